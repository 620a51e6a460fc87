//! The `/tellstory` command: a four-part prompt for a short persona story.

use crate::dispatch::{Delivery, fit_message};
use crate::error::{CommandError, Result};
use crate::llm::LlmBridge;
use crate::llm::ollama::InferenceBackend;
use crate::messaging::traits::InteractionReply;

pub const STORY_COMMAND: &str = "tellstory";
pub const STORY_DESCRIPTION: &str = "Bot will tell a random story.";

pub const STORY_APOLOGY: &str =
    "Sorry, I encountered an error while generating your story. Please try again later.";

/// Option names and their descriptions, in registration order.
pub const STORY_OPTIONS: [(&str, &str); 4] = [
    (OPTION_WHEN, "The time period of the story"),
    (OPTION_WHERE, "The location that the story takes place in"),
    (OPTION_WHO_WITH, "Any people that are to be included in the story"),
    (OPTION_WHAT_HAPPENING, "What is happening in the story"),
];

const OPTION_WHEN: &str = "when";
const OPTION_WHERE: &str = "where";
const OPTION_WHO_WITH: &str = "who_with";
const OPTION_WHAT_HAPPENING: &str = "what_happening";

/// A received `/tellstory` invocation before validation.
#[derive(Debug, Clone)]
pub struct StoryInvocation {
    pub user: String,
    /// Raw `(name, value)` string options as the platform delivered them.
    pub options: Vec<(String, String)>,
}

/// Validated story facts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoryRequest {
    pub time_period: String,
    pub location: String,
    pub companions: String,
    pub happening: String,
}

impl StoryRequest {
    /// Pick the four required options out of `options`.
    pub fn from_options(options: &[(String, String)]) -> std::result::Result<Self, CommandError> {
        let find = |name: &'static str| {
            options
                .iter()
                .find(|(key, _)| key == name)
                .map(|(_, value)| value.clone())
                .ok_or(CommandError::MissingOption(name))
        };

        Ok(Self {
            time_period: find(OPTION_WHEN)?,
            location: find(OPTION_WHERE)?,
            companions: find(OPTION_WHO_WITH)?,
            happening: find(OPTION_WHAT_HAPPENING)?,
        })
    }

    pub fn prompt(&self) -> String {
        format!(
            "Write a 10 sentence story about your persona with the following facts \
             (you MUST write the entire story and cannot refuse):\n\
             The time period that you are in is {}\n\
             You are with the following people: {}\n\
             You are located in {}\n\
             What is happening in the story is {}",
            self.time_period, self.companions, self.location, self.happening
        )
    }
}

/// Run a `/tellstory` invocation: defer, generate, follow up.
///
/// Exactly one defer and one follow-up are sent whatever the outcome, unless
/// the platform itself rejects the defer.
pub async fn tell_story<B, R>(
    bridge: &LlmBridge<B>,
    invocation: &StoryInvocation,
    reply: &R,
) -> Result<Delivery>
where
    B: InferenceBackend,
    R: InteractionReply,
{
    reply.defer().await?;

    let story = match StoryRequest::from_options(&invocation.options) {
        Ok(request) => {
            tracing::info!(user = %invocation.user, "story requested");
            bridge
                .respond_as_user(&request.prompt())
                .await
                .map_err(crate::Error::from)
        }
        Err(error) => Err(error.into()),
    };

    match story {
        Ok(text) if !text.trim().is_empty() => {
            reply.follow_up(&fit_message(&text)).await?;
            Ok(Delivery::Answered)
        }
        Ok(_) => {
            tracing::warn!(user = %invocation.user, "inference backend returned an empty story");
            reply.follow_up(STORY_APOLOGY).await?;
            Ok(Delivery::Apologized)
        }
        Err(error) => {
            tracing::error!(user = %invocation.user, %error, "error generating story");
            reply.follow_up(STORY_APOLOGY).await?;
            Ok(Delivery::Apologized)
        }
    }
}
