//! Replies to channel messages that mention the bot.

use crate::dispatch::{Delivery, fit_message};
use crate::error::Result;
use crate::llm::LlmBridge;
use crate::llm::ollama::InferenceBackend;
use crate::messaging::traits::ChannelReply;

pub const MENTION_APOLOGY: &str =
    "Sorry, I encountered an error while generating a response. Please try again later.";

/// Platform-neutral view of an inbound channel message.
#[derive(Debug, Clone)]
pub struct IncomingMessage {
    pub author_id: u64,
    pub author_name: String,
    pub mentioned_user_ids: Vec<u64>,
    pub mentions_everyone: bool,
    pub content: String,
}

impl IncomingMessage {
    /// Whether the message's audience includes `user_id`.
    pub fn mentions(&self, user_id: u64) -> bool {
        self.mentions_everyone || self.mentioned_user_ids.contains(&user_id)
    }
}

/// Answer `message` if it mentions the bot and was written by someone else.
///
/// The raw message text is the prompt. Any bridge failure is logged with the
/// author and replaced by [`MENTION_APOLOGY`] in the channel.
pub async fn handle_mention<B, R>(
    bridge: &LlmBridge<B>,
    bot_id: u64,
    message: &IncomingMessage,
    reply: &R,
) -> Result<Delivery>
where
    B: InferenceBackend,
    R: ChannelReply,
{
    // Replying to ourselves would start an endless chain.
    if message.author_id == bot_id {
        return Ok(Delivery::Ignored);
    }
    if !message.mentions(bot_id) {
        return Ok(Delivery::Ignored);
    }

    tracing::info!(user = %message.author_name, user_id = message.author_id, "bot mentioned");

    match bridge.respond_as_user(&message.content).await {
        Ok(text) if !text.trim().is_empty() => {
            reply.send_text(&fit_message(&text)).await?;
            Ok(Delivery::Answered)
        }
        Ok(_) => {
            tracing::warn!(user = %message.author_name, "inference backend returned an empty reply");
            reply.send_text(MENTION_APOLOGY).await?;
            Ok(Delivery::Apologized)
        }
        Err(error) => {
            tracing::error!(user = %message.author_name, %error, "failed to generate mention reply");
            reply.send_text(MENTION_APOLOGY).await?;
            Ok(Delivery::Apologized)
        }
    }
}
