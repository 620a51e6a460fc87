//! User-facing entry points that turn platform events into bridge calls.
//!
//! Every request ends with exactly one delivered message: the generated
//! text, or a fixed apology that never reveals why generation failed.

pub mod mention;
pub mod story;

pub use mention::{IncomingMessage, handle_mention};
pub use story::{StoryInvocation, StoryRequest, tell_story};

/// Discord rejects message content longer than this many characters.
pub const MESSAGE_CHAR_LIMIT: usize = 2000;

/// How a request left the dispatch surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// The event was not addressed to the bot; nothing was sent.
    Ignored,
    /// Generated text was delivered.
    Answered,
    /// Generation failed and the apology was delivered instead.
    Apologized,
}

/// Fit generated text into one platform message.
pub(crate) fn fit_message(text: &str) -> String {
    match text.char_indices().nth(MESSAGE_CHAR_LIMIT - 1) {
        Some((byte_index, _)) if text.chars().count() > MESSAGE_CHAR_LIMIT => {
            format!("{}…", &text[..byte_index])
        }
        _ => text.to_string(),
    }
}
