//! Chat platform integration.

pub mod discord;
pub mod traits;

pub use discord::DiscordHandler;
pub use traits::{ChannelReply, InteractionReply};
