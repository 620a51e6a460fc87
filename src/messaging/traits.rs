//! Outbound seams between the dispatch surface and a chat platform.

use crate::error::Result;

use std::future::Future;

/// Sends text into the channel an inbound message came from.
pub trait ChannelReply: Send + Sync {
    fn send_text(&self, text: &str) -> impl Future<Output = Result<()>> + Send;
}

/// Two-phase reply to a slash command invocation.
///
/// The platform expects an acknowledgement long before a generation
/// finishes, so callers `defer` first and deliver the text with `follow_up`.
pub trait InteractionReply: Send + Sync {
    /// Acknowledge the invocation without content.
    fn defer(&self) -> impl Future<Output = Result<()>> + Send;

    /// Deliver the actual reply after a `defer`.
    fn follow_up(&self, text: &str) -> impl Future<Output = Result<()>> + Send;
}
