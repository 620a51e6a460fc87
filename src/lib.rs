//! Bougbot: a Discord bot that relays mentions and story requests to a local Ollama model.

pub mod config;
pub mod dispatch;
pub mod error;
pub mod llm;
pub mod logging;
pub mod messaging;

#[cfg(test)]
mod test_support;

pub use error::{Error, Result};
