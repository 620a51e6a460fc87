//! Top-level error types for Bougbot.

use std::sync::Arc;

/// Crate-wide result type alias.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error enum wrapping domain-specific errors.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Llm(#[from] LlmError),

    #[error(transparent)]
    Command(#[from] CommandError),

    #[error(transparent)]
    Messaging(#[from] MessagingError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Configuration loading errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to load config from {path}: {source}")]
    Load {
        path: String,
        source: Arc<std::io::Error>,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        source: Box<toml::de::Error>,
    },

    #[error("invalid configuration: {0}")]
    Invalid(String),

    #[error("missing required config key: {0}")]
    MissingKey(String),
}

/// Failures surfaced by the LLM bridge.
///
/// Callers match on the variant; the dispatch surface never shows any of
/// these to end users.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    /// Empty prompt or unrecognised role. Never retried.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The inference backend could not be reached at all.
    #[error("could not connect to the inference backend; ensure it is running")]
    BackendUnreachable,

    /// The backend answered, but not with a usable reply.
    #[error(transparent)]
    BackendProtocol(#[from] ProtocolError),

    #[error("unexpected inference failure: {0}")]
    Unexpected(String),
}

/// Errors returned by the inference client adapter.
#[derive(Debug, thiserror::Error)]
pub enum AdapterError {
    #[error("failed to connect to {endpoint}: {detail}")]
    Connect { endpoint: String, detail: String },

    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    #[error("{0}")]
    Unexpected(String),
}

/// Transport and protocol level failures from the inference backend.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[error("inference backend returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("inference backend transport error: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("inference backend returned malformed JSON: {0}")]
    Malformed(#[source] serde_json::Error),
}

/// Slash command invocation errors.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("missing required option: {0}")]
    MissingOption(&'static str),
}

/// Platform send errors.
#[derive(Debug, thiserror::Error)]
pub enum MessagingError {
    #[error("discord request failed: {0}")]
    Discord(#[from] serenity::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
