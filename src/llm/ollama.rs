//! Ollama chat adapter: the wire client for the inference backend.

use crate::error::{AdapterError, LlmError, ProtocolError};
use crate::logging::truncate_for_log;

use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

const DEFAULT_OLLAMA_BASE_URL: &str = "http://localhost:11434";

/// Longest slice of an error body kept in a `ProtocolError`.
const MAX_ERROR_BODY_CHARS: usize = 500;

/// Author of a chat message.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    #[default]
    User,
    System,
}

impl ChatRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChatRole::User => "user",
            ChatRole::System => "system",
        }
    }
}

impl std::fmt::Display for ChatRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ChatRole {
    type Err = LlmError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "user" => Ok(ChatRole::User),
            "system" => Ok(ChatRole::System),
            other => Err(LlmError::InvalidArgument(format!(
                "{other} is not a valid role, use 'system' or 'user'"
            ))),
        }
    }
}

/// One entry of a chat request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: ChatRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

/// Generated text plus the time the backend took to produce it.
#[derive(Debug, Clone)]
pub struct ChatResponse {
    pub content: String,
    pub elapsed: Duration,
}

/// Where a single call is sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendEndpoint {
    /// Normalized base URL, without a trailing `/api`.
    pub url: String,
    pub model: Arc<str>,
}

impl BackendEndpoint {
    pub fn chat_url(&self) -> String {
        format!("{}/api/chat", self.url)
    }
}

/// Issues chat requests against an inference backend.
///
/// Implementations must not hold connections across calls: every `send`
/// targets the endpoint it is given.
pub trait InferenceBackend: Send + Sync + 'static {
    fn send(
        &self,
        endpoint: &BackendEndpoint,
        messages: Vec<ChatMessage>,
    ) -> impl Future<Output = Result<ChatResponse, AdapterError>> + Send;
}

/// Production backend. Builds a fresh [`OllamaClient`] for every call.
#[derive(Debug, Clone, Copy, Default)]
pub struct OllamaAdapter;

impl InferenceBackend for OllamaAdapter {
    async fn send(
        &self,
        endpoint: &BackendEndpoint,
        messages: Vec<ChatMessage>,
    ) -> Result<ChatResponse, AdapterError> {
        let client = OllamaClient::connect(endpoint)?;
        client.chat(&messages).await
    }
}

/// HTTP client bound to one endpoint and model.
pub struct OllamaClient {
    http: reqwest::Client,
    chat_url: String,
    model: Arc<str>,
}

#[derive(Serialize)]
struct ChatRequestBody<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    stream: bool,
}

#[derive(Deserialize)]
struct ChatReplyBody {
    message: ChatReplyMessage,
}

#[derive(Deserialize)]
struct ChatReplyMessage {
    content: String,
}

impl OllamaClient {
    /// Build a client for `endpoint`. No request or connect timeout is set.
    pub fn connect(endpoint: &BackendEndpoint) -> Result<Self, AdapterError> {
        tracing::debug!(url = %endpoint.url, model = %endpoint.model, "creating Ollama client");

        let http = reqwest::Client::builder().build().map_err(|error| {
            AdapterError::Unexpected(format!("failed to build HTTP client: {error}"))
        })?;

        Ok(Self {
            http,
            chat_url: endpoint.chat_url(),
            model: endpoint.model.clone(),
        })
    }

    /// Send one non-streaming chat completion request.
    pub async fn chat(&self, messages: &[ChatMessage]) -> Result<ChatResponse, AdapterError> {
        let body = ChatRequestBody {
            model: &self.model,
            messages,
            stream: false,
        };

        tracing::debug!(url = %self.chat_url, messages = messages.len(), "sending chat request to Ollama");
        let started = Instant::now();

        let response = self
            .http
            .post(&self.chat_url)
            .json(&body)
            .send()
            .await
            .map_err(|error| self.classify(error))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|error| self.classify(error))?;
        let elapsed = started.elapsed();

        if !status.is_success() {
            let (body, _) = truncate_for_log(&text, MAX_ERROR_BODY_CHARS);
            return Err(ProtocolError::Status {
                status: status.as_u16(),
                body: body.to_string(),
            }
            .into());
        }

        let content = parse_chat_reply(&text)?;
        tracing::debug!(chars = content.chars().count(), "received response from Ollama");

        Ok(ChatResponse { content, elapsed })
    }

    fn classify(&self, error: reqwest::Error) -> AdapterError {
        if error.is_connect() {
            AdapterError::Connect {
                endpoint: self.chat_url.clone(),
                detail: error.to_string(),
            }
        } else if error.is_builder() {
            AdapterError::Unexpected(format!("invalid request to {}: {error}", self.chat_url))
        } else {
            ProtocolError::Transport(error).into()
        }
    }
}

fn parse_chat_reply(text: &str) -> Result<String, AdapterError> {
    let value: serde_json::Value = serde_json::from_str(text).map_err(ProtocolError::Malformed)?;

    let reply: ChatReplyBody = serde_json::from_value(value).map_err(|error| {
        AdapterError::Unexpected(format!("reply is missing message.content: {error}"))
    })?;

    Ok(reply.message.content)
}

/// Trim the configured base URL down to scheme, host and port.
pub fn normalize_ollama_base_url(configured: Option<String>) -> String {
    let mut base_url = configured
        .unwrap_or_else(|| DEFAULT_OLLAMA_BASE_URL.to_string())
        .trim()
        .trim_end_matches('/')
        .to_string();

    if base_url.ends_with("/api") {
        base_url.truncate(base_url.len() - "/api".len());
    } else if base_url.ends_with("/v1") {
        base_url.truncate(base_url.len() - "/v1".len());
    }

    base_url
}
