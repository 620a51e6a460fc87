//! LLM bridge: validated prompt in, generated text or a classified failure out.

use crate::config::LlmConfig;
use crate::error::{AdapterError, LlmError};
use crate::llm::ollama::{ChatMessage, ChatRole, InferenceBackend, OllamaAdapter};
use crate::logging::truncate_for_log;

use std::sync::Arc;
use std::time::Instant;

const MAX_LOGGED_PROMPT_CHARS: usize = 200;

/// Turns prompts into single-message chat requests against the backend.
///
/// Holds no connection. Each call resolves the endpoint from the owned
/// [`LlmConfig`] and hands it to the backend, which runs on its own task so
/// a slow generation never occupies the caller's event path. There are no
/// retries and no timeout: one attempt per call.
pub struct LlmBridge<B = OllamaAdapter> {
    config: LlmConfig,
    backend: Arc<B>,
}

impl LlmBridge<OllamaAdapter> {
    pub fn new(config: LlmConfig) -> Self {
        Self::with_backend(config, OllamaAdapter)
    }
}

impl<B: InferenceBackend> LlmBridge<B> {
    pub fn with_backend(config: LlmConfig, backend: B) -> Self {
        Self {
            config,
            backend: Arc::new(backend),
        }
    }

    /// Generate a reply to `prompt` as the default `user` role.
    pub async fn respond_as_user(&self, prompt: &str) -> Result<String, LlmError> {
        self.respond(ChatRole::User.as_str(), prompt).await
    }

    /// Generate a reply to `prompt` sent under `role` (`"user"` or `"system"`).
    pub async fn respond(&self, role: &str, prompt: &str) -> Result<String, LlmError> {
        if prompt.trim().is_empty() {
            return Err(LlmError::InvalidArgument("please enter a prompt".into()));
        }
        let role: ChatRole = role.parse()?;

        let prompt_chars = prompt.chars().count();
        tracing::info!(%role, prompt_chars, "LLM request initiated");
        let (logged_prompt, truncated) = truncate_for_log(prompt, MAX_LOGGED_PROMPT_CHARS);
        tracing::debug!(prompt = %logged_prompt, truncated, "full prompt content");

        let endpoint = self.config.endpoint();
        tracing::debug!(url = %endpoint.url, model = %endpoint.model, "dispatching to inference backend");

        let messages = vec![ChatMessage::new(role, prompt)];
        let backend = Arc::clone(&self.backend);
        let started = Instant::now();

        let outcome = tokio::spawn(async move { backend.send(&endpoint, messages).await })
            .await
            .map_err(|error| {
                tracing::error!(%error, "inference task did not complete");
                LlmError::Unexpected(format!("inference task failed: {error}"))
            })?;

        let elapsed = started.elapsed().as_secs_f64();

        match outcome {
            Ok(response) => {
                tracing::info!(
                    elapsed_secs = elapsed,
                    backend_secs = response.elapsed.as_secs_f64(),
                    response_chars = response.content.chars().count(),
                    "LLM request completed"
                );
                Ok(response.content)
            }
            Err(AdapterError::Connect { endpoint, detail }) => {
                tracing::error!(%endpoint, %detail, "connection error to inference backend");
                Err(LlmError::BackendUnreachable)
            }
            Err(AdapterError::Protocol(error)) => {
                tracing::error!(%error, elapsed_secs = elapsed, "inference backend protocol error");
                Err(LlmError::BackendProtocol(error))
            }
            Err(AdapterError::Unexpected(detail)) => {
                tracing::error!(%detail, elapsed_secs = elapsed, "unexpected error in LLM request");
                Err(LlmError::Unexpected(detail))
            }
        }
    }
}
