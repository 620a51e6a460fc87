//! Inference backend access: the Ollama wire adapter and the bridge in front of it.

pub mod bridge;
pub mod ollama;

pub use bridge::LlmBridge;
pub use ollama::{BackendEndpoint, ChatMessage, ChatResponse, ChatRole, InferenceBackend, OllamaAdapter};
