//! Scripted backend and recording replies shared by unit tests.

use crate::error::{AdapterError, Result};
use crate::llm::ollama::{BackendEndpoint, ChatMessage, ChatResponse, InferenceBackend};
use crate::messaging::traits::{ChannelReply, InteractionReply};

use std::sync::{Arc, Mutex};
use std::time::Duration;

type Script = dyn Fn(&[ChatMessage]) -> std::result::Result<String, AdapterError> + Send + Sync;
type Delay = dyn Fn(&[ChatMessage]) -> Duration + Send + Sync;

/// Backend that records every call and answers from a closure.
#[derive(Clone)]
pub struct ScriptedBackend {
    script: Arc<Script>,
    delay: Arc<Delay>,
    calls: Arc<Mutex<Vec<(BackendEndpoint, Vec<ChatMessage>)>>>,
}

impl ScriptedBackend {
    fn new(
        script: impl Fn(&[ChatMessage]) -> std::result::Result<String, AdapterError>
        + Send
        + Sync
        + 'static,
    ) -> Self {
        Self {
            script: Arc::new(script),
            delay: Arc::new(|_| Duration::ZERO),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn replying(text: &'static str) -> Self {
        Self::new(move |_| Ok(text.to_string()))
    }

    /// Replies with `echo: <content of the last message>`.
    pub fn echoing() -> Self {
        Self::new(|messages| {
            let content = messages
                .last()
                .map(|message| message.content.as_str())
                .unwrap_or_default();
            Ok(format!("echo: {content}"))
        })
    }

    pub fn failing(error: impl Fn() -> AdapterError + Send + Sync + 'static) -> Self {
        Self::new(move |_| Err(error()))
    }

    pub fn panicking() -> Self {
        Self::new(|_| panic!("backend exploded"))
    }

    pub fn with_delay(
        mut self,
        delay: impl Fn(&[ChatMessage]) -> Duration + Send + Sync + 'static,
    ) -> Self {
        self.delay = Arc::new(delay);
        self
    }

    pub fn calls(&self) -> Vec<(BackendEndpoint, Vec<ChatMessage>)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

impl InferenceBackend for ScriptedBackend {
    async fn send(
        &self,
        endpoint: &BackendEndpoint,
        messages: Vec<ChatMessage>,
    ) -> std::result::Result<ChatResponse, AdapterError> {
        self.calls
            .lock()
            .unwrap()
            .push((endpoint.clone(), messages.clone()));

        let delay = (self.delay)(&messages);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        (self.script)(&messages).map(|content| ChatResponse {
            content,
            elapsed: delay,
        })
    }
}

/// Channel reply that keeps every sent text.
#[derive(Clone, Default)]
pub struct RecordingChannel {
    sent: Arc<Mutex<Vec<String>>>,
}

impl RecordingChannel {
    pub fn sent(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }
}

impl ChannelReply for RecordingChannel {
    async fn send_text(&self, text: &str) -> Result<()> {
        self.sent.lock().unwrap().push(text.to_string());
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InteractionEvent {
    Deferred,
    FollowUp(String),
}

/// Interaction reply that keeps the order of defers and follow-ups.
#[derive(Clone, Default)]
pub struct RecordingInteraction {
    events: Arc<Mutex<Vec<InteractionEvent>>>,
}

impl RecordingInteraction {
    pub fn events(&self) -> Vec<InteractionEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl InteractionReply for RecordingInteraction {
    async fn defer(&self) -> Result<()> {
        self.events.lock().unwrap().push(InteractionEvent::Deferred);
        Ok(())
    }

    async fn follow_up(&self, text: &str) -> Result<()> {
        self.events
            .lock()
            .unwrap()
            .push(InteractionEvent::FollowUp(text.to_string()));
        Ok(())
    }
}
