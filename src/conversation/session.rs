//! Drives a [`ConversationState`] against a [`ChatTransport`].
//!
//! An accepted submission spawns one request task. The session keeps its
//! handle and applies the result exactly once when the reply is awaited.

use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::client::ChatTransport;
use crate::error::{ChatError, ChatResult};

use super::machine::ConversationState;
use super::message::Message;

/// One user's chat session.
pub struct ChatSession<T> {
    state: ConversationState,
    transport: Arc<T>,
    in_flight: Option<JoinHandle<ChatResult>>,
}

impl<T> ChatSession<T>
where
    T: ChatTransport + 'static,
{
    /// Start a session with the standard welcome turn.
    #[must_use]
    pub fn new(transport: Arc<T>) -> Self {
        Self::with_state(transport, ConversationState::new())
    }

    /// Start a session from an existing state.
    #[must_use]
    pub const fn with_state(transport: Arc<T>, state: ConversationState) -> Self {
        Self {
            state,
            transport,
            in_flight: None,
        }
    }

    /// Conversation so far.
    #[must_use]
    pub const fn state(&self) -> &ConversationState {
        &self.state
    }

    /// Submit user text. Must be called inside a tokio runtime.
    ///
    /// Returns `false` when the submission was ignored (blank text, or a
    /// request already in flight).
    pub fn submit(&mut self, text: &str) -> bool {
        let Some(request) = self.state.submit(text) else {
            return false;
        };

        let transport = Arc::clone(&self.transport);
        self.in_flight = Some(tokio::spawn(async move {
            transport.send_message(&request.text).await
        }));
        true
    }

    /// Wait for the in-flight request and append its outcome.
    ///
    /// Returns the new assistant turn, or `None` if nothing was in flight.
    pub async fn wait_for_reply(&mut self) -> Option<Message> {
        let handle = self.in_flight.take()?;
        let result = match handle.await {
            Ok(result) => result,
            Err(err) => Err(ChatError::unknown(format!("request task failed: {err}"))),
        };
        self.state.resolve(result).cloned()
    }

    /// Submit and wait in one step.
    pub async fn send(&mut self, text: &str) -> Option<Message> {
        if !self.submit(text) {
            return None;
        }
        self.wait_for_reply().await
    }

    /// Probe the backend through the transport.
    pub async fn check_backend(&self) -> bool {
        self.transport.check_backend_health().await
    }
}
