//! Transport abstraction used by the chat session.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::ChatResult;

/// Something that can deliver a chat message and report backend health.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Send one user message and return the assistant's answer.
    async fn send_message(&self, text: &str) -> ChatResult;

    /// Probe the backend. Never fails; unreachable means `false`.
    async fn check_backend_health(&self) -> bool;
}

#[async_trait]
impl<T: ChatTransport + ?Sized> ChatTransport for Arc<T> {
    async fn send_message(&self, text: &str) -> ChatResult {
        (**self).send_message(text).await
    }

    async fn check_backend_health(&self) -> bool {
        (**self).check_backend_health().await
    }
}
