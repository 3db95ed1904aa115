//! HTTP transport client for the chat API.
//!
//! Sends `POST <base>/chat` with `{"message": ...}` and folds every outcome
//! (success body, error status, `error` field, network failure) into a
//! [`ChatResult`]. The health probe hits `GET <base>/health` and only ever
//! answers `true` or `false`.

pub mod transport;

pub use transport::ChatTransport;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use crate::config::{self, ClientConfig, ConfigError};
use crate::error::{ChatError, ChatResult};

/// Outbound chat request body.
#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    message: &'a str,
}

/// Reply envelope returned by the chat API.
#[derive(Debug, Default, Deserialize)]
struct ChatReply {
    #[serde(default)]
    response: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

impl ChatReply {
    fn into_result(self) -> ChatResult {
        if let Some(error) = self.error.filter(|e| !e.is_empty()) {
            return Err(ChatError::Backend(error));
        }
        self.response
            .ok_or_else(|| ChatError::unknown("reply did not contain a response"))
    }
}

/// Client for the chat API, built once and passed to whoever needs it.
#[derive(Clone, Debug)]
pub struct ChatClient {
    http: reqwest::Client,
    base_url: String,
}

impl ChatClient {
    /// Create a client from configuration.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &ClientConfig) -> Result<Self, ConfigError> {
        let http = config::build_http_client(config.request_timeout())?;
        Ok(Self::with_http(http, config.api_url()))
    }

    /// Create a client around an existing HTTP client.
    #[must_use]
    pub fn with_http(http: reqwest::Client, base_url: &str) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Base URL requests are sent to.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Send one message. The caller guarantees `text` is not blank.
    ///
    /// # Errors
    /// Returns a [`ChatError`] describing why no answer was obtained.
    pub async fn send_message(&self, text: &str) -> ChatResult {
        let result = self.post_chat(text).await;
        if let Err(err) = &result {
            tracing::warn!(kind = err.kind().as_str(), "chat request failed: {err}");
        }
        result
    }

    /// `true` iff `GET <base>/health` answers with a 2xx status.
    pub async fn check_backend_health(&self) -> bool {
        let url = format!("{}/health", self.base_url);
        match self.http.get(&url).send().await {
            Ok(response) => {
                let healthy = response.status().is_success();
                tracing::debug!(status = %response.status(), healthy, "health probe");
                healthy
            }
            Err(err) => {
                tracing::warn!("health probe failed: {err}");
                false
            }
        }
    }

    async fn post_chat(&self, text: &str) -> ChatResult {
        let url = format!("{}/chat", self.base_url);
        let response = self
            .http
            .post(&url)
            .json(&ChatRequest { message: text })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.bytes().await.unwrap_or_default();
            return Err(status_error(status, &body));
        }

        let reply: ChatReply = response.json().await?;
        reply.into_result()
    }
}

#[async_trait]
impl ChatTransport for ChatClient {
    async fn send_message(&self, text: &str) -> ChatResult {
        Self::send_message(self, text).await
    }

    async fn check_backend_health(&self) -> bool {
        Self::check_backend_health(self).await
    }
}

/// Map a non-2xx reply to an error, preferring the body's `error` field.
///
/// `400` means the server rejected the input itself and maps to
/// [`ChatError::Validation`]; every other status is a backend failure.
fn status_error(status: StatusCode, body: &[u8]) -> ChatError {
    let message = serde_json::from_slice::<ChatReply>(body)
        .ok()
        .and_then(|reply| reply.error)
        .filter(|e| !e.is_empty())
        .unwrap_or_else(|| {
            format!(
                "Error {}: {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or_default()
            )
        });

    if status == StatusCode::BAD_REQUEST {
        ChatError::Validation(message)
    } else {
        ChatError::Backend(message)
    }
}
