//! `POST /api/chat`: relay a message to the backend and normalize the reply.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::{Value, json};
use thiserror::Error;

use crate::error::ErrorKind;

use super::state::AppState;

/// Answer used when the backend reply carries no usable text.
pub const NO_RESPONSE_TEXT: &str = "no response received from the server";

/// Public error string for every non-validation failure.
pub const INTERNAL_ERROR_TEXT: &str = "internal server error";

/// Successful proxy reply.
#[derive(Debug, Serialize)]
pub struct ProxyResponse {
    /// Assistant answer.
    pub response: String,
}

/// Failures inside the proxy handler. All of them become a JSON response.
#[derive(Debug, Error)]
pub enum ProxyError {
    /// `message` absent or falsy.
    #[error("message required")]
    MissingMessage,

    /// Inbound body is not JSON.
    #[error("invalid request body: {0}")]
    InvalidBody(String),

    /// Backend answered with a non-2xx status.
    #[error("backend error: {0}")]
    BackendStatus(u16),

    /// Backend could not be reached or the transfer failed.
    #[error("backend request failed: {0}")]
    Upstream(#[from] reqwest::Error),

    /// Backend body is not JSON.
    #[error("invalid backend response: {0}")]
    InvalidReply(String),
}

impl ProxyError {
    /// Category of this failure.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingMessage => ErrorKind::Validation,
            Self::Upstream(err) if err.is_connect() || err.is_timeout() => {
                ErrorKind::BackendUnavailable
            }
            Self::BackendStatus(_) => ErrorKind::BackendError,
            Self::InvalidBody(_) | Self::Upstream(_) | Self::InvalidReply(_) => ErrorKind::Unknown,
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        if matches!(self, Self::MissingMessage) {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": self.to_string() })),
            )
                .into_response();
        }

        tracing::error!(kind = self.kind().as_str(), "chat proxy failed: {self}");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({
                "error": INTERNAL_ERROR_TEXT,
                "details": self.to_string(),
            })),
        )
            .into_response()
    }
}

/// Backend reply fields that may carry the answer, in priority order.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ReplyField {
    /// `response`
    Response,
    /// `message`
    Message,
}

impl ReplyField {
    /// Lookup order.
    pub const PRIORITY: [Self; 2] = [Self::Response, Self::Message];

    /// JSON key.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Response => "response",
            Self::Message => "message",
        }
    }
}

/// Parsed backend reply: the first non-empty string field found, if any.
#[derive(Debug, Default, Eq, PartialEq)]
pub struct BackendReply {
    /// Field the text came from.
    pub field: Option<ReplyField>,
    /// Text found.
    pub text: Option<String>,
}

impl BackendReply {
    /// Parse a backend body.
    ///
    /// # Errors
    /// Returns an error if the body is not JSON.
    pub fn parse(body: &[u8]) -> Result<Self, serde_json::Error> {
        let value: Value = serde_json::from_slice(body)?;
        Ok(ReplyField::PRIORITY
            .into_iter()
            .find_map(|field| {
                value
                    .get(field.key())
                    .and_then(Value::as_str)
                    .filter(|s| !s.is_empty())
                    .map(|text| Self {
                        field: Some(field),
                        text: Some(text.to_string()),
                    })
            })
            .unwrap_or_default())
    }

    /// Answer text, or the fixed fallback.
    #[must_use]
    pub fn into_text(self) -> String {
        self.text.unwrap_or_else(|| NO_RESPONSE_TEXT.to_string())
    }
}

/// Handle `POST /api/chat`.
pub async fn chat_proxy(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<ProxyResponse>, ProxyError> {
    let message = extract_message(&body)?;
    let response = relay(&state, message).await?;
    Ok(Json(ProxyResponse { response }))
}

fn extract_message(body: &[u8]) -> Result<Value, ProxyError> {
    let value: Value =
        serde_json::from_slice(body).map_err(|e| ProxyError::InvalidBody(e.to_string()))?;

    match value.get("message") {
        Some(message) if is_truthy(message) => Ok(message.clone()),
        _ => Err(ProxyError::MissingMessage),
    }
}

async fn relay(state: &AppState, message: Value) -> Result<String, ProxyError> {
    let url = state.backend.chat_url();
    tracing::debug!(%url, "forwarding chat message");

    let response = state
        .http
        .post(&url)
        .json(&json!({ "message": message }))
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        return Err(ProxyError::BackendStatus(status.as_u16()));
    }

    let body = response.bytes().await?;
    let reply = BackendReply::parse(&body).map_err(|e| ProxyError::InvalidReply(e.to_string()))?;
    if reply.field.is_none() {
        tracing::warn!("backend reply had no response text; using fallback");
    }
    Ok(reply.into_text())
}

/// JSON truthiness: `null`, `false`, `0` and `""` are falsy.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reply_prefers_response_over_message() {
        let reply = BackendReply::parse(br#"{"response": "a", "message": "b"}"#);
        assert_eq!(
            reply.ok(),
            Some(BackendReply {
                field: Some(ReplyField::Response),
                text: Some("a".to_string()),
            })
        );
    }

    #[test]
    fn test_reply_falls_back_to_message_then_default() {
        let reply = BackendReply::parse(br#"{"response": "", "message": "from message"}"#)
            .unwrap_or_default();
        assert_eq!(reply.field, Some(ReplyField::Message));
        assert_eq!(reply.into_text(), "from message");

        let reply = BackendReply::parse(br#"{"timestamp": "2024-01-01"}"#).unwrap_or_default();
        assert_eq!(reply.field, None);
        assert_eq!(reply.into_text(), NO_RESPONSE_TEXT);
    }

    #[test]
    fn test_reply_ignores_non_string_fields() {
        let reply = BackendReply::parse(br#"{"response": 42, "message": "text"}"#).unwrap_or_default();
        assert_eq!(reply.field, Some(ReplyField::Message));
    }

    #[test]
    fn test_reply_rejects_non_json() {
        assert!(BackendReply::parse(b"<html>").is_err());
    }

    #[test]
    fn test_truthiness() {
        assert!(!is_truthy(&Value::Null));
        assert!(!is_truthy(&json!(false)));
        assert!(!is_truthy(&json!(0)));
        assert!(!is_truthy(&json!("")));
        assert!(is_truthy(&json!(" ")));
        assert!(is_truthy(&json!(7)));
        assert!(is_truthy(&json!([])));
    }

    #[test]
    fn test_extract_message() {
        assert!(matches!(extract_message(b"{}"), Err(ProxyError::MissingMessage)));
        assert!(matches!(
            extract_message(br#"{"message": null}"#),
            Err(ProxyError::MissingMessage)
        ));
        assert!(matches!(extract_message(b"not json"), Err(ProxyError::InvalidBody(_))));
        assert_eq!(
            extract_message(br#"{"message": "hi"}"#).ok(),
            Some(json!("hi"))
        );
    }

    #[test]
    fn test_error_kinds() {
        assert_eq!(ProxyError::MissingMessage.kind(), ErrorKind::Validation);
        assert_eq!(ProxyError::BackendStatus(503).kind(), ErrorKind::BackendError);
        assert_eq!(ProxyError::InvalidReply(String::new()).kind(), ErrorKind::Unknown);
    }
}
