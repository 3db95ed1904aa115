//! Error types shared by the transport client and the chat session.

use thiserror::Error;

/// Fixed message surfaced when the server cannot be reached at all.
pub const UNREACHABLE_MESSAGE: &str = "could not connect to the server; verify the backend is running.";

/// Fallback message when a failure carries no description.
pub const UNKNOWN_MESSAGE: &str = "unknown error sending message";

/// Coarse category of a chat failure.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum ErrorKind {
    /// Missing or empty input, correctable by the user.
    Validation,
    /// The server could not be reached.
    BackendUnavailable,
    /// The server answered with a failure status or an `error` field.
    BackendError,
    /// Anything uncategorized.
    Unknown,
}

impl ErrorKind {
    /// Stable lowercase name, used in log fields.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::BackendUnavailable => "backend_unavailable",
            Self::BackendError => "backend_error",
            Self::Unknown => "unknown",
        }
    }
}

/// Errors produced while exchanging a chat message.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum ChatError {
    /// Input rejected by the server with `400 Bad Request`.
    #[error("{0}")]
    Validation(String),

    /// Network-level failure reaching the server.
    #[error("could not connect to the server; verify the backend is running.")]
    BackendUnavailable,

    /// The server was reached but reported a failure.
    #[error("{0}")]
    Backend(String),

    /// Uncategorized failure.
    #[error("{0}")]
    Unknown(String),
}

impl ChatError {
    /// Build an [`ChatError::Unknown`], substituting the generic message for an empty one.
    #[must_use]
    pub fn unknown(message: impl Into<String>) -> Self {
        let message = message.into();
        if message.trim().is_empty() {
            Self::Unknown(UNKNOWN_MESSAGE.to_string())
        } else {
            Self::Unknown(message)
        }
    }

    /// Category of this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::BackendUnavailable => ErrorKind::BackendUnavailable,
            Self::Backend(_) => ErrorKind::BackendError,
            Self::Unknown(_) => ErrorKind::Unknown,
        }
    }
}

impl From<reqwest::Error> for ChatError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_connect() || err.is_timeout() {
            Self::BackendUnavailable
        } else if err.is_decode() {
            Self::unknown(format!("invalid response body: {err}"))
        } else {
            Self::unknown(err.to_string())
        }
    }
}

/// Result of one chat round-trip: the answer text or the failure.
pub type ChatResult = Result<String, ChatError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unreachable_message_is_fixed() {
        assert_eq!(ChatError::BackendUnavailable.to_string(), UNREACHABLE_MESSAGE);
        assert_eq!(
            ChatError::BackendUnavailable.kind(),
            ErrorKind::BackendUnavailable
        );
    }

    #[test]
    fn test_unknown_falls_back_to_generic_message() {
        assert_eq!(ChatError::unknown("").to_string(), UNKNOWN_MESSAGE);
        assert_eq!(ChatError::unknown("  ").to_string(), UNKNOWN_MESSAGE);
        assert_eq!(ChatError::unknown("boom").to_string(), "boom");
    }

    #[test]
    fn test_backend_error_passes_message_through() {
        let err = ChatError::Backend("message required".to_string());
        assert_eq!(err.to_string(), "message required");
        assert_eq!(err.kind().as_str(), "backend_error");
    }
}
