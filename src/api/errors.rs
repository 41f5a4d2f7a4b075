//! Error taxonomy for API calls. Every failure coming out of the HTTP client or
//! the facade is an [`ApiError`]; error bodies are normalized into [`ErrorBody`]
//! at the boundary so callers never inspect upstream JSON shapes directly.

use serde_json::Value;
use thiserror::Error;

/// Maximum number of raw body characters kept for unparseable responses.
const MAX_ERROR_CHARS: usize = 200;

const DEFAULT_MESSAGE: &str = "Request failed.";
const MALFORMED_MESSAGE: &str = "Malformed response from server.";

/// Normalized error payload.
#[derive(Clone, Debug, PartialEq)]
pub struct ErrorBody {
    /// User-facing message extracted from the body.
    pub message: String,
    /// Parsed JSON body, or the trimmed text when the body was not JSON.
    pub raw: Value,
}

impl ErrorBody {
    /// Normalizes a parsed JSON error body.
    ///
    /// The message is the first string found in `message`, `error`, `errors[0]`
    /// or `detail`; anything else falls back to a generic message.
    #[must_use]
    pub fn from_json(raw: Value) -> Self {
        let candidates = [
            raw.get("message"),
            raw.get("error"),
            raw.get("errors").and_then(|errors| errors.get(0)),
            raw.get("detail"),
        ];
        let message = candidates
            .into_iter()
            .flatten()
            .filter_map(Value::as_str)
            .map(str::trim)
            .find(|message| !message.is_empty())
            .unwrap_or(DEFAULT_MESSAGE)
            .to_string();

        Self { message, raw }
    }

    /// Fallback payload substituted when the body could not be parsed as JSON.
    #[must_use]
    pub fn malformed(text: &str) -> Self {
        Self {
            message: MALFORMED_MESSAGE.to_string(),
            raw: Value::String(text.trim().chars().take(MAX_ERROR_CHARS).collect()),
        }
    }

    /// Payload describing a JSON body that did not match the expected type.
    #[must_use]
    pub fn unexpected_shape(raw: Value, err: &serde_json::Error) -> Self {
        Self {
            message: format!("Failed to decode response: {err}"),
            raw,
        }
    }
}

#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never produced a response.
    #[error("Network error: {0}")]
    Transport(String),
    #[error("Timeout: {0}")]
    Timeout(String),
    /// The server answered with a status outside 200-299.
    #[error("Request failed ({status}): {}", .body.message)]
    Http { status: u16, body: ErrorBody },
    /// The server answered but the body was unusable.
    #[error("Response error ({status}): {}", .body.message)]
    Malformed { status: u16, body: ErrorBody },
    #[error("Response error: expected payload absent")]
    MissingData,
    #[error("Config error: {0}")]
    Config(String),
    #[error("Request error: {0}")]
    Serialization(String),
}

impl ApiError {
    /// HTTP status, when a response was received.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } | Self::Malformed { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Normalized response body, when a response was received.
    #[must_use]
    pub fn body(&self) -> Option<&ErrorBody> {
        match self {
            Self::Http { body, .. } | Self::Malformed { body, .. } => Some(body),
            _ => None,
        }
    }

    /// The single message surfaced to users for this error.
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::Http { body, .. } | Self::Malformed { body, .. } => body.message.clone(),
            Self::Transport(message)
            | Self::Timeout(message)
            | Self::Config(message)
            | Self::Serialization(message) => message.clone(),
            Self::MissingData => "expected payload absent".to_string(),
        }
    }

    /// True for 401 and 403 responses.
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        matches!(self.status(), Some(401 | 403))
    }
}
