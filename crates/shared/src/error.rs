use serde::{Deserialize, Serialize};

/// Failure categories surfaced by the interview client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Network error or non-2xx status.
    Transport,
    /// The backend answered `success: false`.
    Rejected,
    /// The response body could not be understood.
    Malformed,
    /// Microphone unavailable or denied.
    Permission,
    /// Rejected locally before any request was made.
    Validation,
}

/// Error payload the backend attaches to failed calls.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub error: Option<String>,
}

impl ErrorBody {
    /// Extracts a non-empty `error` message from a raw response body.
    pub fn message_from(raw: &str) -> Option<String> {
        serde_json::from_str::<ErrorBody>(raw)
            .ok()
            .and_then(|body| body.error)
            .map(|message| message.trim().to_string())
            .filter(|message| !message.is_empty())
    }
}
