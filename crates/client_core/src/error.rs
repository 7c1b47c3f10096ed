use shared::{domain::Screen, error::FailureKind};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiCallError {
    #[error("invalid backend url '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("request to {endpoint} failed: {source}")]
    Transport {
        endpoint: &'static str,
        #[source]
        source: reqwest::Error,
    },
    #[error(
        "HTTP error! status: {status}{}",
        .message.as_deref().map(|m| format!(" ({m})")).unwrap_or_default()
    )]
    Status {
        endpoint: &'static str,
        status: u16,
        message: Option<String>,
    },
    #[error("{message}")]
    Rejected {
        endpoint: &'static str,
        message: String,
    },
    #[error("unexpected response from {endpoint}: {reason}")]
    Malformed {
        endpoint: &'static str,
        reason: String,
    },
    #[error("failed to read upload {path}: {source}")]
    Upload {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl ApiCallError {
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::InvalidUrl { .. } | Self::Transport { .. } | Self::Status { .. } => {
                FailureKind::Transport
            }
            Self::Rejected { .. } => FailureKind::Rejected,
            Self::Malformed { .. } => FailureKind::Malformed,
            Self::Upload { .. } => FailureKind::Validation,
        }
    }
}

#[derive(Debug, Error)]
pub enum MediaError {
    #[error("microphone unavailable: {0}")]
    Unavailable(String),
    #[error("audio playback failed: {0}")]
    Playback(String),
    #[error("invalid audio payload: {0}")]
    InvalidAudio(String),
}

#[derive(Debug, Error)]
pub enum ControllerError {
    #[error(transparent)]
    Api(#[from] ApiCallError),
    #[error(transparent)]
    Media(#[from] MediaError),
    #[error("{0}")]
    Validation(String),
    #[error("{action} is not available on the {screen:?} screen")]
    Ignored {
        action: &'static str,
        screen: Screen,
    },
    #[error("{action} is not available while recording")]
    RecordingActive { action: &'static str },
}

impl ControllerError {
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Api(err) => err.kind(),
            Self::Media(MediaError::Unavailable(_)) => FailureKind::Permission,
            Self::Media(_) => FailureKind::Malformed,
            Self::Validation(_) | Self::Ignored { .. } | Self::RecordingActive { .. } => {
                FailureKind::Validation
            }
        }
    }

    /// Ignored events were never shown to the user.
    pub fn was_surfaced(&self) -> bool {
        !matches!(self, Self::Ignored { .. } | Self::RecordingActive { .. })
    }
}
