pub mod api;
pub mod controller;
pub mod error;
pub mod media;
pub mod view;

pub use api::{HttpInterviewApi, InterviewApi, ResumeUpload};
pub use controller::{SessionController, UiEvent};
pub use error::{ApiCallError, ControllerError, MediaError};
pub use media::{
    AudioPlayer, CaptureHandle, CaptureTrack, Microphone, RecordedAudio, RecordingSession,
};
pub use view::{InterviewView, RecordingIndicator};

#[cfg(test)]
#[path = "tests/support.rs"]
mod test_support;
