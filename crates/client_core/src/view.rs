//! The surface the session controller renders into.

use shared::domain::{InputMode, Screen, Turn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecordingIndicator {
    #[default]
    Idle,
    Recording,
    Processing,
    Recorded,
    Failed,
}

impl RecordingIndicator {
    pub fn status_text(self) -> &'static str {
        match self {
            Self::Idle => "Voice mode: start recording to answer",
            Self::Recording => "Recording... speak now!",
            Self::Processing => "Processing...",
            Self::Recorded => "Answer recorded!",
            Self::Failed => "Processing failed",
        }
    }
}

pub trait InterviewView: Send + Sync {
    /// Shows `screen` and hides the other two.
    fn show_screen(&self, screen: Screen);
    fn set_role_label(&self, role: &str);
    fn set_start_busy(&self, busy: bool);
    /// Shows the controls for `mode` and hides the controls of the other mode.
    fn apply_input_mode(&self, mode: InputMode);
    fn set_input_enabled(&self, mode: InputMode, enabled: bool);
    fn set_recording_indicator(&self, indicator: RecordingIndicator);
    fn clear_conversation(&self);
    fn append_turn(&self, turn: &Turn);
    fn clear_answer_input(&self);
    fn clear_resume_selection(&self);
    fn show_feedback(&self, feedback: &str);
    /// Blocking, user-visible error notification.
    fn show_error(&self, message: &str);
}
