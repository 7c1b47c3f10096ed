//! Session controller: maps UI events onto backend calls and drives the
//! setup -> interview -> feedback screen flow.

use std::{path::PathBuf, sync::Arc};

use shared::domain::{canonical_role, InputMode, Screen, SessionId, Turn};
use tracing::{debug, error, info, warn};

use crate::{
    api::{InterviewApi, ResumeUpload},
    error::{ControllerError, MediaError},
    media::{AudioPlayer, Microphone, RecordedAudio, RecordingSession},
    view::{InterviewView, RecordingIndicator},
};

const EMPTY_ANSWER_MESSAGE: &str = "Please enter your answer";
const MISSING_ROLE_MESSAGE: &str = "Please select a role";
const MICROPHONE_DENIED_MESSAGE: &str =
    "Microphone access denied. Please allow microphone access.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    SelectMode(InputMode),
    StartInterview {
        role: String,
        resume: Option<PathBuf>,
    },
    SubmitText(String),
    ToggleRecording,
    EndInterview,
    Reset,
}

impl UiEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::SelectMode(_) => "select_mode",
            Self::StartInterview { .. } => "start_interview",
            Self::SubmitText(_) => "submit_answer",
            Self::ToggleRecording => "toggle_recording",
            Self::EndInterview => "end_interview",
            Self::Reset => "reset",
        }
    }
}

pub struct SessionController {
    api: Arc<dyn InterviewApi>,
    view: Arc<dyn InterviewView>,
    microphone: Arc<dyn Microphone>,
    player: Arc<dyn AudioPlayer>,
    session_id: SessionId,
    mode: InputMode,
    screen: Screen,
    recording: Option<RecordingSession>,
}

impl SessionController {
    pub fn new(
        api: Arc<dyn InterviewApi>,
        view: Arc<dyn InterviewView>,
        microphone: Arc<dyn Microphone>,
        player: Arc<dyn AudioPlayer>,
    ) -> Self {
        Self::with_mode(api, view, microphone, player, InputMode::default())
    }

    pub fn with_mode(
        api: Arc<dyn InterviewApi>,
        view: Arc<dyn InterviewView>,
        microphone: Arc<dyn Microphone>,
        player: Arc<dyn AudioPlayer>,
        mode: InputMode,
    ) -> Self {
        let session_id = SessionId::generate();
        info!(session_id = %session_id, %mode, "interview session created");
        view.show_screen(Screen::Setup);
        view.apply_input_mode(mode);
        Self {
            api,
            view,
            microphone,
            player,
            session_id,
            mode,
            screen: Screen::Setup,
            recording: None,
        }
    }

    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    pub fn mode(&self) -> InputMode {
        self.mode
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn is_recording(&self) -> bool {
        self.recording.is_some()
    }

    pub async fn handle(&mut self, event: UiEvent) -> Result<(), ControllerError> {
        debug!(event = event.name(), screen = ?self.screen, "handling ui event");
        match event {
            UiEvent::SelectMode(mode) => self.select_mode(mode),
            UiEvent::StartInterview { role, resume } => {
                self.start_interview(&role, resume).await
            }
            UiEvent::SubmitText(text) => self.submit_text_answer(&text).await,
            UiEvent::ToggleRecording => self.toggle_recording().await,
            UiEvent::EndInterview => self.end_interview().await,
            UiEvent::Reset => self.reset(),
        }
    }

    fn require_screen(&self, expected: Screen, action: &'static str) -> Result<(), ControllerError> {
        if self.screen == expected {
            return Ok(());
        }
        debug!(action, screen = ?self.screen, "ignoring event outside its screen");
        Err(ControllerError::Ignored {
            action,
            screen: self.screen,
        })
    }

    fn set_screen(&mut self, screen: Screen) {
        info!(from = ?self.screen, to = ?screen, session_id = %self.session_id, "screen transition");
        self.screen = screen;
        self.view.show_screen(screen);
    }

    fn fail(&self, message: String, err: ControllerError) -> ControllerError {
        error!(error = %err, "{message}");
        self.view.show_error(&message);
        err
    }

    pub fn select_mode(&mut self, mode: InputMode) -> Result<(), ControllerError> {
        self.require_screen(Screen::Setup, "select_mode")?;
        self.mode = mode;
        self.view.apply_input_mode(mode);
        info!(%mode, "input mode selected");
        Ok(())
    }

    pub async fn start_interview(
        &mut self,
        role: &str,
        resume: Option<PathBuf>,
    ) -> Result<(), ControllerError> {
        self.require_screen(Screen::Setup, "start_interview")?;
        let Some(role) = canonical_role(role) else {
            return Err(self.fail(
                MISSING_ROLE_MESSAGE.to_string(),
                ControllerError::Validation(MISSING_ROLE_MESSAGE.to_string()),
            ));
        };

        info!(session_id = %self.session_id, %role, "starting interview");
        self.view.set_role_label(&role);
        self.view.set_start_busy(true);

        if let Some(path) = resume {
            self.upload_resume(path).await;
        }
        let result = self.api.start_interview(&self.session_id, &role).await;
        self.view.set_start_busy(false);

        match result {
            Ok(question) => {
                self.set_screen(Screen::Interview);
                self.view.clear_conversation();
                self.view.append_turn(&Turn::question(question));
                self.view.apply_input_mode(self.mode);
                Ok(())
            }
            Err(err) => Err(self.fail(
                format!(
                    "Failed to start interview. Please make sure the server is running. Error: {err}"
                ),
                err.into(),
            )),
        }
    }

    /// Best effort: failures are logged and the interview proceeds.
    async fn upload_resume(&self, path: PathBuf) {
        let upload = match ResumeUpload::from_path(&path).await {
            Ok(upload) => upload,
            Err(err) => {
                warn!(error = %err, "resume upload skipped");
                return;
            }
        };
        match self.api.upload_resume(&self.session_id, upload).await {
            Ok(response) => info!(
                path = %path.display(),
                message = response.message.as_deref().unwrap_or_default(),
                "resume uploaded"
            ),
            Err(err) => warn!(error = %err, "resume upload failed"),
        }
    }

    pub async fn submit_text_answer(&mut self, text: &str) -> Result<(), ControllerError> {
        self.require_screen(Screen::Interview, "submit_answer")?;
        if self.recording.is_some() {
            debug!("ignoring typed answer while a recording is active");
            return Err(ControllerError::RecordingActive {
                action: "submit_answer",
            });
        }
        let answer = text.trim();
        if answer.is_empty() {
            return Err(self.fail(
                EMPTY_ANSWER_MESSAGE.to_string(),
                ControllerError::Validation(EMPTY_ANSWER_MESSAGE.to_string()),
            ));
        }

        self.view.clear_answer_input();
        self.submit_answer(answer).await
    }

    async fn submit_answer(&mut self, answer: &str) -> Result<(), ControllerError> {
        self.view.append_turn(&Turn::answer(answer));
        self.view.set_input_enabled(self.mode, false);

        let outcome = match self.api.submit_answer(&self.session_id, answer).await {
            Ok(question) => {
                self.view.append_turn(&Turn::question(question.as_str()));
                if self.mode == InputMode::Voice {
                    self.speak(&question).await;
                }
                Ok(())
            }
            Err(err) => Err(self.fail(format!("Failed to submit answer: {err}"), err.into())),
        };

        self.view.set_input_enabled(self.mode, true);
        outcome
    }

    pub async fn toggle_recording(&mut self) -> Result<(), ControllerError> {
        self.require_screen(Screen::Interview, "toggle_recording")?;
        if self.mode != InputMode::Voice {
            debug!("ignoring recording toggle in text mode");
            return Err(ControllerError::Ignored {
                action: "toggle_recording",
                screen: self.screen,
            });
        }
        if self.recording.is_some() {
            self.stop_recording().await
        } else {
            self.start_recording().await
        }
    }

    async fn start_recording(&mut self) -> Result<(), ControllerError> {
        match self.microphone.open().await {
            Ok(handle) => {
                self.recording = Some(RecordingSession::start(handle));
                self.view
                    .set_recording_indicator(RecordingIndicator::Recording);
                info!(session_id = %self.session_id, "recording started");
                Ok(())
            }
            Err(err) => Err(self.fail(MICROPHONE_DENIED_MESSAGE.to_string(), err.into())),
        }
    }

    async fn stop_recording(&mut self) -> Result<(), ControllerError> {
        let Some(recording) = self.recording.take() else {
            return Ok(());
        };
        self.view
            .set_recording_indicator(RecordingIndicator::Processing);
        let audio = recording.finish().await;
        info!(bytes = audio.bytes.len(), mime = %audio.mime_type, "recording stopped");

        self.view.set_input_enabled(InputMode::Voice, false);
        let outcome = self.process_voice_answer(audio).await;
        self.view.set_input_enabled(InputMode::Voice, true);

        let indicator = if outcome.is_ok() {
            RecordingIndicator::Recorded
        } else {
            RecordingIndicator::Failed
        };
        self.view.set_recording_indicator(indicator);
        outcome
    }

    async fn process_voice_answer(&mut self, audio: RecordedAudio) -> Result<(), ControllerError> {
        if audio.is_empty() {
            let err = ControllerError::Media(MediaError::InvalidAudio(
                "no audio was captured".to_string(),
            ));
            return Err(self.fail(format!("Voice processing error: {err}"), err));
        }

        match self.api.process_voice_answer(&self.session_id, audio).await {
            Ok(turn) => {
                self.view.append_turn(&turn.answer);
                self.view.append_turn(&turn.next_question);
                match turn.question_audio {
                    Some(clip) => self.play(&clip).await,
                    None => self.speak(&turn.next_question.content).await,
                }
                Ok(())
            }
            Err(err) => Err(self.fail(format!("Voice processing error: {err}"), err.into())),
        }
    }

    /// Best effort: speech failures are logged only.
    async fn speak(&self, text: &str) {
        match self.api.text_to_speech(text).await {
            Ok(clip) => self.play(&clip).await,
            Err(err) => warn!(error = %err, "text-to-speech failed"),
        }
    }

    async fn play(&self, clip: &[u8]) {
        if let Err(err) = self.player.play(clip).await {
            warn!(error = %err, "audio playback failed");
        }
    }

    pub async fn end_interview(&mut self) -> Result<(), ControllerError> {
        self.require_screen(Screen::Interview, "end_interview")?;
        self.view.set_input_enabled(self.mode, false);
        if let Some(recording) = self.recording.take() {
            recording.discard();
            self.view.set_recording_indicator(RecordingIndicator::Idle);
            info!("active recording discarded");
        }

        let outcome = match self.api.end_interview(&self.session_id).await {
            Ok(feedback) => {
                self.set_screen(Screen::Feedback);
                self.view.show_feedback(&feedback);
                Ok(())
            }
            Err(err) => Err(self.fail(format!("Failed to end interview: {err}"), err.into())),
        };

        self.view.set_input_enabled(self.mode, true);
        outcome
    }

    pub fn reset(&mut self) -> Result<(), ControllerError> {
        self.require_screen(Screen::Feedback, "reset")?;
        let previous = self.session_id.clone();
        self.session_id = SessionId::regenerate(&previous);
        info!(previous = %previous, session_id = %self.session_id, "session reset");

        self.view.clear_conversation();
        self.view.clear_answer_input();
        self.view.clear_resume_selection();
        self.view.set_recording_indicator(RecordingIndicator::Idle);
        self.set_screen(Screen::Setup);
        self.view.apply_input_mode(self.mode);
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
