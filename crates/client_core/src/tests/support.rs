//! Test doubles for the controller's API, view, microphone and player seams.

use std::{
    collections::VecDeque,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    },
};

use async_trait::async_trait;
use shared::{
    domain::{InputMode, Screen, SessionId, Turn, TurnRole},
    protocol::{HealthResponse, UploadResumeResponse, VoiceTurn},
};
use tokio::sync::mpsc;

use crate::{
    api::{InterviewApi, ResumeUpload},
    error::{ApiCallError, MediaError},
    media::{AudioPlayer, CaptureHandle, CaptureTrack, Microphone, RecordedAudio},
    view::{InterviewView, RecordingIndicator},
};

#[derive(Debug, Clone)]
pub enum Reply {
    Ok(String),
    Rejected(String),
    Status(u16),
}

impl Reply {
    fn into_result(self, endpoint: &'static str) -> Result<String, ApiCallError> {
        match self {
            Self::Ok(value) => Ok(value),
            Self::Rejected(message) => Err(ApiCallError::Rejected { endpoint, message }),
            Self::Status(status) => Err(ApiCallError::Status {
                endpoint,
                status,
                message: None,
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiCall {
    Start { session_id: SessionId, role: String },
    Submit { session_id: SessionId, answer: String },
    End { session_id: SessionId },
    Speech { text: String },
    Resume { session_id: SessionId, file_name: String },
    Voice { session_id: SessionId, audio: RecordedAudio },
}

#[derive(Default)]
pub struct FakeApi {
    pub calls: Mutex<Vec<ApiCall>>,
    pub start: Mutex<VecDeque<Reply>>,
    pub submit: Mutex<VecDeque<Reply>>,
    pub end: Mutex<VecDeque<Reply>>,
    pub speech: Mutex<VecDeque<Reply>>,
    pub voice: Mutex<VecDeque<Result<VoiceTurn, Reply>>>,
    pub resume_fails: bool,
}

impl FakeApi {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn script(queue: &Mutex<VecDeque<Reply>>, reply: Reply) {
        queue.lock().expect("script lock").push_back(reply);
    }

    pub fn calls(&self) -> Vec<ApiCall> {
        self.calls.lock().expect("calls lock").clone()
    }

    fn record(&self, call: ApiCall) {
        self.calls.lock().expect("calls lock").push(call);
    }

    fn next(queue: &Mutex<VecDeque<Reply>>, endpoint: &'static str) -> Result<String, ApiCallError> {
        queue
            .lock()
            .expect("script lock")
            .pop_front()
            .unwrap_or(Reply::Status(500))
            .into_result(endpoint)
    }
}

#[async_trait]
impl InterviewApi for FakeApi {
    async fn start_interview(
        &self,
        session_id: &SessionId,
        role: &str,
    ) -> Result<String, ApiCallError> {
        self.record(ApiCall::Start {
            session_id: session_id.clone(),
            role: role.to_string(),
        });
        Self::next(&self.start, "api/start_interview")
    }

    async fn submit_answer(
        &self,
        session_id: &SessionId,
        answer: &str,
    ) -> Result<String, ApiCallError> {
        self.record(ApiCall::Submit {
            session_id: session_id.clone(),
            answer: answer.to_string(),
        });
        Self::next(&self.submit, "api/submit_answer")
    }

    async fn end_interview(&self, session_id: &SessionId) -> Result<String, ApiCallError> {
        self.record(ApiCall::End {
            session_id: session_id.clone(),
        });
        Self::next(&self.end, "api/end_interview")
    }

    async fn text_to_speech(&self, text: &str) -> Result<Vec<u8>, ApiCallError> {
        self.record(ApiCall::Speech {
            text: text.to_string(),
        });
        Self::next(&self.speech, "api/text-to-speech").map(String::into_bytes)
    }

    async fn upload_resume(
        &self,
        session_id: &SessionId,
        resume: ResumeUpload,
    ) -> Result<UploadResumeResponse, ApiCallError> {
        self.record(ApiCall::Resume {
            session_id: session_id.clone(),
            file_name: resume.file_name,
        });
        if self.resume_fails {
            return Err(ApiCallError::Status {
                endpoint: "api/upload_resume",
                status: 500,
                message: Some("parser crashed".to_string()),
            });
        }
        Ok(UploadResumeResponse {
            success: true,
            message: Some("Resume parsed successfully".to_string()),
            error: None,
        })
    }

    async fn process_voice_answer(
        &self,
        session_id: &SessionId,
        audio: RecordedAudio,
    ) -> Result<VoiceTurn, ApiCallError> {
        self.record(ApiCall::Voice {
            session_id: session_id.clone(),
            audio,
        });
        match self.voice.lock().expect("script lock").pop_front() {
            Some(Ok(turn)) => Ok(turn),
            Some(Err(reply)) => match reply.into_result("api/process-voice-answer") {
                Ok(_) => panic!("voice script errors must be failures"),
                Err(err) => Err(err),
            },
            None => Err(ApiCallError::Status {
                endpoint: "api/process-voice-answer",
                status: 500,
                message: None,
            }),
        }
    }

    async fn health(&self) -> Result<HealthResponse, ApiCallError> {
        Ok(HealthResponse {
            status: "healthy".to_string(),
            version: None,
            message: None,
        })
    }
}

#[derive(Debug, Default, Clone)]
pub struct ViewState {
    pub screen: Screen,
    pub role_label: Option<String>,
    pub start_busy: bool,
    pub mode: InputMode,
    pub text_enabled: bool,
    pub voice_enabled: bool,
    pub indicator: RecordingIndicator,
    pub turns: Vec<Turn>,
    pub answer_cleared: usize,
    pub resume_cleared: usize,
    pub feedback: Option<String>,
    pub errors: Vec<String>,
    /// Every mode passed to `apply_input_mode`, in call order.
    pub mode_history: Vec<InputMode>,
    pub disabled_history: Vec<InputMode>,
}

#[derive(Default)]
pub struct RecordingView {
    state: Mutex<ViewState>,
}

impl RecordingView {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(ViewState {
                text_enabled: true,
                voice_enabled: true,
                ..ViewState::default()
            }),
        })
    }

    pub fn snapshot(&self) -> ViewState {
        self.state.lock().expect("view lock").clone()
    }

    pub fn transcript(&self) -> Vec<(TurnRole, String)> {
        self.snapshot()
            .turns
            .into_iter()
            .map(|turn| (turn.role, turn.content))
            .collect()
    }

    fn update(&self, f: impl FnOnce(&mut ViewState)) {
        f(&mut self.state.lock().expect("view lock"));
    }
}

impl InterviewView for RecordingView {
    fn show_screen(&self, screen: Screen) {
        self.update(|state| state.screen = screen);
    }

    fn set_role_label(&self, role: &str) {
        self.update(|state| state.role_label = Some(format!("Role: {role}")));
    }

    fn set_start_busy(&self, busy: bool) {
        self.update(|state| state.start_busy = busy);
    }

    fn apply_input_mode(&self, mode: InputMode) {
        self.update(|state| {
            state.mode = mode;
            state.mode_history.push(mode);
        });
    }

    fn set_input_enabled(&self, mode: InputMode, enabled: bool) {
        self.update(|state| {
            match mode {
                InputMode::Text => state.text_enabled = enabled,
                InputMode::Voice => state.voice_enabled = enabled,
            }
            if !enabled {
                state.disabled_history.push(mode);
            }
        });
    }

    fn set_recording_indicator(&self, indicator: RecordingIndicator) {
        self.update(|state| state.indicator = indicator);
    }

    fn clear_conversation(&self) {
        self.update(|state| state.turns.clear());
    }

    fn append_turn(&self, turn: &Turn) {
        self.update(|state| state.turns.push(turn.clone()));
    }

    fn clear_answer_input(&self) {
        self.update(|state| state.answer_cleared += 1);
    }

    fn clear_resume_selection(&self) {
        self.update(|state| state.resume_cleared += 1);
    }

    fn show_feedback(&self, feedback: &str) {
        self.update(|state| state.feedback = Some(feedback.to_string()));
    }

    fn show_error(&self, message: &str) {
        self.update(|state| state.errors.push(message.to_string()));
    }
}

pub struct FakeTrack {
    stops: Arc<AtomicUsize>,
    sender: Option<mpsc::Sender<Vec<u8>>>,
}

impl CaptureTrack for FakeTrack {
    fn stop(&mut self) {
        self.stops.fetch_add(1, Ordering::SeqCst);
        self.sender.take();
    }
}

/// A capture handle whose fragments are already buffered.
pub fn buffered_capture(fragments: Vec<Vec<u8>>, stops: Arc<AtomicUsize>) -> CaptureHandle {
    let (tx, rx) = mpsc::channel(fragments.len().max(1));
    for fragment in fragments {
        tx.try_send(fragment).expect("buffer fragment");
    }
    CaptureHandle {
        mime_type: "audio/webm".to_string(),
        fragments: rx,
        track: Box::new(FakeTrack {
            stops,
            sender: Some(tx),
        }),
    }
}

pub struct FakeMicrophone {
    pub fragments: Vec<Vec<u8>>,
    pub deny: bool,
    pub opens: AtomicUsize,
    pub stops: Arc<AtomicUsize>,
}

impl FakeMicrophone {
    pub fn with_fragments(fragments: Vec<Vec<u8>>) -> Arc<Self> {
        Arc::new(Self {
            fragments,
            deny: false,
            opens: AtomicUsize::new(0),
            stops: Arc::new(AtomicUsize::new(0)),
        })
    }

    pub fn denied() -> Arc<Self> {
        Arc::new(Self {
            fragments: Vec::new(),
            deny: true,
            opens: AtomicUsize::new(0),
            stops: Arc::new(AtomicUsize::new(0)),
        })
    }

    pub fn stop_count(&self) -> usize {
        self.stops.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Microphone for FakeMicrophone {
    async fn open(&self) -> Result<CaptureHandle, MediaError> {
        self.opens.fetch_add(1, Ordering::SeqCst);
        if self.deny {
            return Err(MediaError::Unavailable("permission denied".to_string()));
        }
        Ok(buffered_capture(
            self.fragments.clone(),
            Arc::clone(&self.stops),
        ))
    }
}

#[derive(Default)]
pub struct RecordingPlayer {
    pub clips: Mutex<Vec<Vec<u8>>>,
    pub fail: bool,
}

impl RecordingPlayer {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            clips: Mutex::new(Vec::new()),
            fail: true,
        })
    }

    pub fn clips(&self) -> Vec<Vec<u8>> {
        self.clips.lock().expect("player lock").clone()
    }
}

#[async_trait]
impl AudioPlayer for RecordingPlayer {
    async fn play(&self, clip: &[u8]) -> Result<(), MediaError> {
        self.clips.lock().expect("player lock").push(clip.to_vec());
        if self.fail {
            return Err(MediaError::Playback("no output device".to_string()));
        }
        Ok(())
    }
}
