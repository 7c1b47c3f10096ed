use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use client_core::{
    media::{SilentPlayer, UnavailableMicrophone},
    ApiCallError, InterviewApi, RecordedAudio, ResumeUpload,
};
use shared::{
    domain::{InputMode, Screen, SessionId},
    protocol::{HealthResponse, UploadResumeResponse, VoiceTurn},
};

use super::*;

#[derive(Default)]
struct ScriptedBackend {
    log: Mutex<Vec<String>>,
}

impl ScriptedBackend {
    fn log(&self) -> Vec<String> {
        self.log.lock().expect("log").clone()
    }

    fn push(&self, entry: String) {
        self.log.lock().expect("log").push(entry);
    }
}

#[async_trait]
impl InterviewApi for ScriptedBackend {
    async fn start_interview(
        &self,
        _session_id: &SessionId,
        role: &str,
    ) -> Result<String, ApiCallError> {
        self.push(format!("start:{role}"));
        Ok("Tell me about yourself.".to_string())
    }

    async fn submit_answer(
        &self,
        _session_id: &SessionId,
        answer: &str,
    ) -> Result<String, ApiCallError> {
        self.push(format!("answer:{answer}"));
        Ok("What was the outcome?".to_string())
    }

    async fn end_interview(&self, _session_id: &SessionId) -> Result<String, ApiCallError> {
        self.push("end".to_string());
        Ok("Great structure. Add metrics.".to_string())
    }

    async fn text_to_speech(&self, _text: &str) -> Result<Vec<u8>, ApiCallError> {
        Ok(Vec::new())
    }

    async fn upload_resume(
        &self,
        _session_id: &SessionId,
        resume: ResumeUpload,
    ) -> Result<UploadResumeResponse, ApiCallError> {
        self.push(format!("resume:{}", resume.file_name));
        Ok(UploadResumeResponse::default())
    }

    async fn process_voice_answer(
        &self,
        _session_id: &SessionId,
        _audio: RecordedAudio,
    ) -> Result<VoiceTurn, ApiCallError> {
        Err(ApiCallError::Rejected {
            endpoint: "api/process-voice-answer",
            message: "voice disabled".to_string(),
        })
    }

    async fn health(&self) -> Result<HealthResponse, ApiCallError> {
        Ok(HealthResponse::default())
    }
}

#[derive(Clone, Default)]
struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().expect("buffer").extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl SharedBuffer {
    fn text(&self) -> String {
        String::from_utf8(self.0.lock().expect("buffer").clone()).expect("utf8")
    }
}

fn setup() -> (
    Arc<ScriptedBackend>,
    Arc<TerminalView<SharedBuffer>>,
    SharedBuffer,
    SessionController,
) {
    let backend = Arc::new(ScriptedBackend::default());
    let buffer = SharedBuffer::default();
    let view = Arc::new(TerminalView::new(buffer.clone(), "Software Engineer"));
    let controller = SessionController::with_mode(
        backend.clone(),
        view.clone(),
        Arc::new(UnavailableMicrophone),
        Arc::new(SilentPlayer),
        InputMode::Text,
    );
    (backend, view, buffer, controller)
}

#[tokio::test]
async fn full_text_interview_from_setup_to_feedback_and_back() {
    let (backend, view, buffer, mut controller) = setup();
    let script = "/role data scientist\n/start\nI cleaned the data\n\n/end\n/new\n";

    run(&mut controller, &view, script.as_bytes())
        .await
        .expect("run");

    assert_eq!(
        backend.log(),
        vec![
            "start:Data Scientist",
            "answer:I cleaned the data",
            "end",
        ]
    );
    assert_eq!(controller.screen(), Screen::Setup);

    let output = buffer.text();
    assert!(output.contains("[1] Q: Tell me about yourself."));
    assert!(output.contains("[2] A: I cleaned the data"));
    assert!(output.contains("[3] Q: What was the outcome?"));
    assert!(output.contains("Error: Please enter your answer"));
    assert!(output.contains("Great structure. Add metrics."));
}

#[tokio::test]
async fn quit_stops_reading_further_commands() {
    let (backend, view, _buffer, mut controller) = setup();

    run(&mut controller, &view, "/quit\n/start\n".as_bytes())
        .await
        .expect("run");

    assert!(backend.log().is_empty());
    assert_eq!(controller.screen(), Screen::Setup);
}

#[tokio::test]
async fn out_of_screen_commands_are_reported_without_backend_calls() {
    let (backend, view, buffer, mut controller) = setup();

    run(&mut controller, &view, "/end\n/new\n/mode shout\n".as_bytes())
        .await
        .expect("run");

    assert!(backend.log().is_empty());
    let output = buffer.text();
    assert!(output.contains("Error: end_interview is not available on the Setup screen"));
    assert!(output.contains("Error: unknown input mode 'shout'"));
}

#[tokio::test]
async fn voice_mode_without_microphone_surfaces_permission_error() {
    let (_backend, view, buffer, mut controller) = setup();

    run(
        &mut controller,
        &view,
        "/mode voice\n/start\n/record\n".as_bytes(),
    )
    .await
    .expect("run");

    assert_eq!(controller.screen(), Screen::Interview);
    assert!(!controller.is_recording());
    assert!(buffer
        .text()
        .contains("Error: Microphone access denied. Please allow microphone access."));
}
