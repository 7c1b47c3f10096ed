use serde::{Deserialize, Serialize};

use crate::domain::{SessionId, Turn};

pub const START_INTERVIEW_PATH: &str = "api/start_interview";
pub const SUBMIT_ANSWER_PATH: &str = "api/submit_answer";
pub const END_INTERVIEW_PATH: &str = "api/end_interview";
pub const TEXT_TO_SPEECH_PATH: &str = "api/text-to-speech";
pub const UPLOAD_RESUME_PATH: &str = "api/upload_resume";
pub const PROCESS_VOICE_ANSWER_PATH: &str = "api/process-voice-answer";
pub const HEALTH_PATH: &str = "api/health";

/// Multipart part names expected by the backend.
pub const RESUME_PART: &str = "resume";
pub const AUDIO_PART: &str = "audio";
pub const SESSION_ID_PART: &str = "session_id";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartInterviewRequest {
    pub session_id: SessionId,
    pub role: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitAnswerRequest {
    pub session_id: SessionId,
    pub answer: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndInterviewRequest {
    pub session_id: SessionId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextToSpeechRequest {
    pub text: String,
}

/// Response to both `start_interview` and `submit_answer`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QuestionResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub question: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EndInterviewResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub feedback: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub full_conversation: Vec<ConversationEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// One entry of the backend's own transcript, keyed by `type`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationEntry {
    #[serde(rename = "type")]
    pub kind: String,
    pub content: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TextToSpeechResponse {
    #[serde(default)]
    pub success: bool,
    /// Base64 encoded audio clip.
    #[serde(default)]
    pub audio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UploadResumeResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VoiceAnswerResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub answer_text: Option<String>,
    #[serde(default)]
    pub next_question: Option<String>,
    /// Base64 encoded speech for `next_question`, when the backend inlines it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub question_audio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HealthResponse {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Transcribed answer plus the follow-up question for a voice turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoiceTurn {
    pub answer: Turn,
    pub next_question: Turn,
    pub question_audio: Option<Vec<u8>>,
}
