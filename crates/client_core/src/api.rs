use std::path::Path;

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::{
    multipart::{Form, Part},
    Client, Response,
};
use serde::{de::DeserializeOwned, Serialize};
use shared::{
    domain::{SessionId, Turn},
    error::ErrorBody,
    protocol::{
        EndInterviewRequest, EndInterviewResponse, HealthResponse, QuestionResponse,
        StartInterviewRequest, SubmitAnswerRequest, TextToSpeechRequest, TextToSpeechResponse,
        UploadResumeResponse, VoiceAnswerResponse, VoiceTurn, AUDIO_PART, END_INTERVIEW_PATH,
        HEALTH_PATH, PROCESS_VOICE_ANSWER_PATH, RESUME_PART, SESSION_ID_PART,
        START_INTERVIEW_PATH, SUBMIT_ANSWER_PATH, TEXT_TO_SPEECH_PATH, UPLOAD_RESUME_PATH,
    },
};
use tracing::{debug, warn};
use url::Url;

use crate::{error::ApiCallError, media::RecordedAudio};

/// A resume file read from disk, ready for multipart upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResumeUpload {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl ResumeUpload {
    pub async fn from_path(path: &Path) -> Result<Self, ApiCallError> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|source| ApiCallError::Upload {
                path: path.display().to_string(),
                source,
            })?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "resume".to_string());
        let mime_type = mime_guess::from_path(path)
            .first_or_octet_stream()
            .essence_str()
            .to_string();
        Ok(Self {
            file_name,
            mime_type,
            bytes,
        })
    }
}

#[async_trait]
pub trait InterviewApi: Send + Sync {
    /// Opens a session for `role` and returns the first question.
    async fn start_interview(
        &self,
        session_id: &SessionId,
        role: &str,
    ) -> Result<String, ApiCallError>;
    /// Returns the next question.
    async fn submit_answer(
        &self,
        session_id: &SessionId,
        answer: &str,
    ) -> Result<String, ApiCallError>;
    /// Returns the final feedback text.
    async fn end_interview(&self, session_id: &SessionId) -> Result<String, ApiCallError>;
    /// Returns decoded audio bytes.
    async fn text_to_speech(&self, text: &str) -> Result<Vec<u8>, ApiCallError>;
    async fn upload_resume(
        &self,
        session_id: &SessionId,
        resume: ResumeUpload,
    ) -> Result<UploadResumeResponse, ApiCallError>;
    async fn process_voice_answer(
        &self,
        session_id: &SessionId,
        audio: RecordedAudio,
    ) -> Result<VoiceTurn, ApiCallError>;
    async fn health(&self) -> Result<HealthResponse, ApiCallError>;
}

pub struct HttpInterviewApi {
    http: Client,
    base_url: Url,
}

impl HttpInterviewApi {
    pub fn new(base_url: &str) -> Result<Self, ApiCallError> {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(http: Client, base_url: &str) -> Result<Self, ApiCallError> {
        let mut normalized = base_url.trim().to_string();
        if !normalized.ends_with('/') {
            normalized.push('/');
        }
        let base_url = Url::parse(&normalized).map_err(|source| ApiCallError::InvalidUrl {
            url: base_url.to_string(),
            source,
        })?;
        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &'static str) -> Result<Url, ApiCallError> {
        self.base_url
            .join(path)
            .map_err(|source| ApiCallError::InvalidUrl {
                url: format!("{}{path}", self.base_url),
                source,
            })
    }

    async fn post_json<B, R>(&self, path: &'static str, body: &B) -> Result<R, ApiCallError>
    where
        B: Serialize + ?Sized + Sync,
        R: DeserializeOwned,
    {
        let url = self.endpoint(path)?;
        debug!(endpoint = path, "posting json request");
        let response = self
            .http
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|source| ApiCallError::Transport {
                endpoint: path,
                source,
            })?;
        decode_response(path, response).await
    }

    async fn post_multipart<R>(&self, path: &'static str, form: Form) -> Result<R, ApiCallError>
    where
        R: DeserializeOwned,
    {
        let url = self.endpoint(path)?;
        debug!(endpoint = path, "posting multipart request");
        let response = self
            .http
            .post(url)
            .multipart(form)
            .send()
            .await
            .map_err(|source| ApiCallError::Transport {
                endpoint: path,
                source,
            })?;
        decode_response(path, response).await
    }
}

async fn decode_response<R>(endpoint: &'static str, response: Response) -> Result<R, ApiCallError>
where
    R: DeserializeOwned,
{
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|source| ApiCallError::Transport { endpoint, source })?;
    if !status.is_success() {
        return Err(ApiCallError::Status {
            endpoint,
            status: status.as_u16(),
            message: ErrorBody::message_from(&body),
        });
    }
    serde_json::from_str(&body).map_err(|err| ApiCallError::Malformed {
        endpoint,
        reason: err.to_string(),
    })
}

fn rejected(endpoint: &'static str, error: Option<String>) -> ApiCallError {
    ApiCallError::Rejected {
        endpoint,
        message: error
            .filter(|message| !message.trim().is_empty())
            .unwrap_or_else(|| "backend reported failure".to_string()),
    }
}

fn required(
    endpoint: &'static str,
    field: &'static str,
    value: Option<String>,
) -> Result<String, ApiCallError> {
    value.ok_or_else(|| ApiCallError::Malformed {
        endpoint,
        reason: format!("missing '{field}'"),
    })
}

fn file_part(
    endpoint: &'static str,
    bytes: Vec<u8>,
    file_name: String,
    mime_type: &str,
) -> Result<Part, ApiCallError> {
    Part::bytes(bytes)
        .file_name(file_name)
        .mime_str(mime_type)
        .map_err(|source| ApiCallError::Transport { endpoint, source })
}

pub fn decode_audio_b64(encoded: &str) -> Result<Vec<u8>, base64::DecodeError> {
    let payload = encoded
        .split_once(";base64,")
        .map_or(encoded, |(_, data)| data);
    STANDARD.decode(payload.trim())
}

#[async_trait]
impl InterviewApi for HttpInterviewApi {
    async fn start_interview(
        &self,
        session_id: &SessionId,
        role: &str,
    ) -> Result<String, ApiCallError> {
        let response: QuestionResponse = self
            .post_json(
                START_INTERVIEW_PATH,
                &StartInterviewRequest {
                    session_id: session_id.clone(),
                    role: role.to_string(),
                },
            )
            .await?;
        if !response.success {
            return Err(rejected(START_INTERVIEW_PATH, response.error));
        }
        required(START_INTERVIEW_PATH, "question", response.question)
    }

    async fn submit_answer(
        &self,
        session_id: &SessionId,
        answer: &str,
    ) -> Result<String, ApiCallError> {
        let response: QuestionResponse = self
            .post_json(
                SUBMIT_ANSWER_PATH,
                &SubmitAnswerRequest {
                    session_id: session_id.clone(),
                    answer: answer.to_string(),
                },
            )
            .await?;
        if !response.success {
            return Err(rejected(SUBMIT_ANSWER_PATH, response.error));
        }
        required(SUBMIT_ANSWER_PATH, "question", response.question)
    }

    async fn end_interview(&self, session_id: &SessionId) -> Result<String, ApiCallError> {
        let response: EndInterviewResponse = self
            .post_json(
                END_INTERVIEW_PATH,
                &EndInterviewRequest {
                    session_id: session_id.clone(),
                },
            )
            .await?;
        if !response.success {
            return Err(rejected(END_INTERVIEW_PATH, response.error));
        }
        debug!(
            turns = response.full_conversation.len(),
            "backend returned interview transcript"
        );
        required(END_INTERVIEW_PATH, "feedback", response.feedback)
    }

    async fn text_to_speech(&self, text: &str) -> Result<Vec<u8>, ApiCallError> {
        let response: TextToSpeechResponse = self
            .post_json(
                TEXT_TO_SPEECH_PATH,
                &TextToSpeechRequest {
                    text: text.to_string(),
                },
            )
            .await?;
        if !response.success {
            return Err(rejected(TEXT_TO_SPEECH_PATH, response.error));
        }
        let encoded = required(TEXT_TO_SPEECH_PATH, "audio", response.audio)?;
        decode_audio_b64(&encoded).map_err(|err| ApiCallError::Malformed {
            endpoint: TEXT_TO_SPEECH_PATH,
            reason: format!("invalid base64 audio: {err}"),
        })
    }

    async fn upload_resume(
        &self,
        session_id: &SessionId,
        resume: ResumeUpload,
    ) -> Result<UploadResumeResponse, ApiCallError> {
        let form = Form::new()
            .part(
                RESUME_PART,
                file_part(
                    UPLOAD_RESUME_PATH,
                    resume.bytes,
                    resume.file_name,
                    &resume.mime_type,
                )?,
            )
            .text(SESSION_ID_PART, session_id.to_string());
        self.post_multipart(UPLOAD_RESUME_PATH, form).await
    }

    async fn process_voice_answer(
        &self,
        session_id: &SessionId,
        audio: RecordedAudio,
    ) -> Result<VoiceTurn, ApiCallError> {
        let file_name = audio.file_name();
        let form = Form::new()
            .part(
                AUDIO_PART,
                file_part(
                    PROCESS_VOICE_ANSWER_PATH,
                    audio.bytes,
                    file_name,
                    &audio.mime_type,
                )?,
            )
            .text(SESSION_ID_PART, session_id.to_string());
        let response: VoiceAnswerResponse = self
            .post_multipart(PROCESS_VOICE_ANSWER_PATH, form)
            .await?;
        if !response.success {
            return Err(rejected(PROCESS_VOICE_ANSWER_PATH, response.error));
        }
        let answer = required(PROCESS_VOICE_ANSWER_PATH, "answer_text", response.answer_text)?;
        let next_question = required(
            PROCESS_VOICE_ANSWER_PATH,
            "next_question",
            response.next_question,
        )?;
        let question_audio = match response.question_audio.as_deref() {
            Some(encoded) if !encoded.is_empty() => match decode_audio_b64(encoded) {
                Ok(bytes) => Some(bytes),
                Err(err) => {
                    warn!(%err, "ignoring undecodable inline question audio");
                    None
                }
            },
            _ => None,
        };
        Ok(VoiceTurn {
            answer: Turn::answer(answer),
            next_question: Turn::question(next_question),
            question_audio,
        })
    }

    async fn health(&self) -> Result<HealthResponse, ApiCallError> {
        let url = self.endpoint(HEALTH_PATH)?;
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|source| ApiCallError::Transport {
                endpoint: HEALTH_PATH,
                source,
            })?;
        decode_response(HEALTH_PATH, response).await
    }
}

#[cfg(test)]
#[path = "tests/api_tests.rs"]
mod tests;
