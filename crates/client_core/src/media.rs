//! Microphone capture and audio playback seams, plus the transient recording
//! session that owns an open microphone between start and stop.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::{sync::mpsc, task::JoinHandle};
use tracing::{debug, warn};

use crate::error::MediaError;

pub const DEFAULT_RECORDING_MIME: &str = "audio/wav";

/// Audio captured for one voice answer, ready for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedAudio {
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

impl RecordedAudio {
    pub fn file_name(&self) -> String {
        format!("recording.{}", extension_for_mime(&self.mime_type))
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

pub fn extension_for_mime(mime_type: &str) -> &'static str {
    let essence = mime_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    match essence.as_str() {
        "audio/webm" => "webm",
        "audio/wav" | "audio/wave" | "audio/x-wav" => "wav",
        "audio/ogg" => "ogg",
        "audio/mpeg" => "mp3",
        _ => "bin",
    }
}

/// An open microphone track.
///
/// `stop` must release the device and close the fragment channel of the
/// owning [`CaptureHandle`] once the last buffered fragment has been sent.
pub trait CaptureTrack: Send {
    fn stop(&mut self);
}

pub struct CaptureHandle {
    pub mime_type: String,
    pub fragments: mpsc::Receiver<Vec<u8>>,
    pub track: Box<dyn CaptureTrack>,
}

#[async_trait]
pub trait Microphone: Send + Sync {
    /// Requests microphone access and starts capturing.
    async fn open(&self) -> Result<CaptureHandle, MediaError>;
}

#[async_trait]
pub trait AudioPlayer: Send + Sync {
    async fn play(&self, clip: &[u8]) -> Result<(), MediaError>;
}

pub struct UnavailableMicrophone;

#[async_trait]
impl Microphone for UnavailableMicrophone {
    async fn open(&self) -> Result<CaptureHandle, MediaError> {
        Err(MediaError::Unavailable(
            "no microphone configured".to_string(),
        ))
    }
}

pub struct SilentPlayer;

#[async_trait]
impl AudioPlayer for SilentPlayer {
    async fn play(&self, clip: &[u8]) -> Result<(), MediaError> {
        debug!(bytes = clip.len(), "audio playback disabled; dropping clip");
        Ok(())
    }
}

/// Accumulates fragments from an open microphone. Fragments are drained by a
/// background task from the moment recording starts, so capture never stalls
/// on a full channel. The track is stopped exactly once: by
/// [`RecordingSession::finish`], [`RecordingSession::discard`] or on drop.
///
/// Must be started inside a tokio runtime.
pub struct RecordingSession {
    mime_type: String,
    collector: Option<JoinHandle<Vec<Vec<u8>>>>,
    track: Option<Box<dyn CaptureTrack>>,
    started_at: Instant,
}

impl RecordingSession {
    pub fn start(handle: CaptureHandle) -> Self {
        let collector = tokio::spawn(collect_fragments(handle.fragments));
        Self {
            mime_type: handle.mime_type,
            collector: Some(collector),
            track: Some(handle.track),
            started_at: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.started_at.elapsed()
    }

    pub fn is_active(&self) -> bool {
        self.track.is_some()
    }

    /// Stops the microphone and packages everything captured so far.
    pub async fn finish(mut self) -> RecordedAudio {
        self.release();
        let fragments = match self.collector.take() {
            Some(collector) => collector.await.unwrap_or_else(|err| {
                warn!(error = %err, "fragment collector failed");
                Vec::new()
            }),
            None => Vec::new(),
        };
        debug!(
            fragments = fragments.len(),
            elapsed_ms = self.elapsed().as_millis() as u64,
            "recording finished"
        );
        RecordedAudio {
            bytes: fragments.concat(),
            mime_type: std::mem::take(&mut self.mime_type),
        }
    }

    pub fn discard(mut self) {
        self.release();
        if let Some(collector) = self.collector.take() {
            collector.abort();
        }
    }

    fn release(&mut self) {
        if let Some(mut track) = self.track.take() {
            track.stop();
            debug!("microphone released");
        }
    }
}

impl Drop for RecordingSession {
    fn drop(&mut self) {
        self.release();
        if let Some(collector) = self.collector.take() {
            collector.abort();
        }
    }
}

/// Runs until every sender of the capture channel is gone.
async fn collect_fragments(mut receiver: mpsc::Receiver<Vec<u8>>) -> Vec<Vec<u8>> {
    let mut fragments = Vec::new();
    while let Some(fragment) = receiver.recv().await {
        if !fragment.is_empty() {
            fragments.push(fragment);
        }
    }
    fragments
}

#[cfg(test)]
#[path = "tests/media_tests.rs"]
mod tests;
