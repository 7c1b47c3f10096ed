//! Microphone capture and playback through external audio tools.

use std::process::Stdio;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use client_core::{AudioPlayer, CaptureHandle, CaptureTrack, MediaError, Microphone};
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    process::{Child, ChildStdout, Command},
    sync::{mpsc, oneshot},
};
use tracing::{debug, warn};

const CAPTURE_CHUNK_BYTES: usize = 8 * 1024;
const CAPTURE_QUEUE_DEPTH: usize = 256;

fn split_command(command_line: &str) -> Result<(String, Vec<String>)> {
    let mut parts = command_line.split_whitespace().map(str::to_string);
    let program = parts
        .next()
        .ok_or_else(|| anyhow!("audio command must not be empty"))?;
    Ok((program, parts.collect()))
}

/// Records by streaming the stdout of a recorder process such as `arecord`.
pub struct ProcessMicrophone {
    program: String,
    args: Vec<String>,
    mime_type: String,
}

impl ProcessMicrophone {
    pub fn new(command_line: &str, mime_type: &str) -> Result<Self> {
        let (program, args) = split_command(command_line)?;
        Ok(Self {
            program,
            args,
            mime_type: mime_type.to_string(),
        })
    }
}

struct ProcessTrack {
    stop: Option<oneshot::Sender<()>>,
}

impl CaptureTrack for ProcessTrack {
    fn stop(&mut self) {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
    }
}

#[async_trait]
impl Microphone for ProcessMicrophone {
    async fn open(&self) -> Result<CaptureHandle, MediaError> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|err| {
                MediaError::Unavailable(format!("failed to start '{}': {err}", self.program))
            })?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| MediaError::Unavailable("recorder stdout unavailable".to_string()))?;

        let (fragment_tx, fragment_rx) = mpsc::channel(CAPTURE_QUEUE_DEPTH);
        let (stop_tx, stop_rx) = oneshot::channel();
        tokio::spawn(pump_recorder(child, stdout, fragment_tx, stop_rx));
        debug!(program = %self.program, "recorder started");

        Ok(CaptureHandle {
            mime_type: self.mime_type.clone(),
            fragments: fragment_rx,
            track: Box::new(ProcessTrack {
                stop: Some(stop_tx),
            }),
        })
    }
}

async fn pump_recorder(
    mut child: Child,
    mut stdout: ChildStdout,
    fragments: mpsc::Sender<Vec<u8>>,
    mut stop: oneshot::Receiver<()>,
) {
    let mut buf = vec![0u8; CAPTURE_CHUNK_BYTES];
    loop {
        tokio::select! {
            read = stdout.read(&mut buf) => match read {
                Ok(0) => break,
                Ok(n) => {
                    if fragments.send(buf[..n].to_vec()).await.is_err() {
                        break;
                    }
                }
                Err(err) => {
                    warn!(error = %err, "recorder output failed");
                    break;
                }
            },
            _ = &mut stop => {
                if let Err(err) = child.start_kill() {
                    warn!(error = %err, "failed to stop recorder");
                }
                let mut tail = Vec::new();
                if stdout.read_to_end(&mut tail).await.is_ok() && !tail.is_empty() {
                    let _ = fragments.send(tail).await;
                }
                break;
            }
        }
    }
    match child.wait().await {
        Ok(status) => debug!(%status, "recorder exited"),
        Err(err) => warn!(error = %err, "failed to reap recorder"),
    }
}

/// Plays clips by piping them into a player process such as `ffplay -`.
pub struct ProcessPlayer {
    program: String,
    args: Vec<String>,
}

impl ProcessPlayer {
    pub fn new(command_line: &str) -> Result<Self> {
        let (program, args) = split_command(command_line)?;
        Ok(Self { program, args })
    }
}

#[async_trait]
impl AudioPlayer for ProcessPlayer {
    async fn play(&self, clip: &[u8]) -> Result<(), MediaError> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|err| {
                MediaError::Playback(format!("failed to start '{}': {err}", self.program))
            })?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(clip)
                .await
                .map_err(|err| MediaError::Playback(err.to_string()))?;
        }

        let status = child
            .wait()
            .await
            .map_err(|err| MediaError::Playback(err.to_string()))?;
        if !status.success() {
            return Err(MediaError::Playback(format!(
                "'{}' exited with {status}",
                self.program
            )));
        }
        Ok(())
    }
}
