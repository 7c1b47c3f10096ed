mod app;
mod config;
mod input;
mod media;
mod view;

use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use clap::Parser;
use client_core::{
    media::{SilentPlayer, UnavailableMicrophone},
    AudioPlayer, HttpInterviewApi, InterviewApi, Microphone, SessionController,
};
use shared::domain::InputMode;
use tokio::io::BufReader;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::{
    config::{load_settings, DEFAULT_CONFIG_PATH},
    media::{ProcessMicrophone, ProcessPlayer},
    view::TerminalView,
};

#[derive(Parser, Debug)]
#[command(name = "mock-interview", about = "Practice job interviews against the interview backend")]
struct Args {
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,
    /// Backend base URL, overriding the config file.
    #[arg(long)]
    api_url: Option<String>,
    #[arg(long)]
    role: Option<String>,
    /// Initial answer mode: text or voice.
    #[arg(long)]
    mode: Option<InputMode>,
    /// Resume to upload when the interview starts.
    #[arg(long)]
    resume: Option<PathBuf>,
    /// Disable the recorder and player processes.
    #[arg(long)]
    no_audio: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    let mut settings = load_settings(&args.config);
    if let Some(api_url) = args.api_url {
        settings.api_base_url = api_url;
    }
    if let Some(role) = args.role {
        settings.default_role = role;
    }
    if let Some(mode) = args.mode {
        settings.default_mode = mode;
    }

    let api = HttpInterviewApi::new(&settings.api_base_url)
        .with_context(|| format!("invalid api url '{}'", settings.api_base_url))?;
    match api.health().await {
        Ok(health) => info!(
            api = %api.base_url(),
            status = %health.status,
            version = health.version.as_deref().unwrap_or("unknown"),
            "backend reachable"
        ),
        Err(err) => warn!(api = %api.base_url(), error = %err, "backend health check failed"),
    }

    let (microphone, player): (Arc<dyn Microphone>, Arc<dyn AudioPlayer>) = if args.no_audio {
        (Arc::new(UnavailableMicrophone), Arc::new(SilentPlayer))
    } else {
        (
            Arc::new(
                ProcessMicrophone::new(&settings.recorder_command, &settings.recorder_mime_type)
                    .context("invalid recorder command")?,
            ),
            Arc::new(ProcessPlayer::new(&settings.player_command).context("invalid player command")?),
        )
    };

    let view = Arc::new(TerminalView::new(std::io::stdout(), settings.default_role));
    if args.resume.is_some() {
        view.set_resume(args.resume);
    }

    let mut controller = SessionController::with_mode(
        Arc::new(api),
        view.clone(),
        microphone,
        player,
        settings.default_mode,
    );
    info!(session_id = %controller.session_id(), "ready");

    app::run(&mut controller, &view, BufReader::new(tokio::io::stdin())).await
}
