use std::{fs, path::Path};

use client_core::media::DEFAULT_RECORDING_MIME;
use serde::Deserialize;
use shared::domain::{InputMode, DEFAULT_ROLE};
use tracing::warn;

pub const DEFAULT_CONFIG_PATH: &str = "interview.toml";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub api_base_url: String,
    pub default_role: String,
    pub default_mode: InputMode,
    pub recorder_command: String,
    pub recorder_mime_type: String,
    pub player_command: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base_url: "http://127.0.0.1:5000".into(),
            default_role: DEFAULT_ROLE.into(),
            default_mode: InputMode::Text,
            recorder_command: "arecord -q -f S16_LE -r 16000 -c 1 -t wav -".into(),
            recorder_mime_type: DEFAULT_RECORDING_MIME.into(),
            player_command: "ffplay -autoexit -nodisp -loglevel quiet -".into(),
        }
    }
}

pub fn load_settings(path: &Path) -> Settings {
    let mut settings = match fs::read_to_string(path) {
        Ok(raw) => parse_settings(&raw).unwrap_or_else(|err| {
            warn!(path = %path.display(), error = %err, "ignoring malformed config file");
            Settings::default()
        }),
        Err(_) => Settings::default(),
    };
    apply_env_overrides(&mut settings, |key| std::env::var(key).ok());
    settings
}

pub fn parse_settings(raw: &str) -> Result<Settings, toml::de::Error> {
    toml::from_str(raw)
}

pub fn apply_env_overrides(settings: &mut Settings, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(v) = lookup("INTERVIEW_API_URL") {
        settings.api_base_url = v;
    }
    if let Some(v) = lookup("APP__API_BASE_URL") {
        settings.api_base_url = v;
    }

    if let Some(v) = lookup("APP__DEFAULT_ROLE") {
        settings.default_role = v;
    }

    if let Some(v) = lookup("APP__DEFAULT_MODE") {
        match v.parse::<InputMode>() {
            Ok(mode) => settings.default_mode = mode,
            Err(err) => warn!(error = %err, "ignoring APP__DEFAULT_MODE"),
        }
    }

    if let Some(v) = lookup("APP__RECORDER_COMMAND") {
        settings.recorder_command = v;
    }
    if let Some(v) = lookup("APP__RECORDER_MIME_TYPE") {
        settings.recorder_mime_type = v;
    }

    if let Some(v) = lookup("APP__PLAYER_COMMAND") {
        settings.player_command = v;
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
