use std::{fmt, str::FromStr};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

const BASE36: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const SESSION_RANDOM_LEN: usize = 9;

/// Client-generated token correlating every request of one interview attempt.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub String);

impl SessionId {
    pub fn generate() -> Self {
        let mut random = Uuid::new_v4().as_u128();
        let mut suffix = String::with_capacity(SESSION_RANDOM_LEN);
        for _ in 0..SESSION_RANDOM_LEN {
            suffix.push(BASE36[(random % 36) as usize] as char);
            random /= 36;
        }
        Self(format!(
            "session_{suffix}_{}",
            Utc::now().timestamp_millis()
        ))
    }

    /// Generates an id guaranteed to differ from `previous`.
    pub fn regenerate(previous: &SessionId) -> Self {
        loop {
            let next = Self::generate();
            if &next != previous {
                return next;
            }
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputMode {
    #[default]
    Text,
    Voice,
}

impl InputMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Voice => "voice",
        }
    }
}

impl fmt::Display for InputMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown input mode '{0}', expected 'text' or 'voice'")]
pub struct ParseInputModeError(pub String);

impl FromStr for InputMode {
    type Err = ParseInputModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "voice" => Ok(Self::Voice),
            other => Err(ParseInputModeError(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Screen {
    #[default]
    Setup,
    Interview,
    Feedback,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnRole {
    Question,
    Answer,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub content: String,
    pub role: TurnRole,
}

impl Turn {
    pub fn question(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            role: TurnRole::Question,
        }
    }

    pub fn answer(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            role: TurnRole::Answer,
        }
    }
}

pub const DEFAULT_ROLE: &str = "Software Engineer";

/// Roles the interview backend has question banks for.
pub const KNOWN_ROLES: &[&str] = &[
    DEFAULT_ROLE,
    "Data Scientist",
    "Sales Representative",
    "Marketing Manager",
    "Product Manager",
    "UX Designer",
];

/// Resolves user input against [`KNOWN_ROLES`] case-insensitively, keeping
/// unknown roles verbatim.
pub fn canonical_role(input: &str) -> Option<String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }
    let known = KNOWN_ROLES
        .iter()
        .find(|role| role.eq_ignore_ascii_case(trimmed))
        .map(|role| (*role).to_string());
    Some(known.unwrap_or_else(|| trimmed.to_string()))
}
