use std::path::PathBuf;

use client_core::UiEvent;
use shared::domain::{InputMode, Screen};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Event(UiEvent),
    /// Start with the role and resume currently selected in the form.
    Start,
    SetRole(String),
    SetResume(Option<PathBuf>),
    ListRoles,
    Help,
    Quit,
    Invalid(String),
    Empty,
}

pub fn parse_line(screen: Screen, line: &str) -> Command {
    let line = line.trim_end_matches(['\r', '\n']);
    let Some(command) = line.trim_start().strip_prefix('/') else {
        return match screen {
            Screen::Interview => Command::Event(UiEvent::SubmitText(line.to_string())),
            _ if line.trim().is_empty() => Command::Empty,
            _ => Command::Invalid("Unknown input; type /help for commands".to_string()),
        };
    };

    let (name, rest) = command
        .split_once(char::is_whitespace)
        .map_or((command, ""), |(name, rest)| (name, rest.trim()));

    match name.to_ascii_lowercase().as_str() {
        "help" | "h" => Command::Help,
        "quit" | "exit" | "q" => Command::Quit,
        "roles" => Command::ListRoles,
        "role" if rest.is_empty() => Command::Invalid("Usage: /role <name>".to_string()),
        "role" => Command::SetRole(rest.to_string()),
        "resume" if rest.is_empty() => Command::SetResume(None),
        "resume" => Command::SetResume(Some(PathBuf::from(rest))),
        "mode" => match rest.parse::<InputMode>() {
            Ok(mode) => Command::Event(UiEvent::SelectMode(mode)),
            Err(err) => Command::Invalid(err.to_string()),
        },
        "start" if rest.is_empty() => Command::Start,
        "start" => Command::Event(UiEvent::StartInterview {
            role: rest.to_string(),
            resume: None,
        }),
        "record" | "stop" => Command::Event(UiEvent::ToggleRecording),
        "end" => Command::Event(UiEvent::EndInterview),
        "new" | "reset" => Command::Event(UiEvent::Reset),
        other => Command::Invalid(format!("Unknown command '/{other}'; type /help")),
    }
}
