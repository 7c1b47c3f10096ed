//! Line-oriented rendering of the interview screens.

use std::{
    io::Write,
    path::PathBuf,
    sync::{Mutex, MutexGuard},
};

use client_core::{InterviewView, RecordingIndicator};
use shared::domain::{InputMode, Screen, Turn, TurnRole, KNOWN_ROLES};
use tracing::warn;

/// Setup inputs the user fills in before starting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetupForm {
    pub role: String,
    pub resume: Option<PathBuf>,
}

struct TerminalState<W> {
    out: W,
    form: SetupForm,
    mode: InputMode,
    turns: usize,
}

pub struct TerminalView<W: Write + Send> {
    state: Mutex<TerminalState<W>>,
}

impl<W: Write + Send> TerminalView<W> {
    pub fn new(out: W, default_role: impl Into<String>) -> Self {
        Self {
            state: Mutex::new(TerminalState {
                out,
                form: SetupForm {
                    role: default_role.into(),
                    resume: None,
                },
                mode: InputMode::Text,
                turns: 0,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, TerminalState<W>> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn print(&self, text: &str) {
        let mut state = self.lock();
        if let Err(err) = writeln!(state.out, "{text}").and_then(|()| state.out.flush()) {
            warn!(error = %err, "failed to write to terminal");
        }
    }

    pub fn form(&self) -> SetupForm {
        self.lock().form.clone()
    }

    pub fn set_role(&self, role: String) {
        self.lock().form.role = role.clone();
        self.print(&format!("Selected role: {role}"));
    }

    pub fn set_resume(&self, resume: Option<PathBuf>) {
        let message = match &resume {
            Some(path) => format!("Resume selected: {}", path.display()),
            None => "Resume cleared".to_string(),
        };
        self.lock().form.resume = resume;
        self.print(&message);
    }

    pub fn mode(&self) -> InputMode {
        self.lock().mode
    }

    pub fn print_roles(&self) {
        let current = self.form().role;
        let mut lines = vec!["Available roles:".to_string()];
        for role in KNOWN_ROLES {
            let marker = if *role == current { "*" } else { " " };
            lines.push(format!(" {marker} {role}"));
        }
        self.print(&lines.join("\n"));
    }

    pub fn print_help(&self, screen: Screen) {
        let help = match screen {
            Screen::Setup => {
                "Commands: /role <name>, /roles, /mode text|voice, /resume <path>, /resume (clear), /start [role], /quit"
            }
            Screen::Interview => match self.mode() {
                InputMode::Text => "Type your answer and press Enter. /end finishes the interview, /quit exits.",
                InputMode::Voice => "/record starts and stops recording. /end finishes the interview, /quit exits.",
            },
            Screen::Feedback => "/new starts another interview, /quit exits.",
        };
        self.print(help);
    }
}

impl<W: Write + Send> InterviewView for TerminalView<W> {
    fn show_screen(&self, screen: Screen) {
        let banner = match screen {
            Screen::Setup => "=== Mock Interview: setup ===",
            Screen::Interview => "=== Interview ===",
            Screen::Feedback => "=== Feedback ===",
        };
        self.print(banner);
        if screen == Screen::Setup {
            let form = self.form();
            self.print(&format!("Role: {}", form.role));
        }
    }

    fn set_role_label(&self, role: &str) {
        self.print(&format!("Role: {role}"));
    }

    fn set_start_busy(&self, busy: bool) {
        if busy {
            self.print("Starting interview...");
        }
    }

    fn apply_input_mode(&self, mode: InputMode) {
        self.lock().mode = mode;
        match mode {
            InputMode::Text => self.print("Text mode: type your answers."),
            InputMode::Voice => self.print(RecordingIndicator::Idle.status_text()),
        }
    }

    fn set_input_enabled(&self, _mode: InputMode, enabled: bool) {
        if !enabled {
            self.print("Processing...");
        }
    }

    fn set_recording_indicator(&self, indicator: RecordingIndicator) {
        if indicator != RecordingIndicator::Idle {
            self.print(indicator.status_text());
        }
    }

    fn clear_conversation(&self) {
        self.lock().turns = 0;
    }

    fn append_turn(&self, turn: &Turn) {
        let index = {
            let mut state = self.lock();
            state.turns += 1;
            state.turns
        };
        let label = match turn.role {
            TurnRole::Question => "Q",
            TurnRole::Answer => "A",
        };
        self.print(&format!("[{index}] {label}: {}", turn.content));
    }

    fn clear_answer_input(&self) {}

    fn clear_resume_selection(&self) {
        self.lock().form.resume = None;
    }

    fn show_feedback(&self, feedback: &str) {
        self.print(feedback);
    }

    fn show_error(&self, message: &str) {
        self.print(&format!("Error: {message}"));
    }
}
