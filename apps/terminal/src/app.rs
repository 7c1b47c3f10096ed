use std::io::Write;

use anyhow::{Context, Result};
use client_core::{InterviewView, SessionController, UiEvent};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::debug;

use crate::{
    input::{parse_line, Command},
    view::TerminalView,
};

/// Reads commands line by line until `/quit` or end of input.
pub async fn run<R, W>(
    controller: &mut SessionController,
    view: &TerminalView<W>,
    input: R,
) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write + Send,
{
    view.print_help(controller.screen());
    let mut lines = input.lines();
    while let Some(line) = lines.next_line().await.context("failed to read input")? {
        let event = match parse_line(controller.screen(), &line) {
            Command::Quit => break,
            Command::Empty => continue,
            Command::Help => {
                view.print_help(controller.screen());
                continue;
            }
            Command::ListRoles => {
                view.print_roles();
                continue;
            }
            Command::SetRole(role) => {
                view.set_role(role);
                continue;
            }
            Command::SetResume(resume) => {
                view.set_resume(resume);
                continue;
            }
            Command::Invalid(message) => {
                view.show_error(&message);
                continue;
            }
            Command::Start => {
                let form = view.form();
                UiEvent::StartInterview {
                    role: form.role,
                    resume: form.resume,
                }
            }
            Command::Event(UiEvent::StartInterview { role, resume: None }) => {
                UiEvent::StartInterview {
                    role,
                    resume: view.form().resume,
                }
            }
            Command::Event(event) => event,
        };

        let screen_before = controller.screen();
        match controller.handle(event).await {
            Ok(()) if controller.screen() != screen_before => {
                view.print_help(controller.screen());
            }
            Ok(()) => {}
            Err(err) if !err.was_surfaced() => view.show_error(&err.to_string()),
            Err(err) => debug!(error = %err, kind = ?err.kind(), "event failed"),
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "tests/app_tests.rs"]
mod tests;
