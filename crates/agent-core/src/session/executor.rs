//! Mapping commands onto the accessibility provider and the host system.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use deskpilot_core_types::history::tags;
use deskpilot_core_types::{ActionKind, Command};
use deskpilot_perceiver_structural::{AccessibilityProvider, WindowHandle};
use tracing::info;

use crate::errors::AgentError;

/// Host-system side effects: clipboard, file and process operations,
/// downloads. Platform impls live outside this crate.
#[async_trait]
pub trait SystemBridge: Send + Sync {
    /// Run one system-class command and return its textual result.
    async fn run(&self, command: &Command) -> Result<String, AgentError>;
}

/// What executing a command produced, beyond its UI side effect.
pub enum ExecOutcome {
    /// Pure UI action; the diff of the next scan is the record.
    Ui,
    /// System action; the tagged entry goes straight into the ledger.
    Note(String),
    /// The session moved to a different window.
    Window(WindowHandle),
}

pub struct Executor {
    provider: Arc<dyn AccessibilityProvider>,
    system: Arc<dyn SystemBridge>,
}

impl Executor {
    pub fn new(provider: Arc<dyn AccessibilityProvider>, system: Arc<dyn SystemBridge>) -> Self {
        Self { provider, system }
    }

    pub async fn execute(
        &self,
        window: &WindowHandle,
        command: &Command,
    ) -> Result<ExecOutcome, AgentError> {
        info!(action = %command.action, element = %command.element_id, "executing");
        match &command.action {
            ActionKind::Click => {
                self.provider.click(window, &command.element_id).await?;
                Ok(ExecOutcome::Ui)
            }
            ActionKind::Type => {
                self.provider
                    .enter(window, &command.element_id, &command.text)
                    .await?;
                Ok(ExecOutcome::Ui)
            }
            ActionKind::Key => {
                self.provider.press_key(window, &command.text).await?;
                Ok(ExecOutcome::Ui)
            }
            ActionKind::Select => {
                self.provider
                    .select(window, &command.element_id, &command.text)
                    .await?;
                Ok(ExecOutcome::Ui)
            }
            ActionKind::MouseMove => {
                self.provider.move_mouse(command.x, command.y).await?;
                Ok(ExecOutcome::Ui)
            }
            ActionKind::Wait => {
                tokio::time::sleep(Duration::from_millis(command.delay_ms)).await;
                Ok(ExecOutcome::Ui)
            }
            ActionKind::SwitchWindow => {
                let handle = self.provider.find_window(&command.text).await?;
                Ok(ExecOutcome::Window(handle))
            }
            ActionKind::ReadClipboard => {
                let content = self.system.run(command).await?;
                Ok(ExecOutcome::Note(format!(
                    "{} {content}",
                    tags::CLIPBOARD_CONTENT
                )))
            }
            ActionKind::WriteClipboard
            | ActionKind::Download
            | ActionKind::OsList
            | ActionKind::OsDelete
            | ActionKind::OsRead
            | ActionKind::OsRun
            | ActionKind::OsKill
            | ActionKind::OsMkdir
            | ActionKind::OsWrite
            | ActionKind::OsExists => {
                let output = self.system.run(command).await?;
                Ok(ExecOutcome::Note(format!("{} {output}", tags::OS_RESULT)))
            }
            // Resolved before the executor: inspect_screen and ask_user by
            // the controller, net_search and create_playbook by the server.
            ActionKind::InspectScreen
            | ActionKind::AskUser
            | ActionKind::NetSearch
            | ActionKind::CreatePlaybook
            | ActionKind::None => Err(AgentError::execution(format!(
                "action '{}' is not executable",
                command.action
            ))),
            ActionKind::Unknown(raw) => {
                Err(AgentError::execution(format!("unknown action '{raw}'")))
            }
        }
    }
}
