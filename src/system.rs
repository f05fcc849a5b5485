//! Host-system side of command execution: files, processes, clipboard,
//! downloads. Outputs are truncated before they enter the ledger so prompts
//! stay bounded.

use std::sync::Mutex;

use async_trait::async_trait;
use deskpilot_agent_core::{AgentError, SystemBridge};
use deskpilot_core_types::{ActionKind, Command};
use tracing::info;

const MAX_OUTPUT: usize = 1000;

/// Real file and process operations plus an in-process clipboard.
pub struct LocalSystem {
    clipboard: Mutex<String>,
    http: reqwest::Client,
}

impl LocalSystem {
    pub fn new() -> Self {
        Self {
            clipboard: Mutex::new(String::new()),
            http: reqwest::Client::new(),
        }
    }

    async fn download(&self, command: &Command) -> Result<String, AgentError> {
        let url = command
            .url
            .as_deref()
            .filter(|u| !u.is_empty())
            .ok_or_else(|| AgentError::execution("download without a url"))?;
        let file_name = command
            .local_file_name
            .clone()
            .filter(|n| !n.is_empty())
            .or_else(|| {
                url.rsplit('/')
                    .next()
                    .filter(|n| !n.is_empty())
                    .map(str::to_string)
            })
            .ok_or_else(|| AgentError::execution("download without a file name"))?;
        let bytes = self
            .http
            .get(url)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| AgentError::execution(format!("download {url}: {e}")))?
            .bytes()
            .await
            .map_err(|e| AgentError::execution(format!("download body {url}: {e}")))?;
        tokio::fs::write(&file_name, &bytes)
            .await
            .map_err(|e| AgentError::execution(format!("saving {file_name}: {e}")))?;
        info!(url, file_name, size = bytes.len(), "downloaded");
        Ok(format!("saved {} bytes to {file_name}", bytes.len()))
    }

    async fn run_process(&self, command_line: &str) -> Result<String, AgentError> {
        let output = tokio::process::Command::new("sh")
            .arg("-c")
            .arg(command_line)
            .output()
            .await
            .map_err(|e| AgentError::execution(format!("spawning '{command_line}': {e}")))?;
        let mut text = String::from_utf8_lossy(&output.stdout).to_string();
        if !output.stderr.is_empty() {
            text.push_str(&String::from_utf8_lossy(&output.stderr));
        }
        if !output.status.success() {
            return Err(AgentError::execution(format!(
                "'{command_line}' exited with {}: {}",
                output.status,
                truncate(&text)
            )));
        }
        Ok(truncate(&text))
    }
}

impl Default for LocalSystem {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SystemBridge for LocalSystem {
    async fn run(&self, command: &Command) -> Result<String, AgentError> {
        let path = command.text.trim();
        match &command.action {
            ActionKind::ReadClipboard => Ok(self
                .clipboard
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .clone()),
            ActionKind::WriteClipboard => {
                *self.clipboard.lock().unwrap_or_else(|e| e.into_inner()) =
                    command.text.clone();
                Ok("clipboard updated".to_string())
            }
            ActionKind::OsList => {
                let mut names = Vec::new();
                let mut entries = tokio::fs::read_dir(path)
                    .await
                    .map_err(|e| AgentError::execution(format!("listing {path}: {e}")))?;
                while let Some(entry) = entries
                    .next_entry()
                    .await
                    .map_err(|e| AgentError::execution(format!("listing {path}: {e}")))?
                {
                    names.push(entry.file_name().to_string_lossy().to_string());
                }
                names.sort();
                Ok(truncate(&names.join(", ")))
            }
            ActionKind::OsRead => {
                let content = tokio::fs::read_to_string(path)
                    .await
                    .map_err(|e| AgentError::execution(format!("reading {path}: {e}")))?;
                Ok(truncate(&content))
            }
            // Path travels in Text, file content in Message.
            ActionKind::OsWrite => {
                tokio::fs::write(path, &command.message)
                    .await
                    .map_err(|e| AgentError::execution(format!("writing {path}: {e}")))?;
                Ok(format!("wrote {} bytes to {path}", command.message.len()))
            }
            ActionKind::OsDelete => {
                tokio::fs::remove_file(path)
                    .await
                    .map_err(|e| AgentError::execution(format!("deleting {path}: {e}")))?;
                Ok(format!("deleted {path}"))
            }
            ActionKind::OsExists => {
                let exists = tokio::fs::try_exists(path)
                    .await
                    .map_err(|e| AgentError::execution(format!("checking {path}: {e}")))?;
                Ok(exists.to_string())
            }
            ActionKind::OsMkdir => {
                tokio::fs::create_dir_all(path)
                    .await
                    .map_err(|e| AgentError::execution(format!("creating {path}: {e}")))?;
                Ok(format!("created {path}"))
            }
            ActionKind::OsRun => self.run_process(path).await,
            ActionKind::OsKill => {
                let pid: u32 = path
                    .parse()
                    .map_err(|_| AgentError::execution(format!("os_kill needs a pid, got '{path}'")))?;
                self.run_process(&format!("kill {pid}")).await?;
                Ok(format!("killed {pid}"))
            }
            ActionKind::Download => self.download(command).await,
            other => Err(AgentError::execution(format!(
                "'{other}' is not a system action"
            ))),
        }
    }
}

fn truncate(text: &str) -> String {
    let trimmed = text.trim();
    if trimmed.chars().count() <= MAX_OUTPUT {
        return trimmed.to_string();
    }
    let cut: String = trimmed.chars().take(MAX_OUTPUT).collect();
    format!("{cut}... (truncated)")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn command(action: ActionKind, text: &str) -> Command {
        let mut cmd = Command::new(action);
        cmd.text = text.to_string();
        cmd
    }

    #[tokio::test]
    async fn clipboard_round_trip() {
        let system = LocalSystem::new();
        system
            .run(&command(ActionKind::WriteClipboard, "copied"))
            .await
            .unwrap();
        let content = system
            .run(&command(ActionKind::ReadClipboard, ""))
            .await
            .unwrap();
        assert_eq!(content, "copied");
    }

    #[tokio::test]
    async fn file_operations_work_in_a_temp_dir() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("note.txt").display().to_string();
        let system = LocalSystem::new();

        let mut write = command(ActionKind::OsWrite, &file);
        write.message = "hello".to_string();
        system.run(&write).await.unwrap();

        let content = system.run(&command(ActionKind::OsRead, &file)).await.unwrap();
        assert_eq!(content, "hello");

        let listing = system
            .run(&command(ActionKind::OsList, &dir.path().display().to_string()))
            .await
            .unwrap();
        assert_eq!(listing, "note.txt");

        system.run(&command(ActionKind::OsDelete, &file)).await.unwrap();
        let exists = system
            .run(&command(ActionKind::OsExists, &file))
            .await
            .unwrap();
        assert_eq!(exists, "false");
    }

    #[test]
    fn long_output_is_truncated() {
        let long = "x".repeat(5000);
        let out = truncate(&long);
        assert!(out.len() < 1100);
        assert!(out.ends_with("(truncated)"));
    }
}
