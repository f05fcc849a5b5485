//! Stored task procedures, expandable by name.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use tracing::{debug, info};

const PLAYBOOK_PREFIX: &str = "playbook:";

pub struct PlaybookStore {
    dir: PathBuf,
}

impl PlaybookStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, name: &str) -> Option<PathBuf> {
        let name = name.trim();
        if name.is_empty()
            || !name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return None;
        }
        Some(self.dir.join(format!("{name}.md")))
    }

    pub async fn load(&self, name: &str) -> Option<String> {
        let path = self.path_for(name)?;
        tokio::fs::read_to_string(&path).await.ok()
    }

    pub async fn save(&self, name: &str, content: &str) -> Result<()> {
        let Some(path) = self.path_for(name) else {
            bail!("invalid playbook name '{name}'");
        };
        tokio::fs::create_dir_all(&self.dir)
            .await
            .with_context(|| format!("creating {}", self.dir.display()))?;
        tokio::fs::write(&path, content)
            .await
            .with_context(|| format!("writing {}", path.display()))?;
        info!(name, path = %path.display(), "playbook saved");
        Ok(())
    }

    /// `playbook:<name>` becomes the stored text; anything else, including
    /// a reference to a missing playbook, passes through as a literal task.
    pub async fn expand(&self, task: &str) -> String {
        let Some(name) = task.trim().strip_prefix(PLAYBOOK_PREFIX) else {
            return task.to_string();
        };
        match self.load(name.trim()).await {
            Some(content) => {
                debug!(name = name.trim(), "task expanded from playbook");
                content
            }
            None => task.to_string(),
        }
    }
}

impl AsRef<Path> for PlaybookStore {
    fn as_ref(&self) -> &Path {
        &self.dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn expand_replaces_known_names_only() {
        let dir = tempfile::tempdir().unwrap();
        let store = PlaybookStore::new(dir.path());
        store.save("greet", "open chat and say hi").await.unwrap();

        assert_eq!(store.expand("playbook:greet").await, "open chat and say hi");
        assert_eq!(store.expand("playbook:missing").await, "playbook:missing");
        assert_eq!(store.expand("just a task").await, "just a task");
    }

    #[tokio::test]
    async fn hostile_names_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = PlaybookStore::new(dir.path());
        assert!(store.save("../escape", "x").await.is_err());
        assert!(store.save("", "x").await.is_err());
        assert!(store.load("a/b").await.is_none());
    }
}
