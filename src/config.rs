//! YAML configuration with environment overrides for secrets.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub llm: LlmConfig,
    pub search: SearchConfig,
    pub client: ClientConfig,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: String,
    /// Debug frames received from clients land here, one subdir per client.
    pub screenshots_dir: PathBuf,
    pub playbooks_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:3000".into(),
            screenshots_dir: PathBuf::from("screenshots"),
            playbooks_dir: PathBuf::from("playbooks"),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// OpenAI-compatible chat completions endpoint.
    pub api_url: String,
    /// Usually left empty here; `DESKPILOT_LLM_API_KEY` wins.
    pub api_key: String,
    pub model: String,
    /// Second try when the primary fails; called text-only.
    pub fallback_model: String,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.openai.com/v1/chat/completions".into(),
            api_key: String::new(),
            model: "gpt-4o-mini".into(),
            fallback_model: "gpt-4o".into(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub api_url: String,
    pub api_key: String,
    pub engine_id: String,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            api_url: "https://www.googleapis.com/customsearch/v1".into(),
            api_key: String::new(),
            engine_id: String::new(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub server_url: String,
    pub window_name: String,
    pub permissive: bool,
    /// Fixed id for this installation; a fresh one is generated when absent.
    pub client_id: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_url: "http://127.0.0.1:3000".into(),
            window_name: "DeskPilot Demo Editor".into(),
            permissive: false,
            client_id: None,
        }
    }
}

pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("deskpilot").join("config.yaml"))
}

/// Load from the given path, or the default location, or fall back to
/// defaults when no file exists. Secrets are then overridden from the
/// environment.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let resolved = path.map(Path::to_path_buf).or_else(default_config_path);
    let mut config = match resolved {
        Some(p) if p.exists() => {
            let raw = std::fs::read_to_string(&p)
                .with_context(|| format!("reading config {}", p.display()))?;
            let cfg = serde_yaml::from_str(&raw)
                .with_context(|| format!("parsing config {}", p.display()))?;
            info!(path = %p.display(), "configuration loaded");
            cfg
        }
        _ => {
            debug!("no config file, using defaults");
            Config::default()
        }
    };
    if let Ok(key) = std::env::var("DESKPILOT_LLM_API_KEY") {
        config.llm.api_key = key;
    }
    if let Ok(key) = std::env::var("DESKPILOT_SEARCH_API_KEY") {
        config.search.api_key = key;
    }
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_yaml_fills_in_defaults() {
        let cfg: Config = serde_yaml::from_str("llm:\n  model: test-model\n").unwrap();
        assert_eq!(cfg.llm.model, "test-model");
        assert_eq!(cfg.server.bind_addr, "127.0.0.1:3000");
        assert_eq!(cfg.client.server_url, "http://127.0.0.1:3000");
    }
}
