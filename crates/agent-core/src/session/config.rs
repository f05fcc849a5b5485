use std::time::Duration;

/// Tuning knobs for one session.
#[derive(Clone, Debug)]
pub struct SessionConfig {
    /// Substring of the target window title.
    pub window_name: String,
    /// Hard step budget; the loop never runs longer.
    pub max_steps: u32,
    /// Mandatory pause between executing a command and re-scanning.
    /// UI updates lag input events.
    pub settle_delay: Duration,
    /// Skip confirmation prompts for high-risk actions.
    pub permissive: bool,
}

impl SessionConfig {
    pub fn new(window_name: impl Into<String>) -> Self {
        Self {
            window_name: window_name.into(),
            ..Self::default()
        }
    }

    /// Short-budget preset used by tests and smoke runs.
    pub fn fast(window_name: impl Into<String>) -> Self {
        Self {
            window_name: window_name.into(),
            max_steps: 5,
            settle_delay: Duration::from_millis(1),
            permissive: true,
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            window_name: String::new(),
            max_steps: 20,
            settle_delay: Duration::from_millis(500),
            permissive: false,
        }
    }
}
