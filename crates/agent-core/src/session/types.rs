use serde::{Deserialize, Serialize};

/// Terminal states of a session. Exactly one is reached.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    /// The decision server declared the task done.
    Completed,
    /// Lost the window, lost the server, or hit an unexpected error.
    Aborted,
    /// Step budget exhausted before completion.
    MaxStepsReached,
}

/// What a finished session reports back.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SessionOutcome {
    pub status: SessionStatus,
    pub steps: u32,
    pub history: Vec<String>,
    pub error: Option<String>,
}

impl SessionOutcome {
    pub fn is_completed(&self) -> bool {
        self.status == SessionStatus::Completed
    }
}
