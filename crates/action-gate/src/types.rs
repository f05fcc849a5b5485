use serde::{Deserialize, Serialize};

/// Verdict for one command.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GateDecision {
    /// Not in the high-risk set, or confirmation approved.
    Approved,
    /// The operator declined; the command is skipped and the loop continues.
    Denied,
}

impl GateDecision {
    pub fn is_approved(&self) -> bool {
        matches!(self, Self::Approved)
    }
}
