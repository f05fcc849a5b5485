//! Safety gate for DeskPilot commands.
//!
//! Destructive or outward-facing actions stop at a human confirmation prompt
//! before they execute. A denial is an ordinary outcome, recorded in the
//! ledger, never an error.

pub mod prompt;
pub mod types;
pub mod validator;

pub use prompt::{ConfirmationPrompt, StdinPrompt};
pub use types::GateDecision;
pub use validator::{is_high_risk, SafetyGate};
