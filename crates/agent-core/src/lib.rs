//! Session layer of DeskPilot: the loop that scans, asks the decision
//! server for the next action, gates it, executes it and records what
//! happened, bounded by a step budget.

pub mod client;
pub mod errors;
pub mod session;

pub use client::{ClientIdentity, DecisionClient, DecisionProvider};
pub use errors::AgentError;
pub use session::{
    ExecOutcome, Executor, HistoryLedger, SessionConfig, SessionController, SessionOutcome,
    SessionStatus, SystemBridge,
};
