//! The session loop and its parts.

mod config;
mod controller;
mod executor;
mod ledger;
mod types;

pub use config::SessionConfig;
pub use controller::SessionController;
pub use executor::{ExecOutcome, Executor, SystemBridge};
pub use ledger::HistoryLedger;
pub use types::{SessionOutcome, SessionStatus};
