//! Structural perception for DeskPilot.
//!
//! Wraps a platform accessibility tree behind [`AccessibilityProvider`],
//! snapshots it into `UIState` values and classifies the difference between
//! consecutive snapshots.

pub mod differ;
pub mod errors;
pub mod ports;
pub mod scanner;

pub use differ::{diff_states, StateChange};
pub use errors::PerceiverError;
pub use ports::{AccessibilityProvider, WindowHandle};
pub use scanner::{content_signature, StateScanner};
