//! DeskPilot: a desktop UI automation agent.
//!
//! One binary carries both halves of the system. `deskpilot serve` runs the
//! decision server (axum, `/decide` + `/health`); `deskpilot run` drives the
//! session loop from `deskpilot-agent-core` against a server. Platform
//! accessibility walkers plug in through the `AccessibilityProvider` trait;
//! the built-in desktop is a simulated editor used by the demo run and the
//! integration tests.

pub mod config;
pub mod decision;
pub mod desktop;
pub mod llm;
pub mod provision;
pub mod server;
pub mod system;
