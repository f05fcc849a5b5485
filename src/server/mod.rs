//! The decision server: axum router over the decision pipeline.

mod router;
mod state;

pub use router::build_router;
pub use state::AppState;
