use std::path::PathBuf;
use std::sync::Arc;

use crate::decision::DecisionPipeline;

/// Shared across handlers; the pipeline is stateless per request.
pub struct AppState {
    pub pipeline: DecisionPipeline,
    pub screenshots_dir: PathBuf,
    pub provider: String,
}

impl AppState {
    pub fn new(pipeline: DecisionPipeline, screenshots_dir: PathBuf, provider: String) -> Arc<Self> {
        Arc::new(Self {
            pipeline,
            screenshots_dir,
            provider,
        })
    }
}
