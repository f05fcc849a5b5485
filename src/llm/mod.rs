//! Language model providers for the decision server.

mod http;
mod mock;

pub use http::HttpLlmProvider;
pub use mock::MockLlmProvider;

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("llm request failed: {0}")]
    Http(String),

    #[error("llm api error: {0}")]
    Api(String),
}

/// One model behind one configuration. The pipeline holds a primary and a
/// text-only fallback.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    fn name(&self) -> &str;

    /// Ask the model for raw text. `image_b64` is a JPEG the model should
    /// look at alongside the prompt.
    async fn generate(&self, prompt: &str, image_b64: Option<&str>) -> Result<String, LlmError>;
}
