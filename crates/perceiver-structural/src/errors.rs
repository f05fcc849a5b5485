use thiserror::Error;

#[derive(Debug, Error)]
pub enum PerceiverError {
    #[error("window not found: {0}")]
    WindowNotFound(String),

    #[error("window handle no longer valid")]
    StaleWindow,

    #[error("element not found: {0}")]
    ElementNotFound(String),

    #[error("accessibility provider failure: {0}")]
    Provider(String),
}

impl PerceiverError {
    pub fn provider(msg: impl Into<String>) -> Self {
        Self::Provider(msg.into())
    }
}
