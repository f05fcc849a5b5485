use deskpilot_perceiver_structural::PerceiverError;
use deskpilot_perceiver_visual::VisualError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AgentError {
    /// Decision server unreachable or answered outside the protocol.
    /// Always aborts the session.
    #[error("transport failure: {0}")]
    Transport(String),

    /// The server answered but could not produce a decision.
    #[error("decision failure: {0}")]
    Decision(String),

    /// A command failed to execute. Recorded as FAILED, loop continues.
    #[error("execution failure: {0}")]
    Execution(String),

    #[error(transparent)]
    Perception(#[from] PerceiverError),

    #[error(transparent)]
    Visual(#[from] VisualError),

    /// Unexpected state; automating further would be unsafe.
    #[error("fatal session error: {0}")]
    Fatal(String),
}

impl AgentError {
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    pub fn decision(msg: impl Into<String>) -> Self {
        Self::Decision(msg.into())
    }

    pub fn execution(msg: impl Into<String>) -> Self {
        Self::Execution(msg.into())
    }

    pub fn fatal(msg: impl Into<String>) -> Self {
        Self::Fatal(msg.into())
    }
}
