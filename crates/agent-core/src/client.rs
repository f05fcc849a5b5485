//! Client side of the decide protocol.

use std::time::Duration;

use async_trait::async_trait;
use deskpilot_core_types::{DecideRequest, DecideResponse, UIState};
use tracing::debug;

use crate::errors::AgentError;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Who this installation claims to be. Resolved once at startup from the
/// embedded token slot and the configured client id, then threaded through
/// the client; nothing reads identity ambiently after that.
#[derive(Clone, Debug)]
pub struct ClientIdentity {
    pub client_id: String,
    /// `None` while running on an unpatched dev binary; the bearer header
    /// is only sent for real tokens.
    pub token: Option<String>,
}

impl ClientIdentity {
    pub fn new(client_id: impl Into<String>, token: Option<String>) -> Self {
        Self {
            client_id: client_id.into(),
            token,
        }
    }
}

/// Source of decisions for the session loop. The production impl speaks
/// HTTP; tests script responses.
#[async_trait]
pub trait DecisionProvider: Send {
    async fn decide(
        &mut self,
        task: &str,
        state: UIState,
        history: Vec<String>,
    ) -> Result<DecideResponse, AgentError>;

    /// The server may hand back a canonical id; subsequent requests use it.
    fn adopt_identity(&mut self, client_id: String);
}

/// HTTP decision client. One attempt per step: a transport failure means
/// the loop is blind and the session aborts, so retrying here would only
/// delay that verdict.
pub struct DecisionClient {
    http: reqwest::Client,
    decide_url: String,
    identity: ClientIdentity,
}

impl DecisionClient {
    pub fn new(server_url: &str, identity: ClientIdentity) -> Result<Self, AgentError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| AgentError::transport(format!("http client init: {e}")))?;
        Ok(Self {
            http,
            decide_url: format!("{}/decide", server_url.trim_end_matches('/')),
            identity,
        })
    }

    pub fn identity(&self) -> &ClientIdentity {
        &self.identity
    }
}

#[async_trait]
impl DecisionProvider for DecisionClient {
    async fn decide(
        &mut self,
        task: &str,
        state: UIState,
        history: Vec<String>,
    ) -> Result<DecideResponse, AgentError> {
        let request = DecideRequest {
            client_id: self.identity.client_id.clone(),
            state,
            task: task.to_string(),
            history,
        };
        let mut builder = self
            .http
            .post(&self.decide_url)
            .header("X-Client-ID", &self.identity.client_id)
            .json(&request);
        if let Some(token) = &self.identity.token {
            builder = builder.bearer_auth(token);
        }
        let response = builder
            .send()
            .await
            .map_err(|e| AgentError::transport(format!("decide request: {e}")))?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AgentError::transport(format!(
                "decide returned {status}: {body}"
            )));
        }
        let decision: DecideResponse = response
            .json()
            .await
            .map_err(|e| AgentError::transport(format!("decide body: {e}")))?;
        debug!(
            success = decision.success,
            task_completed = decision.task_completed,
            "decision received"
        );
        Ok(decision)
    }

    fn adopt_identity(&mut self, client_id: String) {
        debug!(%client_id, "adopting canonical client id");
        self.identity.client_id = client_id;
    }
}
