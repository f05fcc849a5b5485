//! Web search resolved server-side on behalf of the model.

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("search request failed: {0}")]
    Http(String),

    #[error("search api error: {0}")]
    Api(String),
}

#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Compact textual digest of the top results.
    async fn search(&self, query: &str) -> Result<String, SearchError>;
}

/// Google Custom Search style JSON API.
pub struct HttpSearchProvider {
    http: reqwest::Client,
    api_url: String,
    api_key: String,
    engine_id: String,
}

impl HttpSearchProvider {
    pub fn new(api_url: &str, api_key: &str, engine_id: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_url: api_url.to_string(),
            api_key: api_key.to_string(),
            engine_id: engine_id.to_string(),
        }
    }
}

#[async_trait]
impl SearchProvider for HttpSearchProvider {
    async fn search(&self, query: &str) -> Result<String, SearchError> {
        debug!(query, "web search");
        let response = self
            .http
            .get(&self.api_url)
            .query(&[("key", &self.api_key), ("cx", &self.engine_id)])
            .query(&[("q", query), ("num", "3")])
            .send()
            .await
            .map_err(|e| SearchError::Http(e.to_string()))?;
        let status = response.status();
        let payload: Value = response
            .json()
            .await
            .map_err(|e| SearchError::Http(e.to_string()))?;
        if !status.is_success() {
            return Err(SearchError::Api(format!("{status}: {payload}")));
        }
        let digest = payload["items"]
            .as_array()
            .map(|items| {
                items
                    .iter()
                    .take(3)
                    .map(|item| {
                        format!(
                            "{}: {}",
                            item["title"].as_str().unwrap_or(""),
                            item["snippet"].as_str().unwrap_or("")
                        )
                    })
                    .collect::<Vec<_>>()
                    .join("\n")
            })
            .unwrap_or_default();
        if digest.is_empty() {
            Ok("no results".to_string())
        } else {
            Ok(digest)
        }
    }
}

/// Fixed-answer provider for tests.
pub struct MockSearchProvider {
    pub answer: String,
}

#[async_trait]
impl SearchProvider for MockSearchProvider {
    async fn search(&self, _query: &str) -> Result<String, SearchError> {
        Ok(self.answer.clone())
    }
}
