//! OpenAI-compatible chat completions provider.

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::debug;

use super::{LlmError, LlmProvider};

pub struct HttpLlmProvider {
    http: reqwest::Client,
    api_url: String,
    api_key: String,
    model: String,
}

impl HttpLlmProvider {
    pub fn new(api_url: &str, api_key: &str, model: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_url: api_url.to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
        }
    }

    fn message_content(prompt: &str, image_b64: Option<&str>) -> Value {
        match image_b64 {
            Some(image) => json!([
                { "type": "text", "text": prompt },
                {
                    "type": "image_url",
                    "image_url": { "url": format!("data:image/jpeg;base64,{image}") }
                }
            ]),
            None => json!(prompt),
        }
    }
}

#[async_trait]
impl LlmProvider for HttpLlmProvider {
    fn name(&self) -> &str {
        &self.model
    }

    async fn generate(&self, prompt: &str, image_b64: Option<&str>) -> Result<String, LlmError> {
        let body = json!({
            "model": self.model,
            "temperature": 0.1,
            "messages": [{
                "role": "user",
                "content": Self::message_content(prompt, image_b64),
            }],
        });
        debug!(model = %self.model, with_image = image_b64.is_some(), "llm call");
        let response = self
            .http
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::Http(e.to_string()))?;
        let status = response.status();
        let payload: Value = response
            .json()
            .await
            .map_err(|e| LlmError::Http(e.to_string()))?;
        if !status.is_success() {
            return Err(LlmError::Api(format!("{status}: {payload}")));
        }
        payload["choices"][0]["message"]["content"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| LlmError::Api(format!("no completion in response: {payload}")))
    }
}
