//! Scripted provider for tests and offline runs.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use super::{LlmError, LlmProvider};

/// Replays canned responses in order and records every prompt it saw.
/// An exhausted script answers with an error, like a dead endpoint would.
pub struct MockLlmProvider {
    responses: Mutex<VecDeque<String>>,
    prompts: Mutex<Vec<String>>,
    saw_image: Mutex<Vec<bool>>,
}

impl MockLlmProvider {
    pub fn new(responses: Vec<&str>) -> Self {
        Self {
            responses: Mutex::new(responses.into_iter().map(str::to_string).collect()),
            prompts: Mutex::new(Vec::new()),
            saw_image: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self::new(Vec::new())
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn image_flags(&self) -> Vec<bool> {
        self.saw_image.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

#[async_trait]
impl LlmProvider for MockLlmProvider {
    fn name(&self) -> &str {
        "mock"
    }

    async fn generate(&self, prompt: &str, image_b64: Option<&str>) -> Result<String, LlmError> {
        self.prompts
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(prompt.to_string());
        self.saw_image
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(image_b64.is_some());
        self.responses
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front()
            .ok_or_else(|| LlmError::Api("mock script exhausted".into()))
    }
}
