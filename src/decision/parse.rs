//! Extracting the one JSON object a decision model was told to return.
//!
//! Models wrap answers in markdown fences or prose anyway; the parser takes
//! the outermost object it can find and ignores the rest.

use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("no JSON object in model output")]
    NoJson,

    #[error("invalid JSON from model: {0}")]
    Json(#[from] serde_json::Error),
}

fn default_delay() -> u64 {
    100
}

/// Fields the model is instructed to emit. Everything is optional except
/// that an empty action with `task_completed=false` is useless downstream.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ModelAnswer {
    pub action: String,
    pub element_id: String,
    pub text: String,
    pub x: i32,
    pub y: i32,
    pub delay_ms: u64,
    pub message: String,
    pub reasoning: String,
    pub task_completed: bool,
    pub url: Option<String>,
    pub local_file_name: Option<String>,
}

impl Default for ModelAnswer {
    fn default() -> Self {
        Self {
            action: String::new(),
            element_id: String::new(),
            text: String::new(),
            x: 0,
            y: 0,
            delay_ms: default_delay(),
            message: String::new(),
            reasoning: String::new(),
            task_completed: false,
            url: None,
            local_file_name: None,
        }
    }
}

pub fn parse_answer(raw: &str) -> Result<ModelAnswer, ParseError> {
    let start = raw.find('{').ok_or(ParseError::NoJson)?;
    let end = raw.rfind('}').ok_or(ParseError::NoJson)?;
    if end < start {
        return Err(ParseError::NoJson);
    }
    Ok(serde_json::from_str(&raw[start..=end])?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_object_parses() {
        let answer = parse_answer(r#"{"action":"click","element_id":"3"}"#).unwrap();
        assert_eq!(answer.action, "click");
        assert_eq!(answer.element_id, "3");
        assert_eq!(answer.delay_ms, 100);
    }

    #[test]
    fn fenced_object_parses() {
        let raw = "```json\n{\"action\":\"type\",\"text\":\"hi\"}\n```";
        let answer = parse_answer(raw).unwrap();
        assert_eq!(answer.action, "type");
        assert_eq!(answer.text, "hi");
    }

    #[test]
    fn prose_around_object_is_ignored() {
        let raw = "Sure! Here is the action:\n{\"action\":\"wait\"}\nGood luck.";
        assert_eq!(parse_answer(raw).unwrap().action, "wait");
    }

    #[test]
    fn missing_object_is_an_error() {
        assert!(matches!(parse_answer("no json here"), Err(ParseError::NoJson)));
    }

    #[test]
    fn broken_json_is_an_error() {
        assert!(matches!(
            parse_answer("{action: click"),
            Err(ParseError::NoJson)
        ));
        assert!(matches!(
            parse_answer(r#"{"action": }"#),
            Err(ParseError::Json(_))
        ));
    }
}
