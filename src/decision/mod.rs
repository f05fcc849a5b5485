//! The server-side decision pipeline: expand the task, build the prompt,
//! call the model, parse its answer and resolve server-only tool actions.

pub mod parse;
pub mod playbook;
pub mod prompt;
pub mod search;

pub use parse::{parse_answer, ModelAnswer, ParseError};
pub use playbook::PlaybookStore;
pub use prompt::{build_prompt, element_summary, MAX_ELEMENT_LINES};
pub use search::{HttpSearchProvider, MockSearchProvider, SearchError, SearchProvider};

use std::sync::Arc;

use deskpilot_core_types::history::tags;
use deskpilot_core_types::{latest_memory, ActionKind, Command, DecideRequest, DecideResponse};
use tracing::{info, warn};
use uuid::Uuid;

use crate::llm::{LlmError, LlmProvider};

/// Most nested tool resolutions (net_search / create_playbook) the server
/// will perform inside one decide request. Exhaustion is a decision error,
/// never an endless loop.
pub const MAX_TOOL_DEPTH: usize = 3;

pub struct DecisionPipeline {
    primary: Arc<dyn LlmProvider>,
    fallback: Option<Arc<dyn LlmProvider>>,
    search: Option<Arc<dyn SearchProvider>>,
    playbooks: PlaybookStore,
}

impl DecisionPipeline {
    pub fn new(
        primary: Arc<dyn LlmProvider>,
        fallback: Option<Arc<dyn LlmProvider>>,
        search: Option<Arc<dyn SearchProvider>>,
        playbooks: PlaybookStore,
    ) -> Self {
        Self {
            primary,
            fallback,
            search,
            playbooks,
        }
    }

    pub fn model_name(&self) -> &str {
        self.primary.name()
    }

    /// One decide round trip. Failures come back inside the response with
    /// `success=false`; this method never errors.
    pub async fn decide(&self, request: DecideRequest) -> DecideResponse {
        let canonical = canonical_id(&request.client_id);
        let task = self.playbooks.expand(&request.task).await;
        let mut history = request.history.clone();

        for round in 0..=MAX_TOOL_DEPTH {
            let memory = latest_memory(&history).to_string();
            let prompt = build_prompt(&task, &memory, &history, &request.state);
            let answer = match self
                .consult(&prompt, request.state.screenshot.as_deref())
                .await
            {
                Ok(answer) => answer,
                Err(error) => {
                    warn!(%error, "all model attempts failed");
                    return with_identity(DecideResponse::failure(error), canonical);
                }
            };

            if answer.task_completed {
                info!(round, "model declared task complete");
                let mut response = DecideResponse::completed(answer.message);
                response.reasoning = answer.reasoning;
                return with_identity(response, canonical);
            }

            match ActionKind::parse(&answer.action) {
                ActionKind::NetSearch => {
                    self.resolve_search(&answer, &mut history).await;
                }
                ActionKind::CreatePlaybook => {
                    self.resolve_playbook(&answer, &mut history).await;
                }
                action => {
                    info!(round, %action, "decision ready");
                    return with_identity(final_response(action, answer), canonical);
                }
            }
        }

        warn!(limit = MAX_TOOL_DEPTH, "tool recursion limit reached");
        with_identity(
            DecideResponse::failure(format!(
                "tool recursion limit of {MAX_TOOL_DEPTH} reached without a decision"
            )),
            canonical,
        )
    }

    /// One decision attempt: primary with the image, then the fallback
    /// text-only. A primary answer that does not parse counts as a failed
    /// attempt and triggers the fallback the same way a transport error does.
    async fn consult(&self, prompt: &str, image_b64: Option<&str>) -> Result<ModelAnswer, String> {
        let primary_err = match self.primary.generate(prompt, image_b64).await {
            Ok(raw) => match parse_answer(&raw) {
                Ok(answer) => return Ok(answer),
                Err(err) => {
                    warn!(%err, raw, model = self.primary.name(), "model answer unparseable");
                    malformed(err)
                }
            },
            Err(err) => {
                warn!(%err, model = self.primary.name(), "model call failed");
                unavailable(err)
            }
        };
        let Some(fallback) = &self.fallback else {
            return Err(primary_err);
        };
        warn!(fallback = fallback.name(), "retrying with the fallback model");
        match fallback.generate(prompt, None).await {
            Ok(raw) => parse_answer(&raw).map_err(|err| {
                warn!(%err, raw, model = fallback.name(), "model answer unparseable");
                malformed(err)
            }),
            Err(err) => Err(unavailable(err)),
        }
    }

    /// The search happens here and now; the client only ever sees the final
    /// decision. Both the query and its outcome become history the next
    /// prompt round can use.
    async fn resolve_search(&self, answer: &ModelAnswer, history: &mut Vec<String>) {
        let query = answer.text.trim();
        let entry = match &self.search {
            Some(provider) => match provider.search(query).await {
                Ok(result) => format!("{} for '{query}': {result}", tags::WEB_SEARCH_RESULT),
                Err(err) => format!("{} for '{query}': search failed: {err}", tags::WEB_SEARCH_RESULT),
            },
            None => format!(
                "{} for '{query}': web search is not configured",
                tags::WEB_SEARCH_RESULT
            ),
        };
        history.push(format!("net_search '{query}'"));
        history.push(entry);
    }

    async fn resolve_playbook(&self, answer: &ModelAnswer, history: &mut Vec<String>) {
        let name = if answer.message.trim().is_empty() {
            answer.element_id.trim()
        } else {
            answer.message.trim()
        };
        let entry = match self.playbooks.save(name, &answer.text).await {
            Ok(()) => format!("{} playbook '{name}' saved", tags::SYSTEM),
            Err(err) => format!("{} create_playbook '{name}': {err}", tags::FAILED),
        };
        history.push(entry);
    }
}

fn unavailable(err: LlmError) -> String {
    format!("model unavailable: {err}")
}

fn malformed(err: ParseError) -> String {
    format!("model returned malformed answer: {err}")
}

fn canonical_id(client_id: &str) -> Option<String> {
    if client_id.is_empty() || client_id == "unknown" {
        Some(Uuid::new_v4().to_string())
    } else {
        None
    }
}

fn with_identity(mut response: DecideResponse, canonical: Option<String>) -> DecideResponse {
    response.canonical_client_id = canonical;
    response
}

fn final_response(action: ActionKind, answer: ModelAnswer) -> DecideResponse {
    let command = Command {
        action,
        element_id: answer.element_id,
        text: answer.text,
        x: answer.x,
        y: answer.y,
        delay_ms: answer.delay_ms,
        message: answer.message,
        url: answer.url,
        local_file_name: answer.local_file_name,
    };
    DecideResponse {
        command: Some(command),
        success: true,
        error: String::new(),
        task_completed: false,
        reasoning: answer.reasoning,
        canonical_client_id: None,
    }
}
