//! Whole-loop test: simulated window, real HTTP hop, scripted model.

use std::sync::Arc;

use deskpilot_action_gate::ConfirmationPrompt;
use deskpilot_agent_core::{
    ClientIdentity, DecisionClient, Executor, SessionConfig, SessionController, SessionStatus,
};
use deskpilot_cli::decision::{DecisionPipeline, PlaybookStore};
use deskpilot_cli::llm::MockLlmProvider;
use deskpilot_cli::server::{build_router, AppState};
use deskpilot_cli::desktop::SimulatedDesktop;
use deskpilot_cli::system::LocalSystem;
use deskpilot_perceiver_structural::StateScanner;

struct NoPrompt;

impl ConfirmationPrompt for NoPrompt {
    fn ask(&self, _question: &str) -> Option<String> {
        None
    }
}

async fn spawn_server(responses: Vec<&str>, dir: &std::path::Path) -> String {
    let pipeline = DecisionPipeline::new(
        Arc::new(MockLlmProvider::new(responses)),
        None,
        None,
        PlaybookStore::new(dir.join("playbooks")),
    );
    let state = AppState::new(pipeline, dir.join("screenshots"), "mock".to_string());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, build_router(state)).await.unwrap();
    });
    format!("http://{addr}")
}

#[tokio::test]
async fn typing_a_word_completes_over_http() {
    let dir = tempfile::tempdir().unwrap();
    let server_url = spawn_server(
        vec![
            r#"{"action":"type","element_id":"1","text":"hello","reasoning":"fill the body"}"#,
            r#"{"action":"","task_completed":true,"message":"the text is in place"}"#,
        ],
        dir.path(),
    )
    .await;

    let desktop = Arc::new(SimulatedDesktop::new());
    let scanner = StateScanner::new(desktop.clone(), "deskpilot-demo");
    let executor = Executor::new(desktop.clone(), Arc::new(LocalSystem::new()));
    let client =
        DecisionClient::new(&server_url, ClientIdentity::new("it-client", None)).unwrap();

    let mut config = SessionConfig::fast("Demo Editor");
    config.max_steps = 5;
    let mut controller = SessionController::new(
        config,
        scanner,
        executor,
        client,
        Arc::new(NoPrompt),
        None,
    );

    let outcome = controller.run("type hello into the editor").await;

    assert_eq!(outcome.status, SessionStatus::Completed);
    assert_eq!(desktop.body(), "hello");
    assert_eq!(outcome.history.len(), 1);
    // Typing into the body changes the title (dirty marker) first.
    assert!(
        outcome.history[0].contains("=>TitleChanged"),
        "unexpected entry: {}",
        outcome.history[0]
    );
}

#[tokio::test]
async fn server_refusal_aborts_the_session() {
    let dir = tempfile::tempdir().unwrap();
    // A prose answer makes the pipeline return success=false.
    let server_url = spawn_server(vec!["cannot comply"], dir.path()).await;

    let desktop = Arc::new(SimulatedDesktop::new());
    let scanner = StateScanner::new(desktop.clone(), "deskpilot-demo");
    let executor = Executor::new(desktop, Arc::new(LocalSystem::new()));
    let client =
        DecisionClient::new(&server_url, ClientIdentity::new("it-client", None)).unwrap();

    let mut controller = SessionController::new(
        SessionConfig::fast("Demo Editor"),
        scanner,
        executor,
        client,
        Arc::new(NoPrompt),
        None,
    );

    let outcome = controller.run("anything").await;

    assert_eq!(outcome.status, SessionStatus::Aborted);
    assert!(outcome.error.unwrap().contains("malformed"));
}
