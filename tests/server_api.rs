//! HTTP surface of the decision server.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use deskpilot_cli::decision::{DecisionPipeline, PlaybookStore};
use deskpilot_cli::llm::MockLlmProvider;
use deskpilot_cli::server::{build_router, AppState};
use deskpilot_core_types::DecideResponse;
use tower::ServiceExt;

fn test_router(responses: Vec<&str>, dir: &std::path::Path) -> axum::Router {
    let pipeline = DecisionPipeline::new(
        Arc::new(MockLlmProvider::new(responses)),
        None,
        None,
        PlaybookStore::new(dir.join("playbooks")),
    );
    let state = AppState::new(pipeline, dir.join("screenshots"), "mock".to_string());
    build_router(state)
}

fn decide_request(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/decide")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn valid_decide_request_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let router = test_router(
        vec![r#"{"action":"click","element_id":"3","reasoning":"obvious"}"#],
        dir.path(),
    );
    let body = r#"{
        "ClientId": "c1",
        "Task": "press the button",
        "History": [],
        "State": { "WindowTitle": "App", "ProcessName": "app", "Elements": [] }
    }"#;

    let response = router.oneshot(decide_request(body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let decision: DecideResponse = serde_json::from_slice(&bytes).unwrap();
    assert!(decision.success);
    assert_eq!(decision.command.unwrap().element_id, "3");
}

#[tokio::test]
async fn malformed_body_is_rejected_without_side_effects() {
    let dir = tempfile::tempdir().unwrap();
    let router = test_router(vec![], dir.path());

    let response = router
        .oneshot(decide_request("this is not json"))
        .await
        .unwrap();

    assert!(response.status().is_client_error());
    // Nothing was persisted for the rejected request.
    assert!(!dir.path().join("screenshots").exists());
}

#[tokio::test]
async fn missing_required_field_is_a_client_error() {
    let dir = tempfile::tempdir().unwrap();
    let router = test_router(vec![], dir.path());

    // No Task field.
    let response = router
        .oneshot(decide_request(
            r#"{"ClientId":"c1","State":{"WindowTitle":"","ProcessName":"","Elements":[]}}"#,
        ))
        .await
        .unwrap();

    assert!(response.status().is_client_error());
}

#[tokio::test]
async fn health_reports_provider_and_model() {
    let dir = tempfile::tempdir().unwrap();
    let router = test_router(vec![], dir.path());

    let response = router
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["llm_provider"], "mock");
    assert_eq!(body["model"], "mock");
}
