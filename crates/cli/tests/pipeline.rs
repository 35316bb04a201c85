//! End-to-end tests for the oli pipeline.
//!
//! A temp directory stands in for the workspace and wiremock stands in for
//! the Ollama server; everything between them is the real stack.

use std::path::Path;
use std::sync::Arc;

use oli_agent::{Assistant, PersistOutcome};
use oli_config::AppConfig;
use oli_core::error::{Error, ProviderError};
use oli_core::prompter::FixedAnswer;
use oli_core::{CancellationToken, ContextUnit};
use oli_providers::OllamaProvider;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Fixtures ─────────────────────────────────────────────────────────────

fn ndjson(records: &[serde_json::Value]) -> String {
    records.iter().map(|r| format!("{r}\n")).collect()
}

async fn ollama(body: String) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(&server)
        .await;
    server
}

fn assistant_for(url: &str) -> Assistant {
    let config = AppConfig {
        ollama_url: url.to_string(),
        ..AppConfig::default()
    };
    let provider = Arc::new(OllamaProvider::new(&config.ollama_url));
    Assistant::from_config(&config, provider)
}

fn workspace() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    let write = |rel: &str, content: &str| {
        let p = dir.path().join(rel);
        std::fs::create_dir_all(p.parent().unwrap()).unwrap();
        std::fs::write(p, content).unwrap();
    };
    write("main.go", "package main\n\nfunc main() {}\n");
    write("README.md", "# demo\n");
    write("node_modules/left-pad/index.js", "module.exports = 1;");
    write("go.sum", "example.com/x v1.0.0 h1:abc=");
    dir
}

/// The `prompt` and `system` fields of the only generate request.
async fn sent_prompt(server: &MockServer) -> (String, String) {
    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(body["stream"], true);
    (
        body["system"].as_str().unwrap_or_default().to_string(),
        body["prompt"].as_str().unwrap_or_default().to_string(),
    )
}

async fn run(assistant: &Assistant, task: &str, root: &Path) -> Result<oli_agent::RunSummary, Error> {
    assistant
        .run(
            task,
            root,
            &CancellationToken::new(),
            &mut FixedAnswer(true),
            &mut std::io::sink(),
        )
        .await
}

// ── E2E ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn e2e_task_streams_answer_and_saves_artifact() {
    let server = ollama(ndjson(&[
        serde_json::json!({"response": "Added a greeting.\n\n```go:"}),
        serde_json::json!({"response": "greet/greet.go\npackage greet\n\nfunc Hello() string { return \"hi\" }\n```\n"}),
        serde_json::json!({"response": "", "done": true}),
    ]))
    .await;
    let dir = workspace();
    let assistant = assistant_for(&server.uri());

    let summary = run(&assistant, "add a greet package", dir.path()).await.unwrap();

    assert!(summary.response.starts_with("Added a greeting."));
    assert_eq!(summary.outcomes.len(), 1);
    assert!(matches!(&summary.outcomes[0], PersistOutcome::Saved { filename, .. } if filename == "greet/greet.go"));
    assert_eq!(
        std::fs::read_to_string(dir.path().join("greet/greet.go")).unwrap(),
        "package greet\n\nfunc Hello() string { return \"hi\" }"
    );

    let (system, prompt) = sent_prompt(&server).await;
    assert!(system.contains("language:path"));
    assert!(prompt.starts_with("## Context: filesystem\n"));
    assert!(prompt.contains("### main.go\n```\npackage main"));
    assert!(prompt.contains("## Context: git\n"));
    assert!(!prompt.contains("left-pad"));
    assert!(!prompt.contains("go.sum"));
    assert!(prompt.ends_with("## Task\nadd a greet package"));
}

#[tokio::test]
async fn e2e_mentioned_file_is_read_into_context() {
    let server = ollama(ndjson(&[serde_json::json!({"response": "It is empty.", "done": true})])).await;
    let dir = workspace();
    let assistant = assistant_for(&server.uri());

    let summary = run(&assistant, "what does main.go do", dir.path()).await.unwrap();
    assert!(summary.outcomes.is_empty());

    let (_, prompt) = sent_prompt(&server).await;
    assert!(prompt.contains("## Context: read-files\n### File: main.go\n"));
}

#[tokio::test]
async fn e2e_backend_error_mid_stream() {
    let server = ollama(ndjson(&[
        serde_json::json!({"response": "```go:a.go\n"}),
        serde_json::json!({"error": "model ran out of memory"}),
    ]))
    .await;
    let dir = workspace();
    let assistant = assistant_for(&server.uri());

    let err = run(&assistant, "write a.go", dir.path()).await.unwrap_err();
    assert!(matches!(err, Error::Provider(ProviderError::Backend(ref m)) if m.contains("out of memory")));
    assert!(!dir.path().join("a.go").exists());
}

#[tokio::test]
async fn e2e_unknown_model_is_api_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(ResponseTemplate::new(404).set_body_string("{\"error\":\"model not found\"}"))
        .mount(&server)
        .await;
    let dir = workspace();
    let assistant = assistant_for(&server.uri());

    let err = run(&assistant, "hello", dir.path()).await.unwrap_err();
    assert!(matches!(
        err,
        Error::Provider(ProviderError::ApiError { status_code: 404, .. })
    ));
}

#[tokio::test]
async fn e2e_repository_review_uses_only_given_context() {
    let server = ollama(ndjson(&[serde_json::json!({"response": "A logging facade.", "done": true})])).await;
    let dir = workspace();
    let assistant = assistant_for(&server.uri());

    let units = vec![ContextUnit::content("github", "Repository: log\nURL: https://github.com/rust-lang/log\n")];
    let summary = assistant
        .run_with_context(
            "what is this",
            units,
            dir.path(),
            &CancellationToken::new(),
            &mut FixedAnswer(true),
            &mut std::io::sink(),
        )
        .await
        .unwrap();
    assert_eq!(summary.response, "A logging facade.");

    let (_, prompt) = sent_prompt(&server).await;
    assert!(prompt.starts_with("## Context: github\nRepository: log"));
    assert!(!prompt.contains("## Context: filesystem"));
    assert!(prompt.ends_with("## Task\nwhat is this"));
}

#[tokio::test]
async fn e2e_declined_artifacts_are_not_written() {
    let server = ollama(ndjson(&[serde_json::json!({
        "response": "**notes.md**\n```md\n# Notes\n```\n",
        "done": true
    })]))
    .await;
    let dir = workspace();
    let assistant = assistant_for(&server.uri());

    let summary = assistant
        .run(
            "write notes",
            dir.path(),
            &CancellationToken::new(),
            &mut FixedAnswer(false),
            &mut std::io::sink(),
        )
        .await
        .unwrap();

    assert_eq!(
        summary.outcomes,
        vec![PersistOutcome::Declined {
            filename: "notes.md".into()
        }]
    );
    assert!(!dir.path().join("notes.md").exists());
}
