use std::time::Duration;

use llm::{BackendKind, GenerationParams, HttpBackend, OllamaClient, TextGenerator};
use serde_json::json;

use mock_server::spawn_mock_server;

const PATH: &str = "/api/generate";

#[tokio::test]
async fn generates_without_streaming() {
    let server = spawn_mock_server(
        PATH,
        vec![(
            200,
            json!({"model": "llama3", "created_at": "now", "response": "PEAK POSE: Crow", "done": true}),
        )],
        Duration::ZERO,
    )
    .await;
    let client = OllamaClient::new(&server.url);
    let params = GenerationParams::new(300, 0.2).unwrap();
    let text = client
        .complete(&"llama3".parse().unwrap(), "sequence please", &params)
        .await
        .unwrap();
    assert_eq!(text, "PEAK POSE: Crow");

    let body = server.body(0);
    assert_eq!(body["model"], "llama3");
    assert_eq!(body["prompt"], "sequence please");
    assert_eq!(body["stream"], false);
    assert_eq!(body["options"]["num_predict"], 300);
    server.stop().await;
}

#[tokio::test]
async fn missing_model_is_permanent() {
    let server = spawn_mock_server(
        PATH,
        vec![(404, json!({"error": "model 'nope' not found"}))],
        Duration::ZERO,
    )
    .await;
    let backend = HttpBackend::connect(BackendKind::Ollama, Some(&server.url), None);
    let err = backend
        .complete(&"nope".parse().unwrap(), "p", &GenerationParams::default())
        .await
        .unwrap_err();
    assert!(!err.is_retryable());
    assert!(err.message().contains("model 'nope' not found"));
    server.stop().await;
}
