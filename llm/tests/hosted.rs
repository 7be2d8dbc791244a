use std::time::Duration;

use llm::{
    GenerationParams, HostedClient, LLMError, ModelCatalog, RetryPolicy, SuggestionClient,
    TextGenerator,
};
use serde_json::json;

use mock_server::{chat_reply, spawn_mock_server};

const PATH: &str = "/v1/chat/completions";

fn fast_policy() -> RetryPolicy {
    RetryPolicy::default()
        .with_timeout(Duration::from_secs(5))
        .with_backoff(Duration::from_millis(1), Duration::from_millis(5))
}

#[tokio::test]
async fn sends_chat_request_and_returns_text_unmodified() {
    let server = spawn_mock_server(PATH, vec![(200, chat_reply("  THEME: Joy\n"))], Duration::ZERO).await;
    let client = HostedClient::new(&server.url).with_api_key("secret");
    let params = GenerationParams::new(256, 0.6).unwrap();
    let text = client
        .complete(&"mistral-large-latest".parse().unwrap(), "hello", &params)
        .await
        .unwrap();
    assert_eq!(text, "  THEME: Joy\n");

    let body = server.body(0);
    assert_eq!(body["model"], "mistral-large-latest");
    assert_eq!(body["max_tokens"], 256);
    assert_eq!(body["messages"][0]["role"], "user");
    assert_eq!(body["messages"][0]["content"], "hello");
    assert!((body["temperature"].as_f64().unwrap() - 0.6).abs() < 1e-6);
    assert_eq!(server.authorization(0).as_deref(), Some("Bearer secret"));
    server.stop().await;
}

#[tokio::test]
async fn rate_limit_is_transient_and_auth_failure_is_permanent() {
    let server = spawn_mock_server(
        PATH,
        vec![
            (429, json!({"message": "Requests rate limit exceeded"})),
            (401, json!({"message": "Unauthorized"})),
        ],
        Duration::ZERO,
    )
    .await;
    let client = HostedClient::new(&server.url);
    let model = "mistral-large-latest".parse().unwrap();
    let params = GenerationParams::default();

    let err = client.complete(&model, "p", &params).await.unwrap_err();
    assert!(err.is_retryable());
    assert!(err.message().contains("Requests rate limit exceeded"));

    let err = client.complete(&model, "p", &params).await.unwrap_err();
    assert_eq!(
        err,
        LLMError::Permanent("HTTP 401 Unauthorized: Unauthorized".into())
    );
    server.stop().await;
}

#[tokio::test]
async fn malformed_body_is_permanent() {
    let server = spawn_mock_server(PATH, vec![(200, json!({"unexpected": true}))], Duration::ZERO).await;
    let err = HostedClient::new(&server.url)
        .complete(&"mistral-large-latest".parse().unwrap(), "p", &GenerationParams::default())
        .await
        .unwrap_err();
    assert!(!err.is_retryable());
    server.stop().await;
}

#[tokio::test]
async fn unreachable_server_is_transient() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let err = HostedClient::new(format!("http://{addr}"))
        .complete(&"mistral-large-latest".parse().unwrap(), "p", &GenerationParams::default())
        .await
        .unwrap_err();
    assert!(err.is_retryable(), "{err:?}");
}

#[tokio::test]
async fn server_errors_are_retried_until_success() {
    let server = spawn_mock_server(
        PATH,
        vec![
            (503, json!({"message": "overloaded"})),
            (500, json!({"message": "oops"})),
            (200, chat_reply("THEME: Balance")),
        ],
        Duration::ZERO,
    )
    .await;
    let client = SuggestionClient::new(HostedClient::new(&server.url), ModelCatalog::hosted())
        .with_policy(fast_policy());
    let suggestion = client
        .suggest("prompt", &"mistral-large-latest".parse().unwrap(), &GenerationParams::default())
        .await
        .unwrap();
    assert_eq!(suggestion.attempts, 3);
    assert_eq!(suggestion.raw_response_text, "THEME: Balance");
    assert_eq!(server.hits(), 3);
    server.stop().await;
}

#[tokio::test]
async fn slow_server_times_out_as_transient() {
    let server = spawn_mock_server(
        PATH,
        vec![(200, chat_reply("late")), (200, chat_reply("late"))],
        Duration::from_millis(300),
    )
    .await;
    let client = SuggestionClient::new(HostedClient::new(&server.url), ModelCatalog::hosted())
        .with_policy(
            fast_policy()
                .with_max_attempts(2)
                .with_timeout(Duration::from_millis(50)),
        );
    let err = client
        .suggest("prompt", &"mistral-large-latest".parse().unwrap(), &GenerationParams::default())
        .await
        .unwrap_err();
    assert_eq!(err.attempts, 2);
    assert!(err.retryable());
    server.stop().await;
}
