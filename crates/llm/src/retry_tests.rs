use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::ai_types::{ChatRequest, Message};
use crate::client::LlmClient;
use crate::error::LlmError;

fn create_test_request() -> ChatRequest {
    ChatRequest {
        model: "test-model".to_owned(),
        messages: vec![Message::new("user", "hello")],
        response_format: None,
        temperature: None,
    }
}

fn completion(content: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "choices": [{"message": {"content": content, "role": "assistant"}}]
    }))
}

fn client_for(server: &MockServer) -> LlmClient {
    LlmClient::new("test-key".to_owned(), &server.uri()).unwrap().with_model("test-model".to_owned())
}

#[tokio::test]
async fn test_success_on_first_attempt() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("Authorization", "Bearer test-key"))
        .and(body_partial_json(json!({"model": "test-model"})))
        .respond_with(completion("test response"))
        .expect(1)
        .mount(&server)
        .await;

    let result = client_for(&server).chat_completion(&create_test_request()).await.unwrap();
    assert_eq!(result, "test response");
}

#[tokio::test]
async fn test_retry_on_429_then_success() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(completion("success after retry"))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(429).set_body_string("Rate limit exceeded"))
        .up_to_n_times(1)
        .mount(&server)
        .await;

    let result = client_for(&server).chat_completion(&create_test_request()).await.unwrap();
    assert_eq!(result, "success after retry");
}

#[tokio::test]
async fn test_no_retry_on_401() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(401).set_body_string("Unauthorized"))
        .expect(1)
        .mount(&server)
        .await;

    let err = client_for(&server).chat_completion(&create_test_request()).await.unwrap_err();
    assert!(matches!(err, LlmError::HttpStatus { code: 401, .. }));
    assert!(err.to_string().contains("Unauthorized"));
}

#[tokio::test]
async fn test_all_retries_exhausted() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(503).set_body_string("Service Unavailable"))
        .expect(4)
        .mount(&server)
        .await;

    let err = client_for(&server).chat_completion(&create_test_request()).await.unwrap_err();
    assert!(matches!(err, LlmError::RetriesExhausted(_)));
    assert!(err.to_string().contains("503"));
}

#[tokio::test]
async fn test_empty_choices_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
        .mount(&server)
        .await;

    let err = client_for(&server).chat_completion(&create_test_request()).await.unwrap_err();
    assert!(matches!(err, LlmError::EmptyResponse));
}
