/*!
 * Integration tests for the OpenAI client against a local mock server
 */

use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};
use summasub::app_config::ClientConfig;
use summasub::errors::{ProviderError, SummaryError};
use summasub::providers::openai::{OpenAI, OpenAIRequest};
use summasub::providers::CompletionProvider;
use summasub::summary::{SummaryOptions, SummaryPipeline};
use crate::common::{cost_from_text, srt_with_costs};

fn client_for(server: &MockServer) -> OpenAI {
    let config = ClientConfig {
        api_key: "sk-test".to_string(),
        model: "gpt-3.5-turbo".to_string(),
        endpoint: format!("{}/v1", server.uri()),
        timeout_secs: 1,
    };
    OpenAI::new(&config).unwrap()
}

fn chat_response(content: &str, total_tokens: u64) -> serde_json::Value {
    json!({
        "id": "chatcmpl-1",
        "object": "chat.completion",
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": content},
            "finish_reason": "stop"
        }],
        "usage": {"prompt_tokens": total_tokens - 5, "completion_tokens": 5, "total_tokens": total_tokens}
    })
}

#[tokio::test]
async fn test_complete_withChatResponse_shouldReturnContentAndUsage() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer sk-test"))
        .and(body_partial_json(json!({
            "model": "gpt-3.5-turbo",
            "temperature": 0.5,
            "messages": [
                {"role": "system", "content": "be brief"},
                {"role": "user", "content": "summarize this"}
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_response("[00:00:01,000 - 00:00:04,000] - Intro", 120)))
        .expect(1)
        .mount(&server)
        .await;

    let completion = client_for(&server).complete("be brief", "summarize this", 0.5).await.unwrap();

    assert_eq!(completion.text, "[00:00:01,000 - 00:00:04,000] - Intro");
    assert_eq!(completion.total_tokens, 120);
}

#[tokio::test]
async fn test_complete_withLegacyTextChoice_shouldFallBackToText() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"index": 0, "text": "legacy summary"}]
        })))
        .mount(&server)
        .await;

    let completion = client_for(&server).complete("s", "u", 0.5).await.unwrap();

    assert_eq!(completion.text, "legacy summary");
    assert_eq!(completion.total_tokens, 0);
}

#[tokio::test]
async fn test_complete_withNoChoices_shouldBeMalformed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
        .mount(&server)
        .await;

    let error = client_for(&server).complete("s", "u", 0.5).await.unwrap_err();

    assert!(error.is_malformed_response());
}

#[tokio::test]
async fn test_complete_withNonJsonBody_shouldBeMalformed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>gateway</html>"))
        .mount(&server)
        .await;

    let error = client_for(&server).complete("s", "u", 0.5).await.unwrap_err();

    assert!(error.is_malformed_response());
}

#[tokio::test]
async fn test_complete_withUnauthorized_shouldReturnAuthenticationError() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": {"message": "Incorrect API key provided", "type": "invalid_request_error"}
        })))
        .mount(&server)
        .await;

    let error = client_for(&server).complete("s", "u", 0.5).await.unwrap_err();

    match error {
        ProviderError::AuthenticationError(message) => assert_eq!(message, "Incorrect API key provided"),
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_complete_withRateLimit_shouldReturnRateLimitExceeded() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429).set_body_string("Too Many Requests"))
        .mount(&server)
        .await;

    let error = client_for(&server).complete("s", "u", 0.5).await.unwrap_err();

    assert!(matches!(error, ProviderError::RateLimitExceeded(_)));
}

#[tokio::test]
async fn test_complete_withServerError_shouldReturnApiErrorWithStatus() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let error = client_for(&server).complete("s", "u", 0.5).await.unwrap_err();

    assert_eq!(error.status_code(), Some(500));
    assert!(error.to_string().contains("boom"));
}

#[tokio::test]
async fn test_complete_withSlowServer_shouldTimeOut() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200)
            .set_body_json(chat_response("late", 10))
            .set_delay(std::time::Duration::from_secs(3)))
        .mount(&server)
        .await;

    let error = client_for(&server).complete("s", "u", 0.5).await.unwrap_err();

    assert!(matches!(error, ProviderError::ConnectionError(_)), "unexpected error: {:?}", error);
}

#[tokio::test]
async fn test_test_connection_shouldSendShortRequest() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(body_partial_json(json!({"max_tokens": 5, "messages": [{"role": "user", "content": "Hello"}]})))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_response("Hi", 12)))
        .expect(1)
        .mount(&server)
        .await;

    client_for(&server).test_connection().await.unwrap();
}

#[test]
fn test_request_builder_shouldSerializeOptionalFieldsOnlyWhenSet() {
    let request = OpenAIRequest::new("gpt-4")
        .add_message("user", "hi");
    let value = serde_json::to_value(&request).unwrap();

    assert_eq!(value, json!({"model": "gpt-4", "messages": [{"role": "user", "content": "hi"}]}));
    assert_eq!(request.messages().len(), 1);
}

#[tokio::test]
async fn test_pipeline_withServerFailingSecondRequest_shouldNotSendThird() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_response("first chunk summary", 50)))
        .up_to_n_times(1)
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
        .mount(&server)
        .await;

    let mut pipeline = SummaryPipeline::new(client_for(&server), Box::new(cost_from_text), SummaryOptions::default());
    let input = srt_with_costs(&[2000, 2000, 2000]);
    let failure = pipeline.run(input.as_bytes(), |_| {}).await.unwrap_err();

    assert_eq!(failure.partial.as_str(), "first chunk summary\n\n");
    match &failure.error {
        SummaryError::Chunk { chunk_index, total_chunks, source } => {
            assert_eq!((*chunk_index, *total_chunks), (2, 3));
            assert_eq!(source.status_code(), Some(503));
        }
        other => panic!("unexpected error: {:?}", other),
    }

    let received = server.received_requests().await.unwrap_or_default();
    assert_eq!(received.len(), 2);
}
