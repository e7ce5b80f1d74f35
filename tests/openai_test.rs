//! OpenAI adapter tests: recorded SSE fixtures and mock HTTP endpoints

mod support;

use std::sync::Arc;

use futures::StreamExt;
use serde_json::json;
use support::{FakeTransport, fixture, load_sse_fixture_as_chunks};
use unillm::prelude::*;
use unillm::providers::openai::{OpenAiClient, OpenAiConfig};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_with(transport: Arc<FakeTransport>) -> OpenAiClient {
    OpenAiClient::with_options(
        OpenAiConfig::new("sk-test"),
        ServiceOptions::new().with_transport(transport),
    )
    .unwrap()
}

fn hello() -> ChatRequest {
    ChatRequest::new(vec![ChatMessage::user("Say hello")])
}

#[tokio::test]
async fn streamed_text_matches_non_streamed_text() {
    let streaming = Arc::new(FakeTransport::sse(load_sse_fixture_as_chunks(
        "openai/chat_deltas_usage.sse",
    )));
    let blocking = Arc::new(FakeTransport::json(200, fixture("openai/chat_completion.json")));

    let items: Vec<ChatResponse> = client_with(streaming.clone())
        .chat(hello(), ChatOptions::streaming())
        .await
        .unwrap()
        .into_stream()
        .unwrap()
        .map(|r| r.unwrap())
        .collect()
        .await;

    let streamed: String = items.iter().filter_map(|r| r.text()).collect();
    let last = items.last().unwrap();
    assert_eq!(last.finish_reason(), Some(FinishReason::Stop));
    assert_eq!(last.model_usage, Some(TokenUsage::new(9, 2)));

    let response = client_with(blocking)
        .chat(hello(), ChatOptions::default())
        .await
        .unwrap()
        .into_response()
        .unwrap();
    assert_eq!(response.text(), Some(streamed.as_str()));
    assert_eq!(response.model_usage, last.model_usage);
    assert_eq!(response.remote_id.as_deref(), Some("chatcmpl-AbC1"));

    let body = streaming.last_body();
    assert_eq!(body["stream"], true);
    assert_eq!(body["stream_options"]["include_usage"], true);
    assert!(body.get("top_k").is_none());
}

#[tokio::test]
async fn streamed_tool_call_arguments_are_joined() {
    let transport = Arc::new(FakeTransport::sse(load_sse_fixture_as_chunks(
        "openai/tool_calls.sse",
    )));
    let request = hello()
        .with_functions(vec![FunctionDefinition::new("get_weather", "Current weather")])
        .with_function_call(FunctionCallMode::Auto);

    let response = client_with(transport.clone())
        .chat_collect(request, ChatOptions::streaming())
        .await
        .unwrap();

    assert!(response.text().is_none());
    assert_eq!(response.finish_reason(), Some(FinishReason::FunctionCall));
    let call = response.function_calls().next().unwrap();
    assert_eq!(call.id, "call_DdmO9pD3xa9XTPNJ32zg2hcA");
    assert_eq!(call.arguments_object().unwrap(), json!({"location": "Boston"}));
    assert!(response.model_usage.is_none());

    let body = transport.last_body();
    assert_eq!(body["tool_choice"], "auto");
    assert_eq!(body["tools"][0]["type"], "function");
    assert_eq!(body["tools"][0]["function"]["parameters"], json!({"type": "object"}));
}

#[tokio::test]
async fn stream_without_done_reports_truncation() {
    let transport = Arc::new(FakeTransport::sse(load_sse_fixture_as_chunks(
        "openai/truncated.sse",
    )));
    let items: Vec<_> = client_with(transport)
        .chat(hello(), ChatOptions::streaming())
        .await
        .unwrap()
        .into_stream()
        .unwrap()
        .collect()
        .await;

    assert_eq!(items.len(), 3);
    assert!(items[..2].iter().all(|r| r.is_ok()));
    assert!(matches!(items[2], Err(LlmError::StreamError(_))));
}

#[tokio::test]
async fn function_results_round_trip_as_tool_messages() {
    let transport = Arc::new(FakeTransport::json(200, fixture("openai/chat_completion.json")));
    let call = FunctionCall::new("call_1", "get_weather", Some(json!({"location": "Boston"})));
    let request = ChatRequest::new(vec![
        ChatMessage::user("Weather in Boston?"),
        ChatMessage::assistant_calls(vec![call]),
        ChatMessage::function_result("call_1", "{\"temp\": 22}"),
    ]);

    client_with(transport.clone())
        .chat(request, ChatOptions::default())
        .await
        .unwrap();

    let body = transport.last_body();
    let messages = body["messages"].as_array().unwrap();
    assert_eq!(messages[1]["tool_calls"][0]["id"], "call_1");
    assert_eq!(
        messages[1]["tool_calls"][0]["function"]["arguments"],
        "{\"location\":\"Boston\"}"
    );
    assert_eq!(messages[2]["role"], "tool");
    assert_eq!(messages[2]["tool_call_id"], "call_1");
}

#[tokio::test]
async fn embeddings_are_ordered_by_index() {
    let transport = Arc::new(FakeTransport::json(200, fixture("openai/embeddings.json")));
    let response = client_with(transport.clone())
        .embed(EmbedRequest::new(["first", "second"]), EmbedOptions::default())
        .await
        .unwrap();

    assert_eq!(response.embeddings.len(), 2);
    assert_eq!(response.embeddings[1], vec![0.25, -0.5, 0.125]);
    assert_eq!(response.model_usage, Some(TokenUsage::new(8, 0)));
    assert_eq!(transport.last_body()["input"], json!(["first", "second"]));
    assert!(transport.requests()[0].url.ends_with("/embeddings"));
}

#[tokio::test]
async fn embedding_count_mismatch_is_a_parse_error() {
    let transport = Arc::new(FakeTransport::json(200, fixture("openai/embeddings.json")));
    let err = client_with(transport)
        .embed(EmbedRequest::new(["a", "b", "c"]), EmbedOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, LlmError::ParseError(_)));
}

#[tokio::test]
async fn malformed_body_is_a_transport_error() {
    let transport = Arc::new(FakeTransport::json(200, "<html>gateway</html>"));
    let err = client_with(transport)
        .chat(hello(), ChatOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, LlmError::HttpError { .. }));
}

#[tokio::test]
async fn default_transport_chat_and_embed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("authorization", "Bearer sk-test"))
        .and(header("openai-organization", "org-1"))
        .and(body_partial_json(json!({"model": "gpt-4o-mini", "max_tokens": 500})))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(fixture("openai/chat_completion.json"))
                .insert_header("content-type", "application/json"),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/embeddings"))
        .and(body_partial_json(json!({"model": "text-embedding-3-small", "dimensions": 3})))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(fixture("openai/embeddings.json"))
                .insert_header("content-type", "application/json"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = OpenAiClient::new(
        OpenAiConfig::new("sk-test")
            .with_base_url(server.uri())
            .with_organization("org-1")
            .with_embed_dimensions(3),
    )
    .unwrap();

    assert_eq!(client.ask("Say hello".to_string()).await.unwrap(), "Hello world");
    let embedded = client
        .embed(EmbedRequest::new(["a", "b"]), EmbedOptions::default())
        .await
        .unwrap();
    assert_eq!(embedded.dimension(), Some(3));
}

#[tokio::test]
async fn default_transport_streams_sse() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("accept", "text/event-stream"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            fixture("openai/chat_deltas_usage.sse"),
            "text/event-stream",
        ))
        .mount(&server)
        .await;

    let client =
        OpenAiClient::new(OpenAiConfig::new("sk-test").with_base_url(server.uri())).unwrap();
    let response = client
        .chat_collect(hello(), ChatOptions::streaming())
        .await
        .unwrap();
    assert_eq!(response.text(), Some("Hello world"));
    assert_eq!(response.model_usage.unwrap().total_tokens, 11);
}

#[tokio::test]
async fn server_error_is_retryable_api_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(503).set_body_json(json!({
            "error": {"message": "The server is overloaded", "type": "server_error", "code": null}
        })))
        .mount(&server)
        .await;

    let client =
        OpenAiClient::new(OpenAiConfig::new("sk-test").with_base_url(server.uri())).unwrap();
    let err = client.chat(hello(), ChatOptions::default()).await.unwrap_err();
    assert_eq!(err.status_code(), Some(503));
    assert!(err.is_retryable());
    assert!(err.to_string().contains("overloaded"));
}
