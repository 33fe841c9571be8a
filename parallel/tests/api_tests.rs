use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use tower::ServiceExt;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use parallel::api::{create_router, ApiState};
use parallel::config::{ClientConfig, Config, LlmConfig, ServerConfig, StorageConfig};
use parallel::llm::LlmProvider;

fn config(llm: LlmConfig) -> Config {
    Config {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            max_body_bytes: 1024 * 1024,
        },
        client: ClientConfig {
            api_url: "http://localhost:3000".to_string(),
        },
        storage: StorageConfig {
            data_dir: std::env::temp_dir().join("parallel-api-tests"),
        },
        llm,
    }
}

fn router_with_llm(llm: LlmConfig) -> Router {
    let provider = LlmProvider::new(&llm);
    create_router(ApiState::new(config(llm), provider))
}

fn router_for(server: &MockServer) -> Router {
    router_with_llm(LlmConfig {
        model: "gemini/gemini-2.0-flash".to_string(),
        api_key: Some("test-key".to_string()),
        base_url: Some(format!("{}/v1", server.uri())),
        timeout_secs: 5,
    })
}

fn unconfigured_router() -> Router {
    router_with_llm(LlmConfig::default())
}

fn completion_body(content: &str) -> Value {
    json!({
        "id": "chatcmpl-test",
        "object": "chat.completion",
        "created": 1,
        "model": "gemini-2.0-flash",
        "choices": [
            {
                "index": 0,
                "message": {
                    "role": "assistant",
                    "content": content
                },
                "finish_reason": "stop"
            }
        ],
        "usage": {
            "prompt_tokens": 1,
            "completion_tokens": 1,
            "total_tokens": 2
        }
    })
}

async fn mock_completion(server: &MockServer, content: &str) {
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body(content)))
        .mount(server)
        .await;
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

#[tokio::test]
async fn analyze_returns_structured_result() {
    let server = MockServer::start().await;
    let result = json!({
        "classification": "CHILD_LOGISTICS",
        "manipulationTags": [],
        "reasoning": "A pickup time request.",
        "recommendedAction": "RESPOND",
        "draftResponse": "Pick up at 6pm confirmed."
    });
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(body_string_contains("Strip everything but data."))
        .and(body_string_contains("json_schema"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(completion_body(&result.to_string())),
        )
        .expect(1)
        .mount(&server)
        .await;

    let (status, body) = send(
        router_for(&server),
        post_json(
            "/api/analyze",
            json!({ "message": "Please pick up Emma at 6pm", "mode": "Logistics Only" }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, result);
}

#[tokio::test]
async fn analyze_includes_plan_context_in_prompt() {
    let server = MockServer::start().await;
    let result = json!({
        "classification": "CHILD_LOGISTICS",
        "manipulationTags": [],
        "reasoning": "Schedule question.",
        "recommendedAction": "RESPOND",
        "draftResponse": "Per the plan, exchange is Friday at 5 PM."
    });
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(body_string_contains("Exchanges happen Fridays at 5 PM"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(completion_body(&result.to_string())),
        )
        .expect(1)
        .mount(&server)
        .await;

    let (status, _) = send(
        router_for(&server),
        post_json(
            "/api/analyze",
            json!({
                "message": "When is the exchange?",
                "mode": "Parallel Parenting",
                "planContext": "Exchanges happen Fridays at 5 PM"
            }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn analyze_requires_message_and_mode() {
    for body in [
        json!({ "mode": "Court Safe" }),
        json!({ "message": "Pickup?" }),
        json!({ "message": "  ", "mode": "Court Safe" }),
    ] {
        let (status, body) = send(unconfigured_router(), post_json("/api/analyze", body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body,
            json!({ "error": "Missing required fields: message, mode" })
        );
    }
}

#[tokio::test]
async fn analyze_rejects_unknown_mode() {
    let (status, body) = send(
        unconfigured_router(),
        post_json("/api/analyze", json!({ "message": "Pickup?", "mode": "Casual" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "Invalid mode: Casual" }));
}

#[tokio::test]
async fn malformed_json_is_a_bad_request() {
    let request = Request::builder()
        .method("POST")
        .uri("/api/analyze")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();

    let (status, body) = send(unconfigured_router(), request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().starts_with("JSON syntax error"));
}

#[tokio::test]
async fn oversized_body_is_a_json_413() {
    let body = json!({ "message": "x".repeat(2 * 1024 * 1024), "mode": "Court Safe" }).to_string();
    let request = Request::builder()
        .method("POST")
        .uri("/api/analyze")
        .header("content-type", "application/json")
        .header("content-length", body.len())
        .body(Body::from(body))
        .unwrap();

    let (status, body) = send(unconfigured_router(), request).await;

    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(body, json!({ "error": "Request body too large" }));
}

#[tokio::test]
async fn non_post_methods_are_rejected() {
    for uri in ["/api/analyze", "/api/safety-check", "/api/extract-document"] {
        let request = Request::builder()
            .method("GET")
            .uri(uri)
            .body(Body::empty())
            .unwrap();

        let (status, body) = send(unconfigured_router(), request).await;

        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED, "{uri}");
        assert_eq!(body, json!({ "error": "Method not allowed" }));
    }
}

#[tokio::test]
async fn missing_credential_is_a_configuration_error() {
    let (status, body) = send(
        unconfigured_router(),
        post_json("/api/analyze", json!({ "message": "Pickup?", "mode": "Court Safe" })),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "error": "Server configuration error" }));
}

#[tokio::test]
async fn empty_model_reply_is_reported() {
    let server = MockServer::start().await;
    mock_completion(&server, "").await;

    let (status, body) = send(
        router_for(&server),
        post_json("/api/analyze", json!({ "message": "Pickup?", "mode": "Court Safe" })),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "error": "Empty response from AI" }));
}

#[tokio::test]
async fn upstream_failure_becomes_retry_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": {
                "message": "Request contains an invalid argument.",
                "type": "invalid_request_error",
                "param": null,
                "code": "invalid_argument"
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let (status, body) = send(
        router_for(&server),
        post_json("/api/analyze", json!({ "message": "Pickup?", "mode": "Court Safe" })),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body,
        json!({ "error": "Failed to analyze message. Please try again." })
    );
}

#[tokio::test]
async fn unparseable_model_reply_becomes_retry_message() {
    let server = MockServer::start().await;
    mock_completion(&server, "I think this message is fine.").await;

    let (status, body) = send(
        router_for(&server),
        post_json("/api/safety-check", json!({ "draft": "See you at 5." })),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "error": "Failed to check draft safety." }));
}

#[tokio::test]
async fn safety_check_returns_verdict() {
    let server = MockServer::start().await;
    let verdict = json!({
        "isSafe": false,
        "emotionalWords": ["ridiculous"],
        "neutralSuggestion": "I will be there at 5."
    });
    mock_completion(&server, &verdict.to_string()).await;

    let (status, body) = send(
        router_for(&server),
        post_json(
            "/api/safety-check",
            json!({ "draft": "This is ridiculous, I'll be there at 5." }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, verdict);
}

#[tokio::test]
async fn safety_check_requires_draft() {
    let (status, body) = send(
        unconfigured_router(),
        post_json("/api/safety-check", json!({})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "Missing required field: draft" }));
}

#[tokio::test]
async fn extract_document_sends_inline_data() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(body_string_contains("data:application/pdf;base64,JVBERi0xLjQ="))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(completion_body("Exchanges happen Fridays at 5 PM.")),
        )
        .expect(1)
        .mount(&server)
        .await;

    let (status, body) = send(
        router_for(&server),
        post_json(
            "/api/extract-document",
            json!({ "base64Data": "JVBERi0xLjQ=", "mimeType": "application/pdf" }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "text": "Exchanges happen Fridays at 5 PM." }));
}

#[tokio::test]
async fn extract_document_without_text_is_empty_string() {
    let server = MockServer::start().await;
    mock_completion(&server, "").await;

    let (status, body) = send(
        router_for(&server),
        post_json(
            "/api/extract-document",
            json!({ "base64Data": "iVBORw0KGgo=", "mimeType": "image/png" }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "text": "" }));
}

#[tokio::test]
async fn extract_document_requires_fields() {
    let (status, body) = send(
        unconfigured_router(),
        post_json("/api/extract-document", json!({ "mimeType": "image/png" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        json!({ "error": "Missing required fields: base64Data, mimeType" })
    );
}

#[tokio::test]
async fn health_reports_llm_status() {
    let request = Request::builder()
        .uri("/api/health")
        .body(Body::empty())
        .unwrap();

    let (status, body) = send(unconfigured_router(), request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["llm"]["status"], "unconfigured");
    assert_eq!(body["llm"]["provider"], "gemini");
    assert_eq!(body["llm"]["model"], "gemini/gemini-2.0-flash");
}
