mod common;

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
};
use base64::{engine::general_purpose, Engine as _};
use common::{MockGateway, MockReply};
use serde_json::json;
use tower::ServiceExt;

#[tokio::test]
async fn test_health_check_success() {
    let gateway = MockGateway::start(vec![(
        "/chat/completions",
        MockReply::Json(StatusCode::OK, common::completion("pong")),
    )])
    .await;
    let app = common::create_test_app(common::test_config(&gateway.base_url()));

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = common::read_json(response).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["message"], "LLM API connection successful");
    assert_eq!(json["config"]["isValid"], true);
    assert_eq!(json["config"]["hasApiKey"], true);
    assert_eq!(json["config"]["apiKeyMasked"], "sk-test-...cdef");
    assert_eq!(json["api"]["baseUrl"], gateway.base_url());
    assert_eq!(json["api"]["model"], "deepseek-chat");

    let hits = gateway.hits();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].body["max_tokens"], 10);
    assert_eq!(hits[0].body["messages"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_health_check_with_invalid_configuration() {
    let gateway = MockGateway::start(vec![]).await;
    let mut config = common::test_config(&gateway.base_url());
    config.llm.api_key = String::new();
    config.app.max_questions = 0;
    let app = common::create_test_app(config);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = common::read_json(response).await;
    assert_eq!(json["success"], false);
    assert_eq!(json["message"], "Configuration validation failed");
    assert_eq!(json["config"]["isValid"], false);
    assert_eq!(json["config"]["apiKeyMasked"], "not set");
    assert!(json["config"]["errors"].as_array().unwrap().len() >= 2);
    assert!(json.get("api").is_none());
    assert!(gateway.hits().is_empty());
}

#[tokio::test]
async fn test_connection_action_reports_upstream_error() {
    let gateway = MockGateway::start(vec![(
        "/chat/completions",
        MockReply::Json(
            StatusCode::UNAUTHORIZED,
            json!({ "error": { "message": "Invalid API key" } }),
        ),
    )])
    .await;
    let app = common::create_test_app(common::test_config(&gateway.base_url()));

    let response = app
        .clone()
        .oneshot(common::json_request(
            "POST",
            "/api/health",
            json!({ "action": "test-connection" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = common::read_json(response).await;
    assert_eq!(json["success"], false);
    assert_eq!(json["message"], "Connection failed: 401 - Invalid API key");
    assert!(json["timestamp"].is_string());
}

#[tokio::test]
async fn test_connection_action_without_error_message() {
    let gateway = MockGateway::start(vec![(
        "/chat/completions",
        MockReply::Text(StatusCode::BAD_GATEWAY, "bad gateway".to_string()),
    )])
    .await;
    let app = common::create_test_app(common::test_config(&gateway.base_url()));

    let response = app
        .clone()
        .oneshot(common::json_request(
            "POST",
            "/api/health",
            json!({ "action": "test-connection" }),
        ))
        .await
        .unwrap();

    let json = common::read_json(response).await;
    assert_eq!(json["success"], false);
    assert_eq!(json["message"], "Connection failed: 502 - unknown error");
}

#[tokio::test]
async fn test_connection_action_with_unreachable_gateway() {
    let base_url = common::unused_base_url().await;
    let app = common::create_test_app(common::test_config(&base_url));

    let response = app
        .clone()
        .oneshot(common::json_request(
            "POST",
            "/api/health",
            json!({ "action": "test-connection" }),
        ))
        .await
        .unwrap();

    let json = common::read_json(response).await;
    assert_eq!(json["success"], false);
    assert!(json["message"]
        .as_str()
        .unwrap()
        .starts_with("Connection test failed:"));
}

#[tokio::test]
async fn test_unknown_action_is_rejected() {
    let gateway = MockGateway::start(vec![]).await;
    let app = common::create_test_app(common::test_config(&gateway.base_url()));

    for body in [json!({ "action": "reboot" }), json!({})] {
        let response = app
            .clone()
            .oneshot(common::json_request("POST", "/api/health", body))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = common::read_json(response).await;
        assert_eq!(json["error"], "Invalid action");
    }

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/health")
                .header("content-type", "application/json")
                .body(Body::from("not json"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    assert!(gateway.hits().is_empty());
}

#[tokio::test]
async fn test_metrics_requires_basic_auth() {
    let gateway = MockGateway::start(vec![]).await;
    let app = common::create_test_app(common::test_config(&gateway.base_url()));

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/metrics")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let wrong = general_purpose::STANDARD.encode("admin:wrong");
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/metrics")
                .header("authorization", format!("Basic {}", wrong))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let credentials = general_purpose::STANDARD.encode("admin:changeme");
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/metrics")
                .header("authorization", format!("Basic {}", credentials))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let text = String::from_utf8(body.to_vec()).unwrap();
    assert!(text.contains("http_requests_total"));
}
