#![allow(clippy::unwrap_used)]
// Integration tests for `SaveClient` using wiremock.

use serde_json::json;
use url::Url;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use tangent_api::{Error, SaveClient, SaveRequest};

// ── Helpers ─────────────────────────────────────────────────────────

const SAVE_PATH: &str = "/__tangent/save";

async fn setup() -> (MockServer, SaveClient) {
    let server = MockServer::start().await;
    let endpoint = Url::parse(&format!("{}{SAVE_PATH}", server.uri())).unwrap();
    let client = SaveClient::with_client(reqwest::Client::new(), endpoint);
    (server, client)
}

fn padding_request() -> SaveRequest {
    SaveRequest::new("src/components/Hero.tsx", "hero", "padding", 24)
}

// ── Success ─────────────────────────────────────────────────────────

#[tokio::test]
async fn test_save_posts_json_body() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path(SAVE_PATH))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({
            "filePath": "src/components/Hero.tsx",
            "id": "hero",
            "key": "padding",
            "value": 24
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
        .expect(1)
        .mount(&server)
        .await;

    client.save(&padding_request()).await.unwrap();
}

#[tokio::test]
async fn test_save_accepts_empty_2xx() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path(SAVE_PATH))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    client.save(&padding_request()).await.unwrap();
}

#[tokio::test]
async fn test_save_sends_string_and_bool_values() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path(SAVE_PATH))
        .and(body_json(json!({
            "filePath": "src/App.tsx",
            "id": "card",
            "key": "shadow",
            "value": "0 4px 12px rgba(0,0,0,0.2)"
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path(SAVE_PATH))
        .and(body_json(json!({
            "filePath": "src/App.tsx",
            "id": "card",
            "key": "rounded",
            "value": true
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let shadow = SaveRequest::new("src/App.tsx", "card", "shadow", "0 4px 12px rgba(0,0,0,0.2)");
    let rounded = SaveRequest::new("src/App.tsx", "card", "rounded", true);
    client.save(&shadow).await.unwrap();
    client.save(&rounded).await.unwrap();
}

// ── Error tests ─────────────────────────────────────────────────────

#[tokio::test]
async fn test_error_payload_message_is_surfaced() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path(SAVE_PATH))
        .respond_with(
            ResponseTemplate::new(500)
                .set_body_json(json!({ "message": "Could not find tangent() call with id hero" })),
        )
        .mount(&server)
        .await;

    let result = client.save(&padding_request()).await;

    match result {
        Err(Error::Rejected { status, ref message }) => {
            assert_eq!(status, 500);
            assert!(
                message.contains("Could not find"),
                "expected endpoint message, got: {message}"
            );
        }
        other => panic!("expected Rejected error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_non_json_error_body_is_previewed() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path(SAVE_PATH))
        .respond_with(ResponseTemplate::new(400).set_body_string("bad request body"))
        .mount(&server)
        .await;

    let result = client.save(&padding_request()).await;

    match result {
        Err(Error::Rejected { status, ref message }) => {
            assert_eq!(status, 400);
            assert_eq!(message, "bad request body");
        }
        other => panic!("expected Rejected error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_empty_error_body_uses_reason_phrase() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path(SAVE_PATH))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let err = client.save(&padding_request()).await.unwrap_err();
    assert_eq!(err.status(), Some(404));
    assert_eq!(err.endpoint_message(), Some("Not Found"));
}

#[tokio::test]
async fn test_unreachable_endpoint_is_transport_error() {
    // Nothing listens on port 1, so the connection is refused.
    let client = SaveClient::from_endpoint("http://127.0.0.1:1/__tangent/save").unwrap();

    let result = client.save(&padding_request()).await;

    assert!(
        matches!(result, Err(Error::Transport(_))),
        "expected Transport error, got: {result:?}"
    );
}

#[test]
fn test_invalid_endpoint_url() {
    let result = SaveClient::from_endpoint("not a url");
    assert!(matches!(result, Err(Error::InvalidUrl(_))));
}
