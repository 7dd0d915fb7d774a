//! Integration tests for the /resolve endpoint

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use sgpresolver::api::create_router;
use sgpresolver::client::DEFAULT_USER_AGENT;
use sgpresolver::ResolverClient;
use std::sync::Arc;
use tower::ServiceExt;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Router whose client accepts the wiremock host
fn test_app() -> Router {
    let client = ResolverClient::builder()
        .allowed_host_suffix("127.0.0.1")
        .build()
        .unwrap();
    create_router(Arc::new(client))
}

fn resolve_uri(page_url: &str) -> String {
    let query = url::form_urlencoded::Serializer::new(String::new())
        .append_pair("url", page_url)
        .finish();
    format!("/resolve?{}", query)
}

async fn get(app: Router, uri: &str) -> axum::response::Response {
    app.oneshot(Request::get(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn assert_cors(response: &axum::response::Response) {
    let headers = response.headers();
    assert_eq!(headers["access-control-allow-origin"], "*");
    assert_eq!(headers["access-control-allow-methods"], "GET, OPTIONS");
    assert_eq!(headers["access-control-allow-headers"], "Content-Type");
    assert_eq!(headers["access-control-max-age"], "86400");
}

async fn mount_page(mock_server: &MockServer, page_path: &str, html: &str) {
    Mock::given(method("GET"))
        .and(path(page_path))
        .and(header("user-agent", DEFAULT_USER_AGENT))
        .respond_with(ResponseTemplate::new(200).set_body_string(html))
        .mount(mock_server)
        .await;
}

#[tokio::test]
async fn test_resolve_audio_element() {
    let mock_server = MockServer::start().await;
    mount_page(
        &mock_server,
        "/u/someone/track",
        r#"<html><head><title> Rainy Night </title></head>
           <body><audio controls src="/sounds/abc.m4a"></audio></body></html>"#,
    )
    .await;

    let page = format!("{}/u/someone/track", mock_server.uri());
    let response = get(test_app(), &resolve_uri(&page)).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_cors(&response);
    assert_eq!(
        response.headers()["content-type"],
        "application/json; charset=utf-8"
    );

    let body = body_json(response).await;
    assert_eq!(body["audioUrl"], "/sounds/abc.m4a");
    assert_eq!(body["title"], "Rainy Night");
}

#[tokio::test]
async fn test_resolve_bare_url_without_title() {
    let mock_server = MockServer::start().await;
    mount_page(
        &mock_server,
        "/u/someone/other",
        r#"<script>var src = "https://media.example/sounds/xyz.mp3";</script>"#,
    )
    .await;

    let page = format!("{}/u/someone/other", mock_server.uri());
    let response = get(test_app(), &resolve_uri(&page)).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["audioUrl"], "https://media.example/sounds/xyz.mp3");
    assert!(body["title"].is_null());
}

#[tokio::test]
async fn test_foreign_host_is_forbidden() {
    let app = create_router(Arc::new(ResolverClient::new().unwrap()));
    let response = get(app, &resolve_uri("https://example.com/u/a/b")).await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_cors(&response);
    let body = body_json(response).await;
    assert_eq!(
        body["error"],
        "Only soundgasm.net URLs are allowed by this resolver."
    );
}

#[tokio::test]
async fn test_missing_url_parameter() {
    for uri in ["/resolve", "/resolve?url="] {
        let response = get(test_app(), uri).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{}", uri);
        assert_cors(&response);
        let body = body_json(response).await;
        assert_eq!(body["error"], "Missing url param. Use /resolve?url=<page-url>");
    }
}

#[tokio::test]
async fn test_invalid_url_parameter() {
    let response = get(test_app(), &resolve_uri("not a url")).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_page_without_audio() {
    let mock_server = MockServer::start().await;
    mount_page(
        &mock_server,
        "/u/someone/empty",
        "<html><title>Empty</title><p>nothing</p></html>",
    )
    .await;

    let page = format!("{}/u/someone/empty", mock_server.uri());
    let response = get(test_app(), &resolve_uri(&page)).await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = body_json(response).await;
    assert_eq!(body["error"], "Could not find an audio URL on that page.");
}

#[tokio::test]
async fn test_upstream_failure_reports_status() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/u/someone/gone"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let page = format!("{}/u/someone/gone", mock_server.uri());
    let response = get(test_app(), &resolve_uri(&page)).await;

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    assert_cors(&response);
    let body = body_json(response).await;
    assert_eq!(body["error"], "Failed to fetch page");
    assert_eq!(body["status"], 404);
}

#[tokio::test]
async fn test_preflight_anywhere() {
    for uri in ["/resolve", "/anything/else"] {
        let response = test_app()
            .oneshot(
                Request::builder()
                    .method(Method::OPTIONS)
                    .uri(uri)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK, "{}", uri);
        assert_cors(&response);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert!(bytes.is_empty());
    }
}

#[tokio::test]
async fn test_unknown_routes_and_methods() {
    let response = get(test_app(), "/other").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_cors(&response);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&bytes[..], b"Not found");

    let response = test_app()
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/resolve")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_cors(&response);
}

#[tokio::test]
async fn test_head_does_not_resolve() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/u/someone/track"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<audio src="https://media.example/t.mp3"></audio>"#,
        ))
        .expect(0)
        .mount(&mock_server)
        .await;

    let page_url = format!("{}/u/someone/track", mock_server.uri());
    for uri in [resolve_uri(&page_url), resolve_uri("https://example.com/p")] {
        let response = test_app()
            .oneshot(
                Request::builder()
                    .method(Method::HEAD)
                    .uri(&uri)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "{}", uri);
        assert_cors(&response);
    }
}

#[tokio::test]
async fn test_repeated_url_parameter_uses_first() {
    let first = url::form_urlencoded::Serializer::new(String::new())
        .append_pair("url", "https://example.com/u/a/b")
        .append_pair("url", "https://soundgasm.net/u/a/b")
        .finish();
    let app = create_router(Arc::new(ResolverClient::new().unwrap()));
    let response = get(app, &format!("/resolve?{}", first)).await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(
        response.headers()["content-type"],
        "application/json; charset=utf-8"
    );
    let body = body_json(response).await;
    assert_eq!(
        body["error"],
        "Only soundgasm.net URLs are allowed by this resolver."
    );
}
