/// HTTP backend against a one-route local server
use axum::http::{header, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::sync::Arc;
use studio_client::api::{GenerateRequest, SaveRequest, TrailerRequest, UploadRequest};
use studio_client::{ClientConfig, HttpBackend, StudioBackend, StudioError};
use tokio::net::TcpListener;

/// Local server answering POSTs to one route with a fixed reply
struct StubServer {
    url: String,
    received: Arc<Mutex<Option<Value>>>,
}

impl StubServer {
    async fn start(
        route: &'static str,
        status: StatusCode,
        content_type: &'static str,
        reply: &'static str,
    ) -> Self {
        let received = Arc::new(Mutex::new(None));
        let seen = received.clone();
        let app = Router::new().route(
            route,
            post(move |Json(body): Json<Value>| {
                let seen = seen.clone();
                async move {
                    *seen.lock() = Some(body);
                    (status, [(header::CONTENT_TYPE, content_type)], reply)
                }
            }),
        );

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { url, received }
    }

    /// JSON body of the request that reached the route, if any
    fn received(&self) -> Option<Value> {
        self.received.lock().clone()
    }
}

fn backend_for(url: &str) -> HttpBackend {
    HttpBackend::new(&ClientConfig::default().with_api_url(url.to_string())).unwrap()
}

#[tokio::test]
async fn test_generate_posts_prompt_and_reads_html() {
    let server = StubServer::start(
        "/api/generate/full",
        StatusCode::OK,
        "application/json",
        r#"{"ok": true, "title": "Space Shooter", "summary": "Pew.", "html": "<html>...</html>"}"#,
    )
    .await;

    let page = backend_for(&server.url)
        .generate(&GenerateRequest {
            prompt: "space shooter game".to_string(),
            model: None,
        })
        .await
        .unwrap();

    assert_eq!(page.html, "<html>...</html>");
    assert_eq!(page.title.as_deref(), Some("Space Shooter"));

    assert_eq!(server.received(), Some(json!({"prompt": "space shooter game"})));
}

#[tokio::test]
async fn test_generate_error_uses_plain_text_body() {
    let server = StubServer::start(
        "/api/generate/full",
        StatusCode::BAD_REQUEST,
        "text/html",
        "Missing prompt",
    )
    .await;

    let err = backend_for(&server.url)
        .generate(&GenerateRequest {
            prompt: "x".to_string(),
            model: None,
        })
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(400));
    assert_eq!(err.to_string(), "Missing prompt");
    assert!(server.received().is_some());
}

#[tokio::test]
async fn test_trailer_error_field_becomes_message() {
    let server = StubServer::start(
        "/api/trailer/generate",
        StatusCode::INTERNAL_SERVER_ERROR,
        "application/json",
        r#"{"error": "render failed"}"#,
    )
    .await;

    let err = backend_for(&server.url)
        .generate_trailer(&TrailerRequest::for_summary(""))
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "render failed");
    assert_eq!(
        server.received(),
        Some(json!({
            "summary": "Arcade browser game trailer.",
            "title": "game-trailer",
            "duration": 6,
            "resolution": "768P"
        }))
    );
}

#[tokio::test]
async fn test_ok_false_with_success_status_is_rejected() {
    let server = StubServer::start(
        "/api/trailer/upload",
        StatusCode::OK,
        "application/json",
        r#"{"ok": false, "message": "quota exceeded"}"#,
    )
    .await;

    let err = backend_for(&server.url)
        .upload_trailer(&UploadRequest {
            filename: "a.mp4".to_string(),
            title: "Game Trailer: a".to_string(),
            description: String::new(),
            privacy: "unlisted".to_string(),
        })
        .await
        .unwrap_err();

    assert!(matches!(err, StudioError::Rejected(ref msg) if msg == "quota exceeded"));
    assert!(server.received().is_some());
}

#[tokio::test]
async fn test_unparsable_error_body_falls_back_to_raw_text() {
    let server = StubServer::start(
        "/api/trailer/generate",
        StatusCode::BAD_GATEWAY,
        "text/plain",
        "upstream timed out",
    )
    .await;

    let err = backend_for(&server.url)
        .generate_trailer(&TrailerRequest::for_summary("pong"))
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "upstream timed out");
    assert_eq!(err.status(), Some(502));
    assert!(server.received().is_some());
}

#[tokio::test]
async fn test_upload_success_reads_watch_url() {
    let server = StubServer::start(
        "/api/trailer/upload",
        StatusCode::OK,
        "application/json",
        r#"{"ok": true, "video_id": "abc123", "watch_url": "https://youtu.be/abc123"}"#,
    )
    .await;

    let upload = backend_for(&server.url)
        .upload_trailer(&UploadRequest {
            filename: "pong-trailer-pad.mp4".to_string(),
            title: "Game Trailer: pong".to_string(),
            description: "pong\n\n#shorts".to_string(),
            privacy: "unlisted".to_string(),
        })
        .await
        .unwrap();

    assert_eq!(upload.watch_url, "https://youtu.be/abc123");
    assert_eq!(upload.video_id.as_deref(), Some("abc123"));
    assert_eq!(server.received().unwrap()["privacy"], "unlisted");
}

#[tokio::test]
async fn test_save_returns_path() {
    let server = StubServer::start(
        "/api/generate/save",
        StatusCode::OK,
        "application/json",
        r#"{"ok": true, "slug": "pong", "title": "Pong", "summary": "A fun game.", "path": "/games/pong/"}"#,
    )
    .await;

    let saved = backend_for(&server.url)
        .save(&SaveRequest {
            html: "<html><title>Pong</title></html>".to_string(),
            prompt: "pong".to_string(),
        })
        .await
        .unwrap();

    assert_eq!(saved.path, "/games/pong/");
    assert_eq!(saved.slug.as_deref(), Some("pong"));
    assert_eq!(
        server.received(),
        Some(json!({"html": "<html><title>Pong</title></html>", "prompt": "pong"}))
    );
}

#[tokio::test]
async fn test_save_plain_text_400_is_status_error() {
    let server = StubServer::start(
        "/api/generate/save",
        StatusCode::BAD_REQUEST,
        "text/html",
        "Missing html",
    )
    .await;

    let err = backend_for(&server.url)
        .save(&SaveRequest {
            html: " ".to_string(),
            prompt: String::new(),
        })
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "Missing html");
    assert_eq!(err.status(), Some(400));
}

#[tokio::test]
async fn test_save_without_path_is_rejected() {
    let server = StubServer::start(
        "/api/generate/save",
        StatusCode::OK,
        "application/json",
        r#"{"ok": true, "slug": "pong"}"#,
    )
    .await;

    let err = backend_for(&server.url)
        .save(&SaveRequest {
            html: "<html></html>".to_string(),
            prompt: "pong".to_string(),
        })
        .await
        .unwrap_err();

    assert!(matches!(err, StudioError::Rejected(_)));
}

#[tokio::test]
async fn test_unreachable_server_is_transport_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);

    let err = backend_for(&url)
        .generate(&GenerateRequest {
            prompt: "pong".to_string(),
            model: None,
        })
        .await
        .unwrap_err();

    assert!(matches!(err, StudioError::Transport(_)));
}
