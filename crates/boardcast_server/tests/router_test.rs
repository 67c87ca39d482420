//! Tests for the HTTP routes.
//!
//! Requests go straight to the `Router` through `tower::ServiceExt`,
//! without binding a TCP port.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use boardcast_server::{ClientEvent, GameEngine, MoveIntent, build_router, spawn_engine};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

async fn body_string(response: axum::response::Response) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn test_health() {
    let dir = tempfile::tempdir().unwrap();
    let router = build_router(spawn_engine(GameEngine::default(), 8), dir.path());

    let response = router.oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "ok");
}

#[tokio::test]
async fn test_state_reflects_moves() {
    let dir = tempfile::tempdir().unwrap();
    let engine = spawn_engine(GameEngine::default(), 8);
    let (peer, _events) = engine.connect().await.unwrap();
    engine
        .submit(peer, ClientEvent::Move(MoveIntent::new(8)))
        .await
        .unwrap();

    let router = build_router(engine, dir.path());
    let response = router.oneshot(get("/api/state")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(
        body,
        json!({
            "board": [null, null, null, null, null, null, null, null, "X"],
            "currentPlayer": "O",
            "gameOver": false
        })
    );
}

#[tokio::test]
async fn test_static_assets_served_from_dir() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("index.html"), "<h1>board</h1>").unwrap();
    let router = build_router(spawn_engine(GameEngine::default(), 8), dir.path());

    let response = router.clone().oneshot(get("/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "<h1>board</h1>");

    let missing = router.oneshot(get("/nope.js")).await.unwrap();
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
}
