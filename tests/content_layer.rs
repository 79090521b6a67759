mod support;

use std::sync::Arc;

use axum::{
    Extension, Json, Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode},
    middleware,
    routing::get,
};
use reqwest::StatusCode as RemoteStatus;
use serde_json::Value;
use tower::ServiceExt;

use support::{CountingStore, RecordingFetcher, client};
use tessera::domain::content::Content;
use tessera::domain::options::{EditMode, LoadOptions, RequestOptions};
use tessera::infra::http::{ContentState, content_layer};

fn app(state: ContentState) -> Router {
    Router::new()
        .route(
            "/",
            get(|Extension(content): Extension<Content>| async move { Json(content) }),
        )
        .layer(middleware::from_fn_with_state(state, content_layer))
}

async fn call(router: &Router, uri: &str) -> (StatusCode, Vec<u8>) {
    let request = Request::builder()
        .uri(uri)
        .body(Body::empty())
        .expect("request should build");
    let response = router
        .clone()
        .oneshot(request)
        .await
        .expect("router should respond");
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body should collect");
    (status, body.to_vec())
}

#[tokio::test]
async fn handlers_receive_loaded_content() {
    let fetcher = Arc::new(RecordingFetcher::new());
    let store = Arc::new(CountingStore::new());
    let client = Arc::new(client(fetcher.clone(), store, RequestOptions::default()));
    let router = app(ContentState::new(client, "main,footer"));

    let (status, body) = call(&router, "/").await;
    assert_eq!(status, StatusCode::OK);

    let json: Value = serde_json::from_slice(&body).expect("json body");
    assert_eq!(json["main"]["id"], "main");
    assert_eq!(json["footer"]["id"], "footer");

    call(&router, "/").await;
    assert_eq!(fetcher.call_count(), 1);
}

#[tokio::test]
async fn edit_query_switches_request_to_draft() {
    let fetcher = Arc::new(RecordingFetcher::new());
    let store = Arc::new(CountingStore::new());
    let defaults = RequestOptions {
        edit_mode: EditMode::QueryString,
        ..RequestOptions::default()
    };
    let client = Arc::new(client(fetcher.clone(), store.clone(), defaults));
    let router = app(ContentState::new(client, "main"));

    let (_, published) = call(&router, "/?page=1").await;
    let (_, edited) = call(&router, "/?edit=true").await;

    let published: Value = serde_json::from_slice(&published).expect("json body");
    let edited: Value = serde_json::from_slice(&edited).expect("json body");
    assert_eq!(published["main"]["draft"], false);
    assert_eq!(edited["main"]["draft"], true);
    assert_eq!(store.sets(), 1);
}

#[tokio::test]
async fn state_options_override_client_defaults() {
    let fetcher = Arc::new(RecordingFetcher::new());
    let client = Arc::new(client(
        fetcher.clone(),
        Arc::new(CountingStore::new()),
        RequestOptions::default(),
    ));
    let state = ContentState::new(client, "main").with_options(LoadOptions::new().lang("it"));
    let router = app(state);

    let (status, body) = call(&router, "/").await;
    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_slice(&body).expect("json body");
    assert_eq!(json["main"]["lang"], "it");
}

#[tokio::test]
async fn failed_load_returns_bad_gateway() {
    let fetcher = Arc::new(RecordingFetcher::failing(RemoteStatus::SERVICE_UNAVAILABLE));
    let client = Arc::new(client(
        fetcher,
        Arc::new(CountingStore::new()),
        RequestOptions::default(),
    ));
    let router = app(ContentState::new(client, "main"));

    let (status, body) = call(&router, "/").await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body, b"Content unavailable");
}
