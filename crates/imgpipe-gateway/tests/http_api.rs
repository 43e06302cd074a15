//! End-to-end HTTP behaviour through both routers.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

mod common;

use axum::body::{self, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use tower::ServiceExt; // for `oneshot`

use imgpipe_core::model::{ImageRecord, ImageStatus};
use imgpipe_gateway::app_state::AppState;
use imgpipe_gateway::router::{build_metrics_router, build_router};

async fn send(app: &Router, method: Method, uri: &str, body: &str) -> Response {
    let req = Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::from(body.to_string()))
        .unwrap();
    app.clone().oneshot(req).await.unwrap()
}

async fn text(resp: Response) -> String {
    let bytes = body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

async fn scrape(state: &AppState) -> String {
    let app = build_metrics_router(state.clone());
    let resp = send(&app, Method::GET, "/metrics", "").await;
    assert_eq!(resp.status(), StatusCode::OK);
    text(resp).await
}

#[tokio::test]
async fn list_seeded_processing_images() {
    let app = build_router(common::test_state());

    let resp = send(&app, Method::GET, "/images", "").await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers()[header::CONTENT_TYPE], "application/json");

    let listed: Vec<ImageRecord> = serde_json::from_str(&text(resp).await).unwrap();
    assert_eq!(listed.iter().map(|r| r.id).collect::<Vec<_>>(), vec![1, 2]);
}

#[tokio::test]
async fn register_then_transition_then_list() {
    let state = common::test_state();
    let app = build_router(state.clone());

    let resp = send(
        &app,
        Method::POST,
        "/images",
        r#"{"id":3,"format":"GIF","resolution":"640x480","img_status":"Processing"}"#,
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    assert_eq!(text(resp).await, "Created Image!");

    let resp = send(&app, Method::PUT, "/images/1", "").await;
    assert_eq!(resp.status(), StatusCode::ACCEPTED);
    assert_eq!(text(resp).await, "Processed Image..");

    let resp = send(&app, Method::GET, "/images", "").await;
    let listed: Vec<ImageRecord> = serde_json::from_str(&text(resp).await).unwrap();
    assert_eq!(
        listed,
        vec![
            ImageRecord::new(2, "PNG", "1280x720", ImageStatus::Processing),
            ImageRecord::new(3, "GIF", "640x480", ImageStatus::Processing),
        ]
    );

    let out = scrape(&state).await;
    assert!(out.contains("myapp_processing_images 2\n"), "{out}");
    assert!(out.contains("myapp_processed_images 1\n"), "{out}");
    assert!(
        out.contains("myapp_request_duration_seconds_count{method=\"GET\",status=\"200\"} 1\n"),
        "{out}"
    );
}

#[tokio::test]
async fn malformed_register_is_400_and_leaves_state() {
    let state = common::test_state();
    let app = build_router(state.clone());

    let resp = send(&app, Method::POST, "/images", "{\"id\": ").await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert!(!text(resp).await.is_empty());

    assert_eq!(state.coordinator().registry().len(), 2);
    let out = scrape(&state).await;
    assert!(out.contains("myapp_processing_images 2\n"));
    assert!(out.contains("myapp_processed_images 0\n"));
}

// Bad ids short-circuit with 404 and leave registry and metrics alone.
#[tokio::test]
async fn bad_transition_ids_are_404() {
    let state = common::test_state();
    let app = build_router(state.clone());
    let before = state.coordinator().registry().snapshot();
    let metrics_before = scrape(&state).await;

    for uri in ["/images/abc", "/images/0", "/images/-4", "/images/"] {
        let resp = send(&app, Method::PUT, uri, "").await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND, "{uri}");
        assert_eq!(text(resp).await, "404 page not found\n");
    }

    assert_eq!(state.coordinator().registry().snapshot(), before);
    assert_eq!(scrape(&state).await, metrics_before);
}

#[tokio::test]
async fn lenient_register_bodies_are_created() {
    let state = common::test_state();
    let app = build_router(state.clone());

    for body in ["null", r#"{"id":3,"format":"GIF"} xyz"#, r#"{"id":4} {"id":5}"#] {
        let resp = send(&app, Method::POST, "/images", body).await;
        assert_eq!(resp.status(), StatusCode::CREATED, "{body}");
    }

    let ids: Vec<_> = state
        .coordinator()
        .registry()
        .snapshot()
        .into_iter()
        .map(|r| r.id)
        .collect();
    assert_eq!(ids, vec![1, 2, 0, 3, 4]);
}

#[tokio::test]
async fn percent_encoded_id_is_decoded() {
    let state = common::test_state();
    let app = build_router(state.clone());

    let resp = send(&app, Method::PUT, "/images/%31", "").await;
    assert_eq!(resp.status(), StatusCode::ACCEPTED);
    assert_eq!(state.coordinator().registry().count_by_status().processed, 1);

    let resp = send(&app, Method::PUT, "/images/%FF", "").await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn unknown_id_transition_is_still_202() {
    let state = common::test_state();
    let app = build_router(state.clone());

    let resp = send(&app, Method::PUT, "/images/404", "").await;
    assert_eq!(resp.status(), StatusCode::ACCEPTED);
    assert_eq!(state.coordinator().registry().count_by_status().processing, 2);
}

#[tokio::test]
async fn wrong_methods_are_405_with_allow() {
    let app = build_router(common::test_state());

    let resp = send(&app, Method::DELETE, "/images", "").await;
    assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(resp.headers()[header::ALLOW], "GET, POST");

    let resp = send(&app, Method::GET, "/images/1", "").await;
    assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(resp.headers()[header::ALLOW], "PUT");
    assert_eq!(text(resp).await, "Method Not Allowed\n");
}

#[tokio::test]
async fn unknown_path_is_404() {
    let app = build_router(common::test_state());
    let resp = send(&app, Method::GET, "/videos", "").await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn login_greets_and_is_timed() {
    let state = common::test_state();
    let app = build_router(state.clone());

    let resp = send(&app, Method::GET, "/login", "").await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(text(resp).await, "Welcome to the image processing app!");

    assert_eq!(state.metrics().login_duration.count(), 1);
    let out = scrape(&state).await;
    assert!(out.contains("myapp_login_request_duration_seconds_count 1\n"));
}

#[tokio::test]
async fn metrics_listener_serves_build_info_and_health() {
    let state = common::test_state();
    let out = scrape(&state).await;
    assert!(out.contains("myapp_info{version=\"2.10.5\"} 1\n"));

    let app = build_metrics_router(state);
    let resp = send(&app, Method::GET, "/healthz", "").await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(text(resp).await, "ok");

    let resp = send(&app, Method::GET, "/metrics", "").await;
    assert_eq!(
        resp.headers()[header::CONTENT_TYPE],
        "text/plain; version=0.0.4; charset=utf-8"
    );
}

#[tokio::test]
async fn api_router_does_not_serve_metrics() {
    let app = build_router(common::test_state());
    let resp = send(&app, Method::GET, "/metrics", "").await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
