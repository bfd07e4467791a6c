mod common;

use std::path::Path;
use std::sync::Arc;
use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;
use enviroscan::data::ServerConfig;
use enviroscan::detection_runners::Detector;
use enviroscan::server::{router, AppState};
use common::{detection, png, StubDetector};

const BOUNDARY: &str = "enviroscan-test-boundary";

fn app(detector: impl Detector + 'static, output_dir: &Path) -> Router {
    let config = ServerConfig::default().with_output_dir(output_dir);
    let detector: Arc<dyn Detector> = Arc::new(detector);
    let state = Arc::new(AppState::new(detector, &config).unwrap());
    router(state, &config)
}

fn multipart_body(parts: &[(&str, &str, Vec<u8>)]) -> Vec<u8> {
    let mut body = Vec::new();
    for (field, filename, bytes) in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        body.extend_from_slice(
            format!("Content-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\n").as_bytes(),
        );
        body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

fn analyze_request(parts: &[(&str, &str, Vec<u8>)]) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/analyze/")
        .header(header::CONTENT_TYPE, format!("multipart/form-data; boundary={BOUNDARY}"))
        .body(Body::from(multipart_body(parts)))
        .unwrap()
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn analyze_returns_results_for_good_files_only() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(StubDetector::with(vec![detection(0, 0.75)]), dir.path());

    let response = app
        .oneshot(analyze_request(&[
            ("files", "litter1.png", png(32, 24)),
            ("files", "broken.png", b"garbage".to_vec()),
            ("files", "litter2.png", png(32, 24)),
        ]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["results"].as_array().unwrap().len(), 2);
    assert_eq!(body["results"][0]["image"], "/output/annotated_litter1.png");
    assert_eq!(body["results"][1]["image"], "/output/annotated_litter2.png");
    assert_eq!(
        body["results"][0]["detections"][0],
        json!({
            "class": "Can",
            "confidence": 0.75,
            "coordinates": [[4.0, 4.0, 28.0, 20.0]],
            "advice": "Rinse and recycle in the metal bin."
        })
    );
}

#[tokio::test]
async fn analyze_without_files_is_unprocessable() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(StubDetector::empty(), dir.path());

    let response = app
        .oneshot(analyze_request(&[("image", "a.png", png(8, 8))]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(json_body(response).await["detail"].is_string());
}

#[tokio::test]
async fn annotated_images_are_served_under_mount() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(StubDetector::empty(), dir.path());

    let response = app
        .clone()
        .oneshot(analyze_request(&[("files", "shot.png", png(12, 12))]))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(Request::builder().uri("/output/annotated_shot.png").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(image::load_from_memory(&bytes).unwrap().width(), 12);
}

#[tokio::test]
async fn clear_outputs_empties_directory() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("output");
    std::fs::create_dir_all(out.join("old")).unwrap();
    std::fs::write(out.join("annotated_a.jpg"), b"x").unwrap();
    let app = app(StubDetector::empty(), &out);

    let response = app
        .oneshot(Request::builder().uri("/clear-outputs/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await, json!({"message": "Output folder cleared successfully"}));
    assert_eq!(std::fs::read_dir(&out).unwrap().count(), 0);
}

#[tokio::test]
async fn clear_outputs_on_missing_directory_succeeds() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(StubDetector::empty(), &dir.path().join("absent"));

    let response = app
        .oneshot(Request::builder().uri("/clear-outputs/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(json_body(response).await["message"], "Output folder cleared successfully");
}

#[tokio::test]
async fn clear_outputs_failure_is_reported_in_body() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("output");
    std::fs::write(&out, b"not a directory").unwrap();
    let app = app(StubDetector::empty(), &out);

    let response = app
        .oneshot(Request::builder().uri("/clear-outputs/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    let fields = body.as_object().unwrap();
    assert_eq!(fields.len(), 1);
    let error = fields["error"].as_str().unwrap();
    assert!(error.starts_with(&format!("Failed to delete {}: ", out.display())), "{error}");
}
