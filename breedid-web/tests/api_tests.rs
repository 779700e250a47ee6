//! HTTP API tests for breedid-web
//!
//! Drives the router in-process with a fixed-score predictor standing in
//! for the ONNX model.

use std::io::Cursor;
use std::path::Path;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, Response, StatusCode};
use axum::Router;
use breedid_classifier::{
    BreedClassifier, BreedKnowledgeBase, BreedPredictor, DecisionPolicy, ImageNormalizer,
    InputTensor, LabelSet, ProbabilityVector,
};
use breedid_common::config::{TomlConfig, DEFAULT_LABELS};
use breedid_web::{build_router, AppState};
use image::{ImageFormat, Rgb, RgbImage};
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

const ACCEPTED_SCORES: [f32; 5] = [0.05, 0.03, 0.84, 0.05, 0.03];
const REJECTED_SCORES: [f32; 5] = [0.40, 0.15, 0.15, 0.15, 0.15];
const BOUNDARY: &str = "breedid-test-boundary";

struct FixedPredictor(Vec<f32>);

impl BreedPredictor for FixedPredictor {
    fn predict(&self, _input: &InputTensor) -> breedid_classifier::Result<ProbabilityVector> {
        Ok(ProbabilityVector::new(self.0.clone()))
    }

    fn describe(&self) -> String {
        "fixed".to_string()
    }
}

struct TestApp {
    state: AppState,
    tmp: TempDir,
}

impl TestApp {
    fn new(scores: &[f32]) -> Self {
        Self::with_config(scores, |_| {})
    }

    fn with_config(scores: &[f32], tweak: impl FnOnce(&mut TomlConfig)) -> Self {
        let tmp = TempDir::new().unwrap();
        let mut config = TomlConfig::default();
        config.gallery.dir = tmp.path().join("gallery");
        tweak(&mut config);

        let classifier = BreedClassifier::new(
            LabelSet::new(DEFAULT_LABELS).unwrap(),
            ImageNormalizer::new(8, 8),
            Arc::new(FixedPredictor(scores.to_vec())),
            DecisionPolicy::default(),
            BreedKnowledgeBase::builtin(),
        );

        Self {
            state: AppState::new(config, Arc::new(classifier)),
            tmp,
        }
    }

    fn router(&self) -> Router {
        build_router(self.state.clone())
    }

    fn gallery_dir(&self) -> std::path::PathBuf {
        self.tmp.path().join("gallery")
    }

    async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router().oneshot(request).await.unwrap()
    }
}

fn png_bytes() -> Vec<u8> {
    let image = RgbImage::from_pixel(32, 24, Rgb([200, 160, 90]));
    let mut out = Cursor::new(Vec::new());
    image.write_to(&mut out, ImageFormat::Png).unwrap();
    out.into_inner()
}

fn multipart_body(field: &str, file_name: &str, bytes: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{}\r\nContent-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n\
             Content-Type: application/octet-stream\r\n\r\n",
            BOUNDARY, field, file_name
        )
        .as_bytes(),
    );
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());
    body
}

fn upload_request(uri: &str, field: &str, file_name: &str, bytes: &[u8], cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        );
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder
        .body(Body::from(multipart_body(field, file_name, bytes)))
        .unwrap()
}

fn get_request(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

/// `name=value` part of the response's Set-Cookie header
fn session_cookie(response: &Response<Body>) -> Option<String> {
    response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(|v| v.to_string())
}

async fn body_text(response: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

async fn body_json(response: Response<Body>) -> Value {
    serde_json::from_str(&body_text(response).await).unwrap()
}

fn gallery_files(dir: &Path) -> Vec<String> {
    match std::fs::read_dir(dir) {
        Ok(entries) => entries
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect(),
        Err(_) => Vec::new(),
    }
}

#[tokio::test]
async fn test_accepted_upload_stores_image_and_history() {
    let app = TestApp::new(&ACCEPTED_SCORES);

    let response = app
        .send(upload_request("/api/classify", "image", "rex.png", &png_bytes(), None))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let cookie = session_cookie(&response).expect("new session sets a cookie");

    let json = body_json(response).await;
    assert_eq!(json["accepted"], true);
    assert_eq!(json["label"], "golden_retriever");
    assert_eq!(json["display_label"], "Golden Retriever");
    assert_eq!(json["confidence"], "84.00%");
    assert_eq!(json["info"]["origin"], "Scotland");
    assert_eq!(json["scores"].as_array().unwrap().len(), 5);

    let files = gallery_files(&app.gallery_dir());
    assert_eq!(files.len(), 1);
    assert!(files[0].starts_with("dog_") && files[0].ends_with(".jpg"));
    assert_eq!(json["image"], files[0].as_str());

    let history = body_json(app.send(get_request("/api/history", Some(&cookie))).await).await;
    let entries = history["entries"].as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["label"], "Golden Retriever");
    assert_eq!(entries[0]["confidence"], "84.00%");
    assert_eq!(entries[0]["image"], files[0].as_str());
    assert!(entries[0].get("image_path").is_none());
}

#[tokio::test]
async fn test_rejected_upload_writes_nothing() {
    let app = TestApp::new(&REJECTED_SCORES);

    let response = app
        .send(upload_request("/api/classify", "image", "cat.jpg", &png_bytes(), None))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let cookie = session_cookie(&response).unwrap();

    let json = body_json(response).await;
    assert_eq!(json["accepted"], false);
    assert_eq!(json["message"], "Image not recognized");
    assert!(json.get("label").is_none());
    assert!(json.get("scores").is_none());

    assert!(gallery_files(&app.gallery_dir()).is_empty());

    let history = body_json(app.send(get_request("/api/history", Some(&cookie))).await).await;
    assert!(history["entries"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_unsupported_extension_is_415() {
    let app = TestApp::new(&ACCEPTED_SCORES);

    let response = app
        .send(upload_request("/api/classify", "image", "rex.gif", &png_bytes(), None))
        .await;
    assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);

    let json = body_json(response).await;
    assert_eq!(json["error"]["code"], "UNSUPPORTED_MEDIA_TYPE");
    assert!(gallery_files(&app.gallery_dir()).is_empty());
}

#[tokio::test]
async fn test_missing_image_field_is_400() {
    let app = TestApp::new(&ACCEPTED_SCORES);

    let response = app
        .send(upload_request("/api/classify", "photo", "rex.png", &png_bytes(), None))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_json(response).await;
    assert_eq!(json["error"]["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_corrupt_image_is_400_and_service_keeps_running() {
    let app = TestApp::new(&ACCEPTED_SCORES);

    let response = app
        .send(upload_request("/api/classify", "image", "rex.png", b"not an image", None))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["error"]["code"], "INVALID_IMAGE");

    let response = app
        .send(upload_request("/api/classify", "image", "rex.png", &png_bytes(), None))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_oversized_upload_is_413() {
    let app = TestApp::with_config(&ACCEPTED_SCORES, |config| config.upload.max_bytes = 1024);

    let response = app
        .send(upload_request("/api/classify", "image", "big.png", &vec![0u8; 8192], None))
        .await;
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn test_index_renders_page_and_sets_cookie() {
    let app = TestApp::new(&ACCEPTED_SCORES);

    let response = app.send(get_request("/", None)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(session_cookie(&response).unwrap().starts_with("breedid_session="));
    let content_type = response.headers().get(header::CONTENT_TYPE).unwrap();
    assert!(content_type.to_str().unwrap().starts_with("text/html"));

    let html = body_text(response).await;
    assert!(html.contains("<li>Golden Retriever</li>"));
    assert!(html.contains("<li>Yorkshire Terrier</li>"));
    assert!(html.contains("No images in the gallery yet."));
}

#[tokio::test]
async fn test_known_session_cookie_is_not_reissued() {
    let app = TestApp::new(&ACCEPTED_SCORES);

    let first = app.send(get_request("/", None)).await;
    let cookie = session_cookie(&first).unwrap();

    let second = app.send(get_request("/", Some(&cookie))).await;
    assert!(session_cookie(&second).is_none());
}

#[tokio::test]
async fn test_form_upload_renders_result_gallery_and_history() {
    let app = TestApp::new(&ACCEPTED_SCORES);

    let response = app
        .send(upload_request("/classify", "image", "rex.JPG", &png_bytes(), None))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let html = body_text(response).await;
    assert!(html.contains("Prediction: <strong>Golden Retriever</strong>"));
    assert!(html.contains("84.00%"));
    assert!(html.contains("<strong>Origin:</strong> Scotland"));
    assert!(html.contains("<div class=\"history-item\">"));
    assert!(!html.contains("No images in the gallery yet."));
}

#[tokio::test]
async fn test_form_upload_rejected_shows_message() {
    let app = TestApp::new(&REJECTED_SCORES);

    let response = app
        .send(upload_request("/classify", "image", "rex.png", &png_bytes(), None))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let html = body_text(response).await;
    assert!(html.contains("Image not recognized"));
    assert!(html.contains("<img src=\"data:image/jpeg;base64,"));
    assert!(!html.contains("Breed information"));
    assert!(html.contains("No classifications yet."));
}

#[tokio::test]
async fn test_form_upload_error_rendered_in_page() {
    let app = TestApp::new(&ACCEPTED_SCORES);

    let response = app
        .send(upload_request("/classify", "image", "rex.bmp", &png_bytes(), None))
        .await;
    assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);

    let html = body_text(response).await;
    assert!(html.contains("Unsupported file type"));
    assert!(html.contains("<form id=\"upload-form\""));
}

#[tokio::test]
async fn test_gallery_listing_and_file_serving() {
    let app = TestApp::new(&ACCEPTED_SCORES);
    app.send(upload_request("/api/classify", "image", "rex.png", &png_bytes(), None))
        .await;

    let json = body_json(app.send(get_request("/api/gallery", None)).await).await;
    let images = json["images"].as_array().unwrap();
    assert_eq!(images.len(), 1);

    let name = images[0].as_str().unwrap();
    let response = app.send(get_request(&format!("/gallery/{}", name), None)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(image::guess_format(&bytes).unwrap(), ImageFormat::Jpeg);
}

#[tokio::test]
async fn test_sessions_do_not_share_history() {
    let app = TestApp::new(&ACCEPTED_SCORES);

    let response = app
        .send(upload_request("/api/classify", "image", "rex.png", &png_bytes(), None))
        .await;
    let first = session_cookie(&response).unwrap();

    let other = app.send(get_request("/api/history", None)).await;
    let second = session_cookie(&other).unwrap();
    assert_ne!(first, second);
    let json = body_json(other).await;
    assert!(json["entries"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_end_session_drops_history() {
    let app = TestApp::new(&ACCEPTED_SCORES);

    let response = app
        .send(upload_request("/api/classify", "image", "rex.png", &png_bytes(), None))
        .await;
    let cookie = session_cookie(&response).unwrap();

    let request = Request::builder()
        .method("DELETE")
        .uri("/api/session")
        .header(header::COOKIE, &cookie)
        .body(Body::empty())
        .unwrap();
    let response = app.send(request).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(session_cookie(&response).unwrap().starts_with("breedid_session="));
    assert_eq!(body_json(response).await["ended"], true);

    let response = app.send(get_request("/api/history", Some(&cookie))).await;
    let reissued = session_cookie(&response).expect("ended session is replaced");
    assert_ne!(reissued, cookie);
    assert!(body_json(response).await["entries"].as_array().unwrap().is_empty());

    // Gallery images outlive the session
    assert_eq!(gallery_files(&app.gallery_dir()).len(), 1);
}

#[tokio::test]
async fn test_health() {
    let app = TestApp::new(&ACCEPTED_SCORES);

    let response = app.send(get_request("/health", None)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["module"], "breedid-web");
    assert_eq!(json["model"], "fixed");
    assert_eq!(json["labels"], 5);
    assert_eq!(json["confidence_threshold"].as_f64().unwrap() as f32, 0.70);
}

#[tokio::test]
async fn test_buildinfo() {
    let app = TestApp::new(&ACCEPTED_SCORES);

    let json = body_json(app.send(get_request("/api/buildinfo", None)).await).await;
    assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
    assert!(json["git_hash"].is_string());
    assert!(json["build_profile"].is_string());
}
