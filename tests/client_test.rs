//! HTTPクライアント結合テスト
//!
//! axum で抽出・保存エンドポイントのモックを立て、送信内容と応答の扱いを検証

use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use card_scan_common::{
    extract, save, AppState, Error, FieldKey, FieldSet, ImageBlob, ImageSource, SelectedFile,
};
use card_scan_rust::{ClientConfig, HttpCardApi};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};

/// 受信したマルチパート (name, file_name, content_type, body)
type Part = (String, Option<String>, Option<String>, String);
type Log = Arc<Mutex<Vec<Vec<Part>>>>;

async fn collect(mut multipart: Multipart) -> Vec<Part> {
    let mut parts = Vec::new();
    while let Some(field) = multipart.next_field().await.expect("multipart読み込み失敗") {
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let data = field.bytes().await.expect("本文読み込み失敗");
        parts.push((name, file_name, content_type, String::from_utf8_lossy(&data).to_string()));
    }
    parts
}

fn value_of<'a>(parts: &'a [Part], name: &str) -> Option<&'a str> {
    parts.iter().find(|p| p.0 == name).map(|p| p.3.as_str())
}

async fn extract_ok(State(log): State<Log>, multipart: Multipart) -> Json<Value> {
    let parts = collect(multipart).await;
    log.lock().unwrap().push(parts);
    Json(json!({
        "ocr_text": "JANE DOE\nACME",
        "fields": {"Name": "Jane Doe", "Company": "Acme", "Designation": "CTO"}
    }))
}

async fn extract_timeout(multipart: Multipart) -> (StatusCode, &'static str) {
    collect(multipart).await;
    (StatusCode::INTERNAL_SERVER_ERROR, "ocr timeout")
}

async fn save_ok(State(log): State<Log>, multipart: Multipart) -> Json<Value> {
    let parts = collect(multipart).await;
    let sheet = value_of(&parts, "to_sheet") == Some("true");
    log.lock().unwrap().push(parts);
    Json(json!({"status": "saved", "csv": true, "sheet": sheet}))
}

async fn save_no_credentials(multipart: Multipart) -> (StatusCode, Json<Value>) {
    collect(multipart).await;
    (StatusCode::BAD_REQUEST, Json(json!({"error": "Google credentials missing"})))
}

async fn health() -> Json<Value> {
    Json(json!({"status": "ok"}))
}

async fn spawn(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}/", addr)
}

async fn healthy_server() -> (HttpCardApi, Log) {
    let log: Log = Arc::default();
    let router = Router::new()
        .route("/api/extract", post(extract_ok))
        .route("/api/save", post(save_ok))
        .route("/health", get(health))
        .with_state(log.clone());
    let base = spawn(router).await;
    let api = HttpCardApi::new(ClientConfig::new(&base).unwrap()).unwrap();
    (api, log)
}

fn selected_file() -> ImageSource {
    ImageSource::SelectedFile(SelectedFile {
        blob: ImageBlob::new(b"PNGDATA".to_vec(), "image/png"),
        file_name: "card.png".to_string(),
    })
}

#[tokio::test]
async fn test_extract_sends_file_and_flag() {
    let (api, log) = healthy_server().await;

    let extraction = extract(&api, &selected_file(), true).await.expect("抽出失敗");

    assert_eq!(extraction.ocr_text, "JANE DOE\nACME");
    assert_eq!(extraction.fields.name, "Jane Doe");
    assert_eq!(extraction.fields.company, "Acme");
    assert_eq!(extraction.fields.email, "");

    let requests = log.lock().unwrap();
    let parts = &requests[0];
    let file = parts.iter().find(|p| p.0 == "file").expect("fileパートなし");
    assert_eq!(file.1.as_deref(), Some("card.png"));
    assert_eq!(file.2.as_deref(), Some("image/png"));
    assert_eq!(file.3, "PNGDATA");
    assert_eq!(value_of(parts, "use_gemini"), Some("true"));
}

#[tokio::test]
async fn test_extract_captured_frame_is_named_capture_jpg() {
    let (api, log) = healthy_server().await;
    let source = ImageSource::CapturedFrame(ImageBlob::jpeg(b"JPEG".to_vec()));

    extract(&api, &source, false).await.unwrap();

    let requests = log.lock().unwrap();
    let file = requests[0].iter().find(|p| p.0 == "file").unwrap();
    assert_eq!(file.1.as_deref(), Some("capture.jpg"));
    assert_eq!(file.2.as_deref(), Some("image/jpeg"));
    assert_eq!(value_of(&requests[0], "use_gemini"), Some("false"));
}

#[tokio::test]
async fn test_extract_without_image_sends_nothing() {
    let (api, log) = healthy_server().await;
    let result = extract(&api, &ImageSource::None, true).await;
    assert!(matches!(result, Err(Error::NoImage)));
    assert!(log.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_extract_http_500_keeps_fields() {
    let router = Router::new().route("/api/extract", post(extract_timeout));
    let base = spawn(router).await;
    let api = HttpCardApi::new(ClientConfig::new(&base).unwrap()).unwrap();

    let mut state = AppState::new();
    state.edit_field(FieldKey::Name, "Before");
    state.select_file(SelectedFile {
        blob: ImageBlob::jpeg(vec![1, 2, 3]),
        file_name: "card.jpg".to_string(),
    })
    .unwrap();

    let ticket = state.begin_extract().unwrap();
    let result = extract(&api, &ticket.source, ticket.use_gemini).await;
    assert!(matches!(result, Err(Error::Remote { status: 500, .. })));
    state.finish_extract(ticket.id, result);

    assert_eq!(state.status_line().as_deref(), Some("Extract failed: ocr timeout"));
    assert_eq!(state.fields().name, "Before");
}

#[tokio::test]
async fn test_save_sends_lowercase_fields_and_flags() {
    let (api, log) = healthy_server().await;
    let mut fields = FieldSet::default();
    fields.name = "Jane Doe".to_string();
    fields.website = "www.acme.io".to_string();

    let payload = save(&api, &fields, false).await.expect("保存失敗");
    assert_eq!(payload, json!({"status": "saved", "csv": true, "sheet": false}));
    // 応答のキー順はサーバーのまま
    assert_eq!(payload.to_string(), r#"{"status":"saved","csv":true,"sheet":false}"#);

    let requests = log.lock().unwrap();
    let parts = &requests[0];
    let names: Vec<&str> = parts.iter().map(|p| p.0.as_str()).collect();
    assert_eq!(
        names,
        vec!["name", "phone", "email", "company", "address", "website", "to_csv", "to_sheet"]
    );
    assert_eq!(value_of(parts, "name"), Some("Jane Doe"));
    assert_eq!(value_of(parts, "phone"), Some(""));
    assert_eq!(value_of(parts, "website"), Some("www.acme.io"));
    assert_eq!(value_of(parts, "to_csv"), Some("true"));
    assert_eq!(value_of(parts, "to_sheet"), Some("false"));
}

#[tokio::test]
async fn test_save_to_sheet_flag() {
    let (api, log) = healthy_server().await;
    let payload = save(&api, &FieldSet::default(), true).await.unwrap();
    assert_eq!(payload["sheet"], json!(true));
    assert_eq!(value_of(&log.lock().unwrap()[0], "to_sheet"), Some("true"));
}

#[tokio::test]
async fn test_save_error_body_is_surfaced() {
    let router = Router::new().route("/api/save", post(save_no_credentials));
    let base = spawn(router).await;
    let api = HttpCardApi::new(ClientConfig::new(&base).unwrap()).unwrap();

    let mut state = AppState::new();
    let ticket = state.begin_save(true);
    let result = save(&api, &ticket.form.fields, ticket.form.to_sheet).await;
    state.finish_save(ticket.id, result);

    assert_eq!(
        state.status_line().as_deref(),
        Some(r#"Save failed: {"error":"Google credentials missing"}"#)
    );
}

#[tokio::test]
async fn test_unreachable_server_is_network_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let api = HttpCardApi::new(ClientConfig::new(&format!("http://{}", addr)).unwrap()).unwrap();
    let result = extract(&api, &selected_file(), true).await;
    assert!(matches!(result, Err(Error::Network(_))));
}

#[tokio::test]
async fn test_health_check() {
    let (api, _log) = healthy_server().await;
    assert!(api.check_health().await.unwrap());
}
