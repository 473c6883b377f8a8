//! Web API Upload Tests
//!
//! Integration tests for the upload form, the upload endpoint and serving
//! stored files back.

use axum::body::Bytes;
use axum::http::StatusCode;
use axum_test::multipart::{MultipartForm, Part};
use axum_test::TestServer;
use docupload::config::Config;
use docupload::upload::UploadService;
use docupload::web::handlers::AppState;
use docupload::web::router::create_router;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

const MIB: usize = 1024 * 1024;
const FORM_HTML: &str = "<html><body><form action=\"/upload\"></form></body></html>";

struct TestApp {
    server: TestServer,
    upload_dir: PathBuf,
    _temp_dir: TempDir,
}

impl TestApp {
    fn metadata_path(&self) -> PathBuf {
        self.upload_dir.join("metadata.json")
    }

    /// Stored document names, excluding the metadata log.
    fn stored_files(&self) -> Vec<String> {
        stored_files(&self.upload_dir)
    }

    fn metadata(&self) -> Vec<Value> {
        let content = std::fs::read_to_string(self.metadata_path()).unwrap();
        serde_json::from_str(&content).unwrap()
    }
}

fn stored_files(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .flatten()
        .filter_map(|e| e.file_name().into_string().ok())
        .filter(|n| !n.starts_with("metadata.json"))
        .collect();
    names.sort();
    names
}

/// Create a test server backed by a temporary upload directory.
fn create_test_app() -> TestApp {
    let temp_dir = TempDir::new().unwrap();
    let upload_dir = temp_dir.path().join("uploads");
    let index_path = temp_dir.path().join("form.html");
    std::fs::write(&index_path, FORM_HTML).unwrap();

    let mut config = Config::default();
    config.files.upload_dir = upload_dir.to_string_lossy().into_owned();
    config.web.index_path = index_path.to_string_lossy().into_owned();

    let uploads =
        UploadService::from_config(&config.files).expect("Failed to create upload service");
    let app_state = Arc::new(AppState::new(uploads));
    let router = create_router(app_state, &config.web);

    let server = TestServer::new(router).expect("Failed to create test server");

    TestApp {
        server,
        upload_dir,
        _temp_dir: temp_dir,
    }
}

fn file_part(content: Vec<u8>, file_name: &str, mime_type: &str) -> Part {
    Part::bytes(Bytes::from(content))
        .file_name(file_name)
        .mime_type(mime_type)
}

fn document_form(content: Vec<u8>, file_name: &str, mime_type: &str) -> MultipartForm {
    MultipartForm::new().add_part("documento", file_part(content, file_name, mime_type))
}

// ============================================================================
// Successful Uploads
// ============================================================================

#[tokio::test]
async fn test_upload_png_without_extra_fields() {
    let app = create_test_app();
    let content = vec![0x89u8; 2 * MIB];

    let response = app
        .server
        .post("/upload")
        .multipart(document_form(content.clone(), "captura.png", "image/png"))
        .await;

    response.assert_status(StatusCode::CREATED);

    let body: Value = response.json();
    assert_eq!(body["ok"], true);

    let metadata = &body["metadata"];
    assert_eq!(metadata["originalName"], "captura.png");
    assert_eq!(metadata["mimeType"], "image/png");
    assert_eq!(metadata["sizeBytes"], 2 * MIB as u64);
    assert_eq!(metadata["requesterName"], Value::Null);
    assert_eq!(metadata["requesterEmail"], Value::Null);

    let stored_name = metadata["storedName"].as_str().unwrap();
    assert!(stored_name.ends_with(".png"));
    assert_eq!(metadata["url"], format!("/uploads/{stored_name}"));
    assert!(metadata["uploadedAt"].as_str().unwrap().ends_with('Z'));

    assert_eq!(app.stored_files(), vec![stored_name.to_string()]);
    assert_eq!(
        std::fs::read(app.upload_dir.join(stored_name)).unwrap(),
        content
    );

    let records = app.metadata();
    assert_eq!(records.len(), 1);
    assert_eq!(&records[0], metadata);
}

#[tokio::test]
async fn test_upload_records_requester_fields() {
    let app = create_test_app();

    let form = document_form(b"%PDF-1.7".to_vec(), "solicitud.pdf", "application/pdf")
        .add_text("name", "Ana Pérez")
        .add_text("email", "ana@example.com");

    let response = app.server.post("/upload").multipart(form).await;

    response.assert_status(StatusCode::CREATED);
    let body: Value = response.json();
    assert_eq!(body["metadata"]["requesterName"], "Ana Pérez");
    assert_eq!(body["metadata"]["requesterEmail"], "ana@example.com");
}

#[tokio::test]
async fn test_upload_empty_fields_become_null() {
    let app = create_test_app();

    let form = MultipartForm::new()
        .add_text("name", "")
        .add_text("email", "")
        .add_part(
            "documento",
            file_part(b"jpeg".to_vec(), "foto.jpg", "image/jpeg"),
        );

    let response = app.server.post("/upload").multipart(form).await;

    response.assert_status(StatusCode::CREATED);
    let body: Value = response.json();
    assert_eq!(body["metadata"]["requesterName"], Value::Null);
    assert_eq!(body["metadata"]["requesterEmail"], Value::Null);
}

#[tokio::test]
async fn test_upload_docx_keeps_extension() {
    let app = create_test_app();

    let response = app
        .server
        .post("/upload")
        .multipart(document_form(
            b"PK\x03\x04".to_vec(),
            "Contrato Final.docx",
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        ))
        .await;

    response.assert_status(StatusCode::CREATED);
    let body: Value = response.json();
    assert_eq!(body["metadata"]["originalName"], "Contrato Final.docx");
    assert!(body["metadata"]["storedName"]
        .as_str()
        .unwrap()
        .ends_with(".docx"));
}

#[tokio::test]
async fn test_upload_exactly_at_limit() {
    let app = create_test_app();

    let response = app
        .server
        .post("/upload")
        .multipart(document_form(vec![0u8; 8 * MIB], "limite.pdf", "application/pdf"))
        .await;

    response.assert_status(StatusCode::CREATED);
    assert_eq!(app.stored_files().len(), 1);
}

#[tokio::test]
async fn test_n_uploads_yield_n_records() {
    let app = create_test_app();

    for i in 0..5 {
        let response = app
            .server
            .post("/upload")
            .multipart(document_form(
                vec![i as u8; 100],
                &format!("doc{i}.pdf"),
                "application/pdf",
            ))
            .await;
        response.assert_status(StatusCode::CREATED);
    }

    let records = app.metadata();
    assert_eq!(records.len(), 5);

    let mut recorded: Vec<String> = records
        .iter()
        .map(|r| r["storedName"].as_str().unwrap().to_string())
        .collect();
    recorded.sort();
    assert_eq!(recorded, app.stored_files());

    let originals: Vec<&str> = records
        .iter()
        .map(|r| r["originalName"].as_str().unwrap())
        .collect();
    assert_eq!(
        originals,
        vec!["doc0.pdf", "doc1.pdf", "doc2.pdf", "doc3.pdf", "doc4.pdf"]
    );
}

#[tokio::test]
async fn test_upload_content_type_parameters_are_ignored() {
    let app = create_test_app();
    let boundary = "docupload-boundary";
    let body = format!(
        "--{boundary}\r\n\
         Content-Disposition: form-data; name=\"documento\"; filename=\"a.pdf\"\r\n\
         Content-Type: Application/PDF; name=a.pdf\r\n\
         \r\n\
         %PDF-1.7\r\n\
         --{boundary}--\r\n"
    );

    let response = app
        .server
        .post("/upload")
        .content_type(&format!("multipart/form-data; boundary={boundary}"))
        .bytes(Bytes::from(body))
        .await;

    response.assert_status(StatusCode::CREATED);
    let body: Value = response.json();
    assert_eq!(body["metadata"]["mimeType"], "application/pdf");
    assert_eq!(body["metadata"]["sizeBytes"], 8);
    assert_eq!(app.metadata()[0]["mimeType"], "application/pdf");
}

#[tokio::test]
async fn test_upload_with_corrupt_metadata_log() {
    let app = create_test_app();
    std::fs::write(app.metadata_path(), "not json at all").unwrap();

    let response = app
        .server
        .post("/upload")
        .multipart(document_form(b"png".to_vec(), "a.png", "image/png"))
        .await;

    response.assert_status(StatusCode::CREATED);
    assert_eq!(app.metadata().len(), 1);

    let backups: Vec<_> = std::fs::read_dir(&app.upload_dir)
        .unwrap()
        .flatten()
        .filter(|e| {
            e.file_name()
                .to_string_lossy()
                .starts_with("metadata.json.corrupt-")
        })
        .collect();
    assert_eq!(backups.len(), 1);
}

// ============================================================================
// Rejected Uploads
// ============================================================================

#[tokio::test]
async fn test_upload_oversize_pdf_rejected() {
    let app = create_test_app();

    let response = app
        .server
        .post("/upload")
        .multipart(document_form(vec![0u8; 9 * MIB], "grande.pdf", "application/pdf"))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);

    let body: Value = response.json();
    assert_eq!(body["ok"], false);
    let error = body["error"].as_str().unwrap();
    assert!(error.contains("too large"));
    assert!(error.contains("8MB"));

    assert!(app.stored_files().is_empty());
    assert!(!app.metadata_path().exists());
}

#[tokio::test]
async fn test_upload_disallowed_type_rejected() {
    let app = create_test_app();

    for (name, mime) in [
        ("page.html", "text/html"),
        ("anim.gif", "image/gif"),
        ("script.sh", "application/x-sh"),
    ] {
        let response = app
            .server
            .post("/upload")
            .multipart(document_form(b"data".to_vec(), name, mime))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert_eq!(body["ok"], false);
        assert_eq!(body["error"], "Tipo de archivo no permitido");
    }

    assert!(app.stored_files().is_empty());
    assert!(!app.metadata_path().exists());
}

#[tokio::test]
async fn test_upload_without_file_rejected() {
    let app = create_test_app();

    let form = MultipartForm::new().add_text("name", "Ana");
    let response = app.server.post("/upload").multipart(form).await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["ok"], false);
    assert_eq!(body["error"], "No se envió archivo");
    assert!(!app.metadata_path().exists());
}

#[tokio::test]
async fn test_upload_file_under_other_field_rejected() {
    let app = create_test_app();

    let form = MultipartForm::new().add_part(
        "archivo",
        file_part(b"%PDF".to_vec(), "doc.pdf", "application/pdf"),
    );
    let response = app.server.post("/upload").multipart(form).await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"], "Unexpected field");
    assert!(app.stored_files().is_empty());
}

#[tokio::test]
async fn test_upload_two_files_rejected() {
    let app = create_test_app();

    let form = document_form(b"one".to_vec(), "one.pdf", "application/pdf").add_part(
        "documento",
        file_part(b"two".to_vec(), "two.pdf", "application/pdf"),
    );
    let response = app.server.post("/upload").multipart(form).await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"], "Unexpected field");
    assert!(app.stored_files().is_empty());
    assert!(!app.metadata_path().exists());
}

#[tokio::test]
async fn test_upload_without_multipart_body_rejected() {
    let app = create_test_app();

    let response = app.server.post("/upload").text("plain text").await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["ok"], false);
    assert!(app.stored_files().is_empty());
}

// ============================================================================
// Static Serving
// ============================================================================

#[tokio::test]
async fn test_get_stored_file() {
    let app = create_test_app();
    let content: Vec<u8> = (0..=255).cycle().take(4096).collect();

    let response = app
        .server
        .post("/upload")
        .multipart(document_form(content.clone(), "scan.jpeg", "image/jpeg"))
        .await;
    response.assert_status(StatusCode::CREATED);
    let body: Value = response.json();
    let url = body["metadata"]["url"].as_str().unwrap().to_string();

    let response = app.server.get(&url).await;

    response.assert_status_ok();
    assert_eq!(response.as_bytes().to_vec(), content);
    assert_eq!(response.header("X-Content-Type-Options"), "nosniff");
}

#[tokio::test]
async fn test_get_missing_stored_file() {
    let app = create_test_app();

    let response = app.server.get("/uploads/does-not-exist.pdf").await;

    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_get_form() {
    let app = create_test_app();

    let response = app.server.get("/").await;

    response.assert_status_ok();
    assert!(response.text().contains("action=\"/upload\""));
}

#[tokio::test]
async fn test_health() {
    let app = create_test_app();

    let response = app.server.get("/health").await;

    response.assert_status_ok();
    assert_eq!(response.text(), "OK");
}
