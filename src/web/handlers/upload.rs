//! Upload handler for Web API.

use axum::{
    extract::{
        multipart::{Field, MultipartError, MultipartRejection},
        Multipart, State,
    },
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use crate::upload::{
    mime_essence, IncomingFile, Requester, UploadPolicy, EMAIL_FIELD, FILE_FIELD, NAME_FIELD,
};
use crate::web::dto::UploadResponse;
use crate::web::error::ApiError;
use crate::web::handlers::AppState;
use crate::{Result, UploadError};

/// MIME type assumed for a file part that declares none.
const DEFAULT_MIME_TYPE: &str = "application/octet-stream";

/// Parts of the upload form that matter to the handler.
#[derive(Debug, Default)]
struct UploadForm {
    file: Option<IncomingFile>,
    name: Option<String>,
    email: Option<String>,
}

/// POST /upload - Upload one document.
///
/// Request body: multipart/form-data with a `documento` file and optional
/// `name` and `email` fields.
pub async fn upload_file(
    State(state): State<Arc<AppState>>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> std::result::Result<(StatusCode, Json<UploadResponse>), ApiError> {
    let mut multipart = multipart.map_err(|e| ApiError::bad_request(e.body_text()))?;
    let form = read_upload_form(state.uploads.policy(), &mut multipart).await?;

    let file = form.file.ok_or(UploadError::MissingFile)?;
    let requester = Requester::from_form(form.name, form.email);

    let record = state.uploads.accept(file, requester).await?;

    Ok((StatusCode::CREATED, Json(UploadResponse::new(record))))
}

/// Walk the multipart body, rejecting as early as possible.
///
/// The MIME type is checked as soon as the file part's headers are read and
/// the size while its body streams in, so a rejected file is never fully
/// buffered.
async fn read_upload_form(policy: &UploadPolicy, multipart: &mut Multipart) -> Result<UploadForm> {
    let mut form = UploadForm::default();

    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(policy, e))?
    {
        let name = field.name().unwrap_or("").to_string();
        // Browsers send an empty filename for a file input left blank.
        let file_name = field
            .file_name()
            .filter(|f| !f.is_empty())
            .map(str::to_string);

        match (name.as_str(), file_name) {
            (FILE_FIELD, Some(original_name)) => {
                if form.file.is_some() {
                    return Err(UploadError::UnexpectedField(name.clone()));
                }
                let mime_type = mime_essence(field.content_type().unwrap_or(DEFAULT_MIME_TYPE));
                policy.check_mime(&mime_type)?;

                let content = read_limited(policy, &mut field).await?;
                form.file = Some(IncomingFile::new(original_name, mime_type, content));
            }
            (_, Some(_)) => return Err(UploadError::UnexpectedField(name.clone())),
            (NAME_FIELD, None) => form.name = Some(read_text(policy, field).await?),
            (EMAIL_FIELD, None) => form.email = Some(read_text(policy, field).await?),
            _ => {}
        }
    }

    Ok(form)
}

async fn read_limited(policy: &UploadPolicy, field: &mut Field<'_>) -> Result<Vec<u8>> {
    let mut content = Vec::new();

    while let Some(chunk) = field
        .chunk()
        .await
        .map_err(|e| multipart_error(policy, e))?
    {
        policy.check_size((content.len() + chunk.len()) as u64)?;
        content.extend_from_slice(&chunk);
    }

    Ok(content)
}

async fn read_text(policy: &UploadPolicy, field: Field<'_>) -> Result<String> {
    field.text().await.map_err(|e| multipart_error(policy, e))
}

fn multipart_error(policy: &UploadPolicy, err: MultipartError) -> UploadError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        UploadError::SizeLimit {
            max_mb: policy.max_bytes() / 1024 / 1024,
        }
    } else {
        UploadError::Multipart(err.body_text())
    }
}
