use crate::error::ApiError;
use crate::staging::stage_upload;
use crate::state::AppState;
use crate::upload_form::UploadForm;
use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    Json,
};
use prep_engine::TrainPayload;
use serde_json::{json, Value};

pub const SUPPORTED_FORMATS: [&str; 2] = [
    "application/pdf",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
];

pub fn summary_question(file_name: &str) -> String {
    format!("Give me a summary of the document \"{file_name}\".")
}

/// POST /api/v1/summarize - stage a PDF/DOCX and ask the AI engine for a summary.
pub async fn summarize_document(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let mut form = UploadForm::read(&mut multipart, "file").await?;
    let file = form
        .file
        .take()
        .ok_or_else(|| ApiError::bad_request("No file was uploaded."))?;

    if !SUPPORTED_FORMATS.contains(&file.content_type.as_str()) {
        log::warn!("Rejected {} ({})", file.file_name, file.content_type);
        return Err(ApiError::bad_request("Unsupported file format"));
    }

    // Removed from disk when `staged` goes out of scope.
    let staged = stage_upload(&state.config().upload_dir, &file.file_name, &file.bytes)?;

    let (context, _cancel) = state.call_context();
    state.pinecone().ensure_index(&context).await.map_err(|e| {
        log::error!("Pinecone index check failed: {}", e);
        ApiError::from(e)
    })?;

    let bytes = tokio::fs::read(staged.path())
        .await
        .map_err(|e| ApiError::Internal(format!("Failed to read staged upload: {e}")))?;

    let payload = TrainPayload {
        file_name: staged.file_name().to_string(),
        content_type: file.content_type,
        bytes,
        question: summary_question(staged.file_name()),
    };
    let answer = state
        .engine()
        .train(&context, payload)
        .await
        .map_err(|e| {
            log::error!("Summarization of {} failed: {}", staged.file_name(), e);
            ApiError::from(e)
        })?;

    Ok((StatusCode::CREATED, Json(json!({ "message": answer }))))
}
