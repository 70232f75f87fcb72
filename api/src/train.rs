use crate::error::ApiError;
use crate::state::AppState;
use crate::upload_form::UploadForm;
use axum::{
    body::Bytes,
    extract::{Multipart, State},
    Json,
};
use prep_engine::{build_question, DocumentMetadata, Payload, TrainPayload};
use serde_json::Value;
use uuid::Uuid;

const FILE_FIELD: &str = "files";

/// POST /api/v1/private-ai/train - upload a document and get its summary.
pub async fn train_and_query(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<Value>, ApiError> {
    let request_id = Uuid::new_v4();
    let mut form = UploadForm::read(&mut multipart, FILE_FIELD).await?;

    let file = form
        .file
        .take()
        .ok_or_else(|| ApiError::bad_request("No files were uploaded."))?;

    let (Some(title), Some(author), Some(document_type)) = (
        form.owned_text("title"),
        form.owned_text("author"),
        form.owned_text("type"),
    ) else {
        log::warn!("[{}] Upload rejected: missing title, author or type", request_id);
        return Err(ApiError::bad_request("Missing required parameters."));
    };

    let metadata = DocumentMetadata {
        title,
        author,
        document_type,
        subject: form.owned_text("subject"),
        grade_level: form.owned_text("gradeLevel"),
        genre: form.owned_text("genre"),
        year: form.owned_text("year"),
    };
    let question = build_question(&metadata).map_err(|e| {
        log::warn!("[{}] Upload rejected: {}", request_id, e);
        ApiError::from(e)
    })?;

    record_upload_cost(&state, file.bytes.clone());

    let payload = TrainPayload {
        file_name: file.file_name,
        content_type: file.content_type,
        bytes: file.bytes.to_vec(),
        question,
    };

    let (context, _cancel) = state.call_context();
    let answer = state
        .engine()
        .train(&context, payload)
        .await
        .map_err(|e| {
            log::error!("[{}] AI engine upload failed: {}", request_id, e);
            ApiError::opaque(e)
        })?;

    log::info!("[{}] AI engine summarized upload", request_id);
    Ok(Json(answer))
}

// Runs off the request path; the handler never waits for the estimate.
fn record_upload_cost(state: &AppState, bytes: Bytes) {
    let estimator = state.cost_estimator().clone();
    drop(tokio::task::spawn_blocking(move || {
        estimator.estimate("upload", Payload::Binary(&bytes));
    }));
}

#[cfg(test)]
mod tests {
    use crate::test_support::{multipart_body, multipart_request, send, FilePart, TestApp};
    use axum::http::StatusCode;
    use httpmock::prelude::*;
    use serde_json::json;

    const URI: &str = "/api/v1/private-ai/train";

    fn pdf() -> FilePart<'static> {
        FilePart {
            field: "files",
            file_name: "cells.pdf",
            content_type: "application/pdf",
            bytes: b"%PDF-1.4 cell structures",
        }
    }

    #[tokio::test]
    async fn textbook_upload_is_forwarded_with_derived_question() {
        let server = MockServer::start_async().await;
        let engine = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/engine")
                    .header("authorization", "Bearer engine-secret")
                    .body_contains("%PDF-1.4 cell structures")
                    .body_contains("gpt-3.5-turbo")
                    .body_contains(
                        "Provide a summary of the textbook \"Cell Structures\" by J. Doe, which is related to Biology at the 10 grade level.",
                    );
                then.status(200)
                    .json_body(json!({ "summary": "Cells have membranes." }));
            })
            .await;
        let app = TestApp::new(&server);

        let body = multipart_body(
            &[
                ("title", "Cell Structures"),
                ("author", "J. Doe"),
                ("type", "TEXTBOOK"),
                ("subject", "Biology"),
                ("gradeLevel", "10"),
            ],
            Some(pdf()),
        );
        let (status, response) = send(app.router(), multipart_request(URI, body)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(response, json!({ "summary": "Cells have membranes." }));
        engine.assert_async().await;
        assert!(app.wait_for_cost("upload").await);
    }

    #[tokio::test]
    async fn missing_title_short_circuits_without_calling_engine() {
        let server = MockServer::start_async().await;
        let engine = server
            .mock_async(|when, then| {
                when.method(POST).path("/engine");
                then.status(200).json_body(json!({}));
            })
            .await;
        let app = TestApp::new(&server);

        let body = multipart_body(
            &[("author", "J. Doe"), ("type", "RESEARCH-PAPER"), ("year", "2020")],
            Some(pdf()),
        );
        let (status, response) = send(app.router(), multipart_request(URI, body)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(response, json!({ "error": "Missing required parameters." }));
        assert_eq!(engine.hits_async().await, 0);
    }

    #[tokio::test]
    async fn upload_without_file_is_rejected() {
        let server = MockServer::start_async().await;
        let app = TestApp::new(&server);

        let body = multipart_body(
            &[("title", "Cell Structures"), ("author", "J. Doe"), ("type", "TEXTBOOK")],
            None,
        );
        let (status, response) = send(app.router(), multipart_request(URI, body)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(response, json!({ "error": "No files were uploaded." }));
    }

    #[tokio::test]
    async fn research_paper_without_year_is_rejected() {
        let server = MockServer::start_async().await;
        let engine = server
            .mock_async(|when, then| {
                when.method(POST).path("/engine");
                then.status(200).json_body(json!({}));
            })
            .await;
        let app = TestApp::new(&server);

        let body = multipart_body(
            &[("title", "On Cells"), ("author", "J. Doe"), ("type", "RESEARCH_PAPER")],
            Some(pdf()),
        );
        let (status, response) = send(app.router(), multipart_request(URI, body)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(response, json!({ "error": "Missing year for research paper." }));
        assert_eq!(engine.hits_async().await, 0);
    }

    #[tokio::test]
    async fn unknown_document_type_is_rejected() {
        let server = MockServer::start_async().await;
        let app = TestApp::new(&server);

        let body = multipart_body(
            &[("title", "Weekly"), ("author", "Staff"), ("type", "MAGAZINE"), ("year", "2020")],
            Some(pdf()),
        );
        let (status, response) = send(app.router(), multipart_request(URI, body)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(response, json!({ "error": "Invalid document type." }));
    }

    #[tokio::test]
    async fn oversized_upload_is_payload_too_large() {
        let server = MockServer::start_async().await;
        let engine = server
            .mock_async(|when, then| {
                when.method(POST).path("/engine");
                then.status(200).json_body(json!({}));
            })
            .await;
        let app = TestApp::with_upload_limit(&server, 1024);

        let large = vec![b'x'; 8 * 1024];
        let body = multipart_body(
            &[("title", "Big"), ("author", "A. Writer"), ("type", "TEXTBOOK")],
            Some(FilePart {
                field: "files",
                file_name: "big.pdf",
                content_type: "application/pdf",
                bytes: &large,
            }),
        );
        let (status, response) = send(app.router(), multipart_request(URI, body)).await;

        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(response, json!({ "error": "Upload exceeds the size limit." }));
        assert_eq!(engine.hits_async().await, 0);
    }

    #[tokio::test]
    async fn engine_failure_is_reported_without_details() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/engine");
                then.status(500).body("Traceback: secret internals");
            })
            .await;
        let app = TestApp::new(&server);

        let body = multipart_body(
            &[
                ("title", "Dracula"),
                ("author", "Bram Stoker"),
                ("type", "LITERATURE"),
                ("genre", "Gothic"),
            ],
            Some(pdf()),
        );
        let (status, response) = send(app.router(), multipart_request(URI, body)).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(response, json!({ "error": "An error occurred." }));
    }
}
