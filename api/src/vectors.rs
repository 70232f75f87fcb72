use crate::error::ApiError;
use crate::state::AppState;
use axum::{body::Bytes, extract::State, Json};
use prep_engine::{DeleteRequest, DeleteVectorsRequest, MessageResponse};

/// POST /api/v1/delete-vectors
pub async fn delete_vectors(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<MessageResponse>, ApiError> {
    let request: DeleteVectorsRequest = if body.is_empty() {
        DeleteVectorsRequest::default()
    } else {
        serde_json::from_slice(&body)
            .map_err(|e| ApiError::bad_request(format!("Invalid request body: {e}")))?
    };
    let request = DeleteRequest::from(request);

    let (context, _cancel) = state.call_context();
    state
        .pinecone()
        .delete_vectors(&context, &request)
        .await
        .map_err(|e| {
            log::error!("Vector deletion failed: {}", e);
            ApiError::from(e)
        })?;

    Ok(Json(MessageResponse {
        message: "Vectors deleted successfully".to_string(),
    }))
}
