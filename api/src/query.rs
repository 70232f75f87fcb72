use crate::error::ApiError;
use crate::state::AppState;
use axum::{body::Bytes, extract::State, Json};
use prep_engine::{Payload, QueryRequest};
use serde_json::{json, Value};

/// POST /api/v1/private-ai/query - relay a question to the AI engine.
///
/// Only an absent `question` is rejected; an empty string or `null` is forwarded.
pub async fn query_private_ai(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    let request: QueryRequest = serde_json::from_slice(&body).unwrap_or_default();
    let Some(question) = request.question else {
        return Err(ApiError::UndefinedBody);
    };

    let outbound = json!({ "question": question });
    let estimator = state.cost_estimator();
    estimator.estimate("query", Payload::Json(&outbound));

    let (context, _cancel) = state.call_context();
    let answer = state
        .engine()
        .query(&context, &outbound)
        .await
        .map_err(|e| {
            log::error!("Query relay failed: {}", e);
            ApiError::from(e)
        })?;

    record_answer_cost(&state, answer.clone());
    Ok(Json(answer))
}

// Answers can be large; tokenize them off the async workers.
fn record_answer_cost(state: &AppState, answer: Value) {
    let estimator = state.cost_estimator().clone();
    drop(tokio::task::spawn_blocking(move || {
        estimator.estimate("query_result", Payload::Json(&answer));
    }));
}
