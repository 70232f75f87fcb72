use crate::state::AppState;
use crate::{query, summarize, train, vectors};
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};

pub fn build_router(state: AppState) -> Router {
    let max_upload = state.config().max_upload_bytes;
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route(
            "/api/v1/summarize",
            post(summarize::summarize_document).layer(DefaultBodyLimit::max(max_upload)),
        )
        .route("/api/v1/delete-vectors", post(vectors::delete_vectors))
        .route(
            "/api/v1/private-ai/train",
            post(train::train_and_query).layer(DefaultBodyLimit::max(max_upload)),
        )
        .route("/api/v1/private-ai/query", post(query::query_private_ai))
        .with_state(state)
        .layer(cors)
}

async fn health() -> &'static str {
    "OK"
}
