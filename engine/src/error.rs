use thiserror::Error;

/// Failures talking to the AI engine or the vector database.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0}")]
    Http(#[from] reqwest::Error),
    #[error("Request failed with status code {status}")]
    Remote { status: u16, body: String },
    #[error("Deadline exceeded.")]
    DeadlineExceeded,
    #[error("Request cancelled.")]
    Cancelled,
}
