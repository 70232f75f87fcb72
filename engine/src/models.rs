use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Kinds of documents the AI engine knows how to summarize.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentType {
    ResearchPaper,
    Literature,
    Textbook,
}

impl DocumentType {
    /// Parses the wire value sent in the `type` form field.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "RESEARCH-PAPER" | "RESEARCH_PAPER" => Some(Self::ResearchPaper),
            "LITERATURE" => Some(Self::Literature),
            "TEXTBOOK" => Some(Self::Textbook),
            _ => None,
        }
    }
}

/// Metadata submitted alongside an uploaded document.
///
/// `document_type` stays raw so an unknown value can be reported as an
/// invalid type rather than a parse failure.
#[derive(Debug, Clone, Default)]
pub struct DocumentMetadata {
    pub title: String,
    pub author: String,
    pub document_type: String,
    pub subject: Option<String>,
    pub grade_level: Option<String>,
    pub genre: Option<String>,
    pub year: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CostEstimate {
    pub token_count: usize,
    pub estimated_cost: f64,
}

/// `question` is `None` only when the field is absent; an explicit `null`
/// arrives as `Some(Value::Null)`.
#[derive(Debug, Default, Deserialize)]
pub struct QueryRequest {
    #[serde(default, deserialize_with = "present")]
    pub question: Option<Value>,
}

fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteVectorsRequest {
    #[serde(default)]
    pub ids: Option<Vec<String>>,
    #[serde(default)]
    pub namespace: Option<String>,
    #[serde(default)]
    pub delete_all: Option<bool>,
}

/// A vector deletion scoped to an optional namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteRequest {
    All { namespace: Option<String> },
    Ids { ids: Vec<String>, namespace: Option<String> },
}

impl From<DeleteVectorsRequest> for DeleteRequest {
    fn from(request: DeleteVectorsRequest) -> Self {
        if request.delete_all == Some(true) {
            DeleteRequest::All {
                namespace: request.namespace,
            }
        } else {
            DeleteRequest::Ids {
                ids: request.ids.unwrap_or_default(),
                namespace: request.namespace,
            }
        }
    }
}

/// A document plus the derived question, ready to send to the AI engine.
#[derive(Debug, Clone)]
pub struct TrainPayload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
    pub question: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
