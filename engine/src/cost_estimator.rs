//! Token-based cost estimation.
//!
//! Payloads are serialized to their JSON form before encoding, so a binary
//! upload is counted as `{"type":"Buffer","data":[...]}`. That overstates the
//! token count of non-text documents; the figure is a billing proxy, not an
//! exact charge.

use crate::models::CostEstimate;
use anyhow::{Context, Result};
use serde_json::Value;
use std::fmt::Write;
use std::sync::Arc;
use tiktoken_rs::{get_bpe_from_model, CoreBPE};

pub const EMBEDDING_MODEL: &str = "text-embedding-ada-002";
pub const RATE_PER_THOUSAND_TOKENS: f64 = 0.0004;

/// Content whose cost is estimated.
#[derive(Debug, Clone, Copy)]
pub enum Payload<'a> {
    Text(&'a str),
    Json(&'a Value),
    Binary(&'a [u8]),
}

impl Payload<'_> {
    /// JSON serialization of the payload, which is what gets tokenized.
    pub fn canonical_form(&self) -> String {
        match self {
            Payload::Text(text) => Value::from(*text).to_string(),
            Payload::Json(value) => value.to_string(),
            Payload::Binary(bytes) => buffer_json(bytes),
        }
    }
}

fn buffer_json(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 4 + 32);
    out.push_str(r#"{"type":"Buffer","data":["#);
    for (i, byte) in bytes.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        // Writing to a String cannot fail.
        let _ = write!(out, "{byte}");
    }
    out.push_str("]}");
    out
}

impl CostEstimate {
    pub fn from_tokens(token_count: usize) -> Self {
        Self {
            token_count,
            estimated_cost: token_count as f64 / 1000.0 * RATE_PER_THOUSAND_TOKENS,
        }
    }
}

/// Receives every estimate the service computes.
///
/// Estimates never reach the caller; recording them is the only effect. A
/// recorder must not fail or block the request it is reporting on.
pub trait CostRecorder: Send + Sync {
    fn record(&self, label: &str, estimate: &CostEstimate);
}

/// Default recorder: one log line per estimate.
pub struct LogCostRecorder;

impl CostRecorder for LogCostRecorder {
    fn record(&self, label: &str, estimate: &CostEstimate) {
        log::info!(
            "cost estimate [{}]: {} tokens, ${:.6}",
            label,
            estimate.token_count,
            estimate.estimated_cost
        );
    }
}

#[derive(Clone)]
pub struct CostEstimator {
    encoding: Arc<CoreBPE>,
    recorder: Arc<dyn CostRecorder>,
}

impl CostEstimator {
    pub fn new() -> Result<Self> {
        Self::with_recorder(Arc::new(LogCostRecorder))
    }

    pub fn with_recorder(recorder: Arc<dyn CostRecorder>) -> Result<Self> {
        log::info!("Loading {} encoding for cost estimation...", EMBEDDING_MODEL);

        let encoding = get_bpe_from_model(EMBEDDING_MODEL)
            .with_context(|| format!("failed to load the {EMBEDDING_MODEL} encoding"))?;

        Ok(Self {
            encoding: Arc::new(encoding),
            recorder,
        })
    }

    pub fn count_tokens(&self, payload: Payload<'_>) -> usize {
        self.encoding
            .encode_ordinary(&payload.canonical_form())
            .len()
    }

    pub fn estimate(&self, label: &str, payload: Payload<'_>) -> CostEstimate {
        let estimate = CostEstimate::from_tokens(self.count_tokens(payload));
        self.recorder.record(label, &estimate);
        estimate
    }
}
