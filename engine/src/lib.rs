pub mod models;
pub mod error;
pub mod call_context;
pub mod cost_estimator;
pub mod question_builder;
pub mod engine_service;
pub mod pinecone_service;

pub use models::*;
pub use error::ServiceError;
pub use call_context::{CallContext, CancelHandle};
pub use cost_estimator::{CostEstimator, CostRecorder, LogCostRecorder, Payload};
pub use question_builder::{build_question, QuestionError, RequiredField};
pub use engine_service::{EngineService, EngineSettings};
pub use pinecone_service::{PineconeService, PineconeSettings};
