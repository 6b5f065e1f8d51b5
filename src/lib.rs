pub mod analyzer;
pub mod api_server;
pub mod config;
pub mod error;
pub mod evaluator;
pub mod image_encoder;
pub mod llm_gateway;
pub mod pipeline;
pub mod prompts;
pub mod schema;
pub mod stories;

pub use error::{AppError, AppResult};
pub use pipeline::evaluate;
pub use schema::EvaluationReport;
