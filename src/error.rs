use thiserror::Error;

use crate::schema::SchemaViolation;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Missing field `{field}` in model response. Response: {body}")]
    MissingField { field: String, body: String },

    #[error("Malformed evaluation JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid evaluation format: {0}")]
    Validation(#[from] SchemaViolation),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<reqwest::Error> for AppError {
    fn from(e: reqwest::Error) -> Self {
        AppError::Transport(e.to_string())
    }
}

pub type AppResult<T> = Result<T, AppError>;
