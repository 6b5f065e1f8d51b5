use std::collections::HashMap;
use std::env;
use std::time::Duration;

use crate::error::{AppError, AppResult};

pub const DEFAULT_API_URL: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "gpt-4o";
pub const DEFAULT_PORT: u16 = 5680;

/// Runtime settings, read once at startup.
#[derive(Clone)]
pub struct Config {
    pub api_key: String,
    pub api_url: String,
    pub model: String,
    pub port: u16,
    pub request_timeout: Option<Duration>,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &"<redacted>")
            .field("api_url", &self.api_url)
            .field("model", &self.model)
            .field("port", &self.port)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

impl Config {
    /// Loads `.env` from the working directory (if any), then reads the
    /// process environment.
    pub fn from_env() -> AppResult<Self> {
        dotenv::dotenv().ok();
        Self::from_vars(&env::vars().collect())
    }

    pub fn from_vars(vars: &HashMap<String, String>) -> AppResult<Self> {
        let get = |key: &str| {
            vars.get(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let api_key = get("OPENAI_API_KEY")
            .ok_or_else(|| AppError::Config("OPENAI_API_KEY is not set".to_string()))?;

        let port = match get("STORY_CANVAS_PORT") {
            Some(v) => v
                .parse::<u16>()
                .map_err(|_| AppError::Config(format!("STORY_CANVAS_PORT is not a port: {}", v)))?,
            None => DEFAULT_PORT,
        };

        let request_timeout = match get("STORY_CANVAS_TIMEOUT_SECS") {
            Some(v) => Some(Duration::from_secs(v.parse::<u64>().map_err(|_| {
                AppError::Config(format!("STORY_CANVAS_TIMEOUT_SECS is not a number: {}", v))
            })?)),
            None => None,
        };

        Ok(Self {
            api_key,
            api_url: get("OPENAI_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            model: get("STORY_CANVAS_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            port,
            request_timeout,
        })
    }
}
