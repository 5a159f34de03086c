use thiserror::Error;

/// Unified error type for the PromptGuard library.
#[derive(Debug, Error)]
pub enum PromptGuardError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Environment variable not set: {0}")]
    ConfigEnvVar(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid pattern in detector '{detector}': {source}")]
    Pattern {
        detector: String,
        source: regex::Error,
    },

    #[error("Upstream error: {0}")]
    Upstream(String),
}

pub type Result<T> = std::result::Result<T, PromptGuardError>;
