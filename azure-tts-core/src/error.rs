use std::path::PathBuf;

use thiserror::Error;

use crate::voice::tts::retry_after::RetryAfter;

#[derive(Error, Debug)]
pub enum TtsError {
    #[error("Text input is required. Pass text as argument or pipe it from stdin.")]
    EmptyText,

    #[error("Azure API key is required. Set it by running: `azure-tts --set-key --key <KEY>`")]
    MissingCredential,

    #[error("{field} is not configured. Pass --{flag}, set {env_var}, or add `{field}` to {path:?}")]
    MissingConfig {
        field: &'static str,
        flag: &'static str,
        env_var: &'static str,
        path: PathBuf,
    },

    #[error("Failed to load config from {path:?}: {message}")]
    Config { path: PathBuf, message: String },

    #[error("Credential store error: {0}")]
    CredentialStore(String),

    #[error("{}", rate_limit_message(.retry_after.as_ref()))]
    RateLimited { retry_after: Option<RetryAfter> },

    #[error("Azure API error {status}: {message}")]
    HttpStatus {
        status: reqwest::StatusCode,
        message: String,
    },

    #[error("Failed to reach Azure endpoint: {0}")]
    Transport(#[from] reqwest::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl TtsError {
    /// Errors the user fixes by changing how the command was invoked.
    pub fn is_usage(&self) -> bool {
        matches!(self, Self::EmptyText)
    }
}

pub(crate) fn rate_limit_message(retry_after: Option<&RetryAfter>) -> String {
    match retry_after {
        Some(wait) => format!(
            "Rate limit exceeded. Need to wait for {} seconds before retrying.",
            wait.seconds()
        ),
        None => "Rate limit exceeded. Need to wait before retrying.".to_string(),
    }
}

pub type Result<T> = std::result::Result<T, TtsError>;
