use thiserror::Error;

#[derive(Error, Debug)]
pub enum DeskError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Drafting prompt too short: need at least {min} characters, got {got}")]
    PromptTooShort { min: usize, got: usize },

    #[error("Drafting service rate limited, retry later")]
    RateLimited,

    #[error("Drafting service quota exhausted")]
    QuotaExhausted,

    #[error("Malformed drafting response: {0}")]
    MalformedResponse(String),

    #[error("Invalid distribution date range: {starts_on} > {ends_on}")]
    InvalidDateRange { starts_on: String, ends_on: String },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type DeskResult<T> = Result<T, DeskError>;
