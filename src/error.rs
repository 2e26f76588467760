use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Facebook Graph API error: {0}")]
    Facebook(String),

    #[error("BigQuery error: {0}")]
    BigQuery(String),

    #[error("Google authentication error: {0}")]
    Auth(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Transform error: {0}")]
    Transform(String),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, AppError>;
