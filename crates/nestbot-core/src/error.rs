//! Error type shared across NestBot crates.

use thiserror::Error;

/// Result alias used throughout NestBot.
pub type Result<T> = std::result::Result<T, NestBotError>;

#[derive(Debug, Error)]
pub enum NestBotError {
    #[error("Config error: {0}")]
    Config(String),

    #[error("Knowledge base error: {0}")]
    Knowledge(String),

    #[error("Provider error: {0}")]
    Provider(String),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Channel error: {0}")]
    Channel(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}
