//! Error types for the relay.

use card_predictor::PredictorError;

/// All errors that can occur in the relay.
#[derive(thiserror::Error, Debug)]
pub enum BotError {
    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Predictor error: {0}")]
    Predictor(#[from] PredictorError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type BotResult<T> = Result<T, BotError>;
