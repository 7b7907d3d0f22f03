use thiserror::Error;

/// Errors surfaced at the engine boundary.
///
/// Missing or partial stat data is not an error: it falls back to league or baseline defaults.
/// Only inputs the engine cannot work around end up here.
#[derive(Debug, Error)]
pub enum PropError {
    #[error("player not found: {0}")]
    PlayerNotFound(String),

    #[error("invalid stat selection '{0}' (use P, R, A or a combination such as PRA)")]
    InvalidStatSelection(String),

    #[error("invalid direction '{0}' (use O/over or U/under)")]
    InvalidDirection(String),

    #[error("invalid line range {min}..={max}")]
    InvalidLineRange { min: i32, max: i32 },

    #[error("blend weights must be non-negative and sum to 1.0 (sum was {0:.6})")]
    InvalidBlendWeights(f64),

    #[error("payload decode failed: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, PropError>;
