//! Server error types

use thiserror::Error;

use crate::metrics::{OUTCOME_CLIENT_ERROR, OUTCOME_SERVER_ERROR};

#[derive(Error, Debug)]
pub enum ServerError {
    #[error(transparent)]
    Core(#[from] shardpir_core::Error),

    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Shard out of range: {index} >= {max}")]
    ShardOutOfRange { index: u64, max: u64 },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ServerError {
    /// Whether the caller or the server is at fault
    ///
    /// Used as the metrics outcome label; never carries query content.
    pub fn outcome(&self) -> &'static str {
        use shardpir_core::Error as Core;

        match self {
            ServerError::InvalidQuery(_) | ServerError::ShardOutOfRange { .. } => OUTCOME_CLIENT_ERROR,
            ServerError::Core(Core::Decode(_))
            | ServerError::Core(Core::KeyOutOfDomain { .. })
            | ServerError::Core(Core::ValueTooLong { .. })
            | ServerError::Core(Core::VariantMismatch { .. }) => OUTCOME_CLIENT_ERROR,
            ServerError::Core(_) => OUTCOME_SERVER_ERROR,
            ServerError::Io(_) => OUTCOME_SERVER_ERROR,
            ServerError::Json(_) => OUTCOME_CLIENT_ERROR,
        }
    }
}

pub type Result<T> = std::result::Result<T, ServerError>;
