//! Error types for shardpir-core

use thiserror::Error;

use crate::Variant;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid crypto parameters: {0}")]
    InvalidParams(String),

    #[error("Crypto params version mismatch: expected v{expected}, got v{actual}. Regenerate the config.")]
    ParamsVersionMismatch { expected: u16, actual: u16 },

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Config hash mismatch: file says {recorded}, contents hash to {computed}")]
    ConfigHashMismatch { recorded: String, computed: String },

    #[error("Key out of domain: {key} >= {max}")]
    KeyOutOfDomain { key: u64, max: u64 },

    #[error("Value too long for key {key}: {len} bytes > {max}")]
    ValueTooLong { key: u64, len: usize, max: usize },

    #[error("Shard too wide: needs {required} slots, capability offers {available}")]
    ShardTooWide { required: usize, available: usize },

    #[error("Variant mismatch: expected {expected}, got {actual}")]
    VariantMismatch { expected: Variant, actual: Variant },

    #[error("Crypto error: {0}")]
    Crypto(String),

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Encode error: {0}")]
    Encode(String),
}

impl From<fhe::Error> for Error {
    fn from(err: fhe::Error) -> Self {
        Error::Crypto(err.to_string())
    }
}
