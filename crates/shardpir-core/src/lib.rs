//! shardpir-core: Core types for sharded single-key PIR
//!
//! This crate defines what client and server must agree on:
//! - Key space mapping: key -> (shard, slot, block offset)
//! - Variant: presence bit per key, or a bounded value per key
//! - Configuration and versioned crypto parameters
//! - Protocol envelopes exchanged over an unspecified channel
//! - The crypto capability consumed by both sides (BFV backend via `fhe`)
//!
//! # Privacy & Threat Model
//!
//! ## Adversary Model
//!
//! - **Server model**: Single-server, honest-but-curious
//! - **Security goal**: Slot confidentiality within a shard (RLWE)
//! - **Non-goals**: Network anonymity, integrity, availability
//!
//! ## What the Server Learns
//!
//! | Information | Server Knowledge |
//! |-------------|------------------|
//! | Shard index | **YES** - sent in cleartext |
//! | Target slot within the shard | NO - encrypted selector |
//! | Whether the key exists | NO - response stays encrypted |
//! | Retrieved value | NO - response stays encrypted |
//! | Query timing, client identity | YES - via transport metadata |
//!
//! The shard index narrows a key down to one of `S` candidates. That is the
//! whole leakage of the protocol.
//!
//! ## Transparent Ciphertexts
//!
//! Every shard fed into the homomorphic multiply carries one reserved unit
//! after its key blocks. Shards with no real entries get the sentinel value
//! there, so the server never multiplies by the literal empty vector.

mod config;
pub mod crypto;
mod dataset;
mod error;
mod keyspace;
mod params;
mod protocol;
mod variant;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

pub use config::{PirConfig, PROTOCOL_VERSION};
pub use crypto::{BfvCapability, CryptoCapability};
pub use dataset::{Dataset, ValueEntry};
pub use error::Error;
pub use keyspace::{KeyLocation, KeySpace};
pub use params::{CryptoParams, CRYPTO_PARAMS_VERSION};
pub use protocol::{Query, Response, MAX_MESSAGE_BYTES};
pub use variant::Variant;

pub type Result<T> = std::result::Result<T, Error>;

/// Key identifier drawn from `[0, key_domain)`
pub type Key = u64;

/// Constants shared by client and server
pub mod constants {
    /// Byte value meaning "nothing stored here"
    pub const UNSET: u8 = 0;

    /// Byte value written at a key's slot in the presence variant
    pub const PRESENT: u8 = 1;

    /// Value of the reserved unit in a shard with no real entries
    pub const SENTINEL: u8 = 1;

    /// Default shard width (slots per shard)
    pub const DEFAULT_SHARD_WIDTH: usize = 20;

    /// Default value width in the value variant (bytes per key)
    pub const DEFAULT_VALUE_WIDTH: usize = 20;

    /// Default key domain: ten-digit numeric identifiers
    pub const DEFAULT_KEY_DOMAIN: u64 = 10_000_000_000;
}
