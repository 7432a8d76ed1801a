//! Protocol envelopes exchanged between client and server
//!
//! Both travel as opaque byte buffers over a channel this crate does not
//! define. The shard index is cleartext on purpose; the payloads are
//! serialized ciphertexts.

use bincode::Options;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Upper bound on an encoded envelope, checked before allocating
pub const MAX_MESSAGE_BYTES: u64 = 16 * 1024 * 1024;

fn wire_options() -> impl Options {
    bincode::DefaultOptions::new().with_limit(MAX_MESSAGE_BYTES)
}

/// Client -> server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Query {
    /// Shard holding the target key (public)
    pub shard_index: u64,
    /// Serialized encrypted selector
    pub payload: Vec<u8>,
}

/// Server -> client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    /// Serialized encrypted product of selector and shard
    pub payload: Vec<u8>,
}

impl Query {
    pub fn new(shard_index: u64, payload: Vec<u8>) -> Self {
        Self {
            shard_index,
            payload,
        }
    }

    /// Encode for the wire
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        wire_options()
            .serialize(self)
            .map_err(|e| Error::Encode(format!("query: {}", e)))
    }

    /// Decode from the wire
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        wire_options()
            .deserialize(bytes)
            .map_err(|e| Error::Decode(format!("query: {}", e)))
    }
}

impl Response {
    pub fn new(payload: Vec<u8>) -> Self {
        Self { payload }
    }

    /// Encode for the wire
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        wire_options()
            .serialize(self)
            .map_err(|e| Error::Encode(format!("response: {}", e)))
    }

    /// Decode from the wire
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        wire_options()
            .deserialize(bytes)
            .map_err(|e| Error::Decode(format!("response: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_envelope() {
        let query = Query::new(492340950, vec![0xab; 64]);
        let bytes = query.to_bytes().unwrap();
        assert_eq!(Query::from_bytes(&bytes).unwrap(), query);
    }

    #[test]
    fn test_truncated_envelope_rejected() {
        let bytes = Query::new(7, vec![1, 2, 3, 4]).to_bytes().unwrap();
        let result = Query::from_bytes(&bytes[..bytes.len() - 2]);
        assert!(matches!(result, Err(Error::Decode(_))));

        assert!(matches!(Response::from_bytes(&[]), Err(Error::Decode(_))));
    }

    #[test]
    fn test_oversized_length_prefix_rejected() {
        // varint marker 0xfd announces a u64 length; claim 2^40 payload bytes
        let mut bytes = vec![0xfd];
        bytes.extend_from_slice(&(1u64 << 40).to_le_bytes());
        assert!(matches!(Response::from_bytes(&bytes), Err(Error::Decode(_))));
    }
}
