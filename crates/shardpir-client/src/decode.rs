//! Response decoding
//!
//! The decrypted product is zero everywhere except the selected block. The
//! reserved unit is dropped before interpretation, and in the value variant
//! so are the marker bytes 0 (unset) and 1 (sentinel).

use shardpir_core::constants::{PRESENT, SENTINEL, UNSET};
use shardpir_core::{CryptoCapability, KeySpace, Response, Variant};

use crate::error::{ClientError, Result};

/// Outcome of a single-key lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupResult {
    /// Whether the key was inserted
    Presence(bool),
    /// Stored value, empty when the key was never inserted
    Value(String),
}

impl LookupResult {
    pub fn is_present(&self) -> bool {
        match self {
            LookupResult::Presence(present) => *present,
            LookupResult::Value(value) => !value.is_empty(),
        }
    }

    /// The value, if this is a value-variant result for a present key
    pub fn value(&self) -> Option<&str> {
        match self {
            LookupResult::Value(value) if !value.is_empty() => Some(value),
            _ => None,
        }
    }
}

/// Interpret decoded slots under `keyspace`
pub fn interpret_slots(keyspace: &KeySpace, slots: &[u64]) -> Result<LookupResult> {
    let nominal = keyspace.nominal_width();
    if slots.len() < nominal {
        return Err(ClientError::InvalidResponse(format!(
            "{} slots decoded, shard needs {}",
            slots.len(),
            nominal
        )));
    }
    let slots = &slots[..nominal];

    match keyspace.variant() {
        Variant::Presence => Ok(LookupResult::Presence(
            slots.iter().any(|v| *v == PRESENT as u64),
        )),
        Variant::Value => {
            let mut bytes = Vec::new();
            for v in slots {
                let byte = u8::try_from(*v).map_err(|_| {
                    ClientError::InvalidResponse(format!("slot value {} is not a byte", v))
                })?;
                if byte != UNSET && byte != SENTINEL {
                    bytes.push(byte);
                }
            }
            Ok(LookupResult::Value(String::from_utf8_lossy(&bytes).into_owned()))
        }
    }
}

/// Decrypt `response` and interpret it
pub fn decode_response<C: CryptoCapability>(
    capability: &C,
    secret_key: &C::SecretKey,
    keyspace: &KeySpace,
    response: &Response,
) -> Result<LookupResult> {
    let ciphertext = capability.deserialize(&response.payload)?;
    let plaintext = capability.decrypt(&ciphertext, secret_key)?;
    let slots = capability.decode_vector(&plaintext)?;
    interpret_slots(keyspace, &slots)
}
