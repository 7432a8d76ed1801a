//! Query construction

use shardpir_core::{CryptoCapability, Error, Key, KeySpace, Query};

use crate::error::Result;

/// One-hot selector for `key`, `slot_count` slots long
///
/// Ones cover the key's whole block: a single slot in the presence variant,
/// `W` consecutive slots in the value variant. Everything else is zero,
/// including the reserved unit.
pub fn selector_vector(keyspace: &KeySpace, slot_count: usize, key: Key) -> Result<Vec<u64>> {
    let loc = keyspace.locate(key)?;
    if keyspace.serialized_width() > slot_count {
        return Err(Error::ShardTooWide {
            required: keyspace.serialized_width(),
            available: slot_count,
        }
        .into());
    }

    let mut selector = vec![0u64; slot_count];
    selector[loc.offset..loc.offset + keyspace.block_width()].fill(1);
    Ok(selector)
}

/// Encrypt the selector for `key` and wrap it with its shard index
pub fn build_query<C: CryptoCapability>(
    capability: &C,
    public_key: &C::PublicKey,
    keyspace: &KeySpace,
    key: Key,
) -> Result<Query> {
    let selector = selector_vector(keyspace, capability.slot_count(), key)?;
    let plaintext = capability.encode_vector(&selector)?;
    let ciphertext = capability.encrypt(&plaintext, public_key)?;

    let shard_index = keyspace.shard_index_of(key);
    tracing::debug!(shard_index, "Query built");

    Ok(Query::new(shard_index, capability.serialize(&ciphertext)))
}
