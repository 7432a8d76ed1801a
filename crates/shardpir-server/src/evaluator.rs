//! Query evaluation
//!
//! One ciphertext x plaintext product per query. The server learns the shard
//! index and nothing else; the selector stays encrypted throughout.

use shardpir_core::{CryptoCapability, Query, Response};

use crate::error::{Result, ServerError};
use crate::store::ShardStore;

/// Answer `query` against `store`
///
/// Blank shards, stored or absent, carry the sentinel, so the product is
/// never taken against an all-zero plaintext and the reply is never a
/// transparent ciphertext.
pub fn respond<C: CryptoCapability>(capability: &C, store: &ShardStore, query: &Query) -> Result<Response> {
    let shard_count = store.keyspace().shard_count();
    if query.shard_index >= shard_count {
        return Err(ServerError::ShardOutOfRange {
            index: query.shard_index,
            max: shard_count,
        });
    }

    if query.payload.is_empty() {
        return Err(ServerError::InvalidQuery("empty selector payload".into()));
    }
    let selector = capability.deserialize(&query.payload)?;

    let shard = store.materialize(query.shard_index);
    let plaintext = capability.encode_vector(&shard.to_slots())?;

    let product = capability.multiply_plain(&selector, &plaintext)?;
    Ok(Response::new(capability.serialize(&product)))
}
