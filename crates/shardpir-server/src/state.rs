//! Server state: configuration, crypto context and shard store

use std::sync::Arc;
use std::time::Instant;

use shardpir_core::{BfvCapability, CryptoCapability, Dataset, Error, Key, PirConfig, Query, Response, Variant};

use crate::error::Result;
use crate::evaluator;
use crate::metrics;
use crate::store::ShardStore;

/// Everything needed to answer queries for one deployment
pub struct ServerState<C: CryptoCapability = BfvCapability> {
    config: PirConfig,
    capability: C,
    store: ShardStore,
}

impl ServerState<BfvCapability> {
    /// Validate `config` and build the BFV context
    ///
    /// Any failure here must abort startup.
    pub fn from_config(config: PirConfig) -> Result<Self> {
        config.validate()?;
        let capability = BfvCapability::new(&config.crypto)?;
        Self::with_capability(config, capability)
    }
}

impl<C: CryptoCapability> ServerState<C> {
    /// Build state around an existing capability
    pub fn with_capability(config: PirConfig, capability: C) -> Result<Self> {
        let keyspace = config.keyspace()?;
        if keyspace.serialized_width() > capability.slot_count() {
            return Err(Error::ShardTooWide {
                required: keyspace.serialized_width(),
                available: capability.slot_count(),
            }
            .into());
        }

        tracing::info!(
            variant = %config.variant,
            shard_width = config.shard_width,
            value_width = config.value_width,
            shard_count = keyspace.shard_count(),
            slots = capability.slot_count(),
            "Server state initialized"
        );

        Ok(Self {
            config,
            capability,
            store: ShardStore::new(keyspace),
        })
    }

    /// Bulk-load a dataset into the store
    pub fn load_dataset(&mut self, dataset: &Dataset) -> Result<()> {
        self.store.load(dataset)?;
        metrics::record_inserts(dataset.len());
        metrics::set_shards_materialized(self.store.count());
        Ok(())
    }

    /// Mark `key` present
    pub fn insert(&mut self, key: Key) -> Result<()> {
        self.store.insert(key)?;
        self.after_insert();
        Ok(())
    }

    /// Store `value` under `key`
    pub fn insert_value(&mut self, key: Key, value: &str) -> Result<()> {
        self.store.insert_value(key, value)?;
        self.after_insert();
        Ok(())
    }

    /// Answer a decoded query
    pub fn process_query(&self, query: &Query) -> Result<Response> {
        let start = Instant::now();
        let result = self.evaluate(query);
        Self::record_outcome(&result, start);
        result
    }

    /// Answer a query received as raw bytes, returning raw response bytes
    pub fn process_query_bytes(&self, bytes: &[u8]) -> Result<Vec<u8>> {
        let start = Instant::now();
        let result = Query::from_bytes(bytes)
            .map_err(Into::into)
            .and_then(|query| self.evaluate(&query))
            .and_then(|response| Ok(response.to_bytes()?));
        Self::record_outcome(&result, start);
        result
    }

    pub fn stats(&self) -> StoreStats {
        let keyspace = self.store.keyspace();
        StoreStats {
            variant: keyspace.variant(),
            shard_width: keyspace.shard_width(),
            block_width: keyspace.block_width(),
            key_domain: keyspace.key_domain(),
            shard_count: keyspace.shard_count(),
            shards_materialized: self.store.count(),
            slot_count: self.capability.slot_count(),
            config_hash: self.config.compute_hash(),
        }
    }

    pub fn config(&self) -> &PirConfig {
        &self.config
    }

    pub fn capability(&self) -> &C {
        &self.capability
    }

    pub fn store(&self) -> &ShardStore {
        &self.store
    }

    fn evaluate(&self, query: &Query) -> Result<Response> {
        tracing::debug!(shard_index = query.shard_index, "Processing query");
        evaluator::respond(&self.capability, &self.store, query)
    }

    fn after_insert(&self) {
        metrics::record_inserts(1);
        metrics::set_shards_materialized(self.store.count());
    }

    fn record_outcome<T>(result: &Result<T>, start: Instant) {
        let outcome = match result {
            Ok(_) => metrics::OUTCOME_OK,
            Err(e) => {
                tracing::warn!(error = %e, "Query failed");
                e.outcome()
            }
        };
        metrics::record_query(outcome, start.elapsed());
    }
}

/// Store statistics for monitoring
#[derive(Debug, Clone, serde::Serialize)]
pub struct StoreStats {
    pub variant: Variant,
    pub shard_width: usize,
    pub block_width: usize,
    pub key_domain: u64,
    pub shard_count: u64,
    pub shards_materialized: usize,
    pub slot_count: usize,
    pub config_hash: String,
}

/// Shared server state type
///
/// Inserts take the write lock, queries the read lock, so a query never
/// observes a half-written block.
pub type SharedState<C = BfvCapability> = Arc<tokio::sync::RwLock<ServerState<C>>>;

/// Wrap state for sharing across tasks
pub fn create_shared_state<C: CryptoCapability>(state: ServerState<C>) -> SharedState<C> {
    Arc::new(tokio::sync::RwLock::new(state))
}

#[cfg(test)]
mod tests {
    use super::*;
    use shardpir_core::testing::ClearCapability;

    fn clear_state(config: PirConfig) -> ServerState<ClearCapability> {
        ServerState::with_capability(config, ClearCapability::new(512)).unwrap()
    }

    fn encrypted_selector(cap: &ClearCapability, ones: &[usize]) -> Vec<u8> {
        let mut slots = vec![0u64; cap.slot_count()];
        for i in ones {
            slots[*i] = 1;
        }
        cap.serialize(&cap.encrypt(&cap.encode_vector(&slots).unwrap(), &()).unwrap())
    }

    #[test]
    fn test_rejects_shard_wider_than_slots() {
        let config = PirConfig::with_values(20, 20);
        let result = ServerState::with_capability(config, ClearCapability::new(400));
        assert!(matches!(
            result,
            Err(crate::ServerError::Core(Error::ShardTooWide {
                required: 401,
                available: 400
            }))
        ));
    }

    #[test]
    fn test_insert_and_stats() {
        let mut state = clear_state(PirConfig::presence(20));
        state.insert(9846819001).unwrap();
        state.insert(8846819001).unwrap();

        let stats = state.stats();
        assert_eq!(stats.shards_materialized, 2);
        assert_eq!(stats.shard_count, 500_000_000);
        assert_eq!(stats.variant, Variant::Presence);
        assert_eq!(stats.config_hash, state.config().compute_hash());
    }

    #[test]
    fn test_process_query_bytes() {
        let mut state = clear_state(PirConfig::presence(20));
        state.insert(9846819001).unwrap();

        let payload = encrypted_selector(state.capability(), &[1]);
        let query_bytes = Query::new(492340950, payload).to_bytes().unwrap();
        let response_bytes = state.process_query_bytes(&query_bytes).unwrap();

        let response = Response::from_bytes(&response_bytes).unwrap();
        let cap = state.capability();
        let slots = cap.decode_vector(&cap.deserialize(&response.payload).unwrap()).unwrap();
        assert_eq!(slots[1], 1);
    }

    #[test]
    fn test_garbage_query_bytes() {
        let state = clear_state(PirConfig::presence(20));
        let err = state.process_query_bytes(&[0xff; 3]).unwrap_err();
        assert_eq!(err.outcome(), metrics::OUTCOME_CLIENT_ERROR);
    }

    #[test]
    fn test_load_dataset_variant_checked() {
        let mut state = clear_state(PirConfig::default_values());
        state
            .load_dataset(&Dataset::from_entries([(8065889001, "Ammu")]))
            .unwrap();
        assert_eq!(state.store().count(), 1);

        assert!(state.load_dataset(&Dataset::from_keys([1])).is_err());
    }
}
