//! Sparse shard store
//!
//! Shards are created lazily on first insert and never restructured: later
//! inserts only touch the block owned by their key. Absent shards are a
//! normal state and read as all-unset.

use std::borrow::Cow;
use std::collections::HashMap;

use shardpir_core::constants::{PRESENT, SENTINEL, UNSET};
use shardpir_core::{Dataset, Error, Key, KeySpace, Result, Variant};

/// One shard: `S` blocks of `W` bytes followed by the reserved unit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shard {
    cells: Vec<u8>,
}

impl Shard {
    fn zeroed(keyspace: &KeySpace) -> Self {
        Self {
            cells: vec![UNSET; keyspace.serialized_width()],
        }
    }

    /// Transient stand-in for an absent shard
    ///
    /// All blocks unset, reserved unit set to the sentinel so the plaintext
    /// is never the empty vector.
    fn synthesized(keyspace: &KeySpace) -> Self {
        let mut shard = Self::zeroed(keyspace);
        shard.cells[keyspace.sentinel_offset()] = SENTINEL;
        shard
    }

    /// Raw bytes, reserved unit included
    pub fn cells(&self) -> &[u8] {
        &self.cells
    }

    /// The reserved trailing unit
    pub fn reserved(&self) -> u8 {
        self.cells.last().copied().unwrap_or(UNSET)
    }

    /// Whether every key block is unset
    pub fn is_blank(&self) -> bool {
        self.cells
            .split_last()
            .map_or(true, |(_, blocks)| blocks.iter().all(|b| *b == UNSET))
    }

    /// Keep the reserved unit in step with the blocks
    ///
    /// A shard whose blocks are all unset (empty or all-NUL values) carries
    /// the sentinel exactly like a synthesized one.
    fn refresh_reserved(&mut self) {
        let reserved = if self.is_blank() { SENTINEL } else { UNSET };
        if let Some(last) = self.cells.last_mut() {
            *last = reserved;
        }
    }

    /// Shard bytes widened to slot values for encoding
    pub fn to_slots(&self) -> Vec<u64> {
        self.cells.iter().map(|b| *b as u64).collect()
    }
}

/// Sparse mapping from shard index to shard
#[derive(Debug, Clone)]
pub struct ShardStore {
    keyspace: KeySpace,
    shards: HashMap<u64, Shard>,
}

impl ShardStore {
    /// Create an empty store
    pub fn new(keyspace: KeySpace) -> Self {
        Self {
            keyspace,
            shards: HashMap::new(),
        }
    }

    /// Build a store from a bulk input set
    pub fn from_dataset(keyspace: KeySpace, dataset: &Dataset) -> Result<Self> {
        let mut store = Self::new(keyspace);
        store.load(dataset)?;
        Ok(store)
    }

    /// Insert every record of `dataset`
    pub fn load(&mut self, dataset: &Dataset) -> Result<()> {
        match dataset {
            Dataset::Presence { keys } => {
                for key in keys {
                    self.insert(*key)?;
                }
            }
            Dataset::Value { entries } => {
                for entry in entries {
                    self.insert_value(entry.key, &entry.value)?;
                }
            }
        }

        tracing::info!(
            records = dataset.len(),
            shards = self.count(),
            variant = %self.keyspace.variant(),
            "Shard store loaded"
        );
        Ok(())
    }

    /// Set the presence bit of `key`
    pub fn insert(&mut self, key: Key) -> Result<()> {
        self.expect_variant(Variant::Presence)?;
        let loc = self.keyspace.locate(key)?;

        let shard = self.shard_mut(loc.shard);
        shard.cells[loc.offset] = PRESENT;
        shard.refresh_reserved();
        Ok(())
    }

    /// Store `value` in the block of `key`
    ///
    /// The value's bytes fill the block from its start; the rest stays unset.
    /// Re-inserting a key replaces its whole block.
    pub fn insert_value(&mut self, key: Key, value: &str) -> Result<()> {
        self.expect_variant(Variant::Value)?;
        let loc = self.keyspace.locate(key)?;
        let width = self.keyspace.block_width();

        let bytes = value.as_bytes();
        if bytes.len() > width {
            return Err(Error::ValueTooLong {
                key,
                len: bytes.len(),
                max: width,
            });
        }
        if bytes.iter().any(|b| *b == UNSET || *b == SENTINEL) {
            // Decoder drops marker bytes, so these will not round-trip
            tracing::warn!(key, "value contains marker bytes 0x00/0x01");
        }

        let shard = self.shard_mut(loc.shard);
        let block = &mut shard.cells[loc.offset..loc.offset + width];
        block.fill(UNSET);
        block[..bytes.len()].copy_from_slice(bytes);
        shard.refresh_reserved();
        Ok(())
    }

    /// Shard content as fed to the evaluator
    ///
    /// Never fails: an absent shard is synthesized with the sentinel set.
    /// Stored shards are never all-zero either, since every write refreshes
    /// their reserved unit.
    pub fn materialize(&self, shard_index: u64) -> Cow<'_, Shard> {
        match self.shards.get(&shard_index) {
            Some(shard) => Cow::Borrowed(shard),
            None => Cow::Owned(Shard::synthesized(&self.keyspace)),
        }
    }

    /// Number of materialized shards
    pub fn count(&self) -> usize {
        self.shards.len()
    }

    pub fn contains_shard(&self, shard_index: u64) -> bool {
        self.shards.contains_key(&shard_index)
    }

    pub fn keyspace(&self) -> &KeySpace {
        &self.keyspace
    }

    fn shard_mut(&mut self, shard_index: u64) -> &mut Shard {
        let keyspace = &self.keyspace;
        self.shards
            .entry(shard_index)
            .or_insert_with(|| Shard::zeroed(keyspace))
    }

    fn expect_variant(&self, requested: Variant) -> Result<()> {
        let configured = self.keyspace.variant();
        if configured != requested {
            return Err(Error::VariantMismatch {
                expected: configured,
                actual: requested,
            });
        }
        Ok(())
    }
}
