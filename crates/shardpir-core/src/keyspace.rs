//! Key space mapping: which shard and slot a key lives in
//!
//! Client and server compute this independently; no shard metadata is ever
//! exchanged, so both sides must be built from the same `S`, `W` and domain.
//!
//! Layout of one serialized shard (`S` slots, block width `W`):
//!
//! ```text
//! | slot 0: W bytes | slot 1: W bytes | ... | slot S-1: W bytes | reserved |
//!   offset 0          offset W                offset (S-1)*W      offset S*W
//! ```
//!
//! The slot index is always `key mod S`. The reserved unit lives after the
//! last block and is never addressed by any key.

use crate::{Error, Key, Result, Variant};

/// Where a key lives inside the database
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyLocation {
    /// Shard index, `key / S` (public, sent in cleartext)
    pub shard: u64,
    /// Slot index within the shard, `key mod S`
    pub slot: usize,
    /// Byte offset of the key's block within the shard, `slot * W`
    pub offset: usize,
}

/// Maps keys onto shards and slots
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeySpace {
    shard_width: usize,
    block_width: usize,
    key_domain: u64,
    variant: Variant,
}

impl KeySpace {
    /// Key space for the presence variant (one byte per key)
    pub fn presence(shard_width: usize, key_domain: u64) -> Result<Self> {
        Self::new(Variant::Presence, shard_width, 1, key_domain)
    }

    /// Key space for the value variant (`value_width` bytes per key)
    pub fn with_values(shard_width: usize, value_width: usize, key_domain: u64) -> Result<Self> {
        Self::new(Variant::Value, shard_width, value_width, key_domain)
    }

    /// Create a key space, checking that the shape is usable
    pub fn new(variant: Variant, shard_width: usize, value_width: usize, key_domain: u64) -> Result<Self> {
        let block_width = variant.block_width(value_width);
        if shard_width == 0 {
            return Err(Error::InvalidConfig("shard width must be positive".into()));
        }
        if block_width == 0 {
            return Err(Error::InvalidConfig("value width must be positive in the value variant".into()));
        }
        if key_domain == 0 {
            return Err(Error::InvalidConfig("key domain must be non-empty".into()));
        }
        if shard_width.checked_mul(block_width).and_then(|w| w.checked_add(1)).is_none() {
            return Err(Error::InvalidConfig("shard width overflows".into()));
        }

        Ok(Self {
            shard_width,
            block_width,
            key_domain,
            variant,
        })
    }

    /// Shard index of a key: `floor(key / S)`
    pub fn shard_index_of(&self, key: Key) -> u64 {
        key / self.shard_width as u64
    }

    /// Slot index of a key within its shard: `key mod S`
    pub fn slot_index_of(&self, key: Key) -> usize {
        (key % self.shard_width as u64) as usize
    }

    /// Byte offset of a key's block within its shard: `(key mod S) * W`
    pub fn block_offset_of(&self, key: Key) -> usize {
        self.slot_index_of(key) * self.block_width
    }

    /// Locate a key, rejecting keys outside the configured domain
    pub fn locate(&self, key: Key) -> Result<KeyLocation> {
        if key >= self.key_domain {
            return Err(Error::KeyOutOfDomain {
                key,
                max: self.key_domain,
            });
        }

        Ok(KeyLocation {
            shard: self.shard_index_of(key),
            slot: self.slot_index_of(key),
            offset: self.block_offset_of(key),
        })
    }

    /// Width of the key-addressable region: `S * W`
    pub fn nominal_width(&self) -> usize {
        self.shard_width * self.block_width
    }

    /// Width of a serialized shard: `S * W + 1`
    pub fn serialized_width(&self) -> usize {
        self.nominal_width() + 1
    }

    /// Offset of the reserved anti-transparency unit
    pub fn sentinel_offset(&self) -> usize {
        self.nominal_width()
    }

    /// Number of shards needed to cover the whole domain
    pub fn shard_count(&self) -> u64 {
        self.key_domain.div_ceil(self.shard_width as u64)
    }

    /// Slots per shard (`S`)
    pub fn shard_width(&self) -> usize {
        self.shard_width
    }

    /// Bytes per key (`W`, or 1 in the presence variant)
    pub fn block_width(&self) -> usize {
        self.block_width
    }

    /// Exclusive upper bound of the key domain
    pub fn key_domain(&self) -> u64 {
        self.key_domain
    }

    pub fn variant(&self) -> Variant {
        self.variant
    }
}
