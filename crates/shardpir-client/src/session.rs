//! Client session: one key pair reused for every query

use std::fmt;

use shardpir_core::{BfvCapability, CryptoCapability, Error, Key, KeySpace, PirConfig, Query, Response};

use crate::decode::{self, LookupResult};
use crate::error::Result;
use crate::query;

/// Key material and shared context for a sequence of lookups
///
/// The key pair is generated once at construction. The secret key never
/// leaves the session.
pub struct ClientSession<C: CryptoCapability = BfvCapability> {
    capability: C,
    keyspace: KeySpace,
    public_key: C::PublicKey,
    secret_key: C::SecretKey,
}

impl ClientSession<BfvCapability> {
    /// Validate `config`, build the BFV context and generate keys
    pub fn from_config(config: &PirConfig) -> Result<Self> {
        config.validate()?;
        let capability = BfvCapability::new(&config.crypto)?;
        Self::new(capability, config.keyspace()?)
    }
}

impl<C: CryptoCapability> ClientSession<C> {
    pub fn new(capability: C, keyspace: KeySpace) -> Result<Self> {
        if keyspace.serialized_width() > capability.slot_count() {
            return Err(Error::ShardTooWide {
                required: keyspace.serialized_width(),
                available: capability.slot_count(),
            }
            .into());
        }

        let (public_key, secret_key) = capability.generate_key_pair()?;
        tracing::info!(variant = %keyspace.variant(), "Client session ready");

        Ok(Self {
            capability,
            keyspace,
            public_key,
            secret_key,
        })
    }

    /// Encrypted query for `key`
    pub fn build_query(&self, key: Key) -> Result<Query> {
        query::build_query(&self.capability, &self.public_key, &self.keyspace, key)
    }

    /// Encrypted query for `key`, encoded for the wire
    pub fn build_query_bytes(&self, key: Key) -> Result<Vec<u8>> {
        Ok(self.build_query(key)?.to_bytes()?)
    }

    /// Decrypt and interpret a response to one of this session's queries
    pub fn decode_response(&self, response: &Response) -> Result<LookupResult> {
        decode::decode_response(&self.capability, &self.secret_key, &self.keyspace, response)
    }

    /// Same as [`decode_response`](Self::decode_response), from wire bytes
    pub fn decode_response_bytes(&self, bytes: &[u8]) -> Result<LookupResult> {
        self.decode_response(&Response::from_bytes(bytes)?)
    }

    pub fn keyspace(&self) -> &KeySpace {
        &self.keyspace
    }

    pub fn capability(&self) -> &C {
        &self.capability
    }
}

impl<C: CryptoCapability> fmt::Debug for ClientSession<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientSession")
            .field("keyspace", &self.keyspace)
            .field("slot_count", &self.capability.slot_count())
            .finish_non_exhaustive()
    }
}
