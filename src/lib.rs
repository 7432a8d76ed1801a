//! shardpir: Sharded single-server PIR
//!
//! Facade over the workspace crates:
//! - [`core`]: key space, configuration, crypto capability, envelopes
//! - [`server`]: shard store and oblivious evaluator
//! - [`client`]: query builder and result decoder

pub use shardpir_client as client;
pub use shardpir_core as core;
pub use shardpir_server as server;
