//! shardpir-server: Sharded PIR responder
//!
//! Holds the sparse shard store and answers encrypted selectors for one
//! shard at a time. Transport is left to the embedding application: queries
//! arrive as bytes and responses leave as bytes.

pub mod error;
pub mod evaluator;
pub mod metrics;
pub mod state;
pub mod store;

pub use error::ServerError;
pub use evaluator::respond;
pub use state::{create_shared_state, ServerState, SharedState, StoreStats};
pub use store::{Shard, ShardStore};
