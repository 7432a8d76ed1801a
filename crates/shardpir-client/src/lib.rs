//! shardpir-client: Sharded PIR client
//!
//! Builds encrypted one-hot selectors and decodes the server's encrypted
//! products. Key material never leaves the [`ClientSession`].

pub mod decode;
pub mod error;
pub mod query;
pub mod session;

pub use decode::{decode_response, interpret_slots, LookupResult};
pub use error::ClientError;
pub use query::{build_query, selector_vector};
pub use session::ClientSession;
