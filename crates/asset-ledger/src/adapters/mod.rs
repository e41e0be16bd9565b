//! # Adapters Module
//!
//! Implementations of the outbound ports.
//!
//! ## Modules
//!
//! - `storage`: in-memory and file-backed key-value stores
//! - `history`: history log over a key-value store
//! - `serializer`: JSON record encoding
//! - `context`: invocation context and clocks

pub mod context;
pub mod history;
pub mod serializer;
pub mod storage;

pub use context::{FixedTimeSource, Invocation, SystemTimeSource};
pub use history::KvHistoryLog;
pub use serializer::JsonAssetSerializer;
#[cfg(feature = "file-store")]
pub use storage::FileBackedKVStore;
pub use storage::InMemoryKVStore;
