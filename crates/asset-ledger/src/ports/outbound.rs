//! # Outbound Ports (Driven Ports)
//!
//! Dependencies required by the ledger service.
//!
//! These are the interfaces the host application implements. The
//! `adapters` module ships in-memory and file-backed versions.

use crate::domain::config::prefix_end;
use crate::domain::entities::{Asset, HistoryEntry, Modification, Timestamp};
use crate::domain::errors::{IdentityError, KVStoreError, SerializationError};
use crate::domain::identity::IdentityContext;

/// Lazy, ordered cursor over `(key, value)` pairs.
///
/// The underlying cursor is released when the iterator is dropped.
pub type KvCursor<'a> = Box<dyn Iterator<Item = Result<(Vec<u8>, Vec<u8>), KVStoreError>> + 'a>;

/// Lazy cursor over the history of one key, oldest first.
pub type HistoryCursor<'a> = Box<dyn Iterator<Item = Result<HistoryEntry, KVStoreError>> + 'a>;

/// Abstract interface for an ordered key-value substrate.
///
/// The host provides transactional atomicity per invocation; the ledger
/// only relies on the guarantees listed on each method.
pub trait KeyValueStore: Send + Sync {
    /// Get a value by key. A missing key is `Ok(None)`, never an error.
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, KVStoreError>;

    /// Put a single key-value pair.
    fn put(&mut self, key: &[u8], value: &[u8]) -> Result<(), KVStoreError>;

    /// Delete a key. Deleting a missing key is a no-op.
    fn delete(&mut self, key: &[u8]) -> Result<(), KVStoreError>;

    /// Execute an atomic batch write.
    ///
    /// Either ALL operations in the batch succeed, or NONE are applied.
    fn atomic_batch_write(&mut self, operations: Vec<BatchOperation>) -> Result<(), KVStoreError>;

    /// Check if a key exists.
    fn exists(&self, key: &[u8]) -> Result<bool, KVStoreError> {
        Ok(self.get(key)?.is_some())
    }

    /// Iterate over `[start, end)` in byte order. An empty `end` is unbounded.
    ///
    /// The cursor sees the key set as of the call.
    fn range_scan(&self, start: &[u8], end: &[u8]) -> Result<KvCursor<'_>, KVStoreError>;

    /// Iterate over keys with a prefix.
    fn prefix_scan(&self, prefix: &[u8]) -> Result<KvCursor<'_>, KVStoreError> {
        self.range_scan(prefix, &prefix_end(prefix))
    }
}

/// Batch operation for atomic writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchOperation {
    /// Put a key-value pair.
    Put { key: Vec<u8>, value: Vec<u8> },
    /// Delete a key.
    Delete { key: Vec<u8> },
}

impl BatchOperation {
    /// Create a Put operation.
    pub fn put(key: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>) -> Self {
        BatchOperation::Put {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Create a Delete operation.
    pub fn delete(key: impl Into<Vec<u8>>) -> Self {
        BatchOperation::Delete { key: key.into() }
    }
}

/// Append-only, per-key log of every mutation.
pub trait HistoryLog: Send + Sync {
    /// Append a fully built modification to `key`'s log.
    ///
    /// Returns the sequence number assigned to the new entry.
    fn append(&mut self, key: &str, modification: Modification) -> Result<u64, KVStoreError>;

    /// Read `key`'s history, oldest first.
    fn read_history(&self, key: &str) -> Result<HistoryCursor<'_>, KVStoreError>;

    /// Whether `key` has ever been written.
    fn has_history(&self, key: &str) -> Result<bool, KVStoreError>;
}

/// Deterministic execution context of one invocation.
///
/// One invocation is one atomic unit of work; the host supplies a fresh
/// context per call.
pub trait TransactionContext {
    /// Identifier of the current transaction.
    fn tx_id(&self) -> &str;

    /// Commit timestamp of the current transaction.
    fn timestamp(&self) -> Timestamp;

    /// The caller's pre-authenticated identity.
    fn resolve_identity(&self) -> Result<IdentityContext, IdentityError>;
}

/// Abstract interface for time operations (for testability).
pub trait TimeSource: Send + Sync {
    /// Current wall-clock time.
    fn now(&self) -> Timestamp;
}

/// Abstract interface for record serialization.
pub trait AssetSerializer: Send + Sync {
    /// Serialize an Asset to bytes.
    fn serialize(&self, asset: &Asset) -> Result<Vec<u8>, SerializationError>;

    /// Deserialize bytes to an Asset.
    fn deserialize(&self, data: &[u8]) -> Result<Asset, SerializationError>;

    /// Decode the record carried by a history entry. Tombstones yield `None`.
    fn decode_entry(&self, entry: &HistoryEntry) -> Result<Option<Asset>, SerializationError> {
        entry
            .value
            .as_deref()
            .map(|data| self.deserialize(data))
            .transpose()
    }
}
