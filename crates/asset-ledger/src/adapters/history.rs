//! # Key-Value History Log
//!
//! `HistoryLog` over any `KeyValueStore`.
//!
//! ## Key Layout
//!
//! | Key | Value |
//! |-----|-------|
//! | `e:{key}\0{seq:u64 BE}` | bincode(HistoryEntry) |
//! | `s:{key}` | last sequence (u64 BE) |
//!
//! Big-endian sequences make byte order equal commit order, so a prefix scan
//! reads a key's history oldest first. Asset keys never contain U+0000, which
//! keeps `e:{key}\0` from matching a longer key.

use crate::domain::entities::{HistoryEntry, Modification};
use crate::domain::errors::KVStoreError;
use crate::ports::outbound::{BatchOperation, HistoryCursor, HistoryLog, KeyValueStore};

const ENTRY_PREFIX: &[u8] = b"e:";
const SEQUENCE_PREFIX: &[u8] = b"s:";

fn entry_prefix(key: &str) -> Vec<u8> {
    let mut prefix = Vec::with_capacity(ENTRY_PREFIX.len() + key.len() + 1);
    prefix.extend_from_slice(ENTRY_PREFIX);
    prefix.extend_from_slice(key.as_bytes());
    prefix.push(0);
    prefix
}

fn entry_key(key: &str, sequence: u64) -> Vec<u8> {
    let mut entry = entry_prefix(key);
    entry.extend_from_slice(&sequence.to_be_bytes());
    entry
}

fn sequence_key(key: &str) -> Vec<u8> {
    let mut seq = SEQUENCE_PREFIX.to_vec();
    seq.extend_from_slice(key.as_bytes());
    seq
}

fn corruption(message: impl Into<String>) -> KVStoreError {
    KVStoreError::CorruptionError {
        message: message.into(),
    }
}

/// History log persisted in a key-value store.
#[derive(Default)]
pub struct KvHistoryLog<KV> {
    store: KV,
}

impl<KV: KeyValueStore> KvHistoryLog<KV> {
    pub fn new(store: KV) -> Self {
        Self { store }
    }

    /// The backing store.
    pub fn store(&self) -> &KV {
        &self.store
    }

    /// Sequence of the newest entry for `key`, or 0 if there is none.
    pub fn last_sequence(&self, key: &str) -> Result<u64, KVStoreError> {
        match self.store.get(&sequence_key(key))? {
            None => Ok(0),
            Some(bytes) => {
                let raw: [u8; 8] = bytes.as_slice().try_into().map_err(|_| {
                    corruption(format!("sequence head for '{}' is {} bytes", key, bytes.len()))
                })?;
                Ok(u64::from_be_bytes(raw))
            }
        }
    }
}

impl<KV: KeyValueStore> HistoryLog for KvHistoryLog<KV> {
    fn append(&mut self, key: &str, modification: Modification) -> Result<u64, KVStoreError> {
        let sequence = self.last_sequence(key)? + 1;
        let entry = HistoryEntry::from_modification(key, sequence, modification);
        let encoded = bincode::serialize(&entry).map_err(|e| KVStoreError::IOError {
            message: format!("encode history entry: {}", e),
        })?;

        self.store.atomic_batch_write(vec![
            BatchOperation::put(entry_key(key, sequence), encoded),
            BatchOperation::put(sequence_key(key), sequence.to_be_bytes().to_vec()),
        ])?;
        Ok(sequence)
    }

    fn read_history(&self, key: &str) -> Result<HistoryCursor<'_>, KVStoreError> {
        let cursor = self.store.prefix_scan(&entry_prefix(key))?;
        Ok(Box::new(cursor.map(|item| {
            let (raw_key, value) = item?;
            bincode::deserialize::<HistoryEntry>(&value).map_err(|e| {
                corruption(format!(
                    "history entry {}: {}",
                    String::from_utf8_lossy(&raw_key),
                    e
                ))
            })
        })))
    }

    fn has_history(&self, key: &str) -> Result<bool, KVStoreError> {
        self.store.exists(&sequence_key(key))
    }
}
