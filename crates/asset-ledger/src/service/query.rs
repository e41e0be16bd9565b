//! # Query Layer
//!
//! Lazy, typed sequences over range scans.
//!
//! Each query call opens one store cursor and wraps it. Iteration is
//! forward-only and not resumable; calling the query again starts over.
//! The cursor is released as soon as the sequence ends, fails, or is dropped.
//!
//! ## Corrupt Records
//!
//! | Mode | Behavior |
//! |------|----------|
//! | `Lenient` | Skip the record, remember it in `malformed()` |
//! | `Strict` | Yield `LedgerError::Serialization` and stop |
//!
//! Store failures always yield `LedgerError::Store` and stop.

use super::AssetLedgerService;
use crate::domain::composite_key::{owner_index_prefix, split_composite_key, OWNER_INDEX};
use crate::domain::config::{KeyPrefix, QueryMode};
use crate::domain::entities::{Asset, HistoryEntry};
use crate::domain::errors::{KVStoreError, LedgerError};
use crate::domain::identity::Operation;
use crate::ports::outbound::{
    AssetSerializer, HistoryCursor, HistoryLog, KeyValueStore, KvCursor,
};

/// A stored record that could not be decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedRecord {
    pub key: String,
    pub reason: String,
}

/// Result of draining a query in one pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryReport {
    pub assets: Vec<Asset>,
    pub malformed: Vec<MalformedRecord>,
}

impl QueryReport {
    /// No record was skipped.
    pub fn is_clean(&self) -> bool {
        self.malformed.is_empty()
    }
}

enum RecordSource<'a> {
    /// The cursor walks `a:{id}` records directly.
    Records,
    /// The cursor walks owner index entries; records are looked up by id.
    OwnerIndex { store: &'a dyn KeyValueStore },
}

enum DecodeError {
    Malformed(MalformedRecord),
    Store(KVStoreError),
}

fn malformed(key: impl Into<String>, reason: impl Into<String>) -> DecodeError {
    DecodeError::Malformed(MalformedRecord {
        key: key.into(),
        reason: reason.into(),
    })
}

/// Lazy sequence of assets in key order.
pub struct AssetIter<'a> {
    cursor: KvCursor<'a>,
    source: RecordSource<'a>,
    serializer: &'a dyn AssetSerializer,
    mode: QueryMode,
    operation: Operation,
    /// Key range (or owner) in error messages.
    scope: String,
    malformed: Vec<MalformedRecord>,
    done: bool,
}

impl<'a> AssetIter<'a> {
    /// Records skipped so far (lenient mode only).
    pub fn malformed(&self) -> &[MalformedRecord] {
        &self.malformed
    }

    /// Drain the sequence, gathering assets and skipped records.
    ///
    /// Fails on the first store error, or on the first corrupt record in
    /// strict mode.
    pub fn collect_report(mut self) -> Result<QueryReport, LedgerError> {
        let mut assets = Vec::new();
        for item in self.by_ref() {
            assets.push(item?);
        }
        Ok(QueryReport {
            assets,
            malformed: std::mem::take(&mut self.malformed),
        })
    }

    /// Release the cursor and stop yielding.
    fn finish(&mut self) {
        self.done = true;
        self.cursor = Box::new(std::iter::empty());
    }

    fn decode(&self, raw_key: &[u8], value: &[u8]) -> Result<Asset, DecodeError> {
        match &self.source {
            RecordSource::Records => {
                let id = KeyPrefix::Asset
                    .strip(raw_key)
                    .and_then(|id| std::str::from_utf8(id).ok())
                    .ok_or_else(|| {
                        malformed(String::from_utf8_lossy(raw_key), "key is not a valid asset key")
                    })?;
                self.decode_record(id, value)
            }
            RecordSource::OwnerIndex { store } => {
                let composite = KeyPrefix::Index
                    .strip(raw_key)
                    .and_then(|k| std::str::from_utf8(k).ok())
                    .ok_or_else(|| {
                        malformed(String::from_utf8_lossy(raw_key), "key is not a valid index key")
                    })?;
                let (object_type, attributes) = split_composite_key(composite)
                    .map_err(|e| malformed(composite.escape_default().to_string(), e.to_string()))?;
                let id = match (object_type.as_str(), attributes.as_slice()) {
                    (OWNER_INDEX, [_, id]) => id,
                    _ => {
                        return Err(malformed(
                            composite.escape_default().to_string(),
                            "unexpected index entry",
                        ))
                    }
                };
                let record = store
                    .get(&KeyPrefix::asset_key(id))
                    .map_err(DecodeError::Store)?
                    .ok_or_else(|| malformed(id.as_str(), "index entry without record"))?;
                self.decode_record(id, &record)
            }
        }
    }

    fn decode_record(&self, id: &str, value: &[u8]) -> Result<Asset, DecodeError> {
        let asset = self
            .serializer
            .deserialize(value)
            .map_err(|e| malformed(id, e.message))?;
        if asset.id != id {
            return Err(malformed(
                id,
                format!("record id '{}' does not match its key", asset.id),
            ));
        }
        Ok(asset)
    }
}

impl Iterator for AssetIter<'_> {
    type Item = Result<Asset, LedgerError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        loop {
            let (raw_key, value) = match self.cursor.next() {
                None => {
                    self.finish();
                    return None;
                }
                Some(Err(e)) => {
                    self.finish();
                    return Some(Err(LedgerError::store(self.operation, &self.scope, e)));
                }
                Some(Ok(pair)) => pair,
            };

            match self.decode(&raw_key, &value) {
                Ok(asset) => return Some(Ok(asset)),
                Err(DecodeError::Store(e)) => {
                    self.finish();
                    return Some(Err(LedgerError::store(self.operation, &self.scope, e)));
                }
                Err(DecodeError::Malformed(record)) => match self.mode {
                    QueryMode::Lenient => {
                        #[cfg(feature = "tracing-log")]
                        tracing::warn!(
                            "[ledger] {}: skipping malformed record '{}': {}",
                            self.operation,
                            record.key,
                            record.reason
                        );
                        self.malformed.push(record);
                    }
                    QueryMode::Strict => {
                        self.finish();
                        return Some(Err(LedgerError::Serialization {
                            operation: self.operation,
                            key: record.key,
                            message: record.reason,
                        }));
                    }
                },
            }
        }
    }
}

/// Lazy sequence of one key's history, oldest first.
pub struct HistoryIter<'a> {
    cursor: HistoryCursor<'a>,
    key: String,
    done: bool,
}

impl Iterator for HistoryIter<'_> {
    type Item = Result<HistoryEntry, LedgerError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.cursor.next() {
            Some(Ok(entry)) => Some(Ok(entry)),
            Some(Err(e)) => {
                self.done = true;
                self.cursor = Box::new(std::iter::empty());
                Some(Err(LedgerError::store(Operation::GetHistory, &self.key, e)))
            }
            None => {
                self.done = true;
                self.cursor = Box::new(std::iter::empty());
                None
            }
        }
    }
}

impl<KV, HL, SER> AssetLedgerService<KV, HL, SER>
where
    KV: KeyValueStore,
    HL: HistoryLog,
    SER: AssetSerializer,
{
    fn asset_iter<'a>(
        &'a self,
        operation: Operation,
        scope: String,
        cursor: KvCursor<'a>,
        source: RecordSource<'a>,
    ) -> AssetIter<'a> {
        AssetIter {
            cursor,
            source,
            serializer: &self.serializer,
            mode: self.config.query_mode,
            operation,
            scope,
            malformed: Vec::new(),
            done: false,
        }
    }

    /// Assets with ids in `[start, end)`; empty `end` is unbounded.
    pub(crate) fn scan_range(
        &self,
        operation: Operation,
        start: &str,
        end: &str,
    ) -> Result<AssetIter<'_>, LedgerError> {
        let scope = format!("[{}, {})", start, end);
        let (from, to) = KeyPrefix::asset_range(start, end);
        let cursor = self
            .kv_store
            .range_scan(&from, &to)
            .map_err(|e| LedgerError::store(operation, &scope, e))?;

        #[cfg(feature = "tracing-log")]
        tracing::debug!("[ledger] {} over {}", operation, scope);

        Ok(self.asset_iter(operation, scope, cursor, RecordSource::Records))
    }

    /// Assets of `owner`, via the owner index.
    pub(crate) fn scan_owner(&self, owner: &str) -> Result<AssetIter<'_>, LedgerError> {
        let operation = Operation::QueryByOwner;
        self.config
            .validation
            .validate_owner(operation, owner, owner)?;
        let prefix = owner_index_prefix(owner).map_err(|e| LedgerError::Validation {
            operation,
            key: owner.to_string(),
            reason: e.to_string(),
        })?;
        let cursor = self
            .kv_store
            .prefix_scan(&KeyPrefix::index_key(&prefix))
            .map_err(|e| LedgerError::store(operation, owner, e))?;

        #[cfg(feature = "tracing-log")]
        tracing::debug!("[ledger] {} for '{}'", operation, owner);

        let source = RecordSource::OwnerIndex {
            store: &self.kv_store,
        };
        Ok(self.asset_iter(operation, format!("owner '{}'", owner), cursor, source))
    }

    /// History of `key`, oldest first. `NotFound` if it never existed.
    pub(crate) fn scan_history(&self, key: &str) -> Result<HistoryIter<'_>, LedgerError> {
        let operation = Operation::GetHistory;
        let known = self
            .history
            .has_history(key)
            .map_err(|e| LedgerError::store(operation, key, e))?;
        if !known {
            return Err(LedgerError::NotFound {
                operation,
                key: key.to_string(),
            });
        }

        let cursor = self
            .history
            .read_history(key)
            .map_err(|e| LedgerError::store(operation, key, e))?;
        Ok(HistoryIter {
            cursor,
            key: key.to_string(),
            done: false,
        })
    }
}
