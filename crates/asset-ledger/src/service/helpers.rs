//! # Asset Ledger Service - Helper Methods
//!
//! Private helper methods for the AssetLedgerService.

use super::AssetLedgerService;
use crate::domain::composite_key::owner_index_key;
use crate::domain::config::KeyPrefix;
use crate::domain::entities::{Asset, ChangeKind, Modification};
use crate::domain::errors::LedgerError;
use crate::domain::identity::Operation;
use crate::domain::policy::Decision;
use crate::events::AssetEvent;
use crate::ports::outbound::{
    AssetSerializer, BatchOperation, HistoryLog, KeyValueStore, TransactionContext,
};

/// Principal reported when the caller's identity cannot be resolved.
const UNRESOLVED_PRINCIPAL: &str = "<unresolved>";

impl<KV, HL, SER> AssetLedgerService<KV, HL, SER>
where
    KV: KeyValueStore,
    HL: HistoryLog,
    SER: AssetSerializer,
{
    /// Resolve the caller and run the identity gate.
    pub(crate) fn authorize(
        &self,
        ctx: &dyn TransactionContext,
        operation: Operation,
        key: &str,
        record: Option<&Asset>,
    ) -> Result<(), LedgerError> {
        let identity = ctx
            .resolve_identity()
            .map_err(|e| LedgerError::AccessDenied {
                operation,
                key: key.to_string(),
                principal: UNRESOLVED_PRINCIPAL.to_string(),
                reason: e.to_string(),
            })?;

        match self.config.policies.authorize(&identity, operation, record) {
            Decision::Allowed { policy: _policy } => {
                #[cfg(feature = "tracing-log")]
                tracing::debug!(
                    "[ledger] {} on '{}' by '{}' allowed by '{}'",
                    operation,
                    key,
                    identity.principal_id,
                    _policy
                );
                Ok(())
            }
            Decision::Denied { reason } => {
                #[cfg(feature = "tracing-log")]
                tracing::warn!(
                    "[ledger] ⛔ {} on '{}' by '{}' denied: {}",
                    operation,
                    key,
                    identity.principal_id,
                    reason
                );
                Err(LedgerError::AccessDenied {
                    operation,
                    key: key.to_string(),
                    principal: identity.principal_id,
                    reason,
                })
            }
        }
    }

    /// Gate a mutation of an existing key and return its current record.
    ///
    /// When a policy inspects the target record, it is read before the gate
    /// runs; the read has no side effects. A record that fails to decode is
    /// shown to the gate as absent, and its `Serialization` error surfaces
    /// only once the caller is allowed. Otherwise the gate runs first and the
    /// record is read after the key is validated.
    pub(crate) fn gate_existing(
        &self,
        ctx: &dyn TransactionContext,
        operation: Operation,
        key: &str,
    ) -> Result<Option<Asset>, LedgerError> {
        if self.config.policies.requires_record(operation) {
            let loaded = self.load(operation, key);
            if let Err(LedgerError::Store { .. }) = loaded {
                return loaded;
            }
            let record = loaded.as_ref().ok().and_then(Option::as_ref);
            self.authorize(ctx, operation, key, record)?;
            self.config.validation.validate_key(operation, key)?;
            loaded
        } else {
            self.authorize(ctx, operation, key, None)?;
            self.config.validation.validate_key(operation, key)?;
            self.load(operation, key)
        }
    }

    /// Read and decode the current record, if present.
    pub(crate) fn load(
        &self,
        operation: Operation,
        key: &str,
    ) -> Result<Option<Asset>, LedgerError> {
        let Some(data) = self
            .kv_store
            .get(&KeyPrefix::asset_key(key))
            .map_err(|e| LedgerError::store(operation, key, e))?
        else {
            return Ok(None);
        };

        self.serializer
            .deserialize(&data)
            .map(Some)
            .map_err(|e| LedgerError::serialization(operation, key, e))
    }

    pub(crate) fn encode(
        &self,
        operation: Operation,
        asset: &Asset,
    ) -> Result<Vec<u8>, LedgerError> {
        self.serializer
            .serialize(asset)
            .map_err(|e| LedgerError::serialization(operation, &asset.id, e))
    }

    pub(crate) fn index_put(
        &self,
        operation: Operation,
        owner: &str,
        key: &str,
    ) -> Result<BatchOperation, LedgerError> {
        let composite = owner_index_key(owner, key).map_err(|e| LedgerError::Validation {
            operation,
            key: key.to_string(),
            reason: e.to_string(),
        })?;
        Ok(BatchOperation::put(KeyPrefix::index_key(&composite), Vec::new()))
    }

    pub(crate) fn index_delete(
        &self,
        operation: Operation,
        owner: &str,
        key: &str,
    ) -> Result<BatchOperation, LedgerError> {
        let composite = owner_index_key(owner, key).map_err(|e| LedgerError::Validation {
            operation,
            key: key.to_string(),
            reason: e.to_string(),
        })?;
        Ok(BatchOperation::delete(KeyPrefix::index_key(&composite)))
    }

    /// Batch operations that move `key`'s index entry between owners.
    pub(crate) fn index_move(
        &self,
        operation: Operation,
        key: &str,
        from: &str,
        to: &str,
    ) -> Result<Vec<BatchOperation>, LedgerError> {
        if from == to {
            return Ok(Vec::new());
        }
        Ok(vec![
            self.index_delete(operation, from, key)?,
            self.index_put(operation, to, key)?,
        ])
    }

    /// Write the state batch, then append the history entry.
    ///
    /// If the append fails, the batch is undone from the pre-images of its
    /// keys before the error is returned. History is append-only, so the
    /// state side is the one rolled back.
    pub(crate) fn commit(
        &mut self,
        ctx: &dyn TransactionContext,
        operation: Operation,
        key: &str,
        batch: Vec<BatchOperation>,
        change: ChangeKind,
        value: Option<Vec<u8>>,
    ) -> Result<u64, LedgerError> {
        let undo = self.undo_batch(operation, key, &batch)?;
        self.kv_store
            .atomic_batch_write(batch)
            .map_err(|e| LedgerError::store(operation, key, e))?;

        let modification = Modification {
            tx_id: ctx.tx_id().to_string(),
            timestamp: ctx.timestamp(),
            change,
            value,
        };
        match self.history.append(key, modification) {
            Ok(sequence) => Ok(sequence),
            Err(e) => {
                if let Err(_undo_err) = self.kv_store.atomic_batch_write(undo) {
                    #[cfg(feature = "tracing-log")]
                    tracing::error!(
                        "[ledger] {} on '{}': rollback after failed history append failed: {}",
                        operation,
                        key,
                        _undo_err
                    );
                }
                #[cfg(feature = "tracing-log")]
                tracing::warn!(
                    "[ledger] {} on '{}' rolled back: history append failed: {}",
                    operation,
                    key,
                    e
                );
                Err(LedgerError::store(operation, key, e))
            }
        }
    }

    /// Batch that restores every key touched by `batch` to its current value.
    fn undo_batch(
        &self,
        operation: Operation,
        key: &str,
        batch: &[BatchOperation],
    ) -> Result<Vec<BatchOperation>, LedgerError> {
        batch
            .iter()
            .map(|op| {
                let target = match op {
                    BatchOperation::Put { key: target, .. } => target,
                    BatchOperation::Delete { key: target } => target,
                };
                let previous = self
                    .kv_store
                    .get(target)
                    .map_err(|e| LedgerError::store(operation, key, e))?;
                Ok(match previous {
                    Some(value) => BatchOperation::put(target.clone(), value),
                    None => BatchOperation::delete(target.clone()),
                })
            })
            .collect()
    }

    /// Hand a committed mutation's event to the host. Failures are logged only.
    pub(crate) fn publish(&self, operation: Operation, event: AssetEvent) {
        let (Some(publisher), Some(event_type)) =
            (self.publisher.as_ref(), AssetEvent::event_type(operation))
        else {
            return;
        };

        let result = event
            .to_json()
            .map_err(|e| e.to_string())
            .and_then(|payload| publisher(event_type, payload));

        if let Err(_e) = result {
            #[cfg(feature = "tracing-log")]
            tracing::warn!(
                "[ledger] failed to publish {} for '{}': {}",
                event_type,
                event.key,
                _e
            );
        }
    }
}
