//! # Asset Lifecycle
//!
//! Implements the AssetLedgerApi trait.
//!
//! Per key: `Absent -> Present -> Absent -> Present ...`. Deletion does not
//! lock a key; it can be created again and its history keeps growing.

use super::AssetLedgerService;
use crate::domain::config::KeyPrefix;
use crate::domain::entities::{Asset, AssetUpdate, ChangeKind};
use crate::domain::errors::LedgerError;
use crate::domain::identity::Operation;
use crate::events::AssetEvent;
use crate::ports::inbound::AssetLedgerApi;
use crate::ports::outbound::{
    AssetSerializer, BatchOperation, HistoryLog, KeyValueStore, TransactionContext,
};
use crate::service::query::{AssetIter, HistoryIter};

fn not_found(operation: Operation, key: &str) -> LedgerError {
    LedgerError::NotFound {
        operation,
        key: key.to_string(),
    }
}

impl<KV, HL, SER> AssetLedgerApi for AssetLedgerService<KV, HL, SER>
where
    KV: KeyValueStore,
    HL: HistoryLog,
    SER: AssetSerializer,
{
    fn create_asset(
        &mut self,
        ctx: &dyn TransactionContext,
        asset: Asset,
    ) -> Result<(), LedgerError> {
        let operation = Operation::CreateAsset;
        let key = asset.id.clone();

        // The candidate stands in as the target record.
        self.authorize(ctx, operation, &key, Some(&asset))?;
        self.config.validation.validate_asset(operation, &asset)?;

        let record_key = KeyPrefix::asset_key(&key);
        if self
            .kv_store
            .exists(&record_key)
            .map_err(|e| LedgerError::store(operation, &key, e))?
        {
            return Err(LedgerError::AlreadyExists { operation, key });
        }

        let value = self.encode(operation, &asset)?;
        let batch = vec![
            BatchOperation::put(record_key, value.clone()),
            self.index_put(operation, &asset.owner, &key)?,
        ];
        let _sequence = self.commit(ctx, operation, &key, batch, ChangeKind::Create, Some(value))?;

        #[cfg(feature = "tracing-log")]
        tracing::info!(
            "[ledger] ✓ created '{}' for '{}' (history #{})",
            key,
            asset.owner,
            _sequence
        );

        self.publish(operation, AssetEvent::new(ctx.tx_id(), &key, &asset.owner));
        Ok(())
    }

    fn update_asset(
        &mut self,
        ctx: &dyn TransactionContext,
        key: &str,
        update: AssetUpdate,
    ) -> Result<(), LedgerError> {
        let operation = Operation::UpdateAsset;

        let current = self.gate_existing(ctx, operation, key)?;
        if let Some(owner) = &update.owner {
            self.config.validation.validate_owner(operation, key, owner)?;
        }
        self.config
            .validation
            .validate_fields(operation, key, &update.fields)?;
        let current = current.ok_or_else(|| not_found(operation, key))?;

        let next = update.apply_to(&current);
        let value = self.encode(operation, &next)?;
        let mut batch = vec![BatchOperation::put(KeyPrefix::asset_key(key), value.clone())];
        batch.extend(self.index_move(operation, key, &current.owner, &next.owner)?);
        let _sequence = self.commit(ctx, operation, key, batch, ChangeKind::Update, Some(value))?;

        #[cfg(feature = "tracing-log")]
        tracing::info!("[ledger] ✓ updated '{}' (history #{})", key, _sequence);

        let mut event = AssetEvent::new(ctx.tx_id(), key, &next.owner);
        if next.owner != current.owner {
            event = event.with_previous_owner(current.owner);
        }
        self.publish(operation, event);
        Ok(())
    }

    fn transfer_asset(
        &mut self,
        ctx: &dyn TransactionContext,
        key: &str,
        new_owner: &str,
    ) -> Result<(), LedgerError> {
        let operation = Operation::TransferAsset;

        let current = self.gate_existing(ctx, operation, key)?;
        self.config
            .validation
            .validate_owner(operation, key, new_owner)?;
        let current = current.ok_or_else(|| not_found(operation, key))?;

        let next = Asset {
            owner: new_owner.to_string(),
            ..current.clone()
        };
        let value = self.encode(operation, &next)?;
        let mut batch = vec![BatchOperation::put(KeyPrefix::asset_key(key), value.clone())];
        batch.extend(self.index_move(operation, key, &current.owner, new_owner)?);
        let _sequence =
            self.commit(ctx, operation, key, batch, ChangeKind::Transfer, Some(value))?;

        #[cfg(feature = "tracing-log")]
        tracing::info!(
            "[ledger] ✓ transferred '{}' from '{}' to '{}' (history #{})",
            key,
            current.owner,
            new_owner,
            _sequence
        );

        self.publish(
            operation,
            AssetEvent::new(ctx.tx_id(), key, new_owner).with_previous_owner(current.owner),
        );
        Ok(())
    }

    fn delete_asset(
        &mut self,
        ctx: &dyn TransactionContext,
        key: &str,
    ) -> Result<(), LedgerError> {
        let operation = Operation::DeleteAsset;

        let current = self
            .gate_existing(ctx, operation, key)?
            .ok_or_else(|| not_found(operation, key))?;

        let batch = vec![
            BatchOperation::delete(KeyPrefix::asset_key(key)),
            self.index_delete(operation, &current.owner, key)?,
        ];
        let _sequence = self.commit(ctx, operation, key, batch, ChangeKind::Delete, None)?;

        #[cfg(feature = "tracing-log")]
        tracing::info!("[ledger] 🗑 deleted '{}' (history #{})", key, _sequence);

        self.publish(operation, AssetEvent::new(ctx.tx_id(), key, &current.owner));
        Ok(())
    }

    fn asset_exists(&self, key: &str) -> Result<bool, LedgerError> {
        self.kv_store
            .exists(&KeyPrefix::asset_key(key))
            .map_err(|e| LedgerError::store(Operation::AssetExists, key, e))
    }

    fn read_asset(&self, key: &str) -> Result<Asset, LedgerError> {
        let operation = Operation::ReadAsset;

        #[cfg(feature = "tracing-log")]
        tracing::debug!("[ledger] {} '{}'", operation, key);

        self.load(operation, key)?
            .ok_or_else(|| not_found(operation, key))
    }

    fn query_all(&self) -> Result<AssetIter<'_>, LedgerError> {
        self.scan_range(Operation::QueryAll, "", "")
    }

    fn query_range(&self, start: &str, end: &str) -> Result<AssetIter<'_>, LedgerError> {
        self.scan_range(Operation::QueryRange, start, end)
    }

    fn query_by_owner(&self, owner: &str) -> Result<AssetIter<'_>, LedgerError> {
        self.scan_owner(owner)
    }

    fn get_history(&self, key: &str) -> Result<HistoryIter<'_>, LedgerError> {
        self.scan_history(key)
    }
}
