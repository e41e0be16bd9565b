//! # Inbound Ports (Driving Ports)
//!
//! The primary API of the asset ledger.

use crate::domain::entities::{Asset, AssetUpdate};
use crate::domain::errors::LedgerError;
use crate::ports::outbound::TransactionContext;
use crate::service::query::{AssetIter, HistoryIter};

/// Primary API of the asset ledger.
///
/// Every mutating operation consults the identity gate first. A denial
/// yields `AccessDenied` and leaves state and history untouched.
pub trait AssetLedgerApi {
    /// Create a new asset.
    ///
    /// ## Errors
    ///
    /// - `AccessDenied`: the caller may not create this asset
    /// - `Validation`: empty key, blank owner, or a non-positive price
    /// - `AlreadyExists`: the key is currently present
    fn create_asset(
        &mut self,
        ctx: &dyn TransactionContext,
        asset: Asset,
    ) -> Result<(), LedgerError>;

    /// Replace the domain fields of an asset (and the owner, if given).
    ///
    /// ## Errors
    ///
    /// - `AccessDenied`, `Validation`
    /// - `NotFound`: the key is absent
    fn update_asset(
        &mut self,
        ctx: &dyn TransactionContext,
        key: &str,
        update: AssetUpdate,
    ) -> Result<(), LedgerError>;

    /// Change only the owner of an asset.
    ///
    /// ## Errors
    ///
    /// - `AccessDenied`
    /// - `Validation`: blank new owner
    /// - `NotFound`: the key is absent
    fn transfer_asset(
        &mut self,
        ctx: &dyn TransactionContext,
        key: &str,
        new_owner: &str,
    ) -> Result<(), LedgerError>;

    /// Remove an asset, leaving a tombstone in its history.
    ///
    /// ## Errors
    ///
    /// - `AccessDenied`
    /// - `NotFound`: the key is absent
    fn delete_asset(&mut self, ctx: &dyn TransactionContext, key: &str)
        -> Result<(), LedgerError>;

    /// Whether the key is currently present. No side effects.
    fn asset_exists(&self, key: &str) -> Result<bool, LedgerError>;

    /// Read the current record.
    ///
    /// ## Errors
    ///
    /// - `NotFound`: the key is absent
    /// - `Serialization`: the stored bytes are corrupt
    fn read_asset(&self, key: &str) -> Result<Asset, LedgerError>;

    /// Lazily iterate over every asset in key order.
    fn query_all(&self) -> Result<AssetIter<'_>, LedgerError>;

    /// Lazily iterate over assets with keys in `[start, end)`.
    ///
    /// An empty `end` means "to the last asset".
    fn query_range(&self, start: &str, end: &str) -> Result<AssetIter<'_>, LedgerError>;

    /// Lazily iterate over the assets of one owner, in key order.
    fn query_by_owner(&self, owner: &str) -> Result<AssetIter<'_>, LedgerError>;

    /// Lazily iterate over a key's history, oldest first.
    ///
    /// ## Errors
    ///
    /// - `NotFound`: the key has never existed
    fn get_history(&self, key: &str) -> Result<HistoryIter<'_>, LedgerError>;
}
