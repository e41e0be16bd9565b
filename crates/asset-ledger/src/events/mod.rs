//! # Ledger Events
//!
//! Notifications published after a mutation commits.
//!
//! ## Event Publications
//!
//! | Event | Trigger |
//! |-------|---------|
//! | `AssetCreated` | `CreateAsset` committed |
//! | `AssetUpdated` | `UpdateAsset` committed |
//! | `AssetTransferred` | `TransferAsset` committed |
//! | `AssetDeleted` | `DeleteAsset` committed |
//!
//! Payloads are JSON (`AssetEvent`). The host wires delivery through
//! `AssetLedgerService::set_event_publisher`.

mod payloads;

pub use payloads::AssetEvent;

/// Callback used to hand events to the host: `(event type, JSON payload)`.
pub type EventPublisher = Box<dyn Fn(&str, Vec<u8>) -> Result<(), String> + Send + Sync>;

// Event type constants
pub mod event_types {
    /// Published when an asset is created
    pub const ASSET_CREATED: &str = "AssetCreated";

    /// Published when an asset's fields are replaced
    pub const ASSET_UPDATED: &str = "AssetUpdated";

    /// Published when an asset changes owner
    pub const ASSET_TRANSFERRED: &str = "AssetTransferred";

    /// Published when an asset is deleted
    pub const ASSET_DELETED: &str = "AssetDeleted";

    /// Every event type the ledger publishes.
    pub const ALL: [&str; 4] = [ASSET_CREATED, ASSET_UPDATED, ASSET_TRANSFERRED, ASSET_DELETED];
}
