//! # Asset Ledger
//!
//! A ledger-backed record store. Callers create, update, transfer, and
//! delete versioned records ("assets") under attribute-based access control,
//! and every change lands in an append-only, queryable per-key history.
//!
//! ## Architecture
//!
//! ```text
//! caller ──op──→ [Identity Gate] ──allow──→ [Lifecycle Engine] ──batch──→ [KeyValueStore]
//!                      │                            │
//!                      ↓ deny                       └──append──→ [HistoryLog]
//!                 AccessDenied                      │
//!                                                   └──event──→ host publisher
//! ```
//!
//! ## Domain Invariants
//!
//! | Invariant | Description |
//! |-----------|-------------|
//! | Gate first | Every mutation is authorized before validation, existence checks, or writes |
//! | Atomic state | A record and its owner index entry change in one batch |
//! | Append-only history | Entries are never rewritten; deletion appends a tombstone |
//! | Re-creatable keys | A deleted key may be created again; its history keeps growing |
//! | Cursor release | Every range scan is released when its sequence ends, fails, or is dropped |
//!
//! ## Crate Structure (Hexagonal Architecture)
//!
//! - `domain/` - Pure domain logic (entities, policies, validation, config)
//! - `ports/` - Port traits (inbound API, outbound SPI)
//! - `adapters/` - Stores, history log, serializer, invocation context
//! - `service/` - Lifecycle engine and query layer
//! - `events/` - Ledger event payloads
//!
//! ## Usage
//!
//! ```ignore
//! use asset_ledger::{Asset, AssetLedgerApi, IdentityContext, InMemoryLedger, Invocation, LedgerConfig};
//!
//! let mut ledger = InMemoryLedger::in_memory(LedgerConfig::default());
//! let admin = IdentityContext::new("admin", "Org1MSP").with_attribute("role", "admin");
//!
//! ledger.create_asset(
//!     &Invocation::new(admin.clone()),
//!     Asset::new("asset1", "Alice").with_field("price", 100),
//! )?;
//! ledger.transfer_asset(&Invocation::new(admin), "asset1", "Bob")?;
//!
//! for entry in ledger.get_history("asset1")? {
//!     println!("{:?}", entry?);
//! }
//! ```

pub mod adapters;
pub mod domain;
pub mod events;
pub mod ports;
pub mod service;

/// Test utilities (identities, fixtures, fault injection)
/// Requires feature: `test-utils`
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

// Re-export key types for convenience
pub use adapters::{
    FixedTimeSource, InMemoryKVStore, Invocation, JsonAssetSerializer, KvHistoryLog,
    SystemTimeSource,
};
#[cfg(feature = "file-store")]
pub use adapters::FileBackedKVStore;
pub use domain::composite_key::{create_composite_key, split_composite_key, CompositeKeyError};
pub use domain::config::{KeyPrefix, LedgerConfig, QueryMode};
pub use domain::entities::{
    Asset, AssetFields, AssetUpdate, ChangeKind, FieldValue, HistoryEntry, Modification, Timestamp,
};
pub use domain::errors::{
    ConfigError, IdentityError, KVStoreError, LedgerError, SerializationError,
};
pub use domain::identity::{IdentityContext, Operation};
pub use domain::policy::{AccessPolicy, Condition, Decision, Effect, PolicySet};
pub use domain::validation::ValidationRules;
pub use events::{event_types, AssetEvent, EventPublisher};
pub use ports::inbound::AssetLedgerApi;
pub use ports::outbound::{
    AssetSerializer, BatchOperation, HistoryLog, KeyValueStore, TimeSource, TransactionContext,
};
pub use service::{
    AssetIter, AssetLedgerService, HistoryIter, InMemoryLedger, LedgerDependencies,
    MalformedRecord, QueryReport,
};
