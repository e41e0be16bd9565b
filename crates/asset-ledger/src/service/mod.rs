//! # Asset Ledger Service
//!
//! The lifecycle engine and query layer over injected ports.
//!
//! ## Mutation Pipeline
//!
//! 1. Resolve the caller's identity and consult the identity gate
//! 2. Validate input
//! 3. Check existence against the state store
//! 4. Write the record and its owner index entry in one atomic batch
//! 5. Append a fully built entry to the history log
//! 6. Publish the ledger event
//!
//! A failure at any step returns before the next one. The service keeps no
//! record state between calls.

mod helpers;
mod lifecycle;
pub mod query;

use crate::adapters::{InMemoryKVStore, JsonAssetSerializer, KvHistoryLog};
use crate::domain::config::LedgerConfig;
use crate::events::EventPublisher;
use crate::ports::outbound::{AssetSerializer, HistoryLog, KeyValueStore};

pub use query::{AssetIter, HistoryIter, MalformedRecord, QueryReport};

/// The asset ledger service.
pub struct AssetLedgerService<KV, HL, SER>
where
    KV: KeyValueStore,
    HL: HistoryLog,
    SER: AssetSerializer,
{
    /// Current state (records and owner index).
    pub(crate) kv_store: KV,
    /// Append-only history.
    pub(crate) history: HL,
    /// Record encoding.
    pub(crate) serializer: SER,
    pub(crate) config: LedgerConfig,
    /// Set by the host when wiring event delivery.
    pub(crate) publisher: Option<EventPublisher>,
}

/// Dependencies for AssetLedgerService
pub struct LedgerDependencies<KV, HL, SER> {
    pub kv_store: KV,
    pub history: HL,
    pub serializer: SER,
}

/// Ledger wired entirely in memory.
pub type InMemoryLedger =
    AssetLedgerService<InMemoryKVStore, KvHistoryLog<InMemoryKVStore>, JsonAssetSerializer>;

impl<KV, HL, SER> AssetLedgerService<KV, HL, SER>
where
    KV: KeyValueStore,
    HL: HistoryLog,
    SER: AssetSerializer,
{
    /// Create a new service with the given dependencies.
    pub fn new(deps: LedgerDependencies<KV, HL, SER>, config: LedgerConfig) -> Self {
        #[cfg(feature = "tracing-log")]
        tracing::debug!(
            "[ledger] service ready ({} policies, {:?} queries)",
            config.policies.policies().len(),
            config.query_mode
        );

        Self {
            kv_store: deps.kv_store,
            history: deps.history,
            serializer: deps.serializer,
            config,
            publisher: None,
        }
    }

    /// Set the callback used to publish ledger events.
    pub fn set_event_publisher<F>(&mut self, publisher: F)
    where
        F: Fn(&str, Vec<u8>) -> Result<(), String> + Send + Sync + 'static,
    {
        self.publisher = Some(Box::new(publisher));
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    pub fn kv_store(&self) -> &KV {
        &self.kv_store
    }

    pub fn history_log(&self) -> &HL {
        &self.history
    }

    pub fn serializer(&self) -> &SER {
        &self.serializer
    }
}

impl InMemoryLedger {
    /// Ledger backed by fresh in-memory stores.
    pub fn in_memory(config: LedgerConfig) -> Self {
        Self::new(
            LedgerDependencies {
                kv_store: InMemoryKVStore::new(),
                history: KvHistoryLog::new(InMemoryKVStore::new()),
                serializer: JsonAssetSerializer,
            },
            config,
        )
    }
}
