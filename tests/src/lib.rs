//! # Asset-Ledger Test Suite
//!
//! Unified test crate exercising the ledger through its public API only.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! ├── integration/
//! │   ├── lifecycle.rs       # Create → update → transfer → delete → re-create
//! │   ├── access_control.rs  # TOML-configured policies at the gate
//! │   ├── queries.rs         # Range, owner, lenient/strict, cursor release
//! │   └── file_store.rs      # Persistence across reopen
//! └── lib.rs
//! benches/
//! └── ledger_benchmarks.rs
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! # All tests
//! cargo test -p ledger-tests
//!
//! # With ledger logs
//! RUST_LOG=asset_ledger=debug cargo test -p ledger-tests -- --nocapture
//!
//! # Benchmarks
//! cargo bench -p ledger-tests
//! ```

#![allow(dead_code)]

pub mod integration;

use asset_ledger::{
    AssetLedgerService, FileBackedKVStore, JsonAssetSerializer, KVStoreError, KvHistoryLog,
    LedgerConfig, LedgerDependencies,
};
use std::path::Path;
use std::sync::Once;
use tracing_subscriber::EnvFilter;

/// Ledger persisted to two files under one directory.
pub type FileLedger =
    AssetLedgerService<FileBackedKVStore, KvHistoryLog<FileBackedKVStore>, JsonAssetSerializer>;

static TRACING: Once = Once::new();

/// Route ledger logs to the test writer, filtered by `RUST_LOG`.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// Open (or reopen) a file-backed ledger rooted at `dir`.
pub fn open_file_ledger(dir: &Path, config: LedgerConfig) -> Result<FileLedger, KVStoreError> {
    Ok(AssetLedgerService::new(
        LedgerDependencies {
            kv_store: FileBackedKVStore::open(dir.join("state.db"))?,
            history: KvHistoryLog::new(FileBackedKVStore::open(dir.join("history.db"))?),
            serializer: JsonAssetSerializer,
        },
        config,
    ))
}
