//! Test utilities for the asset ledger.
//!
//! Identities, sample records, a fault-injecting store and an event recorder.
//! Enable with the `test-utils` feature flag.

use crate::adapters::{FixedTimeSource, Invocation};
use crate::domain::entities::{Asset, Timestamp};
use crate::domain::errors::KVStoreError;
use crate::domain::identity::IdentityContext;
use crate::events::AssetEvent;
use crate::ports::outbound::{BatchOperation, KeyValueStore, KvCursor};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

pub const ORG: &str = "Org1MSP";

/// Holder of `role=admin`.
pub fn admin() -> IdentityContext {
    IdentityContext::new("admin", ORG).with_attribute("role", "admin")
}

/// A regular member; may only mutate what it owns under the default policies.
pub fn member(principal: &str) -> IdentityContext {
    IdentityContext::new(principal, ORG).with_attribute("role", "member")
}

/// Invocation with a readable tx id and a fixed clock.
pub fn invocation(identity: IdentityContext, tx_id: &str, seconds: u64) -> Invocation {
    Invocation::with_time_source(identity, &FixedTimeSource(Timestamp::from_secs(seconds)))
        .with_tx_id(tx_id)
}

pub fn sample_asset(id: &str, owner: &str) -> Asset {
    Asset::new(id, owner)
        .with_field("color", "blue")
        .with_field("size", 5)
        .with_field("price", 100)
}

#[derive(Default)]
struct Faults {
    writes: AtomicBool,
    reads: AtomicBool,
    /// Items a scan yields before failing; `usize::MAX` disables.
    scan_after: AtomicUsize,
}

/// Shared switchboard for a `FailingKVStore`.
#[derive(Clone)]
pub struct FaultPlan(Arc<Faults>);

impl Default for FaultPlan {
    fn default() -> Self {
        let faults = Faults::default();
        faults.scan_after.store(usize::MAX, Ordering::SeqCst);
        Self(Arc::new(faults))
    }
}

impl FaultPlan {
    pub fn fail_writes(&self, on: bool) {
        self.0.writes.store(on, Ordering::SeqCst);
    }

    pub fn fail_reads(&self, on: bool) {
        self.0.reads.store(on, Ordering::SeqCst);
    }

    /// Make every scan fail after `items` entries. `None` disables.
    pub fn fail_scans_after(&self, items: Option<usize>) {
        self.0
            .scan_after
            .store(items.unwrap_or(usize::MAX), Ordering::SeqCst);
    }
}

fn injected(what: &str) -> KVStoreError {
    KVStoreError::IOError {
        message: format!("injected {} failure", what),
    }
}

/// Store wrapper that fails on demand.
pub struct FailingKVStore<KV> {
    inner: KV,
    faults: FaultPlan,
}

impl<KV: KeyValueStore> FailingKVStore<KV> {
    pub fn new(inner: KV) -> Self {
        Self {
            inner,
            faults: FaultPlan::default(),
        }
    }

    /// Handle for toggling faults after the store is moved into a service.
    pub fn faults(&self) -> FaultPlan {
        self.faults.clone()
    }

    pub fn inner(&self) -> &KV {
        &self.inner
    }

    fn check_reads(&self) -> Result<(), KVStoreError> {
        if self.faults.0.reads.load(Ordering::SeqCst) {
            return Err(injected("read"));
        }
        Ok(())
    }

    fn check_writes(&self) -> Result<(), KVStoreError> {
        if self.faults.0.writes.load(Ordering::SeqCst) {
            return Err(injected("write"));
        }
        Ok(())
    }
}

impl<KV: KeyValueStore> KeyValueStore for FailingKVStore<KV> {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, KVStoreError> {
        self.check_reads()?;
        self.inner.get(key)
    }

    fn put(&mut self, key: &[u8], value: &[u8]) -> Result<(), KVStoreError> {
        self.check_writes()?;
        self.inner.put(key, value)
    }

    fn delete(&mut self, key: &[u8]) -> Result<(), KVStoreError> {
        self.check_writes()?;
        self.inner.delete(key)
    }

    fn atomic_batch_write(&mut self, operations: Vec<BatchOperation>) -> Result<(), KVStoreError> {
        self.check_writes()?;
        self.inner.atomic_batch_write(operations)
    }

    fn exists(&self, key: &[u8]) -> Result<bool, KVStoreError> {
        self.check_reads()?;
        self.inner.exists(key)
    }

    fn range_scan(&self, start: &[u8], end: &[u8]) -> Result<KvCursor<'_>, KVStoreError> {
        self.check_reads()?;
        let cursor = self.inner.range_scan(start, end)?;
        let after = self.faults.0.scan_after.load(Ordering::SeqCst);
        if after == usize::MAX {
            return Ok(cursor);
        }
        Ok(Box::new(
            cursor
                .take(after)
                .chain(std::iter::once(Err(injected("scan")))),
        ))
    }
}

/// Captures published events.
#[derive(Clone, Default)]
pub struct EventRecorder {
    events: Arc<Mutex<Vec<(String, AssetEvent)>>>,
}

impl EventRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Callback to pass to `set_event_publisher`.
    pub fn publisher(
        &self,
    ) -> impl Fn(&str, Vec<u8>) -> Result<(), String> + Send + Sync + 'static {
        let events = Arc::clone(&self.events);
        move |event_type: &str, payload: Vec<u8>| {
            let event: AssetEvent = serde_json::from_slice(&payload).map_err(|e| e.to_string())?;
            events.lock().push((event_type.to_string(), event));
            Ok(())
        }
    }

    pub fn events(&self) -> Vec<(String, AssetEvent)> {
        self.events.lock().clone()
    }

    pub fn event_types(&self) -> Vec<String> {
        self.events.lock().iter().map(|(t, _)| t.clone()).collect()
    }
}
