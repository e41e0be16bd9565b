//! # Query Flows
//!
//! Range and owner queries over mixed healthy and corrupt records, plus
//! cursor accounting under early exit and store failure.

#[cfg(test)]
mod tests {
    use crate::init_tracing;
    use asset_ledger::test_utils::{admin, invocation, sample_asset, FailingKVStore};
    use asset_ledger::{
        AssetLedgerApi, AssetLedgerService, InMemoryKVStore, InMemoryLedger, JsonAssetSerializer,
        KeyPrefix, KeyValueStore, KvHistoryLog, LedgerConfig, LedgerDependencies, LedgerError,
        Operation, QueryMode,
    };

    type FaultyLedger = AssetLedgerService<
        FailingKVStore<InMemoryKVStore>,
        KvHistoryLog<InMemoryKVStore>,
        JsonAssetSerializer,
    >;

    /// Ten records `item00..item09`; even ones belong to Alice, odd to Bob.
    fn seeded(mode: QueryMode) -> FaultyLedger {
        init_tracing();
        let mut ledger = AssetLedgerService::new(
            LedgerDependencies {
                kv_store: FailingKVStore::new(InMemoryKVStore::new()),
                history: KvHistoryLog::new(InMemoryKVStore::new()),
                serializer: JsonAssetSerializer,
            },
            LedgerConfig::default().with_query_mode(mode),
        );
        for i in 0..10 {
            let id = format!("item{:02}", i);
            let owner = if i % 2 == 0 { "Alice" } else { "Bob" };
            ledger
                .create_asset(&invocation(admin(), &id, 1), sample_asset(&id, owner))
                .unwrap();
        }
        ledger
    }

    fn ids(iter: impl Iterator<Item = Result<asset_ledger::Asset, LedgerError>>) -> Vec<String> {
        iter.map(|r| r.unwrap().id).collect()
    }

    #[test]
    fn test_range_windows() {
        let ledger = seeded(QueryMode::Lenient);

        assert_eq!(
            ids(ledger.query_range("item02", "item05").unwrap()),
            vec!["item02", "item03", "item04"]
        );
        assert_eq!(ids(ledger.query_range("item08", "").unwrap()).len(), 2);
        assert_eq!(ids(ledger.query_range("", "item01").unwrap()), vec!["item00"]);
        assert!(ids(ledger.query_range("item05", "item05").unwrap()).is_empty());
        assert_eq!(ids(ledger.query_all().unwrap()).len(), 10);
    }

    #[test]
    fn test_owner_query_returns_only_owned() {
        let ledger = seeded(QueryMode::Lenient);

        let alice = ids(ledger.query_by_owner("Alice").unwrap());
        assert_eq!(alice, vec!["item00", "item02", "item04", "item06", "item08"]);
        assert!(ids(ledger.query_by_owner("Carol").unwrap()).is_empty());
    }

    #[test]
    fn test_store_failure_mid_scan() {
        let ledger = seeded(QueryMode::Lenient);
        ledger.kv_store().faults().fail_scans_after(Some(3));

        let mut iter = ledger.query_all().unwrap();
        let mut yielded = 0;
        let mut failure = None;
        for item in iter.by_ref() {
            match item {
                Ok(_) => yielded += 1,
                Err(e) => failure = Some(e),
            }
        }

        assert_eq!(yielded, 3);
        assert!(matches!(
            failure,
            Some(LedgerError::Store {
                operation: Operation::QueryAll,
                ..
            })
        ));
        assert!(iter.next().is_none());
        assert_eq!(ledger.kv_store().inner().open_cursors(), 0);
    }

    #[test]
    fn test_scan_setup_failure_is_returned_directly() {
        let ledger = seeded(QueryMode::Lenient);
        ledger.kv_store().faults().fail_reads(true);

        assert!(matches!(
            ledger.query_all(),
            Err(LedgerError::Store { .. })
        ));
        assert_eq!(ledger.kv_store().inner().open_cursors(), 0);
    }

    #[test]
    fn test_early_exit_releases_cursor() {
        let ledger = seeded(QueryMode::Lenient);

        let first_two: Vec<_> = ledger.query_all().unwrap().take(2).collect();
        assert_eq!(first_two.len(), 2);
        assert_eq!(ledger.kv_store().inner().open_cursors(), 0);

        let owned = ledger.query_by_owner("Bob").unwrap().next();
        assert!(owned.is_some());
        assert_eq!(ledger.kv_store().inner().open_cursors(), 0);
    }

    fn with_corrupt_record(mode: QueryMode) -> InMemoryLedger {
        init_tracing();
        let mut store = InMemoryKVStore::new();
        store
            .put(&KeyPrefix::asset_key("item01"), br#"{"docType":"asset","id":"item01"}"#)
            .unwrap();
        store
            .put(&KeyPrefix::asset_key("item03"), &[0xFF, 0x00, 0x13])
            .unwrap();

        let mut ledger = AssetLedgerService::new(
            LedgerDependencies {
                kv_store: store,
                history: KvHistoryLog::new(InMemoryKVStore::new()),
                serializer: JsonAssetSerializer,
            },
            LedgerConfig::default().with_query_mode(mode),
        );
        for id in ["item00", "item02", "item04"] {
            ledger
                .create_asset(&invocation(admin(), id, 1), sample_asset(id, "Alice"))
                .unwrap();
        }
        ledger
    }

    #[test]
    fn test_lenient_report_lists_every_malformed_key() {
        let ledger = with_corrupt_record(QueryMode::Lenient);

        let report = ledger.query_all().unwrap().collect_report().unwrap();
        assert_eq!(
            report.assets.iter().map(|a| a.id.as_str()).collect::<Vec<_>>(),
            vec!["item00", "item02", "item04"]
        );
        assert_eq!(
            report
                .malformed
                .iter()
                .map(|m| m.key.as_str())
                .collect::<Vec<_>>(),
            vec!["item01", "item03"]
        );
        assert_eq!(ledger.kv_store().open_cursors(), 0);
    }

    #[test]
    fn test_strict_mode_fails_at_first_malformed() {
        let ledger = with_corrupt_record(QueryMode::Strict);

        let results: Vec<_> = ledger.query_range("item00", "item05").unwrap().collect();
        assert_eq!(results.len(), 2);
        assert!(results[0].is_ok());
        match &results[1] {
            Err(LedgerError::Serialization { operation, key, .. }) => {
                assert_eq!(*operation, Operation::QueryRange);
                assert_eq!(key, "item01");
            }
            other => panic!("expected Serialization, got {:?}", other),
        }
        assert_eq!(ledger.kv_store().open_cursors(), 0);
    }
}
