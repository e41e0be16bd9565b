//! # File Store Flows
//!
//! The ledger over file-backed stores: state and history survive a reopen,
//! and a data directory cannot be opened twice.

#[cfg(test)]
mod tests {
    use crate::{init_tracing, open_file_ledger};
    use asset_ledger::test_utils::{admin, invocation, sample_asset};
    use asset_ledger::{AssetLedgerApi, ChangeKind, KVStoreError, LedgerConfig};

    #[test]
    fn test_state_and_history_survive_reopen() {
        init_tracing();
        let dir = tempfile::tempdir().unwrap();

        {
            let mut ledger = open_file_ledger(dir.path(), LedgerConfig::default()).unwrap();
            ledger
                .create_asset(&invocation(admin(), "tx1", 1), sample_asset("asset1", "Alice"))
                .unwrap();
            ledger
                .create_asset(&invocation(admin(), "tx2", 2), sample_asset("asset2", "Alice"))
                .unwrap();
            ledger
                .transfer_asset(&invocation(admin(), "tx3", 3), "asset1", "Bob")
                .unwrap();
            ledger
                .delete_asset(&invocation(admin(), "tx4", 4), "asset2")
                .unwrap();
        }

        let ledger = open_file_ledger(dir.path(), LedgerConfig::default()).unwrap();
        assert_eq!(ledger.read_asset("asset1").unwrap().owner, "Bob");
        assert!(!ledger.asset_exists("asset2").unwrap());
        assert_eq!(ledger.query_by_owner("Bob").unwrap().count(), 1);
        assert_eq!(ledger.query_by_owner("Alice").unwrap().count(), 0);

        let changes: Vec<_> = ledger
            .get_history("asset2")
            .unwrap()
            .map(|e| e.unwrap().change)
            .collect();
        assert_eq!(changes, vec![ChangeKind::Create, ChangeKind::Delete]);
    }

    #[test]
    fn test_second_open_is_refused() {
        init_tracing();
        let dir = tempfile::tempdir().unwrap();

        let _first = open_file_ledger(dir.path(), LedgerConfig::default()).unwrap();
        assert!(matches!(
            open_file_ledger(dir.path(), LedgerConfig::default()),
            Err(KVStoreError::Unavailable { .. })
        ));
    }

    #[test]
    fn test_history_continues_after_reopen() {
        init_tracing();
        let dir = tempfile::tempdir().unwrap();

        {
            let mut ledger = open_file_ledger(dir.path(), LedgerConfig::default()).unwrap();
            ledger
                .create_asset(&invocation(admin(), "tx1", 1), sample_asset("asset1", "Alice"))
                .unwrap();
        }
        {
            let mut ledger = open_file_ledger(dir.path(), LedgerConfig::default()).unwrap();
            ledger
                .transfer_asset(&invocation(admin(), "tx2", 2), "asset1", "Bob")
                .unwrap();
        }

        let ledger = open_file_ledger(dir.path(), LedgerConfig::default()).unwrap();
        let sequences: Vec<u64> = ledger
            .get_history("asset1")
            .unwrap()
            .map(|e| e.unwrap().sequence)
            .collect();
        assert_eq!(sequences, vec![1, 2]);
    }
}
