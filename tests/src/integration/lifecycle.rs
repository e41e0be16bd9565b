//! # Lifecycle Flows
//!
//! Full record lifecycle through the public API, checked against both the
//! current state and the history log.

#[cfg(test)]
mod tests {
    use crate::init_tracing;
    use asset_ledger::test_utils::{admin, invocation, sample_asset, EventRecorder};
    use asset_ledger::{
        event_types, Asset, AssetLedgerApi, AssetSerializer, AssetUpdate, ChangeKind, FieldValue,
        InMemoryLedger, LedgerConfig, LedgerError, Timestamp,
    };
    use parking_lot::Mutex;
    use std::sync::Arc;

    fn ledger() -> InMemoryLedger {
        init_tracing();
        InMemoryLedger::in_memory(LedgerConfig::default())
    }

    #[test]
    fn test_full_lifecycle_with_recreation() {
        let mut ledger = ledger();

        ledger
            .create_asset(
                &invocation(admin(), "tx1", 10),
                Asset::new("asset1", "Alice").with_field("price", 100),
            )
            .unwrap();
        ledger
            .transfer_asset(&invocation(admin(), "tx2", 20), "asset1", "Bob")
            .unwrap();
        ledger
            .update_asset(
                &invocation(admin(), "tx3", 30),
                "asset1",
                AssetUpdate::new().with_field("price", 250),
            )
            .unwrap();
        ledger
            .delete_asset(&invocation(admin(), "tx4", 40), "asset1")
            .unwrap();

        assert!(!ledger.asset_exists("asset1").unwrap());
        assert!(matches!(
            ledger.read_asset("asset1"),
            Err(LedgerError::NotFound { .. })
        ));

        ledger
            .create_asset(
                &invocation(admin(), "tx5", 50),
                Asset::new("asset1", "Carol").with_field("price", 1),
            )
            .unwrap();

        let entries: Vec<_> = ledger
            .get_history("asset1")
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(entries.len(), 5);
        assert_eq!(
            entries.iter().map(|e| e.change).collect::<Vec<_>>(),
            vec![
                ChangeKind::Create,
                ChangeKind::Transfer,
                ChangeKind::Update,
                ChangeKind::Delete,
                ChangeKind::Create
            ]
        );
        assert_eq!(
            entries.iter().map(|e| e.timestamp).collect::<Vec<_>>(),
            [10, 20, 30, 40, 50].map(Timestamp::from_secs).to_vec()
        );

        let decoded: Vec<Option<Asset>> = entries
            .iter()
            .map(|e| ledger.serializer().decode_entry(e).unwrap())
            .collect();
        assert_eq!(decoded[0].as_ref().unwrap().owner, "Alice");
        assert_eq!(decoded[1].as_ref().unwrap().owner, "Bob");
        assert_eq!(
            decoded[2].as_ref().unwrap().field("price"),
            Some(&FieldValue::Int(250))
        );
        assert!(decoded[3].is_none());
        assert_eq!(decoded[4].as_ref().unwrap().owner, "Carol");

        let current = ledger.read_asset("asset1").unwrap();
        assert_eq!(current.field("price"), Some(&FieldValue::Int(1)));
    }

    #[test]
    fn test_independent_keys_do_not_share_history() {
        let mut ledger = ledger();
        for id in ["a", "ab", "b"] {
            ledger
                .create_asset(&invocation(admin(), id, 1), sample_asset(id, "Alice"))
                .unwrap();
        }
        ledger
            .transfer_asset(&invocation(admin(), "t", 2), "ab", "Bob")
            .unwrap();

        assert_eq!(ledger.get_history("a").unwrap().count(), 1);
        assert_eq!(ledger.get_history("ab").unwrap().count(), 2);
        assert_eq!(ledger.get_history("b").unwrap().count(), 1);
    }

    #[test]
    fn test_event_payloads_are_camel_case_json() {
        let mut ledger = ledger();
        let payloads: Arc<Mutex<Vec<(String, serde_json::Value)>>> = Arc::default();
        let sink = Arc::clone(&payloads);
        ledger.set_event_publisher(move |event_type: &str, payload: Vec<u8>| {
            let value = serde_json::from_slice(&payload).map_err(|e| e.to_string())?;
            sink.lock().push((event_type.to_string(), value));
            Ok(())
        });

        ledger
            .create_asset(&invocation(admin(), "tx1", 1), sample_asset("asset1", "Alice"))
            .unwrap();
        ledger
            .transfer_asset(&invocation(admin(), "tx2", 2), "asset1", "Bob")
            .unwrap();

        let payloads = payloads.lock();
        assert_eq!(payloads.len(), 2);
        assert_eq!(payloads[0].0, event_types::ASSET_CREATED);
        assert!(payloads[0].1.get("previousOwner").is_none());
        assert_eq!(payloads[1].0, event_types::ASSET_TRANSFERRED);
        assert_eq!(
            payloads[1].1,
            serde_json::json!({
                "txId": "tx2",
                "key": "asset1",
                "owner": "Bob",
                "previousOwner": "Alice"
            })
        );
    }

    #[test]
    fn test_failed_operations_publish_nothing() {
        let mut ledger = ledger();
        let recorder = EventRecorder::new();
        ledger.set_event_publisher(recorder.publisher());

        let _ = ledger.update_asset(&invocation(admin(), "tx1", 1), "ghost", AssetUpdate::new());
        let _ = ledger.create_asset(
            &invocation(admin(), "tx2", 2),
            Asset::new("asset1", "Alice").with_field("price", -1),
        );

        assert!(recorder.events().is_empty());
    }
}
