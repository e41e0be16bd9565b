//! # Access Control Flows
//!
//! Policies loaded from TOML, enforced ahead of validation and existence
//! checks.

#[cfg(test)]
mod tests {
    use crate::init_tracing;
    use asset_ledger::test_utils::{admin, invocation, sample_asset};
    use asset_ledger::{
        AssetLedgerApi, AssetUpdate, ConfigError, IdentityContext, IdentityError, InMemoryLedger,
        Invocation, LedgerConfig, LedgerError, Operation,
    };

    const POLICIES: &str = r#"
        [[policies]]
        name = "no-org2"
        effect = "deny"
        condition = { organization_in = { organizations = ["Org2MSP"] } }

        [[policies]]
        name = "it-admins"
        effect = "allow"
        condition = { any_of = [
            { attribute_equals = { name = "role", value = "admin" } },
            { attribute_equals = { name = "department", value = "IT" } },
        ] }

        [[policies]]
        name = "owners-transfer"
        effect = "allow"
        operations = ["TransferAsset"]
        condition = "is_record_owner"
    "#;

    fn ledger() -> InMemoryLedger {
        init_tracing();
        InMemoryLedger::in_memory(LedgerConfig::from_toml_str(POLICIES).unwrap())
    }

    fn clerk(principal: &str) -> IdentityContext {
        IdentityContext::new(principal, "Org1MSP").with_attribute("role", "clerk")
    }

    fn denial(result: Result<(), LedgerError>) -> (Operation, String) {
        match result {
            Err(LedgerError::AccessDenied {
                operation, reason, ..
            }) => (operation, reason),
            other => panic!("expected AccessDenied, got {:?}", other),
        }
    }

    #[test]
    fn test_department_attribute_grants_create() {
        let mut ledger = ledger();
        let it_clerk = clerk("dana").with_attribute("department", "IT");

        ledger
            .create_asset(&invocation(it_clerk, "tx1", 1), sample_asset("asset1", "dana"))
            .unwrap();
        assert!(ledger.asset_exists("asset1").unwrap());
    }

    #[test]
    fn test_missing_attribute_is_named_in_denial() {
        let mut ledger = ledger();

        let (operation, reason) = denial(ledger.create_asset(
            &invocation(clerk("erin"), "tx1", 1),
            sample_asset("asset1", "erin"),
        ));

        assert_eq!(operation, Operation::CreateAsset);
        assert_eq!(reason, "missing attribute 'department'");
        assert!(!ledger.asset_exists("asset1").unwrap());
        assert!(ledger.get_history("asset1").is_err());
    }

    #[test]
    fn test_deny_policy_overrides_admin_role() {
        let mut ledger = ledger();
        let foreign_admin =
            IdentityContext::new("root", "Org2MSP").with_attribute("role", "admin");

        let (_, reason) = denial(ledger.create_asset(
            &invocation(foreign_admin, "tx1", 1),
            sample_asset("asset1", "root"),
        ));
        assert_eq!(reason, "denied by policy 'no-org2'");
    }

    #[test]
    fn test_owner_may_transfer_but_not_update() {
        let mut ledger = ledger();
        ledger
            .create_asset(&invocation(admin(), "tx1", 1), sample_asset("asset1", "erin"))
            .unwrap();

        ledger
            .transfer_asset(&invocation(clerk("erin"), "tx2", 2), "asset1", "frank")
            .unwrap();
        assert_eq!(ledger.read_asset("asset1").unwrap().owner, "frank");

        let (operation, _) = denial(ledger.update_asset(
            &invocation(clerk("frank"), "tx3", 3),
            "asset1",
            AssetUpdate::new().with_field("price", 1),
        ));
        assert_eq!(operation, Operation::UpdateAsset);
        assert_eq!(ledger.get_history("asset1").unwrap().count(), 2);
    }

    #[test]
    fn test_denial_precedes_validation_and_existence() {
        let mut ledger = ledger();
        let outsider = || invocation(clerk("erin"), "tx", 1);

        denial(ledger.create_asset(&outsider(), sample_asset("", "")));
        denial(ledger.delete_asset(&outsider(), "ghost"));
        denial(ledger.transfer_asset(&outsider(), "ghost", ""));
    }

    #[test]
    fn test_unauthenticated_caller_is_denied() {
        let mut ledger = ledger();
        let ctx = Invocation::unauthenticated(IdentityError::Unresolvable(
            "certificate expired".to_string(),
        ));

        match ledger.create_asset(&ctx, sample_asset("asset1", "Alice")) {
            Err(LedgerError::AccessDenied { reason, .. }) => {
                assert!(reason.contains("certificate expired"))
            }
            other => panic!("expected AccessDenied, got {:?}", other),
        }
    }

    #[test]
    fn test_reads_need_no_identity() {
        let mut ledger = ledger();
        ledger
            .create_asset(&invocation(admin(), "tx1", 1), sample_asset("asset1", "Alice"))
            .unwrap();

        assert!(ledger.read_asset("asset1").is_ok());
        assert_eq!(ledger.query_by_owner("Alice").unwrap().count(), 1);
        assert_eq!(ledger.get_history("asset1").unwrap().count(), 1);
    }

    #[test]
    fn test_config_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.toml");
        std::fs::write(&path, POLICIES).unwrap();

        let config = LedgerConfig::load(&path).unwrap();
        assert_eq!(config.policies.policies().len(), 3);

        assert!(matches!(
            LedgerConfig::load(dir.path().join("missing.toml")),
            Err(ConfigError::Io { .. })
        ));
        assert!(matches!(
            LedgerConfig::from_toml_str("query_mode = \"eager\""),
            Err(ConfigError::Parse(_))
        ));
    }
}
