//! # Caller Identity
//!
//! The resolved, already-authenticated identity of an invocation, and the
//! named operations the ledger exposes.
//!
//! Certificate parsing and trust-chain validation happen in the host's
//! authentication layer. The ledger only ever sees the result.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Every named operation of the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Operation {
    CreateAsset,
    UpdateAsset,
    TransferAsset,
    DeleteAsset,
    AssetExists,
    ReadAsset,
    QueryAll,
    QueryRange,
    QueryByOwner,
    GetHistory,
}

impl Operation {
    /// Operations that change state and must pass the identity gate.
    pub const MUTATING: [Operation; 4] = [
        Operation::CreateAsset,
        Operation::UpdateAsset,
        Operation::TransferAsset,
        Operation::DeleteAsset,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::CreateAsset => "CreateAsset",
            Operation::UpdateAsset => "UpdateAsset",
            Operation::TransferAsset => "TransferAsset",
            Operation::DeleteAsset => "DeleteAsset",
            Operation::AssetExists => "AssetExists",
            Operation::ReadAsset => "ReadAsset",
            Operation::QueryAll => "QueryAll",
            Operation::QueryRange => "QueryRange",
            Operation::QueryByOwner => "QueryByOwner",
            Operation::GetHistory => "GetHistory",
        }
    }

    pub fn is_mutating(&self) -> bool {
        Self::MUTATING.contains(self)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Authenticated caller identity, derived once per invocation.
///
/// Never persisted, never mutated by the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityContext {
    /// Unique principal id (e.g. the subject of the client certificate).
    pub principal_id: String,
    /// Organization / tenant (MSP id).
    pub organization_id: String,
    /// Named attributes (role, department, ...).
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
}

impl IdentityContext {
    pub fn new(principal_id: impl Into<String>, organization_id: impl Into<String>) -> Self {
        Self {
            principal_id: principal_id.into(),
            organization_id: organization_id.into(),
            attributes: BTreeMap::new(),
        }
    }

    /// Builder method to add an attribute.
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// A principal id is resolvable when it is non-blank.
    pub fn is_resolved(&self) -> bool {
        !self.principal_id.trim().is_empty()
    }
}
