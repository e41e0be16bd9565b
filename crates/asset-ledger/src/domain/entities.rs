//! # Domain Entities
//!
//! Core data structures of the ledger.
//!
//! ## Type Decisions
//!
//! - Domain fields are an ordered `BTreeMap<String, FieldValue>` rather than an
//!   open JSON object, so validation and serialization stay statically checked.
//! - `FieldValue` is a tagged scalar: text, integer, or boolean.
//! - A history value of `None` is a deletion tombstone.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Ordered mapping of field name to scalar value.
pub type AssetFields = BTreeMap<String, FieldValue>;

/// Scalar value of a domain field.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Bool(bool),
    Int(i64),
    Text(String),
}

impl FieldValue {
    pub fn as_int(&self) -> Option<i64> {
        match self {
            FieldValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(v) => Some(v),
            _ => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Bool(v) => write!(f, "{}", v),
            FieldValue::Int(v) => write!(f, "{}", v),
            FieldValue::Text(v) => write!(f, "{}", v),
        }
    }
}

impl From<bool> for FieldValue {
    fn from(v: bool) -> Self {
        FieldValue::Bool(v)
    }
}

impl From<i64> for FieldValue {
    fn from(v: i64) -> Self {
        FieldValue::Int(v)
    }
}

impl From<i32> for FieldValue {
    fn from(v: i32) -> Self {
        FieldValue::Int(v as i64)
    }
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        FieldValue::Text(v.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(v: String) -> Self {
        FieldValue::Text(v)
    }
}

/// A versioned record stored in the ledger.
///
/// ## Invariants
///
/// - `id` is non-empty and immutable once created
/// - `owner` is non-empty
/// - Between creation and deletion the record is always fully materialized
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Asset {
    /// Unique key of the record.
    pub id: String,
    /// Principal id of the current owner.
    pub owner: String,
    /// Domain fields (color, size, price, status, ...).
    #[serde(default)]
    pub fields: AssetFields,
}

impl Asset {
    pub fn new(id: impl Into<String>, owner: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            owner: owner.into(),
            fields: AssetFields::new(),
        }
    }

    /// Builder method to set a domain field.
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    pub fn field(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }
}

/// Replacement payload for `UpdateAsset`.
///
/// The field mapping is replaced wholesale. The owner is kept unless given.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetUpdate {
    pub owner: Option<String>,
    pub fields: AssetFields,
}

impl AssetUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_owner(mut self, owner: impl Into<String>) -> Self {
        self.owner = Some(owner.into());
        self
    }

    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// Apply this update on top of the current record.
    pub fn apply_to(self, current: &Asset) -> Asset {
        Asset {
            id: current.id.clone(),
            owner: self.owner.unwrap_or_else(|| current.owner.clone()),
            fields: self.fields,
        }
    }
}

/// Transaction timestamp (Unix epoch).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp {
    pub seconds: u64,
    pub nanos: u32,
}

impl Timestamp {
    pub fn new(seconds: u64, nanos: u32) -> Self {
        Self { seconds, nanos }
    }

    pub fn from_secs(seconds: u64) -> Self {
        Self { seconds, nanos: 0 }
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:09}", self.seconds, self.nanos)
    }
}

/// Kind of change a history entry records.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChangeKind {
    Create,
    Update,
    Transfer,
    Delete,
}

/// A mutation as handed to the history log, before it is positioned.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modification {
    pub tx_id: String,
    pub timestamp: Timestamp,
    pub change: ChangeKind,
    /// Serialized record after the change; `None` for a deletion.
    pub value: Option<Vec<u8>>,
}

/// One immutable entry of a key's history.
///
/// Identity: `(key, sequence)`. Sequences start at 1 and increase by one per
/// append for that key.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub key: String,
    pub sequence: u64,
    pub tx_id: String,
    pub timestamp: Timestamp,
    pub change: ChangeKind,
    /// Serialized record at this point; `None` marks a deletion.
    pub value: Option<Vec<u8>>,
}

impl HistoryEntry {
    pub fn from_modification(key: impl Into<String>, sequence: u64, m: Modification) -> Self {
        Self {
            key: key.into(),
            sequence,
            tx_id: m.tx_id,
            timestamp: m.timestamp,
            change: m.change,
            value: m.value,
        }
    }

    pub fn is_delete(&self) -> bool {
        self.value.is_none()
    }
}
