//! # Value Objects
//!
//! Configuration and key layout for the ledger.
//!
//! ## Key Layout
//!
//! | Prefix | Content |
//! |--------|---------|
//! | `a:{id}` | Serialized asset record |
//! | `i:{composite}` | Secondary index entry (empty value) |

use super::errors::ConfigError;
use super::policy::{AccessPolicy, PolicySet};
use super::validation::ValidationRules;
use serde::{Deserialize, Serialize};

/// How range queries treat records that fail to deserialize.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryMode {
    /// Skip corrupt records and report them alongside the results.
    #[default]
    Lenient,
    /// Abort the scan at the first corrupt record.
    Strict,
}

/// Configuration for the ledger service.
///
/// All values have sensible defaults; policies default to
/// "administrators or the record owner may mutate".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LedgerConfig {
    /// Corrupt-record policy for `QueryAll` / `QueryRange` / `QueryByOwner`.
    pub query_mode: QueryMode,
    /// Ordered access policies evaluated before every mutation.
    pub policies: PolicySet,
    /// Input validation rules.
    pub validation: ValidationRules,
}

impl LedgerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the query mode.
    pub fn with_query_mode(mut self, mode: QueryMode) -> Self {
        self.query_mode = mode;
        self
    }

    /// Replace the access policies.
    pub fn with_policies(mut self, policies: PolicySet) -> Self {
        self.policies = policies;
        self
    }

    /// Replace the validation rules.
    pub fn with_validation(mut self, rules: ValidationRules) -> Self {
        self.validation = rules;
        self
    }

    /// Check cross-field constraints.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.validation.max_key_length == 0 {
            return Err(ConfigError::Invalid("max_key_length must be positive".into()));
        }
        self.policies.validate()
    }
}

/// Configuration file structure.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    #[serde(default)]
    query_mode: Option<QueryMode>,
    #[serde(default)]
    validation: Option<ValidationRules>,
    #[serde(default)]
    policies: Option<Vec<AccessPolicy>>,
}

impl From<ConfigFile> for LedgerConfig {
    fn from(file: ConfigFile) -> Self {
        Self {
            query_mode: file.query_mode.unwrap_or_default(),
            policies: file.policies.map(PolicySet::new).unwrap_or_default(),
            validation: file.validation.unwrap_or_default(),
        }
    }
}

#[cfg(feature = "toml-config")]
impl LedgerConfig {
    /// Parse configuration from a TOML string.
    ///
    /// # Config File Format
    ///
    /// ```toml
    /// query_mode = "strict"
    ///
    /// [validation]
    /// max_key_length = 64
    /// positive_fields = ["price", "size"]
    ///
    /// [[policies]]
    /// name = "it-admins"
    /// effect = "allow"
    /// operations = ["CreateAsset", "DeleteAsset"]
    /// condition = { any_of = [
    ///     { attribute_equals = { name = "role", value = "admin" } },
    ///     { attribute_equals = { name = "department", value = "IT" } },
    /// ] }
    /// ```
    ///
    /// Omitted sections fall back to their defaults.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let file: ConfigFile =
            toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        let config = LedgerConfig::from(file);
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<std::path::Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::Io {
            path: path.as_ref().display().to_string(),
            error: e.to_string(),
        })?;
        Self::from_toml_str(&content)
    }
}

/// Key prefixes for the key-value store.
///
/// All keys are prefixed to namespace different data types.
#[derive(Debug, Clone, Copy)]
pub enum KeyPrefix {
    /// Asset record: `a:{id}` -> serialized Asset
    Asset,
    /// Secondary index: `i:{composite key}` -> empty
    Index,
}

impl KeyPrefix {
    /// Get the byte prefix for this key type.
    pub fn as_bytes(&self) -> &'static [u8] {
        match self {
            KeyPrefix::Asset => b"a:",
            KeyPrefix::Index => b"i:",
        }
    }

    /// Build a full key with the given suffix.
    pub fn key(&self, suffix: &[u8]) -> Vec<u8> {
        let mut key = self.as_bytes().to_vec();
        key.extend_from_slice(suffix);
        key
    }

    /// Build an asset key from its id.
    pub fn asset_key(id: &str) -> Vec<u8> {
        KeyPrefix::Asset.key(id.as_bytes())
    }

    /// Build an index key from a composite key.
    pub fn index_key(composite: &str) -> Vec<u8> {
        KeyPrefix::Index.key(composite.as_bytes())
    }

    /// Strip this prefix from a stored key.
    pub fn strip<'a>(&self, key: &'a [u8]) -> Option<&'a [u8]> {
        key.strip_prefix(self.as_bytes())
    }

    /// Half-open store range `[start, end)` for asset ids `[start_id, end_id)`.
    ///
    /// An empty `end_id` means "to the last asset".
    pub fn asset_range(start_id: &str, end_id: &str) -> (Vec<u8>, Vec<u8>) {
        let start = KeyPrefix::asset_key(start_id);
        let end = if end_id.is_empty() {
            prefix_end(KeyPrefix::Asset.as_bytes())
        } else {
            KeyPrefix::asset_key(end_id)
        };
        (start, end)
    }
}

/// Smallest key strictly greater than every key starting with `prefix`.
///
/// Returns an empty vector (unbounded) when no such key exists.
pub fn prefix_end(prefix: &[u8]) -> Vec<u8> {
    let mut end = prefix.to_vec();
    while let Some(last) = end.pop() {
        if last < u8::MAX {
            end.push(last + 1);
            return end;
        }
    }
    end
}
