//! # Input Validation
//!
//! Checks run before any existence check or write.

use super::composite_key::COMPOSITE_KEY_NAMESPACE;
use super::entities::{Asset, AssetFields, FieldValue};
use super::errors::LedgerError;
use super::identity::Operation;
use serde::{Deserialize, Serialize};

/// Default maximum asset key length in bytes.
pub const DEFAULT_MAX_KEY_LENGTH: usize = 256;

/// Validation rules applied to incoming records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationRules {
    /// Maximum key length in bytes.
    pub max_key_length: usize,
    /// Fields that must be strictly positive when they hold an integer.
    pub positive_fields: Vec<String>,
}

impl Default for ValidationRules {
    fn default() -> Self {
        Self {
            max_key_length: DEFAULT_MAX_KEY_LENGTH,
            positive_fields: vec!["price".to_string()],
        }
    }
}

impl ValidationRules {
    pub fn validate_key(&self, operation: Operation, key: &str) -> Result<(), LedgerError> {
        let reason = if key.is_empty() {
            Some("key must not be empty".to_string())
        } else if key.len() > self.max_key_length {
            Some(format!(
                "key is {} bytes, max {}",
                key.len(),
                self.max_key_length
            ))
        } else if key.contains(COMPOSITE_KEY_NAMESPACE) {
            Some("key must not contain U+0000".to_string())
        } else {
            None
        };

        match reason {
            Some(reason) => Err(invalid(operation, key, reason)),
            None => Ok(()),
        }
    }

    pub fn validate_owner(
        &self,
        operation: Operation,
        key: &str,
        owner: &str,
    ) -> Result<(), LedgerError> {
        if owner.trim().is_empty() {
            return Err(invalid(operation, key, "owner must not be empty"));
        }
        if owner.contains(COMPOSITE_KEY_NAMESPACE) {
            return Err(invalid(operation, key, "owner must not contain U+0000"));
        }
        Ok(())
    }

    pub fn validate_fields(
        &self,
        operation: Operation,
        key: &str,
        fields: &AssetFields,
    ) -> Result<(), LedgerError> {
        if fields.keys().any(|name| name.is_empty()) {
            return Err(invalid(operation, key, "field names must not be empty"));
        }

        for name in &self.positive_fields {
            if let Some(FieldValue::Int(value)) = fields.get(name) {
                if *value <= 0 {
                    return Err(invalid(
                        operation,
                        key,
                        format!("{} must be positive, got {}", name, value),
                    ));
                }
            }
        }
        Ok(())
    }

    /// Validate a complete record.
    pub fn validate_asset(&self, operation: Operation, asset: &Asset) -> Result<(), LedgerError> {
        self.validate_key(operation, &asset.id)?;
        self.validate_owner(operation, &asset.id, &asset.owner)?;
        self.validate_fields(operation, &asset.id, &asset.fields)
    }
}

fn invalid(operation: Operation, key: &str, reason: impl Into<String>) -> LedgerError {
    LedgerError::Validation {
        operation,
        key: key.to_string(),
        reason: reason.into(),
    }
}
