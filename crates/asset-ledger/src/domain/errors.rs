//! # Domain Errors
//!
//! Error types for the asset ledger.
//!
//! ## Taxonomy
//!
//! | Variant | Raised when |
//! |---------|-------------|
//! | `Validation` | Malformed or missing input |
//! | `AlreadyExists` | Create on a present key |
//! | `NotFound` | Mutation or read of an absent key |
//! | `AccessDenied` | The identity gate refused the caller |
//! | `Store` | The key-value substrate or history log failed |
//! | `Serialization` | Persisted bytes could not be decoded |
//!
//! Every variant names the operation and the key (or key range) involved.

use super::identity::Operation;
use thiserror::Error;

/// Errors returned by every ledger operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    /// Input rejected before touching the store.
    #[error("{operation}: invalid input for '{key}': {reason}")]
    Validation {
        operation: Operation,
        key: String,
        reason: String,
    },

    /// Create on a key that is currently present.
    #[error("{operation}: asset '{key}' already exists")]
    AlreadyExists { operation: Operation, key: String },

    /// The key is absent (or, for history, never existed).
    #[error("{operation}: asset '{key}' does not exist")]
    NotFound { operation: Operation, key: String },

    /// The identity gate denied the operation.
    #[error("{operation}: access denied for '{principal}' on '{key}': {reason}")]
    AccessDenied {
        operation: Operation,
        key: String,
        principal: String,
        reason: String,
    },

    /// Storage substrate failure, wrapped with operation context.
    #[error("{operation}: store failure on '{key}': {source}")]
    Store {
        operation: Operation,
        key: String,
        #[source]
        source: KVStoreError,
    },

    /// Corrupt persisted bytes.
    #[error("{operation}: corrupt record '{key}': {message}")]
    Serialization {
        operation: Operation,
        key: String,
        message: String,
    },
}

impl LedgerError {
    /// The operation that failed.
    pub fn operation(&self) -> Operation {
        match self {
            LedgerError::Validation { operation, .. }
            | LedgerError::AlreadyExists { operation, .. }
            | LedgerError::NotFound { operation, .. }
            | LedgerError::AccessDenied { operation, .. }
            | LedgerError::Store { operation, .. }
            | LedgerError::Serialization { operation, .. } => *operation,
        }
    }

    /// The key (or key range) the failure refers to.
    pub fn key(&self) -> &str {
        match self {
            LedgerError::Validation { key, .. }
            | LedgerError::AlreadyExists { key, .. }
            | LedgerError::NotFound { key, .. }
            | LedgerError::AccessDenied { key, .. }
            | LedgerError::Store { key, .. }
            | LedgerError::Serialization { key, .. } => key,
        }
    }

    pub(crate) fn store(
        operation: Operation,
        key: impl Into<String>,
        source: KVStoreError,
    ) -> Self {
        LedgerError::Store {
            operation,
            key: key.into(),
            source,
        }
    }

    pub(crate) fn serialization(
        operation: Operation,
        key: impl Into<String>,
        err: SerializationError,
    ) -> Self {
        LedgerError::Serialization {
            operation,
            key: key.into(),
            message: err.message,
        }
    }
}

/// Key-value store errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KVStoreError {
    /// I/O error during read/write.
    #[error("KV store I/O error: {message}")]
    IOError { message: String },

    /// Data corruption in the store.
    #[error("KV store corruption: {message}")]
    CorruptionError { message: String },

    /// The store cannot serve requests (closed, locked, unreachable).
    #[error("KV store unavailable: {message}")]
    Unavailable { message: String },
}

/// Serialization errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Serialization error: {message}")]
pub struct SerializationError {
    pub message: String,
}

impl SerializationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Failure to obtain the caller's identity from the authentication layer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentityError {
    /// No authenticated identity is attached to the invocation.
    #[error("no authenticated identity attached to the invocation")]
    Missing,

    /// The authentication layer could not produce an identity.
    #[error("identity resolution failed: {0}")]
    Unresolvable(String),
}

/// Configuration loading errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Config file could not be read.
    #[error("failed to read config {path}: {error}")]
    Io { path: String, error: String },

    /// Config file is not valid TOML / does not match the schema.
    #[error("failed to parse config: {0}")]
    Parse(String),

    /// Config parsed but violates a constraint.
    #[error("invalid config: {0}")]
    Invalid(String),
}
