//! # Domain Layer
//!
//! Pure domain logic for the asset ledger.
//! Nothing here touches storage; every function is deterministic.
//!
//! ## Modules
//!
//! - `entities` - Asset, update payload, history entries
//! - `identity` - Resolved caller identity and operation names
//! - `policy` - Identity gate (attribute-based access policies)
//! - `validation` - Input validation rules
//! - `composite_key` - Multi-attribute keys for secondary indexes
//! - `config` - Service configuration and key layout
//! - `errors` - Domain error types

pub mod composite_key;
pub mod config;
pub mod entities;
pub mod errors;
pub mod identity;
pub mod policy;
pub mod validation;
