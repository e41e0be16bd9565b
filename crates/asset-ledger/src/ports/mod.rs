//! # Ports Layer
//!
//! Defines the port traits for the asset ledger.
//!
//! ## Hexagonal Architecture
//!
//! - `inbound.rs` - Driving ports (operations exposed to the host)
//! - `outbound.rs` - Driven ports (collaborators the host supplies)

pub mod inbound;
pub mod outbound;
