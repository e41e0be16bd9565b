//! Invocation context and clocks.

use crate::domain::entities::Timestamp;
use crate::domain::errors::IdentityError;
use crate::domain::identity::IdentityContext;
use crate::ports::outbound::{TimeSource, TransactionContext};
use uuid::Uuid;

/// Default time source using system time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    fn now(&self) -> Timestamp {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| Timestamp::new(d.as_secs(), d.subsec_nanos()))
            .unwrap_or_default()
    }
}

/// Time source that always reports the same instant.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixedTimeSource(pub Timestamp);

impl TimeSource for FixedTimeSource {
    fn now(&self) -> Timestamp {
        self.0
    }
}

/// One invocation of the ledger by an already-authenticated caller.
///
/// Carries a random transaction id, the commit timestamp, and the identity
/// handed over by the authentication layer.
#[derive(Debug, Clone)]
pub struct Invocation {
    tx_id: String,
    timestamp: Timestamp,
    identity: Result<IdentityContext, IdentityError>,
}

impl Invocation {
    /// New invocation stamped with the system clock.
    pub fn new(identity: IdentityContext) -> Self {
        Self::with_time_source(identity, &SystemTimeSource)
    }

    pub fn with_time_source(identity: IdentityContext, clock: &dyn TimeSource) -> Self {
        Self {
            tx_id: Uuid::new_v4().to_string(),
            timestamp: clock.now(),
            identity: Ok(identity),
        }
    }

    /// Invocation whose identity could not be resolved.
    pub fn unauthenticated(error: IdentityError) -> Self {
        Self {
            tx_id: Uuid::new_v4().to_string(),
            timestamp: SystemTimeSource.now(),
            identity: Err(error),
        }
    }

    /// Override the transaction id.
    pub fn with_tx_id(mut self, tx_id: impl Into<String>) -> Self {
        self.tx_id = tx_id.into();
        self
    }

    /// Override the timestamp.
    pub fn at(mut self, timestamp: Timestamp) -> Self {
        self.timestamp = timestamp;
        self
    }
}

impl TransactionContext for Invocation {
    fn tx_id(&self) -> &str {
        &self.tx_id
    }

    fn timestamp(&self) -> Timestamp {
        self.timestamp
    }

    fn resolve_identity(&self) -> Result<IdentityContext, IdentityError> {
        self.identity.clone()
    }
}
