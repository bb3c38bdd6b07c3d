//! Dead-letter sink for events the projector gave up on.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{DomainError, EventEnvelope, Timestamp};

/// A parked event together with why it was parked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeadLetter {
    pub event: EventEnvelope,
    pub reason: String,
    pub failed_at: Timestamp,
}

/// Sink for events that exhausted their retries.
///
/// Parking an event lets the projector advance its cursor past it, so one
/// poison event never stalls the rest of the feed.
#[async_trait]
pub trait DeadLetterSink: Send + Sync {
    async fn push(&self, letter: DeadLetter) -> Result<(), DomainError>;

    /// Everything parked so far, in push order.
    async fn drain(&self) -> Result<Vec<DeadLetter>, DomainError>;
}
