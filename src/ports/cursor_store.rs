//! Projection cursor persistence.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{DomainError, EventId, Timestamp};

/// Position of the projector in the global event feed.
///
/// The cursor is the ordering key of the last event the projector finished
/// with (handled or dead-lettered). Committing it after each event bounds
/// redelivery after a crash to a single event; every handler is idempotent
/// so redelivery is harmless either way.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectionCursor {
    pub last_timestamp: Timestamp,
    pub last_event_id: EventId,
}

impl ProjectionCursor {
    pub fn new(last_timestamp: Timestamp, last_event_id: EventId) -> Self {
        Self {
            last_timestamp,
            last_event_id,
        }
    }

    /// Ordering key this cursor points at.
    pub fn ordering_key(&self) -> (Timestamp, &str) {
        (self.last_timestamp, self.last_event_id.as_str())
    }
}

/// Durable storage for the projector's position.
#[async_trait]
pub trait CursorStore: Send + Sync {
    /// Loads the committed cursor, `None` on first run.
    async fn load(&self) -> Result<Option<ProjectionCursor>, DomainError>;

    /// Commits the cursor. Must be durable before returning.
    async fn commit(&self, cursor: ProjectionCursor) -> Result<(), DomainError>;
}
