//! In-memory append-only event log.

use async_trait::async_trait;
use std::collections::HashSet;
use tokio::sync::RwLock;

use crate::domain::events::DecodeOutcome;
use crate::domain::events::SchemaRegistry;
use crate::domain::foundation::{DomainError, ErrorCode, EventEnvelope, Timestamp, UserId};
use crate::ports::{EventStore, ProjectionCursor};

/// Reference event log: a single vector kept sorted by
/// `(timestamp, event_id)` with an id index for duplicate rejection.
///
/// Appends validate known payloads through the schema registry before
/// writing, so malformed events of recognized types never reach the log.
/// Unknown event types are accepted as-is (future producers must be able
/// to write ahead of this reader's schema knowledge).
pub struct InMemoryEventStore {
    registry: SchemaRegistry,
    inner: RwLock<Inner>,
}

#[derive(Default)]
struct Inner {
    events: Vec<EventEnvelope>,
    ids: HashSet<String>,
}

impl InMemoryEventStore {
    pub fn new() -> Self {
        Self {
            registry: SchemaRegistry::new(),
            inner: RwLock::new(Inner::default()),
        }
    }

    /// Number of events in the log.
    pub async fn len(&self) -> usize {
        self.inner.read().await.events.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.events.is_empty()
    }
}

impl Default for InMemoryEventStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventStore for InMemoryEventStore {
    async fn append(&self, envelope: EventEnvelope) -> Result<(), DomainError> {
        // Malformed payloads of known types are rejected before write;
        // unknown types pass through untouched.
        match self.registry.decode(&envelope)? {
            DecodeOutcome::Decoded(_) | DecodeOutcome::Unknown => {}
        }

        let mut inner = self.inner.write().await;
        if inner.ids.contains(envelope.event_id.as_str()) {
            return Err(DomainError::new(
                ErrorCode::DuplicateEvent,
                format!("event {} already appended", envelope.event_id),
            )
            .with_detail("event_id", envelope.event_id.as_str()));
        }

        inner.ids.insert(envelope.event_id.as_str().to_string());
        let position = inner
            .events
            .binary_search_by(|e| e.ordering_key().cmp(&envelope.ordering_key()))
            .unwrap_or_else(|p| p);
        inner.events.insert(position, envelope);
        Ok(())
    }

    async fn read_stream(
        &self,
        user_id: UserId,
        since: Option<Timestamp>,
        after: Option<&ProjectionCursor>,
        limit: usize,
    ) -> Result<Vec<EventEnvelope>, DomainError> {
        let inner = self.inner.read().await;
        Ok(inner
            .events
            .iter()
            .filter(|e| e.stream_id == user_id)
            .filter(|e| since.map_or(true, |s| e.timestamp >= s))
            .filter(|e| match after {
                Some(c) => e.ordering_key() > c.ordering_key(),
                None => true,
            })
            .take(limit)
            .cloned()
            .collect())
    }

    async fn read_after(
        &self,
        cursor: Option<&ProjectionCursor>,
        limit: usize,
    ) -> Result<Vec<EventEnvelope>, DomainError> {
        let inner = self.inner.read().await;
        Ok(inner
            .events
            .iter()
            .filter(|e| match cursor {
                Some(c) => e.ordering_key() > c.ordering_key(),
                None => true,
            })
            .take(limit)
            .cloned()
            .collect())
    }
}
