//! Append-only event log port.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, EventEnvelope, Timestamp, UserId};

use super::cursor_store::ProjectionCursor;

/// The append-only event log.
///
/// Events are immutable once appended; corrections are compensating events.
/// Reads are ordered by `(timestamp, event_id)` so every consumer agrees on
/// a single total order per stream. Delivery to consumers is at-least-once;
/// all consumers dedupe by `event_id`.
#[async_trait]
pub trait EventStore: Send + Sync {
    /// Appends one event.
    ///
    /// Rejects a duplicate `event_id` with `ErrorCode::DuplicateEvent`.
    /// Transient infrastructure failures surface as
    /// `ErrorCode::TransientStore` so callers can retry.
    async fn append(&self, envelope: EventEnvelope) -> Result<(), DomainError>;

    /// Reads one page of a user's stream in ascending
    /// `(timestamp, event_id)` order: events strictly after `after` (from
    /// the start of the stream when `None`), at or after `since`, at most
    /// `limit`. Callers page until a short or empty batch comes back, so a
    /// long history never has to fit in memory at once.
    async fn read_stream(
        &self,
        user_id: UserId,
        since: Option<Timestamp>,
        after: Option<&ProjectionCursor>,
        limit: usize,
    ) -> Result<Vec<EventEnvelope>, DomainError>;

    /// Reads the global feed strictly after `cursor` (from the beginning
    /// when `None`), ascending, at most `limit` events. Used by the
    /// projector.
    async fn read_after(
        &self,
        cursor: Option<&ProjectionCursor>,
        limit: usize,
    ) -> Result<Vec<EventEnvelope>, DomainError>;
}
