//! Materialized view persistence port.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, EventId, Timestamp, UserId};
use crate::domain::projection::{CoachingSessionRow, JournalEntryRow, UserObjectiveRow};
use uuid::Uuid;

/// Storage for the projector's read models.
///
/// All upserts are idempotent on their key: journal entries and objectives
/// key on `event_id`, coaching sessions key on `session_id` so a completion
/// updates the row its start created. Re-upserting replaces, never
/// duplicates.
#[async_trait]
pub trait ViewStore: Send + Sync {
    async fn upsert_journal_entry(&self, row: JournalEntryRow) -> Result<(), DomainError>;

    async fn upsert_objective(&self, row: UserObjectiveRow) -> Result<(), DomainError>;

    async fn upsert_coaching_session(&self, row: CoachingSessionRow) -> Result<(), DomainError>;

    /// The user's journal entry with the greatest ordering key strictly
    /// below `(before_timestamp, before_event_id)`.
    ///
    /// The exclusive bound keeps trend derivation idempotent: a redelivered
    /// event never compares against the row it wrote itself.
    async fn latest_journal_entry_before(
        &self,
        user_id: UserId,
        before_timestamp: Timestamp,
        before_event_id: EventId,
    ) -> Result<Option<JournalEntryRow>, DomainError>;

    /// Looks up a session row by its session id.
    async fn find_coaching_session(
        &self,
        session_id: Uuid,
    ) -> Result<Option<CoachingSessionRow>, DomainError>;

    /// All journal entries for a user, ascending by `(recorded_at, event_id)`.
    async fn list_journal_entries(
        &self,
        user_id: UserId,
    ) -> Result<Vec<JournalEntryRow>, DomainError>;

    /// All objectives for a user, ascending by `(set_at, event_id)`.
    async fn list_objectives(
        &self,
        user_id: UserId,
    ) -> Result<Vec<UserObjectiveRow>, DomainError>;

    /// All coaching sessions for a user, ascending by `started_at`.
    async fn list_coaching_sessions(
        &self,
        user_id: UserId,
    ) -> Result<Vec<CoachingSessionRow>, DomainError>;
}
