//! In-memory materialized view store.

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::foundation::{DomainError, EventId, Timestamp, UserId};
use crate::domain::projection::{CoachingSessionRow, JournalEntryRow, UserObjectiveRow};
use crate::ports::ViewStore;

/// Reference view store: three keyed maps, one per view.
///
/// Journal entries and objectives key on `event_id`; coaching sessions key
/// on `session_id`. Upserts replace on key collision, which is what makes
/// redelivery produce exactly one row.
pub struct InMemoryViewStore {
    inner: RwLock<Inner>,
}

#[derive(Default)]
struct Inner {
    journal: HashMap<String, JournalEntryRow>,
    objectives: HashMap<String, UserObjectiveRow>,
    sessions: HashMap<Uuid, CoachingSessionRow>,
}

impl InMemoryViewStore {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner::default()),
        }
    }
}

impl Default for InMemoryViewStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ViewStore for InMemoryViewStore {
    async fn upsert_journal_entry(&self, row: JournalEntryRow) -> Result<(), DomainError> {
        let mut inner = self.inner.write().await;
        inner.journal.insert(row.event_id.as_str().to_string(), row);
        Ok(())
    }

    async fn upsert_objective(&self, row: UserObjectiveRow) -> Result<(), DomainError> {
        let mut inner = self.inner.write().await;
        inner
            .objectives
            .insert(row.event_id.as_str().to_string(), row);
        Ok(())
    }

    async fn upsert_coaching_session(&self, row: CoachingSessionRow) -> Result<(), DomainError> {
        let mut inner = self.inner.write().await;
        inner.sessions.insert(row.session_id, row);
        Ok(())
    }

    async fn latest_journal_entry_before(
        &self,
        user_id: UserId,
        before_timestamp: Timestamp,
        before_event_id: EventId,
    ) -> Result<Option<JournalEntryRow>, DomainError> {
        let inner = self.inner.read().await;
        let bound = (before_timestamp, before_event_id.as_str().to_string());
        Ok(inner
            .journal
            .values()
            .filter(|row| row.user_id == user_id)
            .filter(|row| (row.recorded_at, row.event_id.as_str().to_string()) < bound)
            .max_by(|a, b| {
                (a.recorded_at, a.event_id.as_str()).cmp(&(b.recorded_at, b.event_id.as_str()))
            })
            .cloned())
    }

    async fn find_coaching_session(
        &self,
        session_id: Uuid,
    ) -> Result<Option<CoachingSessionRow>, DomainError> {
        let inner = self.inner.read().await;
        Ok(inner.sessions.get(&session_id).cloned())
    }

    async fn list_journal_entries(
        &self,
        user_id: UserId,
    ) -> Result<Vec<JournalEntryRow>, DomainError> {
        let inner = self.inner.read().await;
        let mut rows: Vec<JournalEntryRow> = inner
            .journal
            .values()
            .filter(|row| row.user_id == user_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| {
            (a.recorded_at, a.event_id.as_str()).cmp(&(b.recorded_at, b.event_id.as_str()))
        });
        Ok(rows)
    }

    async fn list_objectives(
        &self,
        user_id: UserId,
    ) -> Result<Vec<UserObjectiveRow>, DomainError> {
        let inner = self.inner.read().await;
        let mut rows: Vec<UserObjectiveRow> = inner
            .objectives
            .values()
            .filter(|row| row.user_id == user_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| (a.set_at, a.event_id.as_str()).cmp(&(b.set_at, b.event_id.as_str())));
        Ok(rows)
    }

    async fn list_coaching_sessions(
        &self,
        user_id: UserId,
    ) -> Result<Vec<CoachingSessionRow>, DomainError> {
        let inner = self.inner.read().await;
        let mut rows: Vec<CoachingSessionRow> = inner
            .sessions
            .values()
            .filter(|row| row.user_id == user_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| {
            (a.started_at, a.event_id.as_str()).cmp(&(b.started_at, b.event_id.as_str()))
        });
        Ok(rows)
    }
}
