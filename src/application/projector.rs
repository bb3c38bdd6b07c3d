//! Event projector - materializes read models from the global event feed.
//!
//! A long-running consumer: poll `read_after(cursor)`, hand each event to
//! its per-type handler (one idempotent upsert keyed by the event), commit
//! the cursor after each event that was handled or dead-lettered. The feed
//! is globally ascending, so per-stream order is preserved. Delivery is
//! at-least-once; redelivery after a crash re-runs at most one handler,
//! and every handler replaces rather than duplicates.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use crate::domain::events::{DecodeOutcome, EventPayload, SchemaRegistry};
use crate::domain::foundation::{DomainError, EventEnvelope, Timestamp};
use crate::domain::projection::{
    CoachingSessionRow, JournalEntryRow, SessionStatus, TrendDirection, UserObjectiveRow,
};
use crate::ports::{CursorStore, DeadLetter, DeadLetterSink, EventStore, ProjectionCursor, ViewStore};

/// Polling, batching, and retry knobs for the projector.
#[derive(Debug, Clone)]
pub struct ProjectorSettings {
    /// How long to sleep when the feed is drained.
    pub poll_interval: Duration,
    /// Maximum events fetched per poll.
    pub batch_size: usize,
    /// Handler attempts before an event is dead-lettered.
    pub max_retries: u32,
    /// First retry delay; doubles per attempt.
    pub backoff_base: Duration,
    /// Upper bound on any single retry delay.
    pub backoff_cap: Duration,
}

impl Default for ProjectorSettings {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(250),
            batch_size: 100,
            max_retries: 3,
            backoff_base: Duration::from_millis(50),
            backoff_cap: Duration::from_millis(2000),
        }
    }
}

/// At-least-once consumer materializing journal, objective, and session
/// views.
pub struct EventProjector {
    event_store: Arc<dyn EventStore>,
    view_store: Arc<dyn ViewStore>,
    cursor_store: Arc<dyn CursorStore>,
    dead_letter: Arc<dyn DeadLetterSink>,
    registry: SchemaRegistry,
    settings: ProjectorSettings,
    shutdown: watch::Receiver<bool>,
}

impl EventProjector {
    pub fn new(
        event_store: Arc<dyn EventStore>,
        view_store: Arc<dyn ViewStore>,
        cursor_store: Arc<dyn CursorStore>,
        dead_letter: Arc<dyn DeadLetterSink>,
        settings: ProjectorSettings,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        Self {
            event_store,
            view_store,
            cursor_store,
            dead_letter,
            registry: SchemaRegistry::new(),
            settings,
            shutdown,
        }
    }

    /// Runs the poll loop until the shutdown signal flips to `true`.
    pub async fn run(&self) -> Result<(), DomainError> {
        let mut shutdown = self.shutdown.clone();
        let mut cursor = self.cursor_store.load().await?;
        info!(resumed = cursor.is_some(), "projector started");

        loop {
            if *shutdown.borrow() {
                break;
            }

            let batch = self
                .event_store
                .read_after(cursor.as_ref(), self.settings.batch_size)
                .await?;

            if batch.is_empty() {
                tokio::select! {
                    _ = shutdown.changed() => {}
                    _ = tokio::time::sleep(self.settings.poll_interval) => {}
                }
                continue;
            }

            for event in batch {
                if *shutdown.borrow() {
                    break;
                }
                self.process_with_retry(&event).await?;
                let next = ProjectionCursor::new(event.timestamp, event.event_id.clone());
                self.cursor_store.commit(next.clone()).await?;
                cursor = Some(next);
            }
        }

        info!("projector stopped");
        Ok(())
    }

    /// Drains everything currently in the feed, then returns. Used by
    /// tests and one-shot catch-up runs.
    pub async fn run_until_drained(&self) -> Result<(), DomainError> {
        let mut cursor = self.cursor_store.load().await?;
        loop {
            let batch = self
                .event_store
                .read_after(cursor.as_ref(), self.settings.batch_size)
                .await?;
            if batch.is_empty() {
                return Ok(());
            }
            for event in batch {
                self.process_with_retry(&event).await?;
                let next = ProjectionCursor::new(event.timestamp, event.event_id.clone());
                self.cursor_store.commit(next.clone()).await?;
                cursor = Some(next);
            }
        }
    }

    /// Handles one event, retrying transient failures with exponential
    /// backoff and dead-lettering when retries are exhausted or the
    /// failure is permanent. Returns `Err` only when the dead-letter sink
    /// itself fails.
    async fn process_with_retry(&self, event: &EventEnvelope) -> Result<(), DomainError> {
        let mut backoff = self.settings.backoff_base;
        let mut attempt = 0u32;

        loop {
            match self.handle(event).await {
                Ok(()) => return Ok(()),
                Err(e) if e.is_transient() && attempt < self.settings.max_retries => {
                    attempt += 1;
                    warn!(
                        event_id = %event.event_id,
                        attempt,
                        error = %e,
                        "transient projection failure, retrying"
                    );
                    tokio::time::sleep(backoff).await;
                    backoff = (backoff * 2).min(self.settings.backoff_cap);
                }
                Err(e) => {
                    error!(
                        event_id = %event.event_id,
                        event_type = %event.event_type,
                        stream_id = %event.stream_id,
                        error = %e,
                        "dead-lettering event"
                    );
                    self.dead_letter
                        .push(DeadLetter {
                            event: event.clone(),
                            reason: e.to_string(),
                            failed_at: Timestamp::now(),
                        })
                        .await?;
                    return Ok(());
                }
            }
        }
    }

    /// Dispatches one event to its view handler.
    async fn handle(&self, event: &EventEnvelope) -> Result<(), DomainError> {
        let payload = match self.registry.decode(event)? {
            DecodeOutcome::Decoded(payload) => payload,
            DecodeOutcome::Unknown => {
                warn!(
                    event_id = %event.event_id,
                    event_type = %event.event_type,
                    event_version = event.event_version,
                    "skipping event with unknown type/version"
                );
                return Ok(());
            }
        };

        match payload {
            EventPayload::MoodLogged(p) => {
                let prior = self
                    .view_store
                    .latest_journal_entry_before(
                        event.stream_id,
                        event.timestamp,
                        event.event_id.clone(),
                    )
                    .await?;
                let row = JournalEntryRow {
                    event_id: event.event_id.clone(),
                    user_id: event.stream_id,
                    score: p.score,
                    confidence: p.confidence,
                    notes: p.notes,
                    mood_trend: TrendDirection::from_scores(p.score, prior.map(|r| r.score)),
                    recorded_at: event.timestamp,
                };
                self.view_store.upsert_journal_entry(row).await?;
            }
            EventPayload::GoalSet(p) => {
                let row = UserObjectiveRow {
                    event_id: event.event_id.clone(),
                    user_id: event.stream_id,
                    title: p.title,
                    objective_type: p.objective_type,
                    set_at: event.timestamp,
                };
                self.view_store.upsert_objective(row).await?;
            }
            EventPayload::CoachingSessionStarted(p) => {
                let row = CoachingSessionRow {
                    event_id: event.event_id.clone(),
                    user_id: event.stream_id,
                    session_id: p.session_id,
                    status: SessionStatus::Started,
                    topic: p.topic,
                    summary: None,
                    duration_minutes: None,
                    started_at: event.timestamp,
                    completed_at: None,
                };
                self.view_store.upsert_coaching_session(row).await?;
            }
            EventPayload::CoachingSessionCompleted(p) => {
                // A completion without a known start still gets a row; the
                // start may arrive later (or was dead-lettered) and will
                // not overwrite a completed session.
                let existing = self.view_store.find_coaching_session(p.session_id).await?;
                let row = match existing {
                    Some(started) if started.status == SessionStatus::Started => {
                        CoachingSessionRow {
                            event_id: event.event_id.clone(),
                            status: SessionStatus::Completed,
                            summary: p.summary,
                            duration_minutes: p.duration_minutes,
                            completed_at: Some(event.timestamp),
                            ..started
                        }
                    }
                    Some(completed) => completed,
                    None => CoachingSessionRow {
                        event_id: event.event_id.clone(),
                        user_id: event.stream_id,
                        session_id: p.session_id,
                        status: SessionStatus::Completed,
                        topic: None,
                        summary: p.summary,
                        duration_minutes: p.duration_minutes,
                        started_at: event.timestamp,
                        completed_at: Some(event.timestamp),
                    },
                };
                self.view_store.upsert_coaching_session(row).await?;
            }
            EventPayload::ConfidenceScoreLogged(_) | EventPayload::ProfileCreated(_) => {
                // Folded into the EVS but not materialized as a view.
                debug!(
                    event_id = %event.event_id,
                    event_type = %event.event_type,
                    "no view for event type"
                );
            }
        }

        Ok(())
    }
}
