//! Replay engine - rebuilds a user's EVS from the event log.
//!
//! Replay is a single streaming pass: events are read page by page in
//! ascending `(timestamp, event_id)` order and folded one by one into a
//! fresh state, so memory stays proportional to one page plus the rolling
//! window rather than to stream length. Because folding dedupes by event
//! id and anchors its window to event time, a rebuilt state agrees with
//! the live-folded one at the same logical point.

use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

use crate::domain::evs::{EmotionalVectorState, EvsAggregator, FoldOutcome};
use crate::domain::foundation::{DomainError, Timestamp, UserId};
use crate::ports::{EventStore, ProjectionCursor};

/// Events fetched per stream read during a rebuild.
const DEFAULT_PAGE_SIZE: usize = 256;

/// Optional limits on how much work a single rebuild may do.
///
/// An exhausted budget stops the pass cleanly; the partial state is
/// returned with `complete = false` and must not be persisted as if it
/// were current.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReplayBudget {
    pub max_events: Option<usize>,
    pub deadline: Option<Instant>,
}

impl ReplayBudget {
    /// No limits; the pass runs to the end of the stream.
    pub fn unbounded() -> Self {
        Self::default()
    }

    pub fn with_max_events(mut self, max_events: usize) -> Self {
        self.max_events = Some(max_events);
        self
    }

    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    fn is_exhausted(&self, processed: usize) -> bool {
        if self.max_events.is_some_and(|max| processed >= max) {
            return true;
        }
        self.deadline.is_some_and(|d| Instant::now() >= d)
    }
}

/// Result of one rebuild pass.
#[derive(Debug)]
pub struct ReplayOutcome {
    pub state: EmotionalVectorState,
    /// False when the budget ran out before the stream did.
    pub complete: bool,
    pub applied: usize,
    pub duplicates: usize,
    pub skipped: usize,
    /// Malformed payloads of known types found in the log. They could not
    /// have been appended through the validated path, but replay must not
    /// die on a poisoned log.
    pub rejected: usize,
}

/// Rebuilds per-user state by streaming the event log.
pub struct ReplayEngine {
    event_store: Arc<dyn EventStore>,
    aggregator: EvsAggregator,
    page_size: usize,
}

impl ReplayEngine {
    pub fn new(event_store: Arc<dyn EventStore>, aggregator: EvsAggregator) -> Self {
        Self {
            event_store,
            aggregator,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// Overrides how many events each stream read fetches.
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Rebuilds one user's EVS from their stream.
    ///
    /// `since` bounds the read (pass `None` for the full stream); `budget`
    /// bounds the work. Unknown event types are skipped with a warning
    /// each; malformed payloads of known types are counted and skipped.
    pub async fn rebuild(
        &self,
        user_id: UserId,
        since: Option<Timestamp>,
        budget: ReplayBudget,
    ) -> Result<ReplayOutcome, DomainError> {
        let mut state = EmotionalVectorState::new(user_id);
        let mut applied = 0;
        let mut duplicates = 0;
        let mut skipped = 0;
        let mut rejected = 0;
        let mut processed = 0;
        let mut complete = true;
        let mut position: Option<ProjectionCursor> = None;

        'pages: loop {
            let batch = self
                .event_store
                .read_stream(user_id, since, position.as_ref(), self.page_size)
                .await?;
            let Some(last) = batch.last() else {
                break;
            };
            position = Some(ProjectionCursor::new(last.timestamp, last.event_id.clone()));

            for event in &batch {
                if budget.is_exhausted(processed) {
                    complete = false;
                    break 'pages;
                }
                processed += 1;

                match self.aggregator.fold(&mut state, event) {
                    Ok(FoldOutcome::Applied) => applied += 1,
                    Ok(FoldOutcome::Duplicate) => duplicates += 1,
                    Ok(FoldOutcome::Skipped) => skipped += 1,
                    Err(e) => {
                        warn!(
                            user_id = %user_id,
                            event_id = %event.event_id,
                            error = %e,
                            "skipping malformed event during replay"
                        );
                        rejected += 1;
                    }
                }
            }

            if batch.len() < self.page_size {
                break;
            }
        }

        info!(
            user_id = %user_id,
            applied,
            duplicates,
            skipped,
            rejected,
            complete,
            "replay pass finished"
        );

        Ok(ReplayOutcome {
            state,
            complete,
            applied,
            duplicates,
            skipped,
            rejected,
        })
    }
}
