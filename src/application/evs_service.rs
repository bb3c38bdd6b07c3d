//! EVS service - the single writer for per-user live state.
//!
//! One entry per user in a shared map, each behind its own async mutex:
//! folds for the same user are serialized, folds for different users run
//! in parallel. State is loaded lazily from the snapshot store, falling
//! back to a full replay when the snapshot is missing or corrupt.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::domain::evs::{EmotionalVectorState, EvsAggregator, EvsSnapshot, FoldOutcome};
use crate::domain::foundation::{DomainError, ErrorCode, EventEnvelope, UserId};
use crate::ports::{EventStore, SnapshotStore};

use super::replay::{ReplayBudget, ReplayEngine};

/// Dashboard read model: either the current EVS snapshot or an explicit
/// no-history marker. Requesting metrics for an unknown user is not an
/// error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DashboardMetrics {
    Ready { metrics: EvsSnapshot },
    InsufficientData,
}

type SharedState = Arc<Mutex<EmotionalVectorState>>;

/// Live folding service over the event log and snapshot store.
pub struct EvsService {
    event_store: Arc<dyn EventStore>,
    snapshot_store: Arc<dyn SnapshotStore>,
    aggregator: Arc<EvsAggregator>,
    replay: ReplayEngine,
    states: Mutex<HashMap<UserId, SharedState>>,
}

impl EvsService {
    pub fn new(
        event_store: Arc<dyn EventStore>,
        snapshot_store: Arc<dyn SnapshotStore>,
        aggregator: EvsAggregator,
    ) -> Self {
        let replay = ReplayEngine::new(
            Arc::clone(&event_store),
            EvsAggregator::new(aggregator.settings().clone()),
        );
        Self {
            event_store,
            snapshot_store,
            aggregator: Arc::new(aggregator),
            replay,
            states: Mutex::new(HashMap::new()),
        }
    }

    /// Appends an event to the log and folds it into the user's live state,
    /// then persists the refreshed snapshot.
    ///
    /// Append-time validation rejects malformed payloads before anything
    /// is written.
    pub async fn record_event(&self, envelope: EventEnvelope) -> Result<FoldOutcome, DomainError> {
        let user_id = envelope.stream_id;
        let state = self.state_entry(user_id).await?;
        let mut state = state.lock().await;

        self.event_store.append(envelope.clone()).await?;
        let outcome = self.aggregator.fold(&mut state, &envelope)?;

        if outcome == FoldOutcome::Applied {
            self.snapshot_store.save(state.to_snapshot()).await?;
        }
        debug!(user_id = %user_id, event_id = %envelope.event_id, ?outcome, "event recorded");
        Ok(outcome)
    }

    /// Current dashboard metrics for a user.
    ///
    /// A user with no folded history gets `InsufficientData`, never an
    /// error.
    pub async fn get_dashboard_metrics(
        &self,
        user_id: UserId,
    ) -> Result<DashboardMetrics, DomainError> {
        let state = self.state_entry(user_id).await?;
        let state = state.lock().await;

        if state.last_updated().is_none() {
            return Ok(DashboardMetrics::InsufficientData);
        }
        Ok(DashboardMetrics::Ready {
            metrics: state.to_snapshot(),
        })
    }

    /// Discards the in-memory state for a user and rebuilds it from the
    /// log, refreshing the persisted snapshot.
    pub async fn rebuild_user(&self, user_id: UserId) -> Result<(), DomainError> {
        let entry = self.state_entry(user_id).await?;
        let mut state = entry.lock().await;

        let outcome = self.replay.rebuild(user_id, None, ReplayBudget::unbounded()).await?;
        *state = outcome.state;
        self.snapshot_store.save(state.to_snapshot()).await?;
        Ok(())
    }

    /// Returns the shared entry for a user, loading it on first access.
    async fn state_entry(&self, user_id: UserId) -> Result<SharedState, DomainError> {
        {
            let states = self.states.lock().await;
            if let Some(entry) = states.get(&user_id) {
                return Ok(Arc::clone(entry));
            }
        }

        let loaded = self.load_state(user_id).await?;

        let mut states = self.states.lock().await;
        // A concurrent first access may have won the race; keep its entry.
        let entry = states
            .entry(user_id)
            .or_insert_with(|| Arc::new(Mutex::new(loaded)));
        Ok(Arc::clone(entry))
    }

    async fn load_state(&self, user_id: UserId) -> Result<EmotionalVectorState, DomainError> {
        match self.snapshot_store.load(user_id).await {
            Ok(Some(snapshot)) => return Ok(EmotionalVectorState::from_snapshot(snapshot)),
            Ok(None) => {}
            Err(e) if e.code == ErrorCode::CorruptSnapshot => {
                warn!(user_id = %user_id, error = %e, "corrupt snapshot, rebuilding from log");
            }
            Err(e) => return Err(e),
        }

        let outcome = self.replay.rebuild(user_id, None, ReplayBudget::unbounded()).await?;
        Ok(outcome.state)
    }
}
