//! EmotionalVectorState - rebuildable per-user derived state.
//!
//! The state is a pure function of the set of events it has folded: two
//! instances that folded the same set of events, in any arrival order and
//! with any amount of redelivery, are equal within floating tolerance.
//! To make that hold, the rolling 7-day window is anchored to the timestamp
//! of the most recent *folded* event, never to wall-clock time, and every
//! aggregate is recomputed from the raw samples retained in the window.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet, VecDeque};

use crate::domain::events::{EventPayload, MAX_SCORE, MIN_SCORE};
use crate::domain::foundation::{EventId, Timestamp, UserId};

use super::settings::{AggregationSettings, BurnoutWeights};

/// Result of folding one event into the state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FoldOutcome {
    /// The event changed the state.
    Applied,
    /// The event's id was already folded; the state is unchanged.
    Duplicate,
    /// The event does not contribute to the state (unknown type).
    Skipped,
}

/// A raw timestamped sample retained inside the rolling window.
///
/// Scores are normalized from the user-facing 1-10 scale to `[0, 1]`.
/// The event id is kept so ties on timestamp still order deterministically.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowSample {
    pub timestamp: Timestamp,
    pub event_id: String,
    pub score: f64,
}

/// A raw timestamped action occurrence retained inside the rolling window.
///
/// Counters are derived from these, not stored directly, so pruning stays
/// exact when the window slides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionOccurrence {
    pub timestamp: Timestamp,
    pub event_id: String,
}

/// Raw window internals carried by a snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowSnapshot {
    pub window_end: Option<Timestamp>,
    pub mood_samples: Vec<WindowSample>,
    pub confidence_samples: Vec<WindowSample>,
    pub actions: BTreeMap<String, Vec<ActionOccurrence>>,
    pub applied_event_ids: Vec<String>,
}

/// Serialized form of the full state, suitable for persistence and for UI
/// consumption (the derived fields are top-level).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvsSnapshot {
    pub user_id: UserId,
    pub mood_average_7d: f64,
    pub mood_count_7d: usize,
    pub confidence_trend: f64,
    pub actions_count_7d: BTreeMap<String, u64>,
    pub burnout_risk_score: f64,
    pub last_updated: Option<Timestamp>,
    pub window: WindowSnapshot,
}

/// Per-user derived emotional state, mutated only by folding events.
#[derive(Debug, Clone)]
pub struct EmotionalVectorState {
    user_id: UserId,

    // Raw window internals, sorted by (timestamp, event_id).
    window_end: Option<Timestamp>,
    mood_samples: Vec<WindowSample>,
    confidence_samples: Vec<WindowSample>,
    actions: BTreeMap<String, Vec<ActionOccurrence>>,

    // Bounded FIFO of recently applied event ids (dedup on redelivery).
    applied_order: VecDeque<String>,
    applied_set: HashSet<String>,

    // Derived aggregates, recomputed on every applied fold.
    mood_average_7d: f64,
    mood_count_7d: usize,
    confidence_trend: f64,
    actions_count_7d: BTreeMap<String, u64>,
    burnout_risk_score: f64,
    last_updated: Option<Timestamp>,
}

impl EmotionalVectorState {
    /// Creates an empty state for a user. Happens lazily on first event.
    pub fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            window_end: None,
            mood_samples: Vec::new(),
            confidence_samples: Vec::new(),
            actions: BTreeMap::new(),
            applied_order: VecDeque::new(),
            applied_set: HashSet::new(),
            mood_average_7d: 0.0,
            mood_count_7d: 0,
            confidence_trend: 0.0,
            actions_count_7d: BTreeMap::new(),
            burnout_risk_score: 0.0,
            last_updated: None,
        }
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Arithmetic mean of normalized mood samples in the window, `[0, 1]`.
    pub fn mood_average_7d(&self) -> f64 {
        self.mood_average_7d
    }

    /// Number of mood samples in the window.
    pub fn mood_count_7d(&self) -> usize {
        self.mood_count_7d
    }

    /// `latest - earliest` normalized confidence sample in the window.
    /// Positive means improving.
    pub fn confidence_trend(&self) -> f64 {
        self.confidence_trend
    }

    /// Count of action events per action type within the window.
    pub fn actions_count_7d(&self) -> &BTreeMap<String, u64> {
        &self.actions_count_7d
    }

    /// Burnout risk in `[0, 1]`, derived from the current window.
    pub fn burnout_risk_score(&self) -> f64 {
        self.burnout_risk_score
    }

    /// Timestamp of the most recent folded event (event time, not wall
    /// clock, so replayed state matches live state).
    pub fn last_updated(&self) -> Option<Timestamp> {
        self.last_updated
    }

    /// Whether this event id has already been folded.
    pub fn has_applied(&self, event_id: &EventId) -> bool {
        self.applied_set.contains(event_id.as_str())
    }

    /// Folds one decoded event into the state.
    ///
    /// Folding the same `event_id` twice is a no-op (`Duplicate`). The
    /// window end advances to the maximum folded timestamp, samples older
    /// than `window_end - window_days` are pruned, and all derived
    /// aggregates are recomputed from the surviving raw samples.
    pub fn fold_decoded(
        &mut self,
        event_id: &EventId,
        timestamp: Timestamp,
        payload: &EventPayload,
        settings: &AggregationSettings,
    ) -> FoldOutcome {
        if self.has_applied(event_id) {
            return FoldOutcome::Duplicate;
        }

        match payload {
            EventPayload::MoodLogged(p) => {
                insert_sample(&mut self.mood_samples, timestamp, event_id, p.score);
                if let Some(confidence) = p.confidence {
                    insert_sample(&mut self.confidence_samples, timestamp, event_id, confidence);
                }
            }
            EventPayload::ConfidenceScoreLogged(p) => {
                insert_sample(&mut self.confidence_samples, timestamp, event_id, p.score);
            }
            EventPayload::GoalSet(_)
            | EventPayload::CoachingSessionStarted(_)
            | EventPayload::CoachingSessionCompleted(_)
            | EventPayload::ProfileCreated(_) => {
                let occurrences = self.actions.entry(payload.kind().as_str().to_string()).or_default();
                let occurrence = ActionOccurrence {
                    timestamp,
                    event_id: event_id.as_str().to_string(),
                };
                let position = occurrences
                    .binary_search_by(|o| (o.timestamp, o.event_id.as_str()).cmp(&(timestamp, event_id.as_str())))
                    .unwrap_or_else(|p| p);
                occurrences.insert(position, occurrence);
            }
        }

        self.window_end = Some(match self.window_end {
            Some(end) if end >= timestamp => end,
            _ => timestamp,
        });

        self.prune(settings);
        self.recompute(settings);
        self.record_applied(event_id, settings.applied_ids_capacity);

        FoldOutcome::Applied
    }

    /// Pure function of the current window aggregates, clamped to `[0, 1]`.
    ///
    /// Components: mood deficit (`1 - mood_average`), confidence deficit
    /// (`1 - latest confidence`), negative confidence-trend magnitude, and
    /// an action-cadence gap flag. Empty mood/confidence windows contribute
    /// a neutral 0.5 deficit.
    pub fn calculate_burnout_risk(&self, weights: &BurnoutWeights, cadence_gap_days: i64) -> f64 {
        let mood_deficit = if self.mood_samples.is_empty() {
            0.5
        } else {
            1.0 - self.mood_average_7d
        };

        let confidence_deficit = match self.confidence_samples.last() {
            Some(sample) => 1.0 - sample.score,
            None => 0.5,
        };

        let trend_decline = (-self.confidence_trend).clamp(0.0, 1.0);

        let cadence_gap = match (self.latest_action_timestamp(), self.window_end) {
            (Some(latest), Some(end)) => {
                if latest < end.minus_days(cadence_gap_days) {
                    1.0
                } else {
                    0.0
                }
            }
            _ => 1.0,
        };

        let risk = weights.mood_deficit * mood_deficit
            + weights.confidence_deficit * confidence_deficit
            + weights.trend_decline * trend_decline
            + weights.cadence_gap * cadence_gap;

        risk.clamp(0.0, 1.0)
    }

    /// Serializes the full state for persistence/transport.
    pub fn to_snapshot(&self) -> EvsSnapshot {
        EvsSnapshot {
            user_id: self.user_id,
            mood_average_7d: self.mood_average_7d,
            mood_count_7d: self.mood_count_7d,
            confidence_trend: self.confidence_trend,
            actions_count_7d: self.actions_count_7d.clone(),
            burnout_risk_score: self.burnout_risk_score,
            last_updated: self.last_updated,
            window: WindowSnapshot {
                window_end: self.window_end,
                mood_samples: self.mood_samples.clone(),
                confidence_samples: self.confidence_samples.clone(),
                actions: self.actions.clone(),
                applied_event_ids: self.applied_order.iter().cloned().collect(),
            },
        }
    }

    /// Restores a state exactly from a snapshot.
    pub fn from_snapshot(snapshot: EvsSnapshot) -> Self {
        let applied_order: VecDeque<String> = snapshot.window.applied_event_ids.into();
        let applied_set: HashSet<String> = applied_order.iter().cloned().collect();

        Self {
            user_id: snapshot.user_id,
            window_end: snapshot.window.window_end,
            mood_samples: snapshot.window.mood_samples,
            confidence_samples: snapshot.window.confidence_samples,
            actions: snapshot.window.actions,
            applied_order,
            applied_set,
            mood_average_7d: snapshot.mood_average_7d,
            mood_count_7d: snapshot.mood_count_7d,
            confidence_trend: snapshot.confidence_trend,
            actions_count_7d: snapshot.actions_count_7d,
            burnout_risk_score: snapshot.burnout_risk_score,
            last_updated: snapshot.last_updated,
        }
    }

    /// Numeric equality within tolerance, exact on counts. Used by the
    /// reconstruction-equivalence checks.
    pub fn approx_eq(&self, other: &Self, tolerance: f64) -> bool {
        self.user_id == other.user_id
            && (self.mood_average_7d - other.mood_average_7d).abs() <= tolerance
            && self.mood_count_7d == other.mood_count_7d
            && (self.confidence_trend - other.confidence_trend).abs() <= tolerance
            && (self.burnout_risk_score - other.burnout_risk_score).abs() <= tolerance
            && self.actions_count_7d == other.actions_count_7d
    }

    fn latest_action_timestamp(&self) -> Option<Timestamp> {
        self.actions
            .values()
            .filter_map(|occurrences| occurrences.last())
            .map(|o| o.timestamp)
            .max()
    }

    fn prune(&mut self, settings: &AggregationSettings) {
        let Some(end) = self.window_end else {
            return;
        };
        let cutoff = end.minus_days(settings.window_days);

        self.mood_samples.retain(|s| s.timestamp >= cutoff);
        self.confidence_samples.retain(|s| s.timestamp >= cutoff);
        for occurrences in self.actions.values_mut() {
            occurrences.retain(|o| o.timestamp >= cutoff);
        }
        self.actions.retain(|_, occurrences| !occurrences.is_empty());
    }

    fn recompute(&mut self, settings: &AggregationSettings) {
        self.mood_count_7d = self.mood_samples.len();
        self.mood_average_7d = if self.mood_samples.is_empty() {
            0.0
        } else {
            let sum: f64 = self.mood_samples.iter().map(|s| s.score).sum();
            sum / self.mood_samples.len() as f64
        };

        self.confidence_trend = match (self.confidence_samples.first(), self.confidence_samples.last()) {
            (Some(earliest), Some(latest)) if self.confidence_samples.len() >= 2 => {
                latest.score - earliest.score
            }
            _ => 0.0,
        };

        self.actions_count_7d = self
            .actions
            .iter()
            .map(|(kind, occurrences)| (kind.clone(), occurrences.len() as u64))
            .collect();

        self.last_updated = self.window_end;
        self.burnout_risk_score =
            self.calculate_burnout_risk(&settings.burnout, settings.cadence_gap_days);
    }

    fn record_applied(&mut self, event_id: &EventId, capacity: usize) {
        if capacity == 0 {
            return;
        }
        while self.applied_order.len() >= capacity {
            if let Some(evicted) = self.applied_order.pop_front() {
                self.applied_set.remove(&evicted);
            }
        }
        self.applied_order.push_back(event_id.as_str().to_string());
        self.applied_set.insert(event_id.as_str().to_string());
    }
}

/// Normalizes a 1-10 scale score into `[0, 1]`.
pub(crate) fn normalize_score(score: f64) -> f64 {
    ((score - MIN_SCORE) / (MAX_SCORE - MIN_SCORE)).clamp(0.0, 1.0)
}

fn insert_sample(samples: &mut Vec<WindowSample>, timestamp: Timestamp, event_id: &EventId, raw_score: f64) {
    let sample = WindowSample {
        timestamp,
        event_id: event_id.as_str().to_string(),
        score: normalize_score(raw_score),
    };
    let position = samples
        .binary_search_by(|s| (s.timestamp, s.event_id.as_str()).cmp(&(timestamp, event_id.as_str())))
        .unwrap_or_else(|p| p);
    samples.insert(position, sample);
}
