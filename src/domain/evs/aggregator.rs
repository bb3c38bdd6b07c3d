//! EVS Aggregator - folds wire events into the per-user state.
//!
//! Contract: `fold(state, event) -> outcome`. Malformed payloads for a
//! recognized type are rejected (the event should never have reached the
//! log); unrecognized types are skipped with a logged warning and folding
//! continues; duplicate event ids are no-ops.

use tracing::warn;

use crate::domain::events::{DecodeOutcome, SchemaRegistry};
use crate::domain::foundation::{DomainError, EventEnvelope};

use super::settings::AggregationSettings;
use super::state::{EmotionalVectorState, FoldOutcome};

/// Folds events into `EmotionalVectorState` through the schema registry.
pub struct EvsAggregator {
    registry: SchemaRegistry,
    settings: AggregationSettings,
}

impl EvsAggregator {
    /// Creates an aggregator with the given settings and the default
    /// schema registry.
    pub fn new(settings: AggregationSettings) -> Self {
        Self {
            registry: SchemaRegistry::new(),
            settings,
        }
    }

    /// Creates an aggregator with an explicit registry (for tests that
    /// register extra schema versions).
    pub fn with_registry(registry: SchemaRegistry, settings: AggregationSettings) -> Self {
        Self { registry, settings }
    }

    pub fn settings(&self) -> &AggregationSettings {
        &self.settings
    }

    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    /// Folds one event into the state.
    ///
    /// Returns `Skipped` (after logging a warning) for unknown event types
    /// or unregistered versions, `Duplicate` for already-applied event ids,
    /// and a `ValidationFailed` error for malformed payloads of known types.
    pub fn fold(
        &self,
        state: &mut EmotionalVectorState,
        event: &EventEnvelope,
    ) -> Result<FoldOutcome, DomainError> {
        match self.registry.decode(event)? {
            DecodeOutcome::Unknown => {
                warn!(
                    event_id = %event.event_id,
                    event_type = %event.event_type,
                    event_version = event.event_version,
                    stream_id = %event.stream_id,
                    "skipping event with unknown type/version"
                );
                Ok(FoldOutcome::Skipped)
            }
            DecodeOutcome::Decoded(payload) => Ok(state.fold_decoded(
                &event.event_id,
                event.timestamp,
                &payload,
                &self.settings,
            )),
        }
    }
}

impl Default for EvsAggregator {
    fn default() -> Self {
        Self::new(AggregationSettings::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{Timestamp, UserId};
    use serde_json::json;

    fn mood_event(user: UserId, score: f64, at: Timestamp) -> EventEnvelope {
        EventEnvelope::new(user, "MoodLogged", "test", json!({ "score": score }), at)
    }

    #[test]
    fn fold_applies_known_event() {
        let aggregator = EvsAggregator::default();
        let user = UserId::new();
        let mut state = EmotionalVectorState::new(user);

        let outcome = aggregator
            .fold(&mut state, &mood_event(user, 7.0, Timestamp::from_unix_secs(1000)))
            .unwrap();

        assert_eq!(outcome, FoldOutcome::Applied);
        assert_eq!(state.mood_count_7d(), 1);
    }

    #[test]
    fn fold_skips_unknown_event_type() {
        let aggregator = EvsAggregator::default();
        let user = UserId::new();
        let mut state = EmotionalVectorState::new(user);

        let event = EventEnvelope::new(
            user,
            "LegacyThingHappened",
            "test",
            json!({"anything": true}),
            Timestamp::from_unix_secs(1000),
        );

        let outcome = aggregator.fold(&mut state, &event).unwrap();
        assert_eq!(outcome, FoldOutcome::Skipped);
        assert_eq!(state.mood_count_7d(), 0);
    }

    #[test]
    fn fold_rejects_malformed_known_payload() {
        let aggregator = EvsAggregator::default();
        let user = UserId::new();
        let mut state = EmotionalVectorState::new(user);

        let event = EventEnvelope::new(
            user,
            "MoodLogged",
            "test",
            json!({"score": "seven"}),
            Timestamp::from_unix_secs(1000),
        );

        assert!(aggregator.fold(&mut state, &event).is_err());
        assert_eq!(state.mood_count_7d(), 0);
    }

    #[test]
    fn fold_redelivery_is_idempotent() {
        let aggregator = EvsAggregator::default();
        let user = UserId::new();
        let mut state = EmotionalVectorState::new(user);
        let event = mood_event(user, 4.0, Timestamp::from_unix_secs(1000));

        aggregator.fold(&mut state, &event).unwrap();
        let snapshot = state.to_snapshot();
        let outcome = aggregator.fold(&mut state, &event).unwrap();

        assert_eq!(outcome, FoldOutcome::Duplicate);
        assert_eq!(state.to_snapshot(), snapshot);
    }
}
