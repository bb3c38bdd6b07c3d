//! Recommendation service - runs the decision engine over a recent window.

use std::collections::VecDeque;
use std::sync::Arc;
use tracing::debug;

use crate::domain::foundation::{DomainError, EventEnvelope, UserId};
use crate::domain::renaissance::{RenaissanceAnalysis, RenaissanceEngine};
use crate::ports::{EventStore, ProjectionCursor};

/// Events fetched per stream read while locating the recent window.
const LOOKBACK_PAGE_SIZE: usize = 256;

/// Bounds on the recent-event window fed to the engine.
#[derive(Debug, Clone, Copy)]
pub struct LookbackSettings {
    /// Window width in days, counted back from the user's latest event.
    pub days: i64,
    /// Maximum number of events fed to the engine.
    pub limit: usize,
}

impl Default for LookbackSettings {
    fn default() -> Self {
        Self {
            days: 14,
            limit: 100,
        }
    }
}

/// Read-side service invoking the pure decision engine.
pub struct RecommendationService {
    event_store: Arc<dyn EventStore>,
    engine: RenaissanceEngine,
    lookback: LookbackSettings,
}

impl RecommendationService {
    pub fn new(
        event_store: Arc<dyn EventStore>,
        engine: RenaissanceEngine,
        lookback: LookbackSettings,
    ) -> Self {
        Self {
            event_store,
            engine,
            lookback,
        }
    }

    /// Analyzes the user's recent window and returns the verdict.
    ///
    /// The window is anchored to the user's latest event timestamp (event
    /// time), so the same log always yields the same analysis. An empty or
    /// thin window yields the insufficient-data analysis, not an error.
    pub async fn get_renaissance_recommendations(
        &self,
        user_id: UserId,
    ) -> Result<RenaissanceAnalysis, DomainError> {
        // Page through the stream keeping only the newest `limit` events;
        // the full history never sits in memory at once.
        let mut tail: VecDeque<EventEnvelope> = VecDeque::with_capacity(self.lookback.limit);
        let mut position: Option<ProjectionCursor> = None;
        loop {
            let batch = self
                .event_store
                .read_stream(user_id, None, position.as_ref(), LOOKBACK_PAGE_SIZE)
                .await?;
            let Some(last) = batch.last() else {
                break;
            };
            position = Some(ProjectionCursor::new(last.timestamp, last.event_id.clone()));
            let drained = batch.len() < LOOKBACK_PAGE_SIZE;

            for event in batch {
                if tail.len() >= self.lookback.limit {
                    tail.pop_front();
                }
                tail.push_back(event);
            }
            if drained {
                break;
            }
        }

        let Some(latest) = tail.back().map(|e| e.timestamp) else {
            debug!(user_id = %user_id, "no history, returning insufficient data");
            return Ok(RenaissanceAnalysis::insufficient_data());
        };

        let since = latest.minus_days(self.lookback.days);
        let window: Vec<EventEnvelope> =
            tail.into_iter().filter(|e| e.timestamp >= since).collect();

        Ok(self.engine.analyze(&window, latest))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryEventStore;
    use crate::domain::foundation::{EventEnvelope, EventId, Timestamp};
    use serde_json::json;

    fn service(store: Arc<InMemoryEventStore>) -> RecommendationService {
        RecommendationService::new(
            store as Arc<dyn EventStore>,
            RenaissanceEngine::default(),
            LookbackSettings::default(),
        )
    }

    fn mood_event(user: UserId, id: &str, day: i64, score: f64, notes: Option<&str>) -> EventEnvelope {
        let mut payload = json!({ "score": score, "confidence": score });
        if let Some(n) = notes {
            payload["notes"] = json!(n);
        }
        EventEnvelope::new(
            user,
            "MoodLogged",
            "test",
            payload,
            Timestamp::from_unix_secs(1_700_000_000).plus_days(day),
        )
        .with_event_id(EventId::from_string(id))
    }

    #[tokio::test]
    async fn empty_history_yields_insufficient_data() {
        let store = Arc::new(InMemoryEventStore::new());
        let analysis = service(store)
            .get_renaissance_recommendations(UserId::new())
            .await
            .unwrap();

        assert!(analysis.is_insufficient_data());
    }

    #[tokio::test]
    async fn distressed_recent_window_triggers() {
        let store = Arc::new(InMemoryEventStore::new());
        let user = UserId::new();
        store.append(mood_event(user, "e1", 0, 2.0, Some("Je suis bloqué"))).await.unwrap();
        store.append(mood_event(user, "e2", 1, 3.0, Some("Encore un échec"))).await.unwrap();
        store.append(mood_event(user, "e3", 2, 1.0, Some("Le désespoir"))).await.unwrap();

        let analysis = service(store)
            .get_renaissance_recommendations(user)
            .await
            .unwrap();

        assert!(analysis.should_trigger);
    }

    #[tokio::test]
    async fn window_keeps_only_the_newest_events_up_to_the_limit() {
        let store = Arc::new(InMemoryEventStore::new());
        let user = UserId::new();
        // Three distressed events followed by three calm ones; with the
        // limit at three only the calm tail reaches the engine.
        let history = [
            (1.0, Some("échec")),
            (1.0, Some("désespoir")),
            (1.0, Some("bloqué")),
            (7.0, None),
            (8.0, None),
            (7.0, None),
        ];
        for (i, (score, notes)) in history.into_iter().enumerate() {
            store
                .append(mood_event(user, &format!("e{i}"), i as i64, score, notes))
                .await
                .unwrap();
        }

        let service = RecommendationService::new(
            Arc::clone(&store) as Arc<dyn EventStore>,
            RenaissanceEngine::default(),
            LookbackSettings { days: 14, limit: 3 },
        );
        let analysis = service.get_renaissance_recommendations(user).await.unwrap();

        assert!(!analysis.should_trigger);
        assert_eq!(analysis.analysis_details.keyword.unwrap().hit_count, 0);
    }

    #[tokio::test]
    async fn old_events_outside_lookback_are_ignored() {
        let store = Arc::new(InMemoryEventStore::new());
        let user = UserId::new();
        // Two distressed events far in the past, one recent neutral one:
        // the window only contains the recent event.
        store.append(mood_event(user, "e1", 0, 1.0, Some("échec"))).await.unwrap();
        store.append(mood_event(user, "e2", 1, 1.0, Some("échec"))).await.unwrap();
        store.append(mood_event(user, "e3", 60, 6.0, None)).await.unwrap();

        let analysis = service(store)
            .get_renaissance_recommendations(user)
            .await
            .unwrap();

        assert!(analysis.is_insufficient_data());
    }
}
