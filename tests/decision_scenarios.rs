//! End-to-end scenarios through the application services: the concrete
//! behaviors the product team signed off on.

use serde_json::json;
use std::sync::{Arc, Mutex};

use renaissance_core::adapters::memory::{InMemoryEventStore, InMemorySnapshotStore};
use renaissance_core::application::{
    DashboardMetrics, EvsService, LookbackSettings, RecommendationService, ReplayBudget,
    ReplayEngine,
};
use renaissance_core::domain::evs::{AggregationSettings, EvsAggregator};
use renaissance_core::domain::foundation::{EventEnvelope, EventId, Timestamp, UserId};
use renaissance_core::domain::renaissance::RenaissanceEngine;
use renaissance_core::ports::EventStore;

fn base_ts() -> Timestamp {
    Timestamp::from_unix_secs(1_700_000_000)
}

/// Collects formatted log output so tests can assert on emitted lines.
#[derive(Clone, Default)]
struct LogCapture {
    buffer: Arc<Mutex<Vec<u8>>>,
}

impl LogCapture {
    fn contents(&self) -> String {
        String::from_utf8_lossy(&self.buffer.lock().unwrap()).into_owned()
    }
}

impl std::io::Write for LogCapture {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.buffer.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for LogCapture {
    type Writer = LogCapture;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

fn mood_event(
    user: UserId,
    id: &str,
    day: i64,
    score: f64,
    notes: Option<&str>,
) -> EventEnvelope {
    let mut payload = json!({ "score": score });
    if let Some(n) = notes {
        payload["notes"] = json!(n);
    }
    EventEnvelope::new(user, "MoodLogged", "mobile", payload, base_ts().plus_days(day))
        .with_event_id(EventId::from_string(id))
}

fn recommendation_service(store: Arc<InMemoryEventStore>) -> RecommendationService {
    RecommendationService::new(
        store as Arc<dyn EventStore>,
        RenaissanceEngine::default(),
        LookbackSettings::default(),
    )
}

#[tokio::test]
async fn distressed_french_notes_trigger_an_intervention() {
    let store = Arc::new(InMemoryEventStore::new());
    let user = UserId::new();

    let distress = [
        ("e1", 0, 2.0, 3.0, "Je me sens bloqué, c'est l'impasse"),
        ("e2", 1, 3.0, 2.0, "Encore un échec à l'entretien"),
        ("e3", 2, 1.0, 1.0, "Le désespoir me gagne"),
    ];
    for (id, day, score, confidence, notes) in distress {
        let event = EventEnvelope::new(
            user,
            "MoodLogged",
            "mobile",
            json!({ "score": score, "confidence": confidence, "notes": notes }),
            base_ts().plus_days(day),
        )
        .with_event_id(EventId::from_string(id));
        store.append(event).await.unwrap();
    }

    let analysis = recommendation_service(store)
        .get_renaissance_recommendations(user)
        .await
        .unwrap();

    assert!(analysis.should_trigger);
    assert!(analysis.confidence_level >= 0.6);
    assert!(!analysis.recommendations.is_empty());
    let keyword = analysis.analysis_details.keyword.unwrap();
    assert!(keyword.above_threshold);
    assert!(keyword.matched_terms.contains(&"bloqué".to_string()));
}

#[tokio::test]
async fn positive_window_does_not_trigger() {
    let store = Arc::new(InMemoryEventStore::new());
    let user = UserId::new();

    store
        .append(mood_event(user, "e1", 0, 8.0, Some("Très bonne semaine")))
        .await
        .unwrap();
    store
        .append(mood_event(user, "e2", 1, 7.0, Some("Entretien réussi")))
        .await
        .unwrap();
    store
        .append(mood_event(user, "e3", 2, 9.0, Some("Pleine d'énergie")))
        .await
        .unwrap();

    let analysis = recommendation_service(store)
        .get_renaissance_recommendations(user)
        .await
        .unwrap();

    assert!(!analysis.should_trigger);
    assert!(analysis.confidence_level < 0.5);
}

#[tokio::test]
async fn single_event_history_reports_insufficient_data() {
    let store = Arc::new(InMemoryEventStore::new());
    let user = UserId::new();
    store.append(mood_event(user, "only", 0, 2.0, None)).await.unwrap();

    let analysis = recommendation_service(store)
        .get_renaissance_recommendations(user)
        .await
        .unwrap();

    assert!(!analysis.should_trigger);
    assert_eq!(analysis.confidence_level, 0.0);
    assert!(analysis.is_insufficient_data());
}

#[tokio::test]
async fn hundred_mood_events_yield_exact_window_aggregates() {
    let event_store = Arc::new(InMemoryEventStore::new());
    let snapshot_store = Arc::new(InMemorySnapshotStore::new());
    let service = EvsService::new(
        Arc::clone(&event_store) as Arc<dyn EventStore>,
        snapshot_store as Arc<dyn renaissance_core::ports::SnapshotStore>,
        EvsAggregator::new(AggregationSettings::default()),
    );
    let user = UserId::new();

    // 100 events, one per hour, all within the 7-day window. Scores cycle
    // 1..=10, so the normalized mean is exactly 0.5.
    for i in 0..100u64 {
        let score = (i % 10 + 1) as f64;
        let event = EventEnvelope::new(
            user,
            "MoodLogged",
            "mobile",
            json!({ "score": score }),
            base_ts().plus_secs(i * 3600),
        )
        .with_event_id(EventId::from_string(format!("m{i:03}")));
        service.record_event(event).await.unwrap();
    }

    match service.get_dashboard_metrics(user).await.unwrap() {
        DashboardMetrics::Ready { metrics } => {
            assert_eq!(metrics.mood_count_7d, 100);
            assert!((metrics.mood_average_7d - 0.5).abs() < 1e-9);
            assert_eq!(metrics.last_updated, Some(base_ts().plus_secs(99 * 3600)));
        }
        other => panic!("unexpected metrics: {:?}", other),
    }
}

#[tokio::test]
async fn unknown_event_type_is_skipped_without_derailing_replay() {
    let logs = LogCapture::default();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::WARN)
        .with_writer(logs.clone())
        .finish();
    let _guard = tracing::subscriber::set_default(subscriber);

    let store = Arc::new(InMemoryEventStore::new());
    let user = UserId::new();

    store.append(mood_event(user, "e1", 0, 6.0, None)).await.unwrap();
    store
        .append(
            EventEnvelope::new(
                user,
                "QuantumVibeMeasured",
                "future-app",
                json!({ "entanglement": 0.9 }),
                base_ts().plus_days(1),
            )
            .with_event_id(EventId::from_string("future")),
        )
        .await
        .unwrap();
    store.append(mood_event(user, "e3", 2, 4.0, None)).await.unwrap();

    let engine = ReplayEngine::new(
        store as Arc<dyn EventStore>,
        EvsAggregator::new(AggregationSettings::default()),
    );
    let outcome = engine
        .rebuild(user, None, ReplayBudget::unbounded())
        .await
        .unwrap();

    assert!(outcome.complete);
    assert_eq!(outcome.applied, 2);
    assert_eq!(outcome.skipped, 1);
    assert_eq!(outcome.state.mood_count_7d(), 2);

    // The skip is logged exactly once, not per retry or per read.
    let captured = logs.contents();
    assert_eq!(
        captured
            .matches("skipping event with unknown type/version")
            .count(),
        1,
        "captured logs: {captured}"
    );
}

#[tokio::test]
async fn burnout_risk_rises_as_the_window_darkens() {
    let event_store = Arc::new(InMemoryEventStore::new());
    let snapshot_store = Arc::new(InMemorySnapshotStore::new());
    let service = EvsService::new(
        Arc::clone(&event_store) as Arc<dyn EventStore>,
        snapshot_store as Arc<dyn renaissance_core::ports::SnapshotStore>,
        EvsAggregator::new(AggregationSettings::default()),
    );
    let user = UserId::new();

    service.record_event(mood_event(user, "e1", 0, 8.0, None)).await.unwrap();
    let sunny = match service.get_dashboard_metrics(user).await.unwrap() {
        DashboardMetrics::Ready { metrics } => metrics.burnout_risk_score,
        other => panic!("unexpected metrics: {:?}", other),
    };

    service.record_event(mood_event(user, "e2", 1, 2.0, None)).await.unwrap();
    service.record_event(mood_event(user, "e3", 2, 1.0, None)).await.unwrap();
    let dark = match service.get_dashboard_metrics(user).await.unwrap() {
        DashboardMetrics::Ready { metrics } => metrics.burnout_risk_score,
        other => panic!("unexpected metrics: {:?}", other),
    };

    assert!(dark > sunny);
    assert!((0.0..=1.0).contains(&dark));
}

#[tokio::test]
async fn analysis_is_stable_across_repeated_invocations() {
    let store = Arc::new(InMemoryEventStore::new());
    let user = UserId::new();
    store.append(mood_event(user, "e1", 0, 2.0, Some("épuisé"))).await.unwrap();
    store.append(mood_event(user, "e2", 1, 3.0, Some("perdu"))).await.unwrap();
    store.append(mood_event(user, "e3", 2, 2.0, Some("vide"))).await.unwrap();

    let service = recommendation_service(store);
    let first = service.get_renaissance_recommendations(user).await.unwrap();
    let second = service.get_renaissance_recommendations(user).await.unwrap();

    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}
