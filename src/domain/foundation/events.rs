//! Event identity and transport envelope.
//!
//! Every state change in the system is recorded as an immutable event.
//! `EventEnvelope` is the wire format shared by producers, the aggregator,
//! the replay engine, and the projector. Events are totally ordered by
//! `(stream_id, timestamp, event_id)` and are never mutated or deleted once
//! appended; corrections are represented by compensating events.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::fmt;
use uuid::Uuid;

use super::{Timestamp, UserId};

/// Unique identifier for events (used for deduplication).
///
/// Uses a String internally to allow for various ID formats (UUID, ULID,
/// etc.) while maintaining serializability.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(String);

impl EventId {
    /// Creates a new random EventId using UUID v4.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Creates an EventId from an existing string.
    ///
    /// No validation is performed - any non-empty string is accepted.
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Returns the inner string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for EventId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Transport envelope for domain events.
///
/// Wire format (JSON):
/// `{event_id, stream_id, event_type, event_version, app_source, payload,
/// correlation_id?, causation_id?, timestamp}`
///
/// The payload shape is keyed by `event_type` and decoded through the
/// schema registry; unknown payload fields are ignored on read so that
/// newer producers do not break older readers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventEnvelope {
    /// Unique ID for this event instance, assigned at append.
    pub event_id: EventId,

    /// The user/aggregate stream this event belongs to.
    pub stream_id: UserId,

    /// Event type for routing (e.g., "MoodLogged").
    pub event_type: String,

    /// Schema version of the payload.
    pub event_version: u32,

    /// Producing application (e.g., "mobile", "web-coach").
    pub app_source: String,

    /// Event-specific payload as JSON.
    pub payload: JsonValue,

    /// ID linking related events across a single user request.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<Uuid>,

    /// ID of the event that directly caused this event.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub causation_id: Option<Uuid>,

    /// When the event occurred (UTC).
    pub timestamp: Timestamp,
}

impl EventEnvelope {
    /// Creates a new envelope with a fresh event ID and version 1.
    pub fn new(
        stream_id: UserId,
        event_type: impl Into<String>,
        app_source: impl Into<String>,
        payload: JsonValue,
        timestamp: Timestamp,
    ) -> Self {
        Self {
            event_id: EventId::new(),
            stream_id,
            event_type: event_type.into(),
            event_version: 1,
            app_source: app_source.into(),
            payload,
            correlation_id: None,
            causation_id: None,
            timestamp,
        }
    }

    /// Sets the schema version of the payload.
    pub fn with_version(mut self, version: u32) -> Self {
        self.event_version = version;
        self
    }

    /// Sets the event ID (for deterministic construction in replays/tests).
    pub fn with_event_id(mut self, event_id: EventId) -> Self {
        self.event_id = event_id;
        self
    }

    /// Add correlation ID for request tracing.
    pub fn with_correlation_id(mut self, id: Uuid) -> Self {
        self.correlation_id = Some(id);
        self
    }

    /// Add causation ID (ID of event that caused this one).
    pub fn with_causation_id(mut self, id: Uuid) -> Self {
        self.causation_id = Some(id);
        self
    }

    /// Total ordering key within a stream: `(timestamp, event_id)`.
    ///
    /// Ties on timestamp are broken by the lexicographic event ID so that
    /// every store and every replay agrees on a single order.
    pub fn ordering_key(&self) -> (Timestamp, &str) {
        (self.timestamp, self.event_id.as_str())
    }

    /// Deserialize payload to a specific type.
    pub fn payload_as<T: for<'de> Deserialize<'de>>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_value(self.payload.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_envelope() -> EventEnvelope {
        EventEnvelope::new(
            UserId::new(),
            "MoodLogged",
            "mobile",
            json!({"score": 7.0}),
            Timestamp::from_unix_secs(1_705_276_800),
        )
    }

    #[test]
    fn event_id_generates_unique_values() {
        assert_ne!(EventId::new(), EventId::new());
    }

    #[test]
    fn event_id_from_string_preserves_value() {
        let id = EventId::from_string("evt-123");
        assert_eq!(id.as_str(), "evt-123");
    }

    #[test]
    fn envelope_new_defaults_to_version_one() {
        let envelope = sample_envelope();
        assert_eq!(envelope.event_version, 1);
        assert!(envelope.correlation_id.is_none());
        assert!(envelope.causation_id.is_none());
    }

    #[test]
    fn envelope_builder_chain_sets_metadata() {
        let correlation = Uuid::new_v4();
        let causation = Uuid::new_v4();
        let envelope = sample_envelope()
            .with_version(2)
            .with_correlation_id(correlation)
            .with_causation_id(causation);

        assert_eq!(envelope.event_version, 2);
        assert_eq!(envelope.correlation_id, Some(correlation));
        assert_eq!(envelope.causation_id, Some(causation));
    }

    #[test]
    fn envelope_serialization_round_trip() {
        let envelope = sample_envelope().with_correlation_id(Uuid::new_v4());

        let json = serde_json::to_string(&envelope).unwrap();
        let restored: EventEnvelope = serde_json::from_str(&json).unwrap();

        assert_eq!(restored, envelope);
    }

    #[test]
    fn envelope_omits_absent_correlation_fields() {
        let json = serde_json::to_string(&sample_envelope()).unwrap();
        assert!(!json.contains("correlation_id"));
        assert!(!json.contains("causation_id"));
    }

    #[test]
    fn envelope_ignores_unknown_wire_fields() {
        let mut value = serde_json::to_value(sample_envelope()).unwrap();
        value["future_field"] = json!("whatever");

        let restored: Result<EventEnvelope, _> = serde_json::from_value(value);
        assert!(restored.is_ok());
    }

    #[test]
    fn ordering_key_breaks_timestamp_ties_by_event_id() {
        let ts = Timestamp::from_unix_secs(1000);
        let user = UserId::new();
        let a = EventEnvelope::new(user, "MoodLogged", "web", json!({}), ts)
            .with_event_id(EventId::from_string("aaa"));
        let b = EventEnvelope::new(user, "MoodLogged", "web", json!({}), ts)
            .with_event_id(EventId::from_string("bbb"));

        assert!(a.ordering_key() < b.ordering_key());
    }

    #[test]
    fn envelope_payload_as_deserializes() {
        #[derive(Debug, Deserialize, PartialEq)]
        struct Payload {
            score: f64,
        }

        let payload: Payload = sample_envelope().payload_as().unwrap();
        assert_eq!(payload.score, 7.0);
    }
}
