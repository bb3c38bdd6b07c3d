//! Versioned schema registry for event payload decoding.
//!
//! Maps `(event_type, event_version)` to a decoder. The registry is the
//! single place where an event's JSON payload becomes a typed
//! `EventPayload`. Unknown types and unregistered future versions come back
//! as an explicit `Unknown` outcome (skip + warn at the call site), never
//! as a silently-defaulted payload. Malformed payloads for a registered
//! combination are a validation error and must be rejected before the
//! event reaches the log or any fold.

use serde_json::Value as JsonValue;
use std::collections::HashMap;

use crate::domain::foundation::{DomainError, EventEnvelope};

use super::payloads::{
    CoachingSessionCompleted, CoachingSessionStarted, ConfidenceScoreLogged, EventPayload, GoalSet,
    MoodLogged, ProfileCreated,
};

/// Outcome of decoding an envelope's payload.
#[derive(Debug, Clone, PartialEq)]
pub enum DecodeOutcome {
    /// The payload decoded and validated against a registered schema.
    Decoded(EventPayload),
    /// The `(event_type, event_version)` combination is not registered.
    ///
    /// Readers skip these and continue; a future version of a known type is
    /// treated the same as an unknown type.
    Unknown,
}

type Decoder = fn(&JsonValue) -> Result<EventPayload, serde_json::Error>;

/// Registry mapping `(event_type, event_version)` to payload decoders.
pub struct SchemaRegistry {
    decoders: HashMap<(String, u32), Decoder>,
}

impl SchemaRegistry {
    /// Creates a registry with all current schemas registered at version 1.
    pub fn new() -> Self {
        let mut registry = Self {
            decoders: HashMap::new(),
        };
        registry.register("MoodLogged", 1, |p| {
            Ok(EventPayload::MoodLogged(serde_json::from_value::<MoodLogged>(p.clone())?))
        });
        registry.register("ConfidenceScoreLogged", 1, |p| {
            Ok(EventPayload::ConfidenceScoreLogged(serde_json::from_value::<
                ConfidenceScoreLogged,
            >(p.clone())?))
        });
        registry.register("GoalSet", 1, |p| {
            Ok(EventPayload::GoalSet(serde_json::from_value::<GoalSet>(p.clone())?))
        });
        registry.register("CoachingSessionStarted", 1, |p| {
            Ok(EventPayload::CoachingSessionStarted(serde_json::from_value::<
                CoachingSessionStarted,
            >(p.clone())?))
        });
        registry.register("CoachingSessionCompleted", 1, |p| {
            Ok(EventPayload::CoachingSessionCompleted(serde_json::from_value::<
                CoachingSessionCompleted,
            >(p.clone())?))
        });
        registry.register("ProfileCreated", 1, |p| {
            Ok(EventPayload::ProfileCreated(serde_json::from_value::<ProfileCreated>(
                p.clone(),
            )?))
        });
        registry
    }

    /// Registers a decoder for a specific `(event_type, event_version)`.
    pub fn register(&mut self, event_type: impl Into<String>, version: u32, decoder: Decoder) {
        self.decoders.insert((event_type.into(), version), decoder);
    }

    /// Whether this `(event_type, event_version)` combination is registered.
    pub fn is_registered(&self, event_type: &str, version: u32) -> bool {
        self.decoders
            .contains_key(&(event_type.to_string(), version))
    }

    /// Decodes and validates an envelope's payload.
    ///
    /// Returns `Unknown` for unregistered combinations, a `ValidationFailed`
    /// error when a registered payload is malformed or semantically invalid.
    pub fn decode(&self, envelope: &EventEnvelope) -> Result<DecodeOutcome, DomainError> {
        let key = (envelope.event_type.clone(), envelope.event_version);
        let Some(decoder) = self.decoders.get(&key) else {
            return Ok(DecodeOutcome::Unknown);
        };

        let payload = decoder(&envelope.payload).map_err(|e| {
            DomainError::validation("payload", format!("malformed {} payload: {}", envelope.event_type, e))
                .with_detail("event_id", envelope.event_id.as_str())
                .with_detail("event_type", envelope.event_type.clone())
        })?;

        payload.validate().map_err(|e| {
            DomainError::from(e)
                .with_detail("event_id", envelope.event_id.as_str())
                .with_detail("event_type", envelope.event_type.clone())
        })?;

        Ok(DecodeOutcome::Decoded(payload))
    }
}

impl Default for SchemaRegistry {
    fn default() -> Self {
        Self::new()
    }
}
