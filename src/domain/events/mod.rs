//! Event schemas - typed payloads and the versioned schema registry.

mod payloads;
mod registry;

pub use payloads::{
    CoachingSessionCompleted, CoachingSessionStarted, ConfidenceScoreLogged, EventKind,
    EventPayload, GoalSet, MoodLogged, ProfileCreated, MAX_SCORE, MIN_SCORE,
};
pub use registry::{DecodeOutcome, SchemaRegistry};
