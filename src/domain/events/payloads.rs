//! Typed event payloads.
//!
//! Every recognized `event_type` has a concrete payload struct and a
//! variant in the `EventPayload` sum type. Duck-typed access with silent
//! defaults is deliberately absent: an event either decodes into one of
//! these shapes, fails validation, or is explicitly unknown.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::domain::foundation::ValidationError;

/// Lower bound of the user-facing mood/confidence scale.
pub const MIN_SCORE: f64 = 1.0;
/// Upper bound of the user-facing mood/confidence scale.
pub const MAX_SCORE: f64 = 10.0;

/// The recognized event types. Envelopes carrying anything else stay
/// opaque strings; they never decode into an `EventPayload`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    MoodLogged,
    ConfidenceScoreLogged,
    GoalSet,
    CoachingSessionStarted,
    CoachingSessionCompleted,
    ProfileCreated,
}

impl EventKind {
    /// The canonical event type string.
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::MoodLogged => "MoodLogged",
            EventKind::ConfidenceScoreLogged => "ConfidenceScoreLogged",
            EventKind::GoalSet => "GoalSet",
            EventKind::CoachingSessionStarted => "CoachingSessionStarted",
            EventKind::CoachingSessionCompleted => "CoachingSessionCompleted",
            EventKind::ProfileCreated => "ProfileCreated",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A user logged their mood on the 1-10 scale.
///
/// `notes` is opaque free text (may originate from an LLM collaborator);
/// the only processing it ever receives is the distress keyword scan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoodLogged {
    pub score: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// A user logged a standalone confidence score on the 1-10 scale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceScoreLogged {
    pub score: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// A user set a career objective.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalSet {
    pub title: String,
    pub objective_type: String,
}

/// A coaching session was started.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoachingSessionStarted {
    pub session_id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
}

/// A coaching session was completed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoachingSessionCompleted {
    pub session_id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_minutes: Option<u32>,
}

/// A user profile was created in one of the producing applications.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileCreated {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    pub app_source: String,
}

/// Tagged union over all recognized payloads.
#[derive(Debug, Clone, PartialEq)]
pub enum EventPayload {
    MoodLogged(MoodLogged),
    ConfidenceScoreLogged(ConfidenceScoreLogged),
    GoalSet(GoalSet),
    CoachingSessionStarted(CoachingSessionStarted),
    CoachingSessionCompleted(CoachingSessionCompleted),
    ProfileCreated(ProfileCreated),
}

impl EventPayload {
    /// The kind this payload belongs to.
    pub fn kind(&self) -> EventKind {
        match self {
            EventPayload::MoodLogged(_) => EventKind::MoodLogged,
            EventPayload::ConfidenceScoreLogged(_) => EventKind::ConfidenceScoreLogged,
            EventPayload::GoalSet(_) => EventKind::GoalSet,
            EventPayload::CoachingSessionStarted(_) => EventKind::CoachingSessionStarted,
            EventPayload::CoachingSessionCompleted(_) => EventKind::CoachingSessionCompleted,
            EventPayload::ProfileCreated(_) => EventKind::ProfileCreated,
        }
    }

    /// Semantic validation beyond shape: score ranges and required text.
    pub fn validate(&self) -> Result<(), ValidationError> {
        match self {
            EventPayload::MoodLogged(p) => {
                validate_score("score", p.score)?;
                if let Some(confidence) = p.confidence {
                    validate_score("confidence", confidence)?;
                }
                Ok(())
            }
            EventPayload::ConfidenceScoreLogged(p) => validate_score("score", p.score),
            EventPayload::GoalSet(p) => {
                if p.title.trim().is_empty() {
                    return Err(ValidationError::empty_field("title"));
                }
                Ok(())
            }
            EventPayload::CoachingSessionStarted(_)
            | EventPayload::CoachingSessionCompleted(_) => Ok(()),
            EventPayload::ProfileCreated(p) => {
                if p.app_source.trim().is_empty() {
                    return Err(ValidationError::empty_field("app_source"));
                }
                Ok(())
            }
        }
    }

    /// Free-text notes carried by this payload, if any.
    pub fn notes(&self) -> Option<&str> {
        match self {
            EventPayload::MoodLogged(p) => p.notes.as_deref(),
            EventPayload::ConfidenceScoreLogged(p) => p.notes.as_deref(),
            EventPayload::CoachingSessionCompleted(p) => p.summary.as_deref(),
            _ => None,
        }
    }
}

fn validate_score(field: &str, value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() || value < MIN_SCORE || value > MAX_SCORE {
        return Err(ValidationError::out_of_range(field, MIN_SCORE, MAX_SCORE, value));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_kind_matches_the_wire_type_string() {
        let payload = EventPayload::MoodLogged(MoodLogged {
            score: 6.0,
            confidence: None,
            notes: None,
        });
        assert_eq!(payload.kind(), EventKind::MoodLogged);
        assert_eq!(payload.kind().as_str(), "MoodLogged");
    }

    #[test]
    fn mood_payload_within_range_validates() {
        let payload = EventPayload::MoodLogged(MoodLogged {
            score: 7.0,
            confidence: Some(5.0),
            notes: None,
        });
        assert!(payload.validate().is_ok());
    }

    #[test]
    fn mood_payload_out_of_range_is_rejected() {
        let payload = EventPayload::MoodLogged(MoodLogged {
            score: 11.0,
            confidence: None,
            notes: None,
        });
        assert!(payload.validate().is_err());
    }

    #[test]
    fn mood_payload_nan_score_is_rejected() {
        let payload = EventPayload::MoodLogged(MoodLogged {
            score: f64::NAN,
            confidence: None,
            notes: None,
        });
        assert!(payload.validate().is_err());
    }

    #[test]
    fn goal_set_requires_title() {
        let payload = EventPayload::GoalSet(GoalSet {
            title: "   ".to_string(),
            objective_type: "skill".to_string(),
        });
        assert!(payload.validate().is_err());
    }

    #[test]
    fn mood_payload_ignores_unknown_fields_on_decode() {
        let json = r#"{"score": 6.0, "notes": "ok", "brand_new_field": 42}"#;
        let decoded: MoodLogged = serde_json::from_str(json).unwrap();
        assert_eq!(decoded.score, 6.0);
        assert_eq!(decoded.notes.as_deref(), Some("ok"));
    }

    #[test]
    fn notes_accessor_covers_text_bearing_payloads() {
        let mood = EventPayload::MoodLogged(MoodLogged {
            score: 3.0,
            confidence: None,
            notes: Some("bloqué".to_string()),
        });
        assert_eq!(mood.notes(), Some("bloqué"));

        let goal = EventPayload::GoalSet(GoalSet {
            title: "Learn Rust".to_string(),
            objective_type: "skill".to_string(),
        });
        assert_eq!(goal.notes(), None);
    }
}
