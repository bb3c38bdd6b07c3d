//! Read-model rows derived from the event log.
//!
//! Every row is keyed by the `event_id` of the event it was derived from,
//! except the coaching-session view which upserts on `session_id` so that a
//! completion event updates the row its start event created. Keyed upserts
//! make redelivery harmless: the same event produces the same row, replacing
//! rather than duplicating.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::foundation::{EventId, Timestamp, UserId};

/// Direction of a value relative to the immediately preceding row for the
/// same user in the same view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Up,
    Down,
    Stable,
}

/// Lifecycle of a coaching session row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Started,
    Completed,
}

/// One journal entry, derived from a `MoodLogged` event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JournalEntryRow {
    pub event_id: EventId,
    pub user_id: UserId,
    /// Raw mood score on the 1-10 scale.
    pub score: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Score movement versus the user's previous journal entry.
    pub mood_trend: TrendDirection,
    pub recorded_at: Timestamp,
}

/// One objective, derived from a `GoalSet` event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserObjectiveRow {
    pub event_id: EventId,
    pub user_id: UserId,
    pub title: String,
    pub objective_type: String,
    pub set_at: Timestamp,
}

/// One coaching session, built from its start and completion events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoachingSessionRow {
    /// The event that last touched this row.
    pub event_id: EventId,
    pub user_id: UserId,
    pub session_id: Uuid,
    pub status: SessionStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_minutes: Option<u32>,
    pub started_at: Timestamp,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<Timestamp>,
}

impl TrendDirection {
    /// Classifies a score against the previous row's score, `Stable` when
    /// there is no previous row.
    pub fn from_scores(current: f64, previous: Option<f64>) -> Self {
        match previous {
            None => TrendDirection::Stable,
            Some(prev) if current > prev => TrendDirection::Up,
            Some(prev) if current < prev => TrendDirection::Down,
            Some(_) => TrendDirection::Stable,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trend_is_stable_without_previous_row() {
        assert_eq!(TrendDirection::from_scores(5.0, None), TrendDirection::Stable);
    }

    #[test]
    fn trend_follows_score_movement() {
        assert_eq!(TrendDirection::from_scores(7.0, Some(5.0)), TrendDirection::Up);
        assert_eq!(TrendDirection::from_scores(3.0, Some(5.0)), TrendDirection::Down);
        assert_eq!(TrendDirection::from_scores(5.0, Some(5.0)), TrendDirection::Stable);
    }

    #[test]
    fn journal_row_serializes_snake_case_trend() {
        let row = JournalEntryRow {
            event_id: EventId::from_string("e1"),
            user_id: UserId::new(),
            score: 6.0,
            confidence: None,
            notes: None,
            mood_trend: TrendDirection::Up,
            recorded_at: Timestamp::from_unix_secs(1_700_000_000),
        };

        let json = serde_json::to_string(&row).unwrap();
        assert!(json.contains("\"mood_trend\":\"up\""));
        assert!(!json.contains("notes"));
    }
}
