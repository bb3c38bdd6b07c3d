//! Materialized view rows produced by the event projector.

mod views;

pub use views::{
    CoachingSessionRow, JournalEntryRow, SessionStatus, TrendDirection, UserObjectiveRow,
};
