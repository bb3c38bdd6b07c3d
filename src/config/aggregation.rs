//! Windowed-aggregation configuration

use serde::Deserialize;

use crate::domain::evs::{AggregationSettings, BurnoutWeights};

use super::error::ValidationError;

/// Rolling-window and burnout-risk configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AggregationConfig {
    /// Width of the rolling window in days
    #[serde(default = "default_window_days")]
    pub window_days: i64,

    /// Days without an action event counted as a cadence gap
    #[serde(default = "default_cadence_gap_days")]
    pub cadence_gap_days: i64,

    /// Capacity of the applied-event-id dedup set
    #[serde(default = "default_applied_ids_capacity")]
    pub applied_ids_capacity: usize,

    /// Burnout weight: mood deficit
    #[serde(default = "default_mood_deficit_weight")]
    pub mood_deficit_weight: f64,

    /// Burnout weight: confidence deficit
    #[serde(default = "default_confidence_deficit_weight")]
    pub confidence_deficit_weight: f64,

    /// Burnout weight: negative trend magnitude
    #[serde(default = "default_trend_decline_weight")]
    pub trend_decline_weight: f64,

    /// Burnout weight: action cadence gap
    #[serde(default = "default_cadence_gap_weight")]
    pub cadence_gap_weight: f64,
}

fn default_window_days() -> i64 {
    7
}

fn default_cadence_gap_days() -> i64 {
    3
}

fn default_applied_ids_capacity() -> usize {
    1024
}

fn default_mood_deficit_weight() -> f64 {
    0.40
}

fn default_confidence_deficit_weight() -> f64 {
    0.30
}

fn default_trend_decline_weight() -> f64 {
    0.20
}

fn default_cadence_gap_weight() -> f64 {
    0.10
}

impl Default for AggregationConfig {
    fn default() -> Self {
        Self {
            window_days: default_window_days(),
            cadence_gap_days: default_cadence_gap_days(),
            applied_ids_capacity: default_applied_ids_capacity(),
            mood_deficit_weight: default_mood_deficit_weight(),
            confidence_deficit_weight: default_confidence_deficit_weight(),
            trend_decline_weight: default_trend_decline_weight(),
            cadence_gap_weight: default_cadence_gap_weight(),
        }
    }
}

impl AggregationConfig {
    /// Validate aggregation configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.window_days <= 0 {
            return Err(ValidationError::InvalidWindow("aggregation.window_days"));
        }
        if self.cadence_gap_days <= 0 {
            return Err(ValidationError::InvalidWindow("aggregation.cadence_gap_days"));
        }

        let total = self.mood_deficit_weight
            + self.confidence_deficit_weight
            + self.trend_decline_weight
            + self.cadence_gap_weight;
        if (total - 1.0).abs() > 1e-9 {
            return Err(ValidationError::WeightsMustSumToOne("burnout risk"));
        }

        Ok(())
    }

    /// Convert into the domain settings used by the aggregator
    pub fn settings(&self) -> AggregationSettings {
        AggregationSettings {
            window_days: self.window_days,
            cadence_gap_days: self.cadence_gap_days,
            applied_ids_capacity: self.applied_ids_capacity,
            burnout: BurnoutWeights {
                mood_deficit: self.mood_deficit_weight,
                confidence_deficit: self.confidence_deficit_weight,
                trend_decline: self.trend_decline_weight,
                cadence_gap: self.cadence_gap_weight,
            },
        }
    }
}
