//! Tunable knobs for windowed aggregation and burnout-risk scoring.

use serde::{Deserialize, Serialize};

/// Weights combining window aggregates into the burnout risk score.
///
/// The four components each produce a value in `[0, 1]`; the weighted sum
/// is clamped to `[0, 1]`. Weights must sum to 1.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BurnoutWeights {
    /// Weight of `1 - mood_average_7d`.
    pub mood_deficit: f64,
    /// Weight of `1 - latest confidence sample`.
    pub confidence_deficit: f64,
    /// Weight of the negative confidence-trend magnitude.
    pub trend_decline: f64,
    /// Weight of the action-cadence gap flag.
    pub cadence_gap: f64,
}

impl Default for BurnoutWeights {
    fn default() -> Self {
        Self {
            mood_deficit: 0.40,
            confidence_deficit: 0.30,
            trend_decline: 0.20,
            cadence_gap: 0.10,
        }
    }
}

impl BurnoutWeights {
    /// Sum of all weights (should be 1.0).
    pub fn total(&self) -> f64 {
        self.mood_deficit + self.confidence_deficit + self.trend_decline + self.cadence_gap
    }
}

/// Settings governing the rolling aggregation window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregationSettings {
    /// Width of the rolling window in days.
    pub window_days: i64,
    /// How many days without any action event count as a cadence gap.
    pub cadence_gap_days: i64,
    /// Capacity of the recently-applied event-id set used for dedup.
    pub applied_ids_capacity: usize,
    /// Burnout-risk weights.
    pub burnout: BurnoutWeights,
}

impl Default for AggregationSettings {
    fn default() -> Self {
        Self {
            window_days: 7,
            cadence_gap_days: 3,
            applied_ids_capacity: 1024,
            burnout: BurnoutWeights::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_burnout_weights_sum_to_one() {
        let weights = BurnoutWeights::default();
        assert!((weights.total() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn default_window_is_seven_days() {
        assert_eq!(AggregationSettings::default().window_days, 7);
    }
}
