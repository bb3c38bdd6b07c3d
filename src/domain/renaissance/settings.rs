//! Tunable thresholds and weights for the decision engine.

use serde::{Deserialize, Serialize};

/// Weights combining the four sub-signals into the trigger confidence.
///
/// Each sub-signal produces a score in `[0, 1]`; the weighted sum is
/// clamped to `[0, 1]`. Weights must sum to 1.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SignalWeights {
    pub mood: f64,
    pub confidence: f64,
    pub keyword: f64,
    pub temporal: f64,
}

impl Default for SignalWeights {
    fn default() -> Self {
        Self {
            mood: 0.30,
            confidence: 0.30,
            keyword: 0.25,
            temporal: 0.15,
        }
    }
}

impl SignalWeights {
    /// Sum of all weights (should be 1.0).
    pub fn total(&self) -> f64 {
        self.mood + self.confidence + self.keyword + self.temporal
    }
}

/// Settings for the Renaissance decision engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionSettings {
    /// Minimum number of decodable events required before any verdict.
    pub min_events: usize,
    /// Mood mean below this (1-10 scale) counts as distressed.
    pub mood_threshold: f64,
    /// Confidence mean below this (1-10 scale) counts as distressed.
    pub confidence_threshold: f64,
    /// Keyword hits at or above this count as distressed.
    pub keyword_threshold: u32,
    /// Trigger when the combined confidence reaches this level.
    pub trigger_threshold: f64,
    /// Dead band (1-10 scale) around zero for trend classification.
    pub trend_dead_band: f64,
    /// Days without any event that count as prolonged silence.
    pub silence_days: i64,
    /// Maximum number of recommendations returned.
    pub max_recommendations: usize,
    /// Sub-signal weights.
    pub weights: SignalWeights,
}

impl Default for DecisionSettings {
    fn default() -> Self {
        Self {
            min_events: 3,
            mood_threshold: 4.0,
            confidence_threshold: 4.0,
            keyword_threshold: 2,
            trigger_threshold: 0.6,
            trend_dead_band: 0.5,
            silence_days: 7,
            max_recommendations: 5,
            weights: SignalWeights::default(),
        }
    }
}
