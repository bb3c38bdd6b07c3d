//! Decision-engine configuration

use serde::Deserialize;

use crate::application::LookbackSettings;
use crate::domain::renaissance::{DecisionSettings, SignalWeights};

use super::error::ValidationError;

/// Renaissance decision-engine configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DecisionConfig {
    /// Minimum decodable events before any verdict
    #[serde(default = "default_min_events")]
    pub min_events: usize,

    /// Mood mean below this (1-10) counts as distressed
    #[serde(default = "default_mood_threshold")]
    pub mood_threshold: f64,

    /// Confidence mean below this (1-10) counts as distressed
    #[serde(default = "default_confidence_threshold")]
    pub confidence_threshold: f64,

    /// Distress keyword hits at or above this count as distressed
    #[serde(default = "default_keyword_threshold")]
    pub keyword_threshold: u32,

    /// Trigger when combined confidence reaches this level
    #[serde(default = "default_trigger_threshold")]
    pub trigger_threshold: f64,

    /// Signal weight: mood
    #[serde(default = "default_mood_weight")]
    pub mood_weight: f64,

    /// Signal weight: confidence
    #[serde(default = "default_confidence_weight")]
    pub confidence_weight: f64,

    /// Signal weight: keywords
    #[serde(default = "default_keyword_weight")]
    pub keyword_weight: f64,

    /// Signal weight: temporal pattern
    #[serde(default = "default_temporal_weight")]
    pub temporal_weight: f64,

    /// Maximum recommendations returned
    #[serde(default = "default_max_recommendations")]
    pub max_recommendations: usize,

    /// Analysis window width in days, counted back from the latest event
    #[serde(default = "default_lookback_days")]
    pub lookback_days: i64,

    /// Maximum events fed to the engine
    #[serde(default = "default_lookback_limit")]
    pub lookback_limit: usize,
}

fn default_min_events() -> usize {
    3
}

fn default_mood_threshold() -> f64 {
    4.0
}

fn default_confidence_threshold() -> f64 {
    4.0
}

fn default_keyword_threshold() -> u32 {
    2
}

fn default_trigger_threshold() -> f64 {
    0.6
}

fn default_mood_weight() -> f64 {
    0.30
}

fn default_confidence_weight() -> f64 {
    0.30
}

fn default_keyword_weight() -> f64 {
    0.25
}

fn default_temporal_weight() -> f64 {
    0.15
}

fn default_max_recommendations() -> usize {
    5
}

fn default_lookback_days() -> i64 {
    14
}

fn default_lookback_limit() -> usize {
    100
}

impl Default for DecisionConfig {
    fn default() -> Self {
        Self {
            min_events: default_min_events(),
            mood_threshold: default_mood_threshold(),
            confidence_threshold: default_confidence_threshold(),
            keyword_threshold: default_keyword_threshold(),
            trigger_threshold: default_trigger_threshold(),
            mood_weight: default_mood_weight(),
            confidence_weight: default_confidence_weight(),
            keyword_weight: default_keyword_weight(),
            temporal_weight: default_temporal_weight(),
            max_recommendations: default_max_recommendations(),
            lookback_days: default_lookback_days(),
            lookback_limit: default_lookback_limit(),
        }
    }
}

impl DecisionConfig {
    /// Validate decision-engine configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        let total = self.mood_weight
            + self.confidence_weight
            + self.keyword_weight
            + self.temporal_weight;
        if (total - 1.0).abs() > 1e-9 {
            return Err(ValidationError::WeightsMustSumToOne("decision trigger"));
        }

        if !(0.0..=1.0).contains(&self.trigger_threshold) {
            return Err(ValidationError::ThresholdOutOfRange("decision.trigger_threshold"));
        }
        if !(1.0..=10.0).contains(&self.mood_threshold) {
            return Err(ValidationError::ThresholdOutOfRange("decision.mood_threshold"));
        }
        if !(1.0..=10.0).contains(&self.confidence_threshold) {
            return Err(ValidationError::ThresholdOutOfRange("decision.confidence_threshold"));
        }
        if self.lookback_days <= 0 {
            return Err(ValidationError::InvalidWindow("decision.lookback_days"));
        }

        Ok(())
    }

    /// Convert into the domain settings used by the engine
    pub fn settings(&self) -> DecisionSettings {
        DecisionSettings {
            min_events: self.min_events,
            mood_threshold: self.mood_threshold,
            confidence_threshold: self.confidence_threshold,
            keyword_threshold: self.keyword_threshold,
            trigger_threshold: self.trigger_threshold,
            trend_dead_band: DecisionSettings::default().trend_dead_band,
            silence_days: DecisionSettings::default().silence_days,
            max_recommendations: self.max_recommendations,
            weights: SignalWeights {
                mood: self.mood_weight,
                confidence: self.confidence_weight,
                keyword: self.keyword_weight,
                temporal: self.temporal_weight,
            },
        }
    }

    /// Convert into the lookback bounds for the recommendation service
    pub fn lookback(&self) -> LookbackSettings {
        LookbackSettings {
            days: self.lookback_days,
            limit: self.lookback_limit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = DecisionConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.settings(), DecisionSettings::default());
    }

    #[test]
    fn unbalanced_weights_fail_validation() {
        let config = DecisionConfig {
            keyword_weight: 0.5,
            ..DecisionConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn out_of_range_trigger_threshold_fails() {
        let config = DecisionConfig {
            trigger_threshold: 1.5,
            ..DecisionConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
