//! Analysis result types produced by the decision engine.
//!
//! `RenaissanceAnalysis` is ephemeral: computed fresh from a bounded
//! recent-event window on every invocation, never persisted, never cached
//! across differing inputs. All collections are ordered so the serialized
//! form is byte-identical for identical inputs.

use serde::{Deserialize, Serialize};

/// Direction of a mood/confidence series over the window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendLabel {
    Declining,
    Stable,
    Improving,
}

/// Qualitative engagement cadence from inter-event gaps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cadence {
    Increasing,
    Stable,
    Declining,
}

/// Mood sub-analysis over the window (1-10 scale).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoodSignal {
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    pub below_threshold: bool,
    pub trend: TrendLabel,
    /// Distress contribution in `[0, 1]`.
    pub score: f64,
}

/// Confidence sub-analysis; identical shape to the mood signal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceSignal {
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    pub below_threshold: bool,
    pub trend: TrendLabel,
    /// Distress contribution in `[0, 1]`.
    pub score: f64,
}

/// Keyword/sentiment scan over free-text notes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordSignal {
    pub hit_count: u32,
    /// Matched lexicon terms in lexicon order.
    pub matched_terms: Vec<String>,
    pub above_threshold: bool,
    /// Distress contribution in `[0, 1]`.
    pub score: f64,
}

/// Temporal engagement pattern over the window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemporalSignal {
    /// Days between the most recent event and the analysis reference time.
    pub days_since_last_event: i64,
    pub cadence: Cadence,
    pub prolonged_silence: bool,
    /// Distress contribution in `[0, 1]`.
    pub score: f64,
}

/// Per-signal breakdown surfaced for explainability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct AnalysisDetails {
    /// Set when no verdict could be produced (e.g., "insufficient_data").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mood: Option<MoodSignal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<ConfidenceSignal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keyword: Option<KeywordSignal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temporal: Option<TemporalSignal>,
    /// Which sub-signal contributed most to the verdict.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dominant_signal: Option<String>,
}

/// Verdict of the decision engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenaissanceAnalysis {
    pub should_trigger: bool,
    /// Combined trigger confidence in `[0, 1]`.
    pub confidence_level: f64,
    pub analysis_details: AnalysisDetails,
    /// Ordered, capped human-readable recommendations.
    pub recommendations: Vec<String>,
}

impl RenaissanceAnalysis {
    /// The neutral result returned when the window is too thin to judge.
    pub fn insufficient_data() -> Self {
        Self {
            should_trigger: false,
            confidence_level: 0.0,
            analysis_details: AnalysisDetails {
                error: Some("insufficient_data".to_string()),
                ..AnalysisDetails::default()
            },
            recommendations: Vec::new(),
        }
    }

    /// Whether this is the insufficient-data result.
    pub fn is_insufficient_data(&self) -> bool {
        self.analysis_details.error.as_deref() == Some("insufficient_data")
    }
}
