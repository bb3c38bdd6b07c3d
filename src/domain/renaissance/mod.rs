//! Renaissance Decision Engine - pure intervention-trigger analysis.

mod analysis;
mod engine;
mod lexicon;
mod settings;

pub use analysis::{
    AnalysisDetails, Cadence, ConfidenceSignal, KeywordSignal, MoodSignal, RenaissanceAnalysis,
    TemporalSignal, TrendLabel,
};
pub use engine::RenaissanceEngine;
pub use lexicon::{scan_for_distress, DISTRESS_LEXICON};
pub use settings::{DecisionSettings, SignalWeights};
