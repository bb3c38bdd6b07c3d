//! Emotional Vector State - the per-user rolling windowed aggregate.

mod aggregator;
mod settings;
mod state;

pub use aggregator::EvsAggregator;
pub use settings::{AggregationSettings, BurnoutWeights};
pub use state::{
    ActionOccurrence, EmotionalVectorState, EvsSnapshot, FoldOutcome, WindowSample,
    WindowSnapshot,
};
