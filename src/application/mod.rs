//! Application services orchestrating the domain through the ports.

mod evs_service;
mod projector;
mod recommendations;
mod replay;

pub use evs_service::{DashboardMetrics, EvsService};
pub use projector::{EventProjector, ProjectorSettings};
pub use recommendations::{LookbackSettings, RecommendationService};
pub use replay::{ReplayBudget, ReplayEngine, ReplayOutcome};
