//! Domain layer - pure business logic with no I/O.

pub mod events;
pub mod evs;
pub mod foundation;
pub mod projection;
pub mod renaissance;
