//! Port traits - the boundary between the domain and infrastructure.
//!
//! Every port is an `async_trait`, `Send + Sync`, and returns
//! `Result<_, DomainError>`. Adapters (in-memory, file, or a real database
//! behind the same contract) live under `adapters/`.

mod cursor_store;
mod dead_letter;
mod event_store;
mod snapshot_store;
mod view_store;

pub use cursor_store::{CursorStore, ProjectionCursor};
pub use dead_letter::{DeadLetter, DeadLetterSink};
pub use event_store::EventStore;
pub use snapshot_store::SnapshotStore;
pub use view_store::ViewStore;
