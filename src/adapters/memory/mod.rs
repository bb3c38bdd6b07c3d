//! In-memory adapters - the reference implementations used by tests and
//! local development.

mod cursor_store;
mod dead_letter;
mod event_store;
mod snapshot_store;
mod view_store;

pub use cursor_store::InMemoryCursorStore;
pub use dead_letter::InMemoryDeadLetterSink;
pub use event_store::InMemoryEventStore;
pub use snapshot_store::InMemorySnapshotStore;
pub use view_store::InMemoryViewStore;
