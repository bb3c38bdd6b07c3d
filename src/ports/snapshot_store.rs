//! EVS snapshot persistence port.

use async_trait::async_trait;

use crate::domain::evs::EvsSnapshot;
use crate::domain::foundation::{DomainError, UserId};

/// Durable storage for per-user EVS snapshots.
///
/// Snapshots are a cache over the event log: losing one costs a replay,
/// never data. A corrupt persisted snapshot surfaces as
/// `ErrorCode::CorruptSnapshot` so callers fall back to replay instead of
/// crashing.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    async fn save(&self, snapshot: EvsSnapshot) -> Result<(), DomainError>;

    async fn load(&self, user_id: UserId) -> Result<Option<EvsSnapshot>, DomainError>;
}
