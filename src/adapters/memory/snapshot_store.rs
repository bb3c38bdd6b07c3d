//! In-memory EVS snapshot store.

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::domain::evs::EvsSnapshot;
use crate::domain::foundation::{DomainError, UserId};
use crate::ports::SnapshotStore;

pub struct InMemorySnapshotStore {
    snapshots: RwLock<HashMap<UserId, EvsSnapshot>>,
}

impl InMemorySnapshotStore {
    pub fn new() -> Self {
        Self {
            snapshots: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for InMemorySnapshotStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SnapshotStore for InMemorySnapshotStore {
    async fn save(&self, snapshot: EvsSnapshot) -> Result<(), DomainError> {
        self.snapshots
            .write()
            .await
            .insert(snapshot.user_id, snapshot);
        Ok(())
    }

    async fn load(&self, user_id: UserId) -> Result<Option<EvsSnapshot>, DomainError> {
        Ok(self.snapshots.read().await.get(&user_id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::evs::EmotionalVectorState;

    #[tokio::test]
    async fn save_then_load_round_trips() {
        let store = InMemorySnapshotStore::new();
        let user = UserId::new();
        let snapshot = EmotionalVectorState::new(user).to_snapshot();

        store.save(snapshot.clone()).await.unwrap();
        assert_eq!(store.load(user).await.unwrap(), Some(snapshot));
    }

    #[tokio::test]
    async fn load_missing_user_returns_none() {
        let store = InMemorySnapshotStore::new();
        assert!(store.load(UserId::new()).await.unwrap().is_none());
    }
}
