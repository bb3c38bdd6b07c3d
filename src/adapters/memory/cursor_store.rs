//! In-memory projection cursor store.

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::foundation::DomainError;
use crate::ports::{CursorStore, ProjectionCursor};

pub struct InMemoryCursorStore {
    cursor: RwLock<Option<ProjectionCursor>>,
}

impl InMemoryCursorStore {
    pub fn new() -> Self {
        Self {
            cursor: RwLock::new(None),
        }
    }
}

impl Default for InMemoryCursorStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CursorStore for InMemoryCursorStore {
    async fn load(&self) -> Result<Option<ProjectionCursor>, DomainError> {
        Ok(self.cursor.read().await.clone())
    }

    async fn commit(&self, cursor: ProjectionCursor) -> Result<(), DomainError> {
        *self.cursor.write().await = Some(cursor);
        Ok(())
    }
}
