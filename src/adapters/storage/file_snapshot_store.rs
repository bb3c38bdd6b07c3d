//! File-based EVS snapshot storage.
//!
//! One JSON file per user under a base directory. Snapshots are a cache
//! over the event log, so an unreadable or corrupt file is reported as
//! `CorruptSnapshot` and the caller falls back to replay.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::domain::evs::EvsSnapshot;
use crate::domain::foundation::{DomainError, ErrorCode, UserId};
use crate::ports::SnapshotStore;

/// File-based storage for per-user EVS snapshots.
#[derive(Debug, Clone)]
pub struct FileSnapshotStore {
    base_path: PathBuf,
}

impl FileSnapshotStore {
    /// Creates a store rooted at `base_path`. The directory is created
    /// lazily on first save.
    pub fn new<P: AsRef<Path>>(base_path: P) -> Self {
        Self {
            base_path: base_path.as_ref().to_path_buf(),
        }
    }

    fn snapshot_path(&self, user_id: UserId) -> PathBuf {
        self.base_path.join(format!("{}.json", user_id))
    }

    async fn ensure_base_dir(&self) -> Result<(), DomainError> {
        fs::create_dir_all(&self.base_path).await.map_err(|e| {
            DomainError::new(ErrorCode::SnapshotStoreError, e.to_string())
                .with_detail("path", self.base_path.display().to_string())
        })
    }
}

#[async_trait]
impl SnapshotStore for FileSnapshotStore {
    async fn save(&self, snapshot: EvsSnapshot) -> Result<(), DomainError> {
        self.ensure_base_dir().await?;

        let path = self.snapshot_path(snapshot.user_id);
        let json = serde_json::to_vec_pretty(&snapshot)
            .map_err(|e| DomainError::new(ErrorCode::SnapshotStoreError, e.to_string()))?;

        // Write-then-rename keeps a crashed save from leaving a torn file.
        let tmp_path = path.with_extension("json.tmp");
        fs::write(&tmp_path, json).await.map_err(|e| {
            DomainError::new(ErrorCode::SnapshotStoreError, e.to_string())
                .with_detail("path", tmp_path.display().to_string())
        })?;
        fs::rename(&tmp_path, &path).await.map_err(|e| {
            DomainError::new(ErrorCode::SnapshotStoreError, e.to_string())
                .with_detail("path", path.display().to_string())
        })?;

        Ok(())
    }

    async fn load(&self, user_id: UserId) -> Result<Option<EvsSnapshot>, DomainError> {
        let path = self.snapshot_path(user_id);

        let json = match fs::read_to_string(&path).await {
            Ok(json) => json,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(DomainError::new(ErrorCode::SnapshotStoreError, e.to_string())
                    .with_detail("path", path.display().to_string()))
            }
        };

        let snapshot: EvsSnapshot = serde_json::from_str(&json).map_err(|e| {
            DomainError::new(
                ErrorCode::CorruptSnapshot,
                format!("snapshot for {} failed to parse: {}", user_id, e),
            )
            .with_detail("path", path.display().to_string())
        })?;

        if snapshot.user_id != user_id {
            return Err(DomainError::new(
                ErrorCode::CorruptSnapshot,
                format!(
                    "snapshot file for {} contains state for {}",
                    user_id, snapshot.user_id
                ),
            )
            .with_detail("path", path.display().to_string()));
        }

        Ok(Some(snapshot))
    }
}
