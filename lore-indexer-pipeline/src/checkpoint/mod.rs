//! Resume checkpoint for interrupted runs.
//!
//! After every indexed page the orchestrator records the last resource it
//! wrote. A later run skips everything up to that position.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::PipelineError;
use lore_indexer_shared::{CourseId, RepositoryId, ResourceId};

/// Last fully indexed position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Checkpoint {
    pub repository_id: RepositoryId,
    pub course_id: CourseId,
    pub last_resource_id: ResourceId,
    /// Documents indexed so far across the interrupted runs.
    pub indexed: usize,
    pub updated_at: DateTime<Utc>,
}

/// Where a course stands relative to a checkpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoursePosition {
    /// Already fully indexed.
    Done,
    /// Partially indexed; continue after this resource id.
    ResumeAfter(ResourceId),
    /// Not reached yet.
    Fresh,
}

impl Checkpoint {
    pub fn new(
        repository_id: RepositoryId,
        course_id: CourseId,
        last_resource_id: ResourceId,
        indexed: usize,
    ) -> Self {
        Self {
            repository_id,
            course_id,
            last_resource_id,
            indexed,
            updated_at: Utc::now(),
        }
    }

    /// Whether every course of the repository was indexed before the checkpoint.
    pub fn repository_done(&self, repository_id: RepositoryId) -> bool {
        repository_id < self.repository_id
    }

    /// Position of a course, given that repositories and courses are
    /// processed in ascending id order.
    pub fn course_position(&self, repository_id: RepositoryId, course_id: CourseId) -> CoursePosition {
        if repository_id < self.repository_id
            || (repository_id == self.repository_id && course_id < self.course_id)
        {
            CoursePosition::Done
        } else if repository_id == self.repository_id && course_id == self.course_id {
            CoursePosition::ResumeAfter(self.last_resource_id)
        } else {
            CoursePosition::Fresh
        }
    }
}

/// JSON file holding the checkpoint.
#[derive(Debug, Clone)]
pub struct CheckpointStore {
    path: PathBuf,
}

impl CheckpointStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the checkpoint, or `None` when no run was interrupted.
    pub async fn load(&self) -> Result<Option<Checkpoint>, PipelineError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(PipelineError::checkpoint(format!(
                    "Failed to read {}: {}",
                    self.path.display(),
                    e
                )))
            }
        };

        let checkpoint = serde_json::from_slice(&bytes).map_err(|e| {
            PipelineError::checkpoint(format!("Invalid checkpoint {}: {}", self.path.display(), e))
        })?;
        Ok(Some(checkpoint))
    }

    /// Write the checkpoint, replacing the previous one atomically.
    pub async fn save(&self, checkpoint: &Checkpoint) -> Result<(), PipelineError> {
        let bytes = serde_json::to_vec_pretty(checkpoint)
            .map_err(|e| PipelineError::checkpoint(e.to_string()))?;

        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        tokio::fs::write(&tmp, bytes)
            .await
            .map_err(|e| PipelineError::checkpoint(format!("Failed to write {}: {}", tmp.display(), e)))?;
        tokio::fs::rename(&tmp, &self.path).await.map_err(|e| {
            PipelineError::checkpoint(format!("Failed to replace {}: {}", self.path.display(), e))
        })?;

        debug!(
            course_id = checkpoint.course_id,
            last_resource_id = checkpoint.last_resource_id,
            "Saved checkpoint"
        );
        Ok(())
    }

    /// Remove the checkpoint after a complete run.
    pub async fn clear(&self) -> Result<(), PipelineError> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(PipelineError::checkpoint(format!(
                "Failed to remove {}: {}",
                self.path.display(),
                e
            ))),
        }
    }
}
