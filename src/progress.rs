use std::sync::Arc;

use chrono::Utc;
use tracing::debug;

use crate::error::StoreError;
use crate::models::progress::{Progress, ProgressStatus};
use crate::store::LocalStore;

/// Translates viewer lifecycle events into progress upserts. Every write
/// goes through the store's find-and-replace path, so a (user, material)
/// pair can never grow a second record. Progress stays device-local.
pub struct ProgressTracker {
    store: Arc<LocalStore>,
}

impl ProgressTracker {
    pub fn new(store: Arc<LocalStore>) -> Self {
        Self { store }
    }

    /// First open creates a Reading record at 0%. Reopening changes nothing:
    /// a Completed material is not reset by merely looking at it again.
    pub async fn open(&self, user_id: &str, material_id: &str) -> Result<Progress, StoreError> {
        if let Some(existing) = self.store.find_progress(user_id, material_id).await? {
            return Ok(existing);
        }
        let progress = Progress::started(material_id);
        self.store.update_progress(user_id, &progress).await?;
        debug!(user_id, material_id, "progress record created");
        Ok(progress)
    }

    /// Position checkpoint. Moves NotStarted into Reading but never demotes
    /// Completed on its own.
    pub async fn update_position(
        &self,
        user_id: &str,
        material_id: &str,
        percent: u8,
    ) -> Result<Progress, StoreError> {
        let mut progress = match self.store.find_progress(user_id, material_id).await? {
            Some(p) => p,
            None => Progress::started(material_id),
        };
        if progress.status != ProgressStatus::Completed {
            progress.status = ProgressStatus::Reading;
        }
        progress.progress_percent = percent.min(100);
        progress.last_read = Utc::now();
        self.store.update_progress(user_id, &progress).await?;
        Ok(progress)
    }

    pub async fn mark_complete(
        &self,
        user_id: &str,
        material_id: &str,
    ) -> Result<Progress, StoreError> {
        let progress = Progress {
            material_id: material_id.to_string(),
            status: ProgressStatus::Completed,
            progress_percent: 100,
            last_read: Utc::now(),
        };
        self.store.update_progress(user_id, &progress).await?;
        debug!(user_id, material_id, "marked complete");
        Ok(progress)
    }

    /// The one sanctioned way back out of Completed: an explicit Reading
    /// status write when the user continues with the material.
    pub async fn resume(&self, user_id: &str, material_id: &str) -> Result<Progress, StoreError> {
        let mut progress = match self.store.find_progress(user_id, material_id).await? {
            Some(p) => p,
            None => Progress::started(material_id),
        };
        progress.status = ProgressStatus::Reading;
        progress.last_read = Utc::now();
        self.store.update_progress(user_id, &progress).await?;
        Ok(progress)
    }
}
