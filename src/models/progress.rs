use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ProgressStatus {
    NotStarted,
    Reading,
    Completed,
}

/// Reading state against one material. Scoped to a user by the collection
/// key it is stored under, so the record itself only carries the material id.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Progress {
    pub material_id: String,
    pub status: ProgressStatus,
    pub progress_percent: u8,
    pub last_read: DateTime<Utc>,
}

impl Progress {
    pub fn started(material_id: &str) -> Self {
        Self {
            material_id: material_id.to_string(),
            status: ProgressStatus::Reading,
            progress_percent: 0,
            last_read: Utc::now(),
        }
    }
}
