use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Device-local record of the last successful push to the remote mirror.
/// Only ever advances.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct SyncMarker {
    pub last_synced: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    Success { synced_at: DateTime<Utc> },
    Failure,
}

impl SyncOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, SyncOutcome::Success { .. })
    }
}
