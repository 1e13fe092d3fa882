pub mod community;
pub mod exam;
pub mod material;
pub mod progress;
pub mod sync;
pub mod user;

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;
use serde::{de::DeserializeOwned, Serialize};

/// One locally cached, JSON-serializable record. Each entity type maps to
/// exactly one collection key in the local store.
pub trait Entity: Serialize + DeserializeOwned + Send + Sync {
    const COLLECTION: &'static str;

    fn id(&self) -> &str;
}

static ID_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Mints a process-unique string id: millisecond timestamp plus a counter
/// so same-tick callers never collide.
pub fn new_id(prefix: &str) -> String {
    let n = ID_COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("{}-{}-{:x}", prefix, Utc::now().timestamp_millis(), n)
}
