use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::{Duration, Utc};
use serde_json::json;
use tracing::{debug, info, warn};

use crate::error::StoreError;
use crate::models::material::Material;
use crate::models::sync::{SyncMarker, SyncOutcome};
use crate::models::user::UserAccount;
use crate::remote::RemoteMirror;
use crate::store::LocalStore;

pub const PROFILES_TABLE: &str = "profiles";
pub const MATERIALS_TABLE: &str = "materials";

/// Best-effort, one-directional reconciliation between the local cache and
/// the remote mirror. Failures degrade to the last-known local state; there
/// is no queue, no retry, no merge.
pub struct SyncCoordinator {
    store: Arc<LocalStore>,
    mirror: Arc<dyn RemoteMirror>,
    online: AtomicBool,
}

impl SyncCoordinator {
    pub fn new(store: Arc<LocalStore>, mirror: Arc<dyn RemoteMirror>) -> Self {
        Self {
            store,
            mirror,
            online: AtomicBool::new(true),
        }
    }

    /// Records reachability as reported by the host. Returns true exactly on
    /// the offline-to-online transition.
    pub fn set_online(&self, online: bool) -> bool {
        let was_online = self.online.swap(online, Ordering::SeqCst);
        online && !was_online
    }

    pub fn is_online(&self) -> bool {
        self.online.load(Ordering::SeqCst)
    }

    /// Reachability-transition trigger: syncs only when coming back online
    /// with an active user session.
    pub async fn connectivity_changed(
        &self,
        online: bool,
        active_user: Option<&str>,
    ) -> Option<SyncOutcome> {
        let came_online = self.set_online(online);
        match (came_online, active_user) {
            (true, Some(user_id)) => Some(self.sync(user_id).await),
            _ => None,
        }
    }

    /// Pushes the user's whole denormalized profile record to the mirror.
    /// Never panics and never touches local state on failure; on success the
    /// sync marker advances strictly and the new timestamp is returned.
    pub async fn sync(&self, user_id: &str) -> SyncOutcome {
        if !self.is_online() {
            debug!(user_id, "sync skipped, offline");
            return SyncOutcome::Failure;
        }

        let user = match self.store.get::<UserAccount>(user_id).await {
            Ok(Some(user)) => user,
            Ok(None) => {
                warn!(user_id, "sync skipped, no local account");
                return SyncOutcome::Failure;
            }
            Err(e) => {
                warn!(user_id, "sync skipped, local read failed: {e}");
                return SyncOutcome::Failure;
            }
        };

        let record = profile_record(&user);
        if let Err(e) = self.mirror.upsert(PROFILES_TABLE, record).await {
            warn!(user_id, "profile push failed: {e}");
            return SyncOutcome::Failure;
        }

        match self.advance_marker().await {
            Ok(marker) => {
                info!(user_id, synced_at = %marker.last_synced, "profile pushed");
                SyncOutcome::Success {
                    synced_at: marker.last_synced,
                }
            }
            Err(e) => {
                warn!(user_id, "marker write failed after push: {e}");
                SyncOutcome::Failure
            }
        }
    }

    /// Authoritative catalog pull. None means "could not refresh", which is
    /// distinct from an empty catalog; the caller keeps its cache.
    pub async fn fetch_global_materials(&self) -> Option<Vec<Material>> {
        if !self.is_online() {
            debug!("catalog pull skipped, offline");
            return None;
        }

        let rows = match self.mirror.select(MATERIALS_TABLE).await {
            Ok(rows) => rows,
            Err(e) => {
                warn!("catalog pull failed: {e}");
                return None;
            }
        };

        let mut materials = Vec::with_capacity(rows.len());
        for row in rows {
            match serde_json::from_value::<Material>(row) {
                Ok(m) => materials.push(m),
                Err(e) => {
                    warn!("catalog pull returned malformed material: {e}");
                    return None;
                }
            }
        }
        Some(materials)
    }

    /// Admin-panel trigger: replaces the local catalog when the pull
    /// succeeds, leaves it untouched otherwise.
    pub async fn refresh_catalog(&self) -> bool {
        let Some(materials) = self.fetch_global_materials().await else {
            return false;
        };
        match self.store.replace_all(&materials).await {
            Ok(()) => {
                info!(count = materials.len(), "catalog refreshed from mirror");
                true
            }
            Err(e) => {
                warn!("catalog refresh write failed: {e}");
                false
            }
        }
    }

    /// Best-effort push of catalog metadata; local state is already written
    /// by the caller and stays as-is either way.
    pub async fn push_material(&self, material: &Material) {
        if !self.is_online() {
            debug!(material_id = %material.id, "material push skipped, offline");
            return;
        }
        let record = match serde_json::to_value(material) {
            Ok(v) => v,
            Err(e) => {
                warn!(material_id = %material.id, "material serialize failed: {e}");
                return;
            }
        };
        if let Err(e) = self.mirror.upsert(MATERIALS_TABLE, record).await {
            warn!(material_id = %material.id, "material push failed: {e}");
        }
    }

    pub async fn push_material_delete(&self, material_id: &str) {
        if !self.is_online() {
            return;
        }
        if let Err(e) = self.mirror.delete(MATERIALS_TABLE, material_id).await {
            warn!(material_id, "material delete push failed: {e}");
        }
    }

    async fn advance_marker(&self) -> Result<SyncMarker, StoreError> {
        let previous = self.store.sync_marker().await?;
        let now = Utc::now();
        // Strictly forward even when two syncs land on the same millisecond.
        let last_synced = match previous {
            Some(m) if m.last_synced >= now => m.last_synced + Duration::milliseconds(1),
            _ => now,
        };
        let marker = SyncMarker { last_synced };
        self.store.set_sync_marker(&marker).await?;
        Ok(marker)
    }
}

/// Whole-record profile shape pushed to the mirror. No field-level diffing;
/// the remote row is overwritten every sync.
fn profile_record(user: &UserAccount) -> serde_json::Value {
    json!({
        "id": user.id,
        "email": user.email,
        "role": user.role,
        "name": user.name,
        "district": user.district,
        "grade": user.grade,
        "bio": user.bio,
        "downloaded_ids": user.downloaded_ids,
        "favorite_ids": user.favorite_ids,
        "is_profile_complete": user.is_profile_complete,
        "updated_at": user.updated_at,
    })
}
