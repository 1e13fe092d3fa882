use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use crate::error::{MirrorError, StoreError};
use crate::models::material::{Material, MaterialCategory};
use crate::models::user::UserAccount;
use crate::models::new_id;
use crate::remote::ObjectStore;
use crate::store::LocalStore;
use crate::sync::SyncCoordinator;

pub struct MaterialDraft {
    pub title: String,
    pub level: String,
    pub grade: String,
    pub subject: String,
    pub category: MaterialCategory,
    pub file_name: String,
    pub is_digital: bool,
    pub content: Option<String>,
}

/// Catalog and per-user library operations. Download and favorite lists are
/// set-backed, so recording the same material twice is naturally a no-op.
pub struct CatalogService {
    store: Arc<LocalStore>,
    sync: Arc<SyncCoordinator>,
    objects: Arc<dyn ObjectStore>,
}

impl CatalogService {
    pub fn new(
        store: Arc<LocalStore>,
        sync: Arc<SyncCoordinator>,
        objects: Arc<dyn ObjectStore>,
    ) -> Self {
        Self {
            store,
            sync,
            objects,
        }
    }

    pub async fn list_materials(&self) -> Result<Vec<Material>, StoreError> {
        self.store.get_all().await
    }

    pub async fn record_download(
        &self,
        user_id: &str,
        material_id: &str,
    ) -> Result<UserAccount, StoreError> {
        self.mutate_user(user_id, |user| {
            user.downloaded_ids.insert(material_id.to_string());
        })
        .await
    }

    pub async fn remove_download(
        &self,
        user_id: &str,
        material_id: &str,
    ) -> Result<UserAccount, StoreError> {
        self.mutate_user(user_id, |user| {
            user.downloaded_ids.remove(material_id);
        })
        .await
    }

    pub async fn toggle_favorite(
        &self,
        user_id: &str,
        material_id: &str,
    ) -> Result<UserAccount, StoreError> {
        self.mutate_user(user_id, |user| {
            if !user.favorite_ids.remove(material_id) {
                user.favorite_ids.insert(material_id.to_string());
            }
        })
        .await
    }

    /// Admin upload: object store first, then the local catalog, then a
    /// best-effort mirror push. The local write is authoritative; a failed
    /// push leaves the material local-only until the next catalog sync.
    pub async fn add_material(
        &self,
        draft: MaterialDraft,
        bytes: Vec<u8>,
    ) -> Result<Material, CatalogError> {
        let id = new_id("mat");
        let path = format!("{}/{}", id, draft.file_name);
        let handle = self.objects.upload(&path, bytes).await?;
        let material = Material {
            id,
            title: draft.title,
            level: draft.level,
            grade: draft.grade,
            subject: draft.subject,
            category: draft.category,
            file_location: self.objects.public_url(&handle),
            file_name: draft.file_name,
            uploaded_at: Utc::now(),
            is_digital: draft.is_digital,
            content: draft.content,
        };
        self.store.upsert(&material).await?;
        self.sync.push_material(&material).await;
        info!(material_id = %material.id, title = %material.title, "material added");
        Ok(material)
    }

    /// Deletes the catalog entry only. References from download lists and
    /// progress records are weak and deliberately left dangling.
    pub async fn delete_material(&self, material_id: &str) -> Result<(), StoreError> {
        self.store.remove::<Material>(material_id).await?;
        self.sync.push_material_delete(material_id).await;
        Ok(())
    }

    async fn mutate_user<F>(&self, user_id: &str, apply: F) -> Result<UserAccount, StoreError>
    where
        F: FnOnce(&mut UserAccount),
    {
        let mut user = match self.store.get::<UserAccount>(user_id).await? {
            Some(user) => user,
            None => UserAccount::new(user_id, ""),
        };
        apply(&mut user);
        user.updated_at = Utc::now();
        self.store.upsert(&user).await?;
        Ok(user)
    }
}

#[derive(thiserror::Error, Debug)]
pub enum CatalogError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Upload(#[from] MirrorError),
}
