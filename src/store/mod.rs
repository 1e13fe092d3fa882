use std::str::FromStr;

use serde_json::Value;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;

use crate::error::StoreError;
use crate::models::progress::Progress;
use crate::models::sync::SyncMarker;
use crate::models::Entity;

const KEY_PREFIX: &str = "studyshelf";

/// Offline cache of every domain collection, one JSON array per key in a
/// single SQLite table. Reads never touch the network; writes land here
/// first and are mirrored remotely later, if at all.
///
/// The pool is capped at one connection so operations apply strictly in
/// call order.
pub struct LocalStore {
    pool: SqlitePool,
}

impl LocalStore {
    pub async fn open(database_url: &str) -> Result<Self, StoreError> {
        let connection_options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
            .synchronous(sqlx::sqlite::SqliteSynchronous::Normal);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(connection_options)
            .await?;

        sqlx::migrate!().run(&pool).await?;

        Ok(Self { pool })
    }

    pub async fn open_in_memory() -> Result<Self, StoreError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;

        sqlx::migrate!().run(&pool).await?;

        Ok(Self { pool })
    }

    /// Entire collection; absent key reads as empty, never as an error.
    pub async fn get_all<T: Entity>(&self) -> Result<Vec<T>, StoreError> {
        let key = collection_key::<T>();
        let items = self.read_items(&key).await?;
        items
            .into_iter()
            .map(|v| serde_json::from_value(v))
            .collect::<Result<Vec<T>, _>>()
            .map_err(|source| StoreError::Corrupt { key, source })
    }

    pub async fn get<T: Entity>(&self, id: &str) -> Result<Option<T>, StoreError> {
        let all = self.get_all::<T>().await?;
        Ok(all.into_iter().find(|e| e.id() == id))
    }

    /// Replace-by-id, else append. Whole-collection read/replace keeps the
    /// operation all-or-nothing against SQLite.
    pub async fn upsert<T: Entity>(&self, entity: &T) -> Result<(), StoreError> {
        let key = collection_key::<T>();
        let mut items = self.read_items(&key).await?;
        let value = serde_json::to_value(entity)?;
        match items.iter_mut().find(|v| value_id(v) == Some(entity.id())) {
            Some(slot) => *slot = value,
            None => items.push(value),
        }
        self.write_items(&key, &items).await
    }

    /// Idempotent: removing an id that is not present is a no-op.
    pub async fn remove<T: Entity>(&self, id: &str) -> Result<(), StoreError> {
        let key = collection_key::<T>();
        let mut items = self.read_items(&key).await?;
        items.retain(|v| value_id(v) != Some(id));
        self.write_items(&key, &items).await
    }

    pub async fn replace_all<T: Entity>(&self, entities: &[T]) -> Result<(), StoreError> {
        let key = collection_key::<T>();
        let items = entities
            .iter()
            .map(serde_json::to_value)
            .collect::<Result<Vec<_>, _>>()?;
        self.write_items(&key, &items).await
    }

    /// Inserts only the defaults whose id is missing, preserving everything
    /// already present. Ships demo content without clobbering user data.
    pub async fn seed<T: Entity>(&self, defaults: &[T]) -> Result<(), StoreError> {
        let key = collection_key::<T>();
        let mut items = self.read_items(&key).await?;
        let mut changed = false;
        for default in defaults {
            let present = items.iter().any(|v| value_id(v) == Some(default.id()));
            if !present {
                items.push(serde_json::to_value(default)?);
                changed = true;
            }
        }
        if changed {
            self.write_items(&key, &items).await?;
        }
        Ok(())
    }

    /// All progress records for one user, in stored order.
    pub async fn progress_for(&self, user_id: &str) -> Result<Vec<Progress>, StoreError> {
        let key = progress_key(user_id);
        let items = self.read_items(&key).await?;
        items
            .into_iter()
            .map(|v| serde_json::from_value(v))
            .collect::<Result<Vec<Progress>, _>>()
            .map_err(|source| StoreError::Corrupt { key, source })
    }

    pub async fn find_progress(
        &self,
        user_id: &str,
        material_id: &str,
    ) -> Result<Option<Progress>, StoreError> {
        let all = self.progress_for(user_id).await?;
        Ok(all.into_iter().find(|p| p.material_id == material_id))
    }

    /// Find-by-material-and-replace, else append. Sole write path into a
    /// user's progress list, which is what keeps one record per material.
    pub async fn update_progress(
        &self,
        user_id: &str,
        progress: &Progress,
    ) -> Result<(), StoreError> {
        let key = progress_key(user_id);
        let mut items = self.read_items(&key).await?;
        let value = serde_json::to_value(progress)?;
        let slot = items
            .iter_mut()
            .find(|v| v.get("material_id").and_then(Value::as_str) == Some(&progress.material_id));
        match slot {
            Some(existing) => *existing = value,
            None => items.push(value),
        }
        self.write_items(&key, &items).await
    }

    pub async fn sync_marker(&self) -> Result<Option<SyncMarker>, StoreError> {
        let key = format!("{KEY_PREFIX}.sync_marker");
        match self.read_raw(&key).await? {
            Some(data) => {
                let marker = serde_json::from_str(&data)
                    .map_err(|source| StoreError::Corrupt { key, source })?;
                Ok(Some(marker))
            }
            None => Ok(None),
        }
    }

    pub async fn set_sync_marker(&self, marker: &SyncMarker) -> Result<(), StoreError> {
        let key = format!("{KEY_PREFIX}.sync_marker");
        let data = serde_json::to_string(marker)?;
        self.write_raw(&key, &data).await
    }

    async fn read_items(&self, key: &str) -> Result<Vec<Value>, StoreError> {
        match self.read_raw(key).await? {
            Some(data) => serde_json::from_str(&data).map_err(|source| StoreError::Corrupt {
                key: key.to_string(),
                source,
            }),
            None => Ok(Vec::new()),
        }
    }

    async fn write_items(&self, key: &str, items: &[Value]) -> Result<(), StoreError> {
        let data = serde_json::to_string(items)?;
        self.write_raw(key, &data).await
    }

    async fn read_raw(&self, key: &str) -> Result<Option<String>, StoreError> {
        let row: Option<(String,)> =
            sqlx::query_as("SELECT data FROM collections WHERE key = ?1")
                .bind(key)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.map(|(data,)| data))
    }

    async fn write_raw(&self, key: &str, data: &str) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO collections (key, data, updated_at)
            VALUES (?1, ?2, datetime('now'))
            ON CONFLICT(key) DO UPDATE SET
                data = excluded.data,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(key)
        .bind(data)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

fn collection_key<T: Entity>() -> String {
    format!("{KEY_PREFIX}.{}", T::COLLECTION)
}

fn progress_key(user_id: &str) -> String {
    format!("{KEY_PREFIX}.progress.{user_id}")
}

fn value_id(v: &Value) -> Option<&str> {
    v.get("id").and_then(Value::as_str)
}
