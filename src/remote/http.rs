use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

use super::{ObjectHandle, ObjectStore, RemoteMirror};
use crate::error::MirrorError;

/// PostgREST-style mirror client. Upserts resolve duplicates by merge, so a
/// repeated push of the same record is safe.
pub struct HttpMirror {
    client: Client,
    base_url: String,
    api_key: String,
}

impl HttpMirror {
    pub fn new(base_url: &str, api_key: &str, timeout_secs: u64) -> Result<Self, MirrorError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }
}

#[async_trait]
impl RemoteMirror for HttpMirror {
    async fn upsert(&self, table: &str, record: Value) -> Result<(), MirrorError> {
        let resp = self
            .client
            .post(self.table_url(table))
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .header("Prefer", "resolution=merge-duplicates")
            .json(&record)
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(MirrorError::Rejected {
                table: table.to_string(),
                status: resp.status().as_u16(),
            });
        }
        Ok(())
    }

    async fn select(&self, table: &str) -> Result<Vec<Value>, MirrorError> {
        let resp = self
            .client
            .get(self.table_url(table))
            .query(&[("select", "*")])
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(MirrorError::Rejected {
                table: table.to_string(),
                status: resp.status().as_u16(),
            });
        }

        let rows: Vec<Value> = resp.json().await?;
        Ok(rows)
    }

    async fn delete(&self, table: &str, id: &str) -> Result<(), MirrorError> {
        let resp = self
            .client
            .delete(self.table_url(table))
            .query(&[("id", format!("eq.{id}"))])
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(MirrorError::Rejected {
                table: table.to_string(),
                status: resp.status().as_u16(),
            });
        }
        Ok(())
    }
}

pub struct HttpObjectStore {
    client: Client,
    base_url: String,
    api_key: String,
    bucket: String,
}

impl HttpObjectStore {
    pub fn new(
        base_url: &str,
        api_key: &str,
        bucket: &str,
        timeout_secs: u64,
    ) -> Result<Self, MirrorError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            bucket: bucket.to_string(),
        })
    }
}

#[async_trait]
impl ObjectStore for HttpObjectStore {
    async fn upload(&self, path: &str, bytes: Vec<u8>) -> Result<ObjectHandle, MirrorError> {
        let url = format!("{}/storage/v1/object/{}/{}", self.base_url, self.bucket, path);
        let resp = self
            .client
            .post(url)
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .body(bytes)
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(MirrorError::Rejected {
                table: format!("storage/{}", self.bucket),
                status: resp.status().as_u16(),
            });
        }

        Ok(ObjectHandle {
            path: path.to_string(),
        })
    }

    fn public_url(&self, handle: &ObjectHandle) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{}",
            self.base_url, self.bucket, handle.path
        )
    }
}
