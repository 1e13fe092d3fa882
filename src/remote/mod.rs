pub mod ai;
pub mod http;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::watch;

use crate::error::{AiError, AuthError, MirrorError};

/// Collection-style remote backing store used for cross-device durability
/// of catalog and profile data. Narrow by design: the core never needs
/// queries, joins, or partial updates.
#[async_trait]
pub trait RemoteMirror: Send + Sync {
    async fn upsert(&self, table: &str, record: Value) -> Result<(), MirrorError>;

    async fn select(&self, table: &str) -> Result<Vec<Value>, MirrorError>;

    async fn delete(&self, table: &str, id: &str) -> Result<(), MirrorError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectHandle {
    pub path: String,
}

/// Binary object storage for uploaded material files.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn upload(&self, path: &str, bytes: Vec<u8>) -> Result<ObjectHandle, MirrorError>;

    fn public_url(&self, handle: &ObjectHandle) -> String;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub uid: String,
    pub email: String,
    pub display_name: String,
}

/// Opaque signed-in identity from the external auth provider. The core only
/// consumes the identity stream and an explicit sign-out.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    fn changes(&self) -> watch::Receiver<Option<Identity>>;

    async fn sign_out(&self) -> Result<(), AuthError>;
}

#[derive(Debug, Clone, PartialEq)]
pub enum GeneratedContent {
    Structured(Value),
    Text(String),
}

/// Generative text service used for quiz generation and the tutor chat.
/// Pure request/response: one call, one result or one error, no retries.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(
        &self,
        prompt: &str,
        response_schema: Option<Value>,
    ) -> Result<GeneratedContent, AiError>;
}
