#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use studyshelf::error::{AiError, MirrorError, RenderError};
use studyshelf::remote::{
    GeneratedContent, ObjectHandle, ObjectStore, RemoteMirror, TextGenerator,
};
use studyshelf::viewer::renderer::{DocumentPage, DocumentRenderer, LoadedDocument};

/// In-memory mirror with a switchable failure mode, keyed table -> id -> row.
#[derive(Default)]
pub struct FakeMirror {
    pub tables: Mutex<HashMap<String, HashMap<String, Value>>>,
    pub fail: AtomicBool,
}

impl FakeMirror {
    pub fn set_failing(&self, failing: bool) {
        self.fail.store(failing, Ordering::SeqCst);
    }

    pub fn record(&self, table: &str, id: &str) -> Option<Value> {
        self.tables
            .lock()
            .unwrap()
            .get(table)
            .and_then(|rows| rows.get(id))
            .cloned()
    }

    pub fn put(&self, table: &str, id: &str, row: Value) {
        self.tables
            .lock()
            .unwrap()
            .entry(table.to_string())
            .or_default()
            .insert(id.to_string(), row);
    }

    fn check(&self, table: &str) -> Result<(), MirrorError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(MirrorError::Rejected {
                table: table.to_string(),
                status: 503,
            });
        }
        Ok(())
    }
}

#[async_trait]
impl RemoteMirror for FakeMirror {
    async fn upsert(&self, table: &str, record: Value) -> Result<(), MirrorError> {
        self.check(table)?;
        let id = record
            .get("id")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        self.put(table, &id, record);
        Ok(())
    }

    async fn select(&self, table: &str) -> Result<Vec<Value>, MirrorError> {
        self.check(table)?;
        Ok(self
            .tables
            .lock()
            .unwrap()
            .get(table)
            .map(|rows| rows.values().cloned().collect())
            .unwrap_or_default())
    }

    async fn delete(&self, table: &str, id: &str) -> Result<(), MirrorError> {
        self.check(table)?;
        if let Some(rows) = self.tables.lock().unwrap().get_mut(table) {
            rows.remove(id);
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct FakeObjects {
    pub uploads: Mutex<HashMap<String, Vec<u8>>>,
}

#[async_trait]
impl ObjectStore for FakeObjects {
    async fn upload(&self, path: &str, bytes: Vec<u8>) -> Result<ObjectHandle, MirrorError> {
        self.uploads.lock().unwrap().insert(path.to_string(), bytes);
        Ok(ObjectHandle {
            path: path.to_string(),
        })
    }

    fn public_url(&self, handle: &ObjectHandle) -> String {
        format!("https://cdn.test/{}", handle.path)
    }
}

/// Canned generator: one queued reply, or a failure.
#[derive(Default)]
pub struct FakeGenerator {
    pub reply: Mutex<Option<GeneratedContent>>,
    pub fail: AtomicBool,
}

impl FakeGenerator {
    pub fn with_reply(reply: GeneratedContent) -> Self {
        Self {
            reply: Mutex::new(Some(reply)),
            fail: AtomicBool::new(false),
        }
    }
}

#[async_trait]
impl TextGenerator for FakeGenerator {
    async fn generate(
        &self,
        _prompt: &str,
        _response_schema: Option<Value>,
    ) -> Result<GeneratedContent, AiError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(AiError::Rejected { status: 500 });
        }
        self.reply
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| AiError::Malformed("no canned reply".to_string()))
    }
}

/// Fake paginated document. Text extraction yields once per page so
/// cancellation can interleave; rendering polls its token between short
/// steps and records what happened in the shared log.
pub struct FakeRenderer {
    pub pages: u32,
    pub fail_load: bool,
    pub render_log: Arc<Mutex<Vec<String>>>,
}

impl FakeRenderer {
    pub fn new(pages: u32) -> Self {
        Self {
            pages,
            fail_load: false,
            render_log: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn failing() -> Self {
        Self {
            pages: 0,
            fail_load: true,
            render_log: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

#[async_trait]
impl DocumentRenderer for FakeRenderer {
    async fn load(&self, _locator: &str) -> Result<Arc<dyn LoadedDocument>, RenderError> {
        if self.fail_load {
            return Err(RenderError::Load("unreachable document".to_string()));
        }
        Ok(Arc::new(FakeDocument {
            pages: self.pages,
            render_log: Arc::clone(&self.render_log),
        }))
    }
}

pub struct FakeDocument {
    pages: u32,
    render_log: Arc<Mutex<Vec<String>>>,
}

#[async_trait]
impl LoadedDocument for FakeDocument {
    fn page_count(&self) -> u32 {
        self.pages
    }

    async fn page(&self, number: u32) -> Result<Arc<dyn DocumentPage>, RenderError> {
        if number == 0 || number > self.pages {
            return Err(RenderError::PageOutOfRange(number));
        }
        Ok(Arc::new(FakePage {
            number,
            render_log: Arc::clone(&self.render_log),
        }))
    }
}

pub struct FakePage {
    number: u32,
    render_log: Arc<Mutex<Vec<String>>>,
}

#[async_trait]
impl DocumentPage for FakePage {
    async fn text_content(&self) -> Result<String, RenderError> {
        tokio::task::yield_now().await;
        Ok(format!("text of page {}", self.number))
    }

    async fn render(&self, _scale: f32, cancel: &CancellationToken) -> Result<(), RenderError> {
        for _ in 0..20 {
            if cancel.is_cancelled() {
                self.render_log
                    .lock()
                    .unwrap()
                    .push(format!("canceled {}", self.number));
                return Err(RenderError::Canceled);
            }
            tokio::time::sleep(std::time::Duration::from_millis(2)).await;
        }
        self.render_log
            .lock()
            .unwrap()
            .push(format!("rendered {}", self.number));
        Ok(())
    }
}
