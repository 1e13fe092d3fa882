pub mod renderer;

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};

use crate::error::RenderError;
use crate::models::material::Material;
use crate::progress::ProgressTracker;
use crate::store::LocalStore;
use renderer::{DocumentPage as _, DocumentRenderer, LoadedDocument};

/// Pages extracted between cooperative yields, so a long document cannot
/// starve the rest of the event loop.
const EXTRACT_YIELD_EVERY: u32 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewerState {
    Idle,
    Loading,
    Ready,
    Failed,
    Closed,
}

struct SessionInner {
    user_id: String,
    material_id: String,
    state: Mutex<ViewerState>,
    document: Mutex<Option<Arc<dyn LoadedDocument>>>,
    extracted: Mutex<BTreeMap<u32, String>>,
    /// Session-wide token; every render token is a child of it, so one
    /// cancel tears down extraction and all in-flight renders together.
    cancel: CancellationToken,
    render_slots: Mutex<HashMap<String, CancellationToken>>,
}

/// Lifecycle of viewing one material: load, background text extraction in
/// strict page order, per-slot page rendering, progress checkpoints, and a
/// single cleanup routine shared by explicit close and teardown.
pub struct ViewerSession {
    inner: Arc<SessionInner>,
    tracker: Arc<ProgressTracker>,
    extraction: Mutex<Option<JoinHandle<()>>>,
}

impl ViewerSession {
    /// Idle -> Loading -> Ready, or Failed if the document cannot be
    /// acquired. Failure never propagates as an error: the host keeps
    /// running and the state reports what happened.
    pub async fn open(
        renderer: &dyn DocumentRenderer,
        store: Arc<LocalStore>,
        user_id: &str,
        material: &Material,
    ) -> ViewerSession {
        let inner = Arc::new(SessionInner {
            user_id: user_id.to_string(),
            material_id: material.id.clone(),
            state: Mutex::new(ViewerState::Loading),
            document: Mutex::new(None),
            extracted: Mutex::new(BTreeMap::new()),
            cancel: CancellationToken::new(),
            render_slots: Mutex::new(HashMap::new()),
        });
        let session = ViewerSession {
            inner,
            tracker: Arc::new(ProgressTracker::new(store)),
            extraction: Mutex::new(None),
        };

        let document = match renderer.load(&material.file_location).await {
            Ok(doc) => doc,
            Err(e) => {
                warn!(material_id = %material.id, "document load failed: {e}");
                session.set_state(ViewerState::Failed);
                return session;
            }
        };

        if let Err(e) = session.tracker.open(user_id, &material.id).await {
            warn!(material_id = %material.id, "progress open failed: {e}");
        }

        *session.inner.document.lock().unwrap() = Some(Arc::clone(&document));
        session.set_state(ViewerState::Ready);

        let handle = tokio::spawn(extract_text(Arc::clone(&session.inner), document));
        *session.extraction.lock().unwrap() = Some(handle);

        session
    }

    pub fn state(&self) -> ViewerState {
        *self.inner.state.lock().unwrap()
    }

    pub fn page_count(&self) -> u32 {
        self.inner
            .document
            .lock()
            .unwrap()
            .as_ref()
            .map(|d| d.page_count())
            .unwrap_or(0)
    }

    pub fn extracted_pages(&self) -> usize {
        self.inner.extracted.lock().unwrap().len()
    }

    pub fn text_for_page(&self, number: u32) -> Option<String> {
        self.inner.extracted.lock().unwrap().get(&number).cloned()
    }

    /// Renders a page into the named slot. The most recent request for a
    /// slot supersedes any prior in-flight one: cancel-and-replace, never a
    /// queue. A canceled render is an expected race, not an error.
    pub fn render_page(&self, slot: &str, number: u32, scale: f32) {
        if self.state() != ViewerState::Ready {
            debug!(slot, number, "render ignored, session not ready");
            return;
        }
        let Some(document) = self.inner.document.lock().unwrap().clone() else {
            return;
        };

        let token = self.inner.cancel.child_token();
        if let Some(previous) = self
            .inner
            .render_slots
            .lock()
            .unwrap()
            .insert(slot.to_string(), token.clone())
        {
            previous.cancel();
        }

        let slot = slot.to_string();
        tokio::spawn(async move {
            let page = match document.page(number).await {
                Ok(page) => page,
                Err(e) => {
                    error!(%slot, number, "page fetch failed: {e}");
                    return;
                }
            };
            match page.render(scale, &token).await {
                Ok(()) => {}
                Err(RenderError::Canceled) => {
                    debug!(%slot, number, "render superseded");
                }
                Err(e) => {
                    // One bad page never aborts the session.
                    error!(%slot, number, "render failed: {e}");
                }
            }
        });
    }

    pub async fn checkpoint(&self, percent: u8) {
        let r = self
            .tracker
            .update_position(&self.inner.user_id, &self.inner.material_id, percent)
            .await;
        if let Err(e) = r {
            warn!(material_id = %self.inner.material_id, "checkpoint failed: {e}");
        }
    }

    pub async fn complete(&self) {
        let r = self
            .tracker
            .mark_complete(&self.inner.user_id, &self.inner.material_id)
            .await;
        if let Err(e) = r {
            warn!(material_id = %self.inner.material_id, "mark complete failed: {e}");
        }
    }

    /// Explicit close. Teardown without a close call converges on the same
    /// routine through Drop.
    pub fn close(&self) {
        self.shutdown();
    }

    /// Awaits the background extraction task, if any. Used when the host
    /// needs extraction to be quiescent (tests, orderly shutdown).
    pub async fn wait_for_extraction(&self) {
        let handle = self.extraction.lock().unwrap().take();
        if let Some(handle) = handle {
            let _ = handle.await;
        }
    }

    fn set_state(&self, state: ViewerState) {
        *self.inner.state.lock().unwrap() = state;
    }

    fn shutdown(&self) {
        self.inner.cancel.cancel();
        self.inner.render_slots.lock().unwrap().clear();
        let mut state = self.inner.state.lock().unwrap();
        if *state != ViewerState::Closed {
            debug!(material_id = %self.inner.material_id, "viewer session closed");
            *state = ViewerState::Closed;
        }
    }
}

impl Drop for ViewerSession {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Walks pages strictly in order, populating the page-to-text map. Checks
/// the session token before every page and yields every few pages so the
/// event loop stays responsive.
async fn extract_text(inner: Arc<SessionInner>, document: Arc<dyn LoadedDocument>) {
    let total = document.page_count();
    for number in 1..=total {
        if inner.cancel.is_cancelled() {
            debug!(material_id = %inner.material_id, number, "extraction canceled");
            return;
        }

        let text = match document.page(number).await {
            Ok(page) => page.text_content().await,
            Err(e) => Err(e),
        };
        match text {
            Ok(text) => {
                if inner.cancel.is_cancelled() {
                    return;
                }
                inner.extracted.lock().unwrap().insert(number, text);
            }
            Err(e) => {
                // Skip the page, keep extracting the rest.
                warn!(material_id = %inner.material_id, number, "text extraction failed: {e}");
            }
        }

        if number % EXTRACT_YIELD_EVERY == 0 {
            tokio::task::yield_now().await;
        }
    }
    debug!(material_id = %inner.material_id, total, "extraction finished");
}
