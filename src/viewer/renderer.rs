use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::RenderError;

/// Paginated-document rendering backend. Pages are fetched lazily; text
/// extraction and canvas rendering are separate, independently cancelable
/// operations.
#[async_trait]
pub trait DocumentRenderer: Send + Sync {
    async fn load(&self, locator: &str) -> Result<Arc<dyn LoadedDocument>, RenderError>;
}

#[async_trait]
pub trait LoadedDocument: Send + Sync {
    fn page_count(&self) -> u32;

    async fn page(&self, number: u32) -> Result<Arc<dyn DocumentPage>, RenderError>;
}

/// One page of a loaded document. `render` must observe the token between
/// steps and return `RenderError::Canceled` when it fires; cancellation is
/// cooperative, a long synchronous step cannot be interrupted mid-step.
#[async_trait]
pub trait DocumentPage: Send + Sync {
    async fn text_content(&self) -> Result<String, RenderError>;

    async fn render(&self, scale: f32, cancel: &CancellationToken) -> Result<(), RenderError>;
}
