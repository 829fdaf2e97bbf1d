//! Rendered document source.
//!
//! The page is dynamic, so it is loaded in a real browser and snapshotted
//! once it has settled:
//!
//! ```text
//! URL → ChromeRenderer → RenderedPage (markup + screenshot) → HtmlDocument
//! ```

mod chrome;
mod config;

pub use chrome::ChromeRenderer;
pub use config::BrowserConfig;

use async_trait::async_trait;
use url::Url;

use crate::app::Result;

/// Snapshot of a loaded page.
#[derive(Debug, Clone)]
pub struct RenderedPage {
    /// Final URL after redirects
    pub url: Url,
    /// Serialized DOM at snapshot time
    pub markup: String,
    /// Whether any readiness selector appeared before the timeout
    pub ready: bool,
    /// PNG bytes, when screenshots are enabled
    pub screenshot: Option<Vec<u8>>,
}

/// Trait for page rendering implementations
#[async_trait]
pub trait PageRenderer: Send + Sync {
    /// Load `url` and wait until one of `ready_selectors` matches or the
    /// readiness timeout passes.
    async fn render(&self, url: &Url, ready_selectors: &[String]) -> Result<RenderedPage>;

    /// Release browser resources.
    async fn close(&mut self) -> Result<()> {
        Ok(())
    }
}
