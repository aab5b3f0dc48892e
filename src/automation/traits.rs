//! Automation client capabilities
//!
//! The engine never drives a browser itself; it consumes these primitives.

use std::time::Duration;

use async_trait::async_trait;

use crate::core::{ClickOptions, Result, ViewportSize};

/// Page-level primitives the image engine relies on
#[async_trait]
pub trait AutomationPage: Send + Sync {
    /// Navigate to a URL
    async fn open(&self, url: &str) -> Result<()>;

    /// Close the page
    async fn close(&self) -> Result<()>;

    /// Capture the whole page as PNG bytes
    async fn screenshot_full_page(&self) -> Result<Vec<u8>>;

    /// Click at viewport coordinates
    async fn mouse_click(&self, x: f64, y: f64, options: &ClickOptions) -> Result<()>;

    /// Scroll by a relative amount, like a mouse wheel
    async fn mouse_wheel(&self, delta_x: f64, delta_y: f64) -> Result<()>;

    /// Current vertical scroll offset of the page
    async fn scroll_y(&self) -> Result<f64>;

    /// Viewport size, or `None` when the page cannot report it
    async fn viewport_size(&self) -> Result<Option<ViewportSize>>;

    /// Insert text into the focused element without key events
    async fn insert_text(&self, text: &str) -> Result<()>;

    /// Wait for a fixed amount of time
    async fn wait_for_timeout(&self, duration: Duration) -> Result<()> {
        tokio::time::sleep(duration).await;
        Ok(())
    }
}

/// Something that can open pages: a browser or an isolated context
#[async_trait]
pub trait AutomationContext: Send + Sync {
    type Page: AutomationPage;

    /// Open a new page
    async fn new_page(&self) -> Result<Self::Page>;

    /// Close the context and all of its pages
    async fn close(&self) -> Result<()>;
}

/// A browser: opens pages directly or through isolated contexts
#[async_trait]
pub trait AutomationBrowser: AutomationContext {
    type Context: AutomationContext<Page = Self::Page>;

    /// Create a new isolated context
    async fn new_context(&self) -> Result<Self::Context>;
}
