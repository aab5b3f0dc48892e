//! Extended page - an automation page with image interactions

use std::time::Duration;

use async_trait::async_trait;

use crate::automation::{AgentBrowserPage, AutomationPage};
use crate::core::{ClickOptions, Result, ViewportSize};
use crate::extend::delegate::Extended;
use crate::interaction::{Image, ImageExtension};

/// A page that keeps its own API and gains `image()`
pub type ExtendedPage<P> = Extended<P, ImageExtension>;

impl<P: AutomationPage> Extended<P, ImageExtension> {
    /// Image-based search, click and type on this page
    pub fn image(&self) -> Image<'_, Self> {
        Image::new(self, self.extension())
    }
}

impl<E> Extended<AgentBrowserPage, E> {
    /// agent-browser session backing this page
    pub fn session_name(&self) -> &str {
        self.base().session_name()
    }
}

#[async_trait]
impl<B, E> AutomationPage for Extended<B, E>
where
    B: AutomationPage,
    E: Send + Sync,
{
    async fn open(&self, url: &str) -> Result<()> {
        self.base().open(url).await
    }

    async fn close(&self) -> Result<()> {
        self.base().close().await
    }

    async fn screenshot_full_page(&self) -> Result<Vec<u8>> {
        self.base().screenshot_full_page().await
    }

    async fn mouse_click(&self, x: f64, y: f64, options: &ClickOptions) -> Result<()> {
        self.base().mouse_click(x, y, options).await
    }

    async fn mouse_wheel(&self, delta_x: f64, delta_y: f64) -> Result<()> {
        self.base().mouse_wheel(delta_x, delta_y).await
    }

    async fn scroll_y(&self) -> Result<f64> {
        self.base().scroll_y().await
    }

    async fn viewport_size(&self) -> Result<Option<ViewportSize>> {
        self.base().viewport_size().await
    }

    async fn insert_text(&self, text: &str) -> Result<()> {
        self.base().insert_text(text).await
    }

    async fn wait_for_timeout(&self, duration: Duration) -> Result<()> {
        self.base().wait_for_timeout(duration).await
    }
}
