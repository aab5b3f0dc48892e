//! Extended browser and context
//!
//! `new_page` and `new_context` are intercepted so that everything opened
//! from an extended browser is extended as well and shares its matcher.

use std::sync::Arc;

use async_trait::async_trait;

use crate::automation::{AutomationBrowser, AutomationContext};
use crate::core::Result;
use crate::extend::delegate::Extended;
use crate::extend::page::ExtendedPage;
use crate::interaction::{ImageExtension, ImageSettings};
use crate::matcher::TemplateMatcher;

/// A browser whose pages and contexts come out extended
pub type ExtendedBrowser<B> = Extended<B, ImageExtension>;

/// A context whose pages come out extended
pub type ExtendedContext<C> = Extended<C, ImageExtension>;

/// Wrap a browser (or context) so everything it opens gains image interactions
pub fn extend<B>(base: B, matcher: Arc<dyn TemplateMatcher>, settings: ImageSettings) -> Extended<B, ImageExtension> {
    Extended::new(base, ImageExtension::new(matcher, settings))
}

impl<C: AutomationContext> Extended<C, ImageExtension> {
    /// Open a page on the base and extend it
    pub async fn new_page(&self) -> Result<ExtendedPage<C::Page>> {
        let page = self.base().new_page().await?;
        Ok(Extended::new(page, self.extension().clone()))
    }

    /// Close the base
    pub async fn close(&self) -> Result<()> {
        self.base().close().await
    }
}

impl<B: AutomationBrowser> Extended<B, ImageExtension> {
    /// Create a context on the base and extend it
    pub async fn new_context(&self) -> Result<ExtendedContext<B::Context>> {
        let context = self.base().new_context().await?;
        Ok(Extended::new(context, self.extension().clone()))
    }
}

// Trait impls so an extended browser or context can stand in wherever the
// base is expected. Both resolve to the intercepting inherent methods above.
#[async_trait]
impl<C: AutomationContext> AutomationContext for Extended<C, ImageExtension> {
    type Page = ExtendedPage<C::Page>;

    async fn new_page(&self) -> Result<Self::Page> {
        Extended::new_page(self).await
    }

    async fn close(&self) -> Result<()> {
        Extended::close(self).await
    }
}

#[async_trait]
impl<B: AutomationBrowser> AutomationBrowser for Extended<B, ImageExtension> {
    type Context = ExtendedContext<B::Context>;

    async fn new_context(&self) -> Result<Self::Context> {
        Extended::new_context(self).await
    }
}
