//! Image interaction - find by template, then click or type
//!
//! Sequence per call: capture → match → maybe scroll → click (→ settle →
//! insert text). Nothing is rolled back when a later step fails.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use crate::automation::AutomationPage;
use crate::core::{ClickOptions, Config, Match, MatchSet, Result, SearchConfig, Template};
use crate::matcher::TemplateMatcher;
use crate::search::{DebugArtifacts, SearchController, DEFAULT_POLL_INTERVAL};
use crate::viewport::resolve_click_point;

/// Defaults shared by every image interaction on a page
#[derive(Debug, Clone)]
pub struct ImageSettings {
    /// Used when a call does not pass its own search options
    pub search: SearchConfig,
    pub poll_interval: Duration,
    pub debug_dir: PathBuf,
    /// Pause between clicking a field and inserting text
    pub settle_delay: Duration,
}

impl Default for ImageSettings {
    fn default() -> Self {
        Self {
            search: SearchConfig::default(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            debug_dir: PathBuf::from("debug/image_search"),
            settle_delay: Duration::from_millis(100),
        }
    }
}

impl ImageSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            search: config.search.search_config(),
            poll_interval: config.search.poll_interval(),
            debug_dir: config.search.debug_dir.clone(),
            settle_delay: config.interaction.settle_delay(),
        }
    }
}

/// Options for `click` and `type_text`
#[derive(Debug, Clone, Default)]
pub struct ClickImageOptions {
    /// Search options; the page defaults apply when `None`
    pub search: Option<SearchConfig>,
    /// Passed to the primitive click untouched
    pub mouse: ClickOptions,
    /// Which match to use, in matcher order
    pub index: usize,
}

impl ClickImageOptions {
    pub fn with_index(mut self, index: usize) -> Self {
        self.index = index;
        self
    }

    pub fn with_search(mut self, search: SearchConfig) -> Self {
        self.search = Some(search);
        self
    }

    pub fn with_mouse(mut self, mouse: ClickOptions) -> Self {
        self.mouse = mouse;
        self
    }
}

/// State an extended object carries for image interactions
#[derive(Clone)]
pub struct ImageExtension {
    matcher: Arc<dyn TemplateMatcher>,
    settings: Arc<ImageSettings>,
}

impl ImageExtension {
    pub fn new(matcher: Arc<dyn TemplateMatcher>, settings: ImageSettings) -> Self {
        Self {
            matcher,
            settings: Arc::new(settings),
        }
    }

    pub fn matcher(&self) -> &Arc<dyn TemplateMatcher> {
        &self.matcher
    }

    pub fn settings(&self) -> &ImageSettings {
        &self.settings
    }
}

/// Image-based interactions on one page
pub struct Image<'a, P: ?Sized> {
    page: &'a P,
    extension: &'a ImageExtension,
}

impl<'a, P: AutomationPage + ?Sized> Image<'a, P> {
    pub fn new(page: &'a P, extension: &'a ImageExtension) -> Self {
        Self { page, extension }
    }

    /// Find every match of `template`, retrying until the search times out
    pub async fn search(
        &self,
        template: impl Into<Template>,
        config: Option<&SearchConfig>,
    ) -> Result<MatchSet> {
        let settings = self.extension.settings();
        let config = config.unwrap_or(&settings.search);

        SearchController::new(self.page, &**self.extension.matcher())
            .with_poll_interval(settings.poll_interval)
            .with_debug_artifacts(DebugArtifacts::new(&settings.debug_dir))
            .search(&template.into(), config)
            .await
    }

    /// Find `template` and click the selected match
    pub async fn click(
        &self,
        template: impl Into<Template>,
        options: &ClickImageOptions,
    ) -> Result<Match> {
        let matches = self.search(template, options.search.as_ref()).await?;
        let selected = matches.select(options.index)?;

        let point = resolve_click_point(self.page, selected.point).await?;
        info!(
            "Clicking match {} (confidence {:.3}) at ({}, {})",
            options.index, selected.confidence, point.x, point.y
        );
        self.page.mouse_click(point.x, point.y, &options.mouse).await?;

        Ok(selected)
    }

    /// Click `template`, wait for focus to settle, then insert `text`.
    ///
    /// Existing field content is not cleared.
    pub async fn type_text(
        &self,
        template: impl Into<Template>,
        text: &str,
        options: &ClickImageOptions,
    ) -> Result<Match> {
        let selected = self.click(template, options).await?;
        self.page
            .wait_for_timeout(self.extension.settings().settle_delay)
            .await?;
        self.page.insert_text(text).await?;
        Ok(selected)
    }
}
