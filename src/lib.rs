//! Sightline - find and interact with page elements by template image
//!
//! Locates on-screen elements by what they look like rather than by DOM
//! selector, and extends automation objects (browser, context, page) with
//! image-based click and type without hiding their original API.
//!
//! # Architecture
//!
//! - **Core**: Match data model, configuration, and error handling
//! - **Matcher**: The template-matching worker process and its line protocol
//! - **Search**: Polling search against fresh screenshots with a deadline
//! - **Viewport**: Scroll-aware click coordinates
//! - **Interaction**: Click/type by template image
//! - **Extend**: Base/extension composition for browsers, contexts and pages
//! - **Automation**: Capability traits plus the agent-browser adapter
//!
//! # Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use sightline::automation::{AgentBrowser, AutomationPage};
//! use sightline::extend::extend;
//! use sightline::interaction::{ClickImageOptions, ImageSettings};
//! use sightline::{Config, MatcherWorker};
//!
//! #[tokio::main]
//! async fn main() -> sightline::Result<()> {
//!     let config = Config::load();
//!     let worker = Arc::new(MatcherWorker::new(config.matcher.clone()));
//!     worker.start().await?;
//!
//!     let browser = extend(AgentBrowser::default(), worker.clone(), ImageSettings::from_config(&config));
//!     let page = browser.new_page().await?;
//!     page.open("https://example.com").await?;
//!
//!     page.image()
//!         .click("buttons/login.png", &ClickImageOptions::default())
//!         .await?;
//!
//!     worker.shutdown().await
//! }
//! ```

pub mod automation;
pub mod cli;
pub mod core;
pub mod extend;
pub mod interaction;
pub mod matcher;
pub mod search;
pub mod viewport;

#[cfg(test)]
mod testing;

// Re-export commonly used items
pub use crate::core::{Config, Match, MatchSet, Result, SearchConfig, SightlineError, Template};
pub use extend::{Extended, ExtendedPage};
pub use matcher::{MatcherWorker, TemplateMatcher};
