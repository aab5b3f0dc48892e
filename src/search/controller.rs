//! Search controller - polls the matcher against fresh screenshots
//!
//! Each attempt captures the page, optionally saves debug artifacts and asks
//! the matcher. Only "no match yet" is retried; worker and protocol errors
//! end the search immediately.

use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, info};

use crate::automation::AutomationPage;
use crate::core::{MatchSet, Result, SearchConfig, SightlineError, Template};
use crate::matcher::{MatchRequest, TemplateMatcher};
use crate::search::debug::DebugArtifacts;

/// Default delay between attempts
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(1000);

/// State of a running search
#[derive(Debug, Clone, PartialEq)]
pub enum SearchState {
    /// About to run the given attempt (1-based)
    Searching { attempt: u32 },
    /// The matcher reported at least one match
    Found(MatchSet),
    /// The deadline passed after this many attempts
    TimedOut { attempts: u32 },
}

impl SearchState {
    /// Whether the search has reached a final state
    pub fn is_terminal(&self) -> bool {
        !matches!(self, SearchState::Searching { .. })
    }
}

/// Finds a template on a page, retrying until a deadline
pub struct SearchController<'a, P: ?Sized, M: ?Sized> {
    page: &'a P,
    matcher: &'a M,
    poll_interval: Duration,
    artifacts: DebugArtifacts,
}

impl<'a, P, M> SearchController<'a, P, M>
where
    P: AutomationPage + ?Sized,
    M: TemplateMatcher + ?Sized,
{
    pub fn new(page: &'a P, matcher: &'a M) -> Self {
        Self {
            page,
            matcher,
            poll_interval: DEFAULT_POLL_INTERVAL,
            artifacts: DebugArtifacts::new("debug/image_search"),
        }
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn with_debug_artifacts(mut self, artifacts: DebugArtifacts) -> Self {
        self.artifacts = artifacts;
        self
    }

    /// Search until a match is found or `config.timeout` has elapsed
    pub async fn search(&self, template: &Template, config: &SearchConfig) -> Result<MatchSet> {
        config.validate()?;
        let template = template.load().await?;
        let started = Instant::now();

        let mut state = SearchState::Searching { attempt: 1 };
        loop {
            state = match state {
                SearchState::Searching { attempt } => {
                    self.step(attempt, &template, config, started).await?
                }
                SearchState::Found(matches) => {
                    info!(
                        "Found {} match(es) in {:?}",
                        matches.len(),
                        started.elapsed()
                    );
                    return Ok(matches);
                }
                SearchState::TimedOut { attempts } => {
                    info!(
                        "No match after {} attempt(s) in {:?}",
                        attempts,
                        started.elapsed()
                    );
                    return Err(SightlineError::NoMatchFound { attempts });
                }
            };
        }
    }

    /// Run one attempt and decide the next state
    pub async fn step(
        &self,
        attempt: u32,
        template: &[u8],
        config: &SearchConfig,
        started: Instant,
    ) -> Result<SearchState> {
        debug!("Image search attempt {}", attempt);

        let screenshot = self.page.screenshot_full_page().await?;
        if config.save_debug_image {
            self.artifacts
                .save_attempt(attempt, &screenshot, template)
                .await?;
        }

        let request = MatchRequest::new(&screenshot, template, config.threshold)
            .with_edge_mode(config.edge_mode);
        let matches = self.matcher.find_matches(request).await?;
        if !matches.is_empty() {
            return Ok(SearchState::Found(matches));
        }

        if started.elapsed() >= config.timeout {
            return Ok(SearchState::TimedOut { attempts: attempt });
        }
        self.page.wait_for_timeout(self.poll_interval).await?;
        // An attempt landing exactly on the deadline still runs
        if started.elapsed() > config.timeout {
            return Ok(SearchState::TimedOut { attempts: attempt });
        }

        Ok(SearchState::Searching {
            attempt: attempt + 1,
        })
    }
}
