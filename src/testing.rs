//! In-memory page and matcher used by unit tests

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::automation::AutomationPage;
use crate::core::{ClickOptions, Match, MatchSet, Point, Result, ViewportSize};
use crate::matcher::{MatchRequest, TemplateMatcher};

#[derive(Debug, Clone, PartialEq)]
pub enum PageCall {
    Open(String),
    Close,
    Screenshot,
    Click { x: f64, y: f64, options: ClickOptions },
    Wheel { dx: f64, dy: f64 },
    ScrollY,
    Viewport,
    InsertText(String),
    Wait(Duration),
}

/// Page that records every primitive and tracks scroll from wheel events
pub struct FakePage {
    viewport: Option<ViewportSize>,
    scroll_y: Mutex<f64>,
    screenshot: Vec<u8>,
    calls: Mutex<Vec<PageCall>>,
}

impl FakePage {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            viewport: Some(ViewportSize { width, height }),
            scroll_y: Mutex::new(0.0),
            screenshot: b"\x89PNG fake screenshot".to_vec(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn without_viewport() -> Self {
        Self {
            viewport: None,
            ..Self::new(0, 0)
        }
    }

    pub fn scrolled_to(self, scroll_y: f64) -> Self {
        *self.scroll_y.lock().unwrap() = scroll_y;
        self
    }

    pub fn calls(&self) -> Vec<PageCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn current_scroll(&self) -> f64 {
        *self.scroll_y.lock().unwrap()
    }

    fn record(&self, call: PageCall) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl AutomationPage for FakePage {
    async fn open(&self, url: &str) -> Result<()> {
        self.record(PageCall::Open(url.to_string()));
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        self.record(PageCall::Close);
        Ok(())
    }

    async fn screenshot_full_page(&self) -> Result<Vec<u8>> {
        self.record(PageCall::Screenshot);
        Ok(self.screenshot.clone())
    }

    async fn mouse_click(&self, x: f64, y: f64, options: &ClickOptions) -> Result<()> {
        self.record(PageCall::Click {
            x,
            y,
            options: options.clone(),
        });
        Ok(())
    }

    async fn mouse_wheel(&self, delta_x: f64, delta_y: f64) -> Result<()> {
        self.record(PageCall::Wheel {
            dx: delta_x,
            dy: delta_y,
        });
        *self.scroll_y.lock().unwrap() += delta_y;
        Ok(())
    }

    async fn scroll_y(&self) -> Result<f64> {
        self.record(PageCall::ScrollY);
        Ok(self.current_scroll())
    }

    async fn viewport_size(&self) -> Result<Option<ViewportSize>> {
        self.record(PageCall::Viewport);
        Ok(self.viewport)
    }

    async fn insert_text(&self, text: &str) -> Result<()> {
        self.record(PageCall::InsertText(text.to_string()));
        Ok(())
    }

    async fn wait_for_timeout(&self, duration: Duration) -> Result<()> {
        self.record(PageCall::Wait(duration));
        tokio::time::sleep(duration).await;
        Ok(())
    }
}

/// Matcher that replays queued answers, then keeps answering "no match"
#[derive(Default)]
pub struct ScriptedMatcher {
    answers: Mutex<VecDeque<Result<MatchSet>>>,
    requests: Mutex<Vec<(f64, bool)>>,
}

impl ScriptedMatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn then(self, answer: Result<MatchSet>) -> Self {
        self.answers.lock().unwrap().push_back(answer);
        self
    }

    pub fn then_empty(self, times: usize) -> Self {
        (0..times).fold(self, |m, _| m.then(Ok(MatchSet::default())))
    }

    /// Number of requests served so far
    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// `(threshold, edge_mode)` of every request
    pub fn requests(&self) -> Vec<(f64, bool)> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl TemplateMatcher for ScriptedMatcher {
    async fn find_matches(&self, request: MatchRequest<'_>) -> Result<MatchSet> {
        self.requests
            .lock()
            .unwrap()
            .push((request.threshold, request.edge_mode));
        self.answers
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(MatchSet::default()))
    }
}

pub fn matches_at(points: &[(f64, f64)]) -> MatchSet {
    MatchSet::new(
        points
            .iter()
            .map(|&(x, y)| Match {
                point: Point::new(x, y),
                confidence: 0.95,
            })
            .collect(),
    )
}
