//! Line protocol spoken with the matcher worker
//!
//! A request is four newline-terminated lines on the worker's stdin:
//! base64 screenshot, base64 template, threshold, edge-mode flag.
//! The answer is one line on stdout holding a JSON array of
//! `{"point": [x, y], "confidence": c}` objects.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::Deserialize;

use crate::core::{Match, MatchSet, Point, Result, SightlineError};

/// One template-match request
#[derive(Debug, Clone, Copy)]
pub struct MatchRequest<'a> {
    /// Encoded screenshot to search in
    pub screenshot: &'a [u8],
    /// Encoded template to search for
    pub template: &'a [u8],
    pub threshold: f64,
    pub edge_mode: bool,
}

impl<'a> MatchRequest<'a> {
    pub fn new(screenshot: &'a [u8], template: &'a [u8], threshold: f64) -> Self {
        Self {
            screenshot,
            template,
            threshold,
            edge_mode: false,
        }
    }

    pub fn with_edge_mode(mut self, edge_mode: bool) -> Self {
        self.edge_mode = edge_mode;
        self
    }

    /// Encode the request as the four protocol lines
    pub fn encode(&self) -> String {
        let screenshot = STANDARD.encode(self.screenshot);
        let template = STANDARD.encode(self.template);

        let mut out = String::with_capacity(screenshot.len() + template.len() + 32);
        out.push_str(&screenshot);
        out.push('\n');
        out.push_str(&template);
        out.push('\n');
        out.push_str(&self.threshold.to_string());
        out.push('\n');
        out.push_str(if self.edge_mode { "true" } else { "false" });
        out.push('\n');
        out
    }
}

#[derive(Debug, Deserialize)]
struct WireMatch {
    point: [f64; 2],
    confidence: f64,
}

/// Parse and validate one response line.
///
/// Either every entry is well formed or the whole line is rejected.
pub fn parse_response(line: &str) -> Result<MatchSet> {
    let wire: Vec<WireMatch> = serde_json::from_str(line.trim()).map_err(|e| {
        SightlineError::validation(format!("{} in {:?}", e, truncate(line, 200)))
    })?;

    let mut matches = Vec::with_capacity(wire.len());
    for (i, entry) in wire.into_iter().enumerate() {
        let [x, y] = entry.point;
        if !x.is_finite() || !y.is_finite() {
            return Err(SightlineError::validation(format!(
                "match {} has a non-finite point",
                i
            )));
        }
        if !(0.0..=1.0).contains(&entry.confidence) {
            return Err(SightlineError::validation(format!(
                "match {} has confidence {} outside [0, 1]",
                i, entry.confidence
            )));
        }
        matches.push(Match {
            point: Point::new(x, y),
            confidence: entry.confidence,
        });
    }

    Ok(MatchSet::new(matches))
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
