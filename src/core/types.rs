//! Shared types used across Sightline modules
//!
//! Contains the match data model, search options, viewport state and the
//! raw click options handed to the automation client.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::core::error::{Result, SightlineError};

/// A point in page (screenshot) coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    /// Create a new point
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A single template match reported by the matcher worker
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Match {
    /// Centre of the matched region
    pub point: Point,
    /// Normalized match score in [0, 1]
    pub confidence: f64,
}

/// Ordered list of matches, in the matcher's own ranking
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MatchSet(Vec<Match>);

impl MatchSet {
    /// Wrap matches without reordering them
    pub fn new(matches: Vec<Match>) -> Self {
        Self(matches)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Get the match at an ordinal index
    pub fn get(&self, index: usize) -> Option<&Match> {
        self.0.get(index)
    }

    /// Get the match at `index` or fail with `IndexOutOfRange`
    pub fn select(&self, index: usize) -> Result<Match> {
        self.0
            .get(index)
            .copied()
            .ok_or(SightlineError::IndexOutOfRange {
                index,
                available: self.0.len(),
            })
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Match> {
        self.0.iter()
    }

    pub fn into_inner(self) -> Vec<Match> {
        self.0
    }
}

impl IntoIterator for MatchSet {
    type Item = Match;
    type IntoIter = std::vec::IntoIter<Match>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Template image to look for
#[derive(Debug, Clone)]
pub enum Template {
    /// Encoded image bytes (PNG, JPEG, ...)
    Bytes(Vec<u8>),
    /// Path to an image file, read when the search starts
    Path(PathBuf),
}

impl Template {
    /// Load the template bytes
    pub async fn load(&self) -> Result<Vec<u8>> {
        match self {
            Template::Bytes(bytes) => Ok(bytes.clone()),
            Template::Path(path) => tokio::fs::read(path).await.map_err(|e| {
                SightlineError::with_context(
                    format!("Failed to read template {}", path.display()),
                    e,
                )
            }),
        }
    }
}

impl From<Vec<u8>> for Template {
    fn from(bytes: Vec<u8>) -> Self {
        Template::Bytes(bytes)
    }
}

impl From<&[u8]> for Template {
    fn from(bytes: &[u8]) -> Self {
        Template::Bytes(bytes.to_vec())
    }
}

impl From<PathBuf> for Template {
    fn from(path: PathBuf) -> Self {
        Template::Path(path)
    }
}

impl From<&std::path::Path> for Template {
    fn from(path: &std::path::Path) -> Self {
        Template::Path(path.to_path_buf())
    }
}

impl From<&str> for Template {
    fn from(path: &str) -> Self {
        Template::Path(PathBuf::from(path))
    }
}

/// Options for a single image search
#[derive(Debug, Clone, PartialEq)]
pub struct SearchConfig {
    /// Minimum confidence for a match
    pub threshold: f64,
    /// Persist every screenshot (and the template) under the debug directory
    pub save_debug_image: bool,
    /// How long to keep retrying before giving up
    pub timeout: Duration,
    /// Match on edge maps instead of colour pixels
    pub edge_mode: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            threshold: 0.8,
            save_debug_image: false,
            timeout: Duration::from_millis(30_000),
            edge_mode: false,
        }
    }
}

impl SearchConfig {
    /// Set the confidence threshold
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    /// Set the search timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Enable or disable debug screenshots
    pub fn with_debug_images(mut self, enabled: bool) -> Self {
        self.save_debug_image = enabled;
        self
    }

    /// Enable or disable edge-detection matching
    pub fn with_edge_mode(mut self, enabled: bool) -> Self {
        self.edge_mode = enabled;
        self
    }

    /// Reject thresholds outside [0, 1]
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.threshold) {
            return Err(SightlineError::InvalidSearchConfig(format!(
                "threshold must be within [0, 1], got {}",
                self.threshold
            )));
        }
        Ok(())
    }
}

/// Viewport dimensions in CSS pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewportSize {
    pub width: u32,
    pub height: u32,
}

/// Viewport dimensions plus the current vertical scroll offset
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportState {
    pub width: u32,
    pub height: u32,
    pub scroll_y: f64,
}

impl ViewportState {
    pub fn new(size: ViewportSize, scroll_y: f64) -> Self {
        Self {
            width: size.width,
            height: size.height,
            scroll_y,
        }
    }
}

/// Mouse button for a click
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MouseButton {
    #[default]
    Left,
    Right,
    Middle,
}

impl std::fmt::Display for MouseButton {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MouseButton::Left => write!(f, "left"),
            MouseButton::Right => write!(f, "right"),
            MouseButton::Middle => write!(f, "middle"),
        }
    }
}

/// Raw options for a primitive mouse click, passed through untouched
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClickOptions {
    pub button: MouseButton,
    pub click_count: u32,
    /// Time between press and release
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delay_ms: Option<u64>,
}

impl Default for ClickOptions {
    fn default() -> Self {
        Self {
            button: MouseButton::Left,
            click_count: 1,
            delay_ms: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_matches() -> MatchSet {
        MatchSet::new(vec![
            Match {
                point: Point::new(325.0, 215.0),
                confidence: 0.96,
            },
            Match {
                point: Point::new(40.0, 900.0),
                confidence: 0.85,
            },
        ])
    }

    #[test]
    fn test_select_keeps_matcher_order() {
        let matches = sample_matches();
        assert_eq!(matches.select(0).unwrap().point, Point::new(325.0, 215.0));
        assert_eq!(matches.select(1).unwrap().point, Point::new(40.0, 900.0));
    }

    #[test]
    fn test_select_out_of_range() {
        let err = sample_matches().select(2).unwrap_err();
        assert!(matches!(
            err,
            SightlineError::IndexOutOfRange {
                index: 2,
                available: 2
            }
        ));
    }

    #[test]
    fn test_search_config_defaults() {
        let config = SearchConfig::default();
        assert_eq!(config.threshold, 0.8);
        assert!(!config.save_debug_image);
        assert_eq!(config.timeout, Duration::from_millis(30_000));
        assert!(!config.edge_mode);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_search_config_rejects_bad_threshold() {
        assert!(SearchConfig::default().with_threshold(1.5).validate().is_err());
        assert!(SearchConfig::default().with_threshold(-0.1).validate().is_err());
        assert!(SearchConfig::default()
            .with_threshold(f64::NAN)
            .validate()
            .is_err());
        assert!(SearchConfig::default().with_threshold(1.0).validate().is_ok());
        assert!(SearchConfig::default().with_threshold(0.0).validate().is_ok());
    }

    #[test]
    fn test_match_set_serializes_as_array() {
        let json = serde_json::to_string(&sample_matches()).unwrap();
        assert!(json.starts_with('['));
    }

    #[tokio::test]
    async fn test_template_from_bytes_loads_directly() {
        let template = Template::from(vec![1u8, 2, 3]);
        assert_eq!(template.load().await.unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn test_template_from_path_reads_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("button.png");
        std::fs::write(&path, b"png-bytes").unwrap();

        let bytes = tokio_test::block_on(Template::from(path.as_path()).load()).unwrap();
        assert_eq!(bytes, b"png-bytes");
    }

    #[tokio::test]
    async fn test_template_missing_path_is_error() {
        let template = Template::from("/definitely/not/here.png");
        assert!(template.load().await.is_err());
    }
}
