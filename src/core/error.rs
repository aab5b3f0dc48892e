//! Custom error types for Sightline
//!
//! Worker failures keep the captured stderr so callers can see why matching died.

use thiserror::Error;

/// Main error type for Sightline operations
#[derive(Error, Debug)]
pub enum SightlineError {
    /// The matcher worker process could not be started
    #[error("Matcher worker failed to start: {0}")]
    WorkerSpawn(String),

    /// The matcher worker exited with a non-zero status
    #[error("Matcher worker exited with code {code}{}", format_stderr(.stderr))]
    WorkerExited { code: i32, stderr: String },

    /// The matcher worker closed its output without answering
    #[error("Matcher worker closed its output stream{}", format_stderr(.stderr))]
    WorkerClosed { stderr: String },

    /// The worker answered with something that is not a match list
    #[error("Invalid matcher response: {0}")]
    ResponseValidation(String),

    /// Nothing matched before the search deadline
    #[error("No matching image found after {attempts} attempt(s)")]
    NoMatchFound { attempts: u32 },

    /// The page could not report its viewport size
    #[error("Viewport size is not available")]
    ViewportUnavailable,

    /// The requested match index is past the end of the match list
    #[error("No match at index {index} ({available} match(es) found)")]
    IndexOutOfRange { index: usize, available: usize },

    /// Search options rejected before any capture
    #[error("Invalid search configuration: {0}")]
    InvalidSearchConfig(String),

    /// Browser automation errors
    #[error("Browser error: {0}")]
    Browser(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON parsing errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Agent-browser not installed
    #[error("agent-browser not found. Install with: npm install -g agent-browser && agent-browser install")]
    AgentBrowserNotFound,

    /// Generic error with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// Convenience Result type for Sightline operations
pub type Result<T> = std::result::Result<T, SightlineError>;

fn format_stderr(stderr: &str) -> String {
    let trimmed = stderr.trim();
    if trimmed.is_empty() {
        String::new()
    } else {
        format!(": {}", trimmed)
    }
}

impl SightlineError {
    /// Create a worker spawn error
    pub fn worker_spawn(msg: impl Into<String>) -> Self {
        Self::WorkerSpawn(msg.into())
    }

    /// Create a response validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::ResponseValidation(msg.into())
    }

    /// Create a browser error
    pub fn browser(msg: impl Into<String>) -> Self {
        Self::Browser(msg.into())
    }

    /// Create a config error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Wrap an error with additional context
    pub fn with_context<E>(context: impl Into<String>, error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::WithContext {
            context: context.into(),
            source: Box::new(error),
        }
    }

    /// Whether the error came from the matcher worker rather than the page
    pub fn is_worker_failure(&self) -> bool {
        matches!(
            self,
            Self::WorkerSpawn(_)
                | Self::WorkerExited { .. }
                | Self::WorkerClosed { .. }
                | Self::ResponseValidation(_)
        )
    }
}
