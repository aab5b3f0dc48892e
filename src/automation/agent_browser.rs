//! agent-browser adapter - drives pages through the agent-browser CLI
//!
//! Every page is its own agent-browser session, so pages opened from the
//! same `AgentBrowser` are isolated from each other.

use std::path::PathBuf;
use std::process::Stdio;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::automation::traits::{AutomationBrowser, AutomationContext, AutomationPage};
use crate::core::{ClickOptions, Result, SightlineError, ViewportSize};

const VIEWPORT_SCRIPT: &str =
    "JSON.stringify({ width: window.innerWidth, height: window.innerHeight })";

/// A single agent-browser session used as a page
pub struct AgentBrowserPage {
    /// Session name for isolation
    session_name: String,
    /// Whether to run in headed mode
    headed: bool,
    screenshot_seq: AtomicU64,
}

impl AgentBrowserPage {
    /// Create a page bound to a session
    pub fn new(session_name: impl Into<String>) -> Self {
        Self {
            session_name: session_name.into(),
            headed: false,
            screenshot_seq: AtomicU64::new(0),
        }
    }

    /// Set headed mode
    pub fn set_headed(&mut self, headed: bool) {
        self.headed = headed;
    }

    pub fn session_name(&self) -> &str {
        &self.session_name
    }

    /// Check if agent-browser is installed
    pub async fn is_available() -> bool {
        Command::new("agent-browser")
            .arg("--version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .map(|s| s.success())
            .unwrap_or(false)
    }

    /// Run an agent-browser command
    async fn run_command(&self, args: &[&str]) -> Result<String> {
        let mut cmd = Command::new("agent-browser");
        cmd.args(["--session", &self.session_name]);

        if self.headed {
            cmd.arg("--headed");
        }

        cmd.args(args);
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());

        debug!(session = %self.session_name, ?args, "agent-browser");

        let output = cmd.output().await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                SightlineError::AgentBrowserNotFound
            } else {
                SightlineError::browser(format!("Failed to run agent-browser: {}", e))
            }
        })?;

        if output.status.success() {
            Ok(String::from_utf8_lossy(&output.stdout).into_owned())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            Err(SightlineError::browser(format!(
                "agent-browser command failed: {}",
                stderr.trim()
            )))
        }
    }

    /// Evaluate JavaScript and return the decoded result
    async fn eval(&self, script: &str) -> Result<Option<serde_json::Value>> {
        let output = self.run_command(&["eval", script]).await?;
        Ok(parse_eval_output(&output))
    }

    fn screenshot_path(&self) -> PathBuf {
        let seq = self.screenshot_seq.fetch_add(1, Ordering::Relaxed);
        std::env::temp_dir().join(format!(
            "sightline-{}-{}-{}.png",
            self.session_name,
            std::process::id(),
            seq
        ))
    }
}

#[async_trait]
impl AutomationPage for AgentBrowserPage {
    /// Navigate and wait for the network to settle
    async fn open(&self, url: &str) -> Result<()> {
        self.run_command(&["open", url]).await?;

        if let Err(e) = self.run_command(&["wait", "--load", "networkidle"]).await {
            warn!("Waiting for network idle on {} failed: {}", url, e);
        }
        Ok(())
    }

    /// Close the session
    async fn close(&self) -> Result<()> {
        self.run_command(&["close"]).await.map(|_| ())
    }

    async fn screenshot_full_page(&self) -> Result<Vec<u8>> {
        let path = self.screenshot_path();
        let path_str = path.to_string_lossy().into_owned();

        self.run_command(&["screenshot", &path_str, "--full"]).await?;

        let bytes = tokio::fs::read(&path).await.map_err(|e| {
            SightlineError::with_context(format!("Failed to read screenshot {}", path_str), e)
        })?;
        let _ = tokio::fs::remove_file(&path).await;
        Ok(bytes)
    }

    async fn mouse_click(&self, x: f64, y: f64, options: &ClickOptions) -> Result<()> {
        let x = x.to_string();
        let y = y.to_string();
        let button = options.button.to_string();

        self.run_command(&["mouse", "move", &x, &y]).await?;

        for _ in 0..options.click_count.max(1) {
            self.run_command(&["mouse", "down", &button]).await?;
            if let Some(delay) = options.delay_ms {
                tokio::time::sleep(std::time::Duration::from_millis(delay)).await;
            }
            self.run_command(&["mouse", "up", &button]).await?;
        }
        Ok(())
    }

    async fn mouse_wheel(&self, delta_x: f64, delta_y: f64) -> Result<()> {
        let dy = delta_y.to_string();
        let dx = delta_x.to_string();
        self.run_command(&["mouse", "wheel", &dy, &dx]).await.map(|_| ())
    }

    async fn scroll_y(&self) -> Result<f64> {
        self.eval("window.scrollY")
            .await?
            .and_then(|v| v.as_f64())
            .ok_or_else(|| SightlineError::browser("Could not read the page scroll offset"))
    }

    async fn viewport_size(&self) -> Result<Option<ViewportSize>> {
        let value = self.eval(VIEWPORT_SCRIPT).await?;
        Ok(value.and_then(|v| serde_json::from_value(v).ok()))
    }

    async fn insert_text(&self, text: &str) -> Result<()> {
        self.run_command(&["keyboard", "inserttext", text])
            .await
            .map(|_| ())
    }
}

/// Decode agent-browser `eval` output.
///
/// Results that were `JSON.stringify`'d come back as a JSON string holding
/// JSON, so string layers are unwrapped while they still parse.
fn parse_eval_output(output: &str) -> Option<serde_json::Value> {
    let mut value: serde_json::Value = serde_json::from_str(output.trim()).ok()?;
    while let serde_json::Value::String(inner) = &value {
        match serde_json::from_str(inner) {
            Ok(decoded) => value = decoded,
            Err(_) => break,
        }
    }
    match value {
        serde_json::Value::Null => None,
        other => Some(other),
    }
}

/// Opens agent-browser sessions as pages
pub struct AgentBrowser {
    session_prefix: String,
    headed: bool,
    next_id: AtomicU64,
    sessions: Mutex<Vec<String>>,
}

impl AgentBrowser {
    pub fn new(session_prefix: impl Into<String>) -> Self {
        Self {
            session_prefix: session_prefix.into(),
            headed: false,
            next_id: AtomicU64::new(1),
            sessions: Mutex::new(Vec::new()),
        }
    }

    /// Set headed mode for every page opened afterwards
    pub fn set_headed(&mut self, headed: bool) {
        self.headed = headed;
    }

    fn next_name(&self, kind: &str) -> String {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        format!("{}-{}{}", self.session_prefix, kind, id)
    }

    fn open_sessions(&self) -> Vec<String> {
        match self.sessions.lock() {
            Ok(mut sessions) => std::mem::take(&mut *sessions),
            Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
        }
    }
}

#[async_trait]
impl AutomationContext for AgentBrowser {
    type Page = AgentBrowserPage;

    async fn new_page(&self) -> Result<AgentBrowserPage> {
        let name = self.next_name("page");
        if let Ok(mut sessions) = self.sessions.lock() {
            sessions.push(name.clone());
        }

        let mut page = AgentBrowserPage::new(name);
        page.set_headed(self.headed);
        Ok(page)
    }

    async fn close(&self) -> Result<()> {
        let mut first_error = None;
        for name in self.open_sessions() {
            let mut page = AgentBrowserPage::new(name);
            page.set_headed(self.headed);
            if let Err(e) = page.close().await {
                warn!("Failed to close session {}: {}", page.session_name(), e);
                first_error.get_or_insert(e);
            }
        }
        first_error.map_or(Ok(()), Err)
    }
}

#[async_trait]
impl AutomationBrowser for AgentBrowser {
    type Context = AgentBrowser;

    async fn new_context(&self) -> Result<AgentBrowser> {
        let mut context = AgentBrowser::new(self.next_name("ctx"));
        context.set_headed(self.headed);
        Ok(context)
    }
}

impl Default for AgentBrowser {
    fn default() -> Self {
        Self::new("sightline")
    }
}
