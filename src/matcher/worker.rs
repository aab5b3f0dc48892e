//! Matcher worker - a long-lived template-matching subprocess
//!
//! The worker speaks the line protocol from [`super::protocol`]. The protocol
//! has no request ids, so a single async mutex is held for the whole round
//! trip: concurrent callers queue instead of interleaving lines.

use std::path::PathBuf;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::protocol::{parse_response, MatchRequest};
use crate::core::config::MatcherConfig;
use crate::core::{MatchSet, Result, SightlineError};

/// Bundled worker, written to the temp dir when no script is configured
const WORKER_SCRIPT: &str = include_str!("image_search.py");
const WORKER_SCRIPT_NAME: &str = "sightline_image_search.py";

/// Anything that can answer a template-match request
#[async_trait]
pub trait TemplateMatcher: Send + Sync {
    async fn find_matches(&self, request: MatchRequest<'_>) -> Result<MatchSet>;
}

/// Handle to the matcher subprocess.
///
/// Create one per application and share it by reference or `Arc`. The process
/// is started by [`start`](Self::start) or lazily by the first request, and is
/// replaced on the next request if it dies or sends an invalid answer.
pub struct MatcherWorker {
    config: MatcherConfig,
    process: Mutex<Option<WorkerProcess>>,
}

struct WorkerProcess {
    child: Child,
    stdin: ChildStdin,
    stdout: BufReader<ChildStdout>,
    stderr: Arc<std::sync::Mutex<String>>,
    stderr_task: JoinHandle<()>,
}

enum Exchange {
    Answered(String),
    Closed,
}

impl MatcherWorker {
    /// Create a worker handle without spawning anything yet
    pub fn new(config: MatcherConfig) -> Self {
        Self {
            config,
            process: Mutex::new(None),
        }
    }

    /// Spawn the worker process if it is not running
    pub async fn start(&self) -> Result<()> {
        let mut guard = self.process.lock().await;
        if guard.is_none() {
            *guard = Some(self.spawn_process().await?);
        }
        Ok(())
    }

    /// Whether a worker process is currently held
    pub async fn is_running(&self) -> bool {
        self.process.lock().await.is_some()
    }

    /// Stop the worker: close its stdin and wait, killing it on timeout
    pub async fn shutdown(&self) -> Result<()> {
        let Some(process) = self.process.lock().await.take() else {
            return Ok(());
        };

        let WorkerProcess {
            mut child,
            stdin,
            stderr_task,
            ..
        } = process;
        drop(stdin);

        let timeout = Duration::from_millis(self.config.shutdown_timeout_ms);
        match tokio::time::timeout(timeout, child.wait()).await {
            Ok(status) => {
                let status = status?;
                info!("Matcher worker stopped ({})", status);
            }
            Err(_) => {
                warn!("Matcher worker did not exit within {:?}, killing it", timeout);
                child.kill().await?;
            }
        }
        stderr_task.abort();
        Ok(())
    }

    async fn script_path(&self) -> Result<PathBuf> {
        if let Some(path) = &self.config.script_path {
            return Ok(path.clone());
        }

        let path = std::env::temp_dir().join(WORKER_SCRIPT_NAME);
        if let Ok(existing) = tokio::fs::read_to_string(&path).await {
            if existing == WORKER_SCRIPT {
                return Ok(path);
            }
        }
        tokio::fs::write(&path, WORKER_SCRIPT).await.map_err(|e| {
            SightlineError::worker_spawn(format!("Failed to write worker script: {}", e))
        })?;
        Ok(path)
    }

    async fn spawn_process(&self) -> Result<WorkerProcess> {
        let script = self.script_path().await?;

        let mut child = Command::new(&self.config.python)
            .arg(&script)
            .env("PYTHONUNBUFFERED", "1")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                SightlineError::worker_spawn(format!(
                    "{} {}: {}",
                    self.config.python,
                    script.display(),
                    e
                ))
            })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| SightlineError::worker_spawn("Failed to capture stdin"))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| SightlineError::worker_spawn("Failed to capture stdout"))?;
        let stderr_pipe = child
            .stderr
            .take()
            .ok_or_else(|| SightlineError::worker_spawn("Failed to capture stderr"))?;

        let stderr = Arc::new(std::sync::Mutex::new(String::new()));
        let sink = stderr.clone();
        let stderr_task = tokio::spawn(async move {
            let mut lines = BufReader::new(stderr_pipe).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                warn!("[matcher] {}", line);
                if let Ok(mut buf) = sink.lock() {
                    buf.push_str(&line);
                    buf.push('\n');
                }
            }
        });

        info!(
            "Matcher worker started (pid {:?}): {} {}",
            child.id(),
            self.config.python,
            script.display()
        );

        Ok(WorkerProcess {
            child,
            stdin,
            stdout: BufReader::new(stdout),
            stderr,
            stderr_task,
        })
    }
}

impl WorkerProcess {
    async fn exchange(&mut self, payload: &str) -> Result<Exchange> {
        if let Ok(mut buf) = self.stderr.lock() {
            buf.clear();
        }

        if let Err(e) = self.write_request(payload).await {
            if e.kind() == std::io::ErrorKind::BrokenPipe {
                return Ok(Exchange::Closed);
            }
            return Err(e.into());
        }

        // A line cut off by EOF means the worker died mid-answer
        let mut line = String::new();
        self.stdout.read_line(&mut line).await?;
        if !line.ends_with('\n') {
            return Ok(Exchange::Closed);
        }
        Ok(Exchange::Answered(line))
    }

    async fn write_request(&mut self, payload: &str) -> std::io::Result<()> {
        self.stdin.write_all(payload.as_bytes()).await?;
        self.stdin.flush().await
    }

    /// Reap a worker whose stdout closed and describe why it went away
    async fn into_exit_error(mut self, wait: Duration) -> SightlineError {
        let code = match tokio::time::timeout(wait, self.child.wait()).await {
            Ok(Ok(status)) => status.code(),
            Ok(Err(e)) => return SightlineError::with_context("Waiting for matcher worker", e),
            Err(_) => {
                let _ = self.child.kill().await;
                None
            }
        };

        // stderr hits EOF once the process is gone
        let _ = tokio::time::timeout(wait, &mut self.stderr_task).await;
        let stderr = self
            .stderr
            .lock()
            .map(|buf| buf.clone())
            .unwrap_or_default();

        match code {
            Some(code) if code != 0 => SightlineError::WorkerExited { code, stderr },
            _ => SightlineError::WorkerClosed { stderr },
        }
    }
}

#[async_trait]
impl TemplateMatcher for MatcherWorker {
    async fn find_matches(&self, request: MatchRequest<'_>) -> Result<MatchSet> {
        let payload = request.encode();

        let mut guard = self.process.lock().await;
        let mut process = match guard.take() {
            Some(process) => process,
            None => self.spawn_process().await?,
        };

        debug!(
            screenshot_bytes = request.screenshot.len(),
            template_bytes = request.template.len(),
            threshold = request.threshold,
            edge_mode = request.edge_mode,
            "Sending match request"
        );

        match process.exchange(&payload).await {
            Ok(Exchange::Answered(line)) => match parse_response(&line) {
                Ok(matches) => {
                    *guard = Some(process);
                    debug!("Matcher returned {} match(es)", matches.len());
                    Ok(matches)
                }
                Err(e) => {
                    // Without request ids a stray line would shift every later
                    // answer, so this process cannot be trusted any more
                    warn!("Discarding matcher worker after invalid answer: {}", e);
                    drop(process);
                    Err(e)
                }
            },
            Ok(Exchange::Closed) => {
                let wait = Duration::from_millis(self.config.shutdown_timeout_ms);
                let err = process.into_exit_error(wait).await;
                warn!("Matcher worker went away: {}", err);
                Err(err)
            }
            Err(e) => Err(e),
        }
    }
}

#[async_trait]
impl<T: TemplateMatcher + ?Sized> TemplateMatcher for Arc<T> {
    async fn find_matches(&self, request: MatchRequest<'_>) -> Result<MatchSet> {
        (**self).find_matches(request).await
    }
}
