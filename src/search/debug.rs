//! Debug artifacts for image searches
//!
//! Screenshots (and the template, on the first attempt) are written under a
//! fixed directory with timestamped, attempt-numbered names.

use std::path::PathBuf;

use tracing::debug;

use crate::core::{Result, SightlineError};

/// Timestamp used in artifact names, e.g. `2025-10-29_14-30-45`
pub fn debug_timestamp() -> String {
    chrono::Local::now().format("%Y-%m-%d_%H-%M-%S").to_string()
}

/// Writes per-attempt screenshots into a debug directory
#[derive(Debug, Clone)]
pub struct DebugArtifacts {
    dir: PathBuf,
}

impl DebugArtifacts {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Save one attempt's screenshot; the first attempt also saves the template.
    ///
    /// Returns the written paths.
    pub async fn save_attempt(
        &self,
        attempt: u32,
        screenshot: &[u8],
        template: &[u8],
    ) -> Result<Vec<PathBuf>> {
        tokio::fs::create_dir_all(&self.dir).await.map_err(|e| {
            SightlineError::with_context(
                format!("Failed to create debug dir {}", self.dir.display()),
                e,
            )
        })?;

        let timestamp = debug_timestamp();
        let mut written = Vec::with_capacity(2);

        if attempt <= 1 {
            let shot = self.unique_path(&format!("screenshot_{}", timestamp)).await?;
            let tpl = self.unique_path(&format!("template_{}", timestamp)).await?;
            tokio::try_join!(
                tokio::fs::write(&shot, screenshot),
                tokio::fs::write(&tpl, template)
            )?;
            written.push(shot);
            written.push(tpl);
        } else {
            let shot = self
                .unique_path(&format!("screenshot_try{}_{}", attempt, timestamp))
                .await?;
            tokio::fs::write(&shot, screenshot).await?;
            written.push(shot);
        }

        debug!("Saved debug artifacts: {:?}", written);
        Ok(written)
    }

    /// `<stem>.png`, or `<stem>_<n>.png` when an earlier run used that name
    async fn unique_path(&self, stem: &str) -> Result<PathBuf> {
        let mut candidate = self.dir.join(format!("{}.png", stem));
        let mut n = 2;
        while tokio::fs::try_exists(&candidate).await? {
            candidate = self.dir.join(format!("{}_{}.png", stem, n));
            n += 1;
        }
        Ok(candidate)
    }
}
