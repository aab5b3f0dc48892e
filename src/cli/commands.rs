//! CLI commands
//!
//! Each command returns the text to print.

use std::path::Path;
use std::sync::Arc;

use tracing::warn;

use crate::automation::{AgentBrowser, AgentBrowserPage, AutomationPage};
use crate::core::{Config, Match, MatchSet, Result, SearchConfig, SightlineError, Template};
use crate::extend::{extend, ExtendedPage};
use crate::interaction::{ClickImageOptions, ImageSettings};
use crate::matcher::{MatchRequest, MatcherWorker, TemplateMatcher};

/// What to do on the page once the template is found
pub enum PageAction {
    Click,
    Type(String),
}

impl PageAction {
    fn describe(&self, index: usize, selected: &Match) -> String {
        let at = format!(
            "match {} at ({}, {}) with confidence {:.4}",
            index, selected.point.x, selected.point.y, selected.confidence
        );
        match self {
            PageAction::Click => format!("Clicked {}", at),
            PageAction::Type(text) => format!("Typed {:?} into {}", text, at),
        }
    }
}

/// Match a template against a screenshot file once, without a browser
pub async fn run_match(
    config: &Config,
    screenshot: &Path,
    template: &Path,
    search: &SearchConfig,
) -> Result<String> {
    search.validate()?;
    let screenshot_bytes = Template::from(screenshot).load().await?;
    let template_bytes = Template::from(template).load().await?;

    let worker = MatcherWorker::new(config.matcher.clone());
    let request = MatchRequest::new(&screenshot_bytes, &template_bytes, search.threshold)
        .with_edge_mode(search.edge_mode);
    let result = worker.find_matches(request).await;
    if let Err(e) = &result {
        hint_worker_setup(config, e);
    }

    if let Err(e) = worker.shutdown().await {
        warn!("Failed to stop matcher worker: {}", e);
    }

    format_matches(&result?)
}

/// Open `url`, find `template` and click (or type into) it
pub async fn run_page_action(
    config: &Config,
    url: &str,
    template: &Path,
    action: PageAction,
    options: ClickImageOptions,
) -> Result<String> {
    if !AgentBrowserPage::is_available().await {
        return Err(SightlineError::AgentBrowserNotFound);
    }

    let worker = Arc::new(MatcherWorker::new(config.matcher.clone()));
    if let Err(e) = worker.start().await {
        hint_worker_setup(config, &e);
        return Err(e);
    }

    let mut launcher = AgentBrowser::new(config.browser.session_name.clone());
    launcher.set_headed(config.browser.headed);
    let browser = extend(launcher, worker.clone(), ImageSettings::from_config(config));

    let page = browser.new_page().await?;
    let outcome = perform(&page, url, template, &action, &options).await;
    if let Err(e) = &outcome {
        hint_worker_setup(config, e);
    }

    if let Err(e) = browser.close().await {
        warn!("Failed to close browser: {}", e);
    }
    if let Err(e) = worker.shutdown().await {
        warn!("Failed to stop matcher worker: {}", e);
    }

    let selected = outcome?;
    Ok(action.describe(options.index, &selected))
}

async fn perform(
    page: &ExtendedPage<AgentBrowserPage>,
    url: &str,
    template: &Path,
    action: &PageAction,
    options: &ClickImageOptions,
) -> Result<Match> {
    page.open(url).await?;

    match action {
        PageAction::Click => page.image().click(template, options).await,
        PageAction::Type(text) => page.image().type_text(template, text, options).await,
    }
}

/// Show the config file location or the default configuration
pub fn show_config(path_only: bool) -> String {
    let path = Config::config_file();
    if path_only {
        return path.display().to_string();
    }

    let status = if Config::config_exists() {
        "exists"
    } else {
        "not created yet"
    };
    format!(
        "# {} ({})\n{}",
        path.display(),
        status,
        Config::default_config_toml()
    )
}

/// Most worker failures come from a missing interpreter or OpenCV install
fn hint_worker_setup(config: &Config, err: &SightlineError) {
    if err.is_worker_failure() {
        warn!(
            "The matcher worker failed. Check that `{}` runs and has opencv-python and numpy installed",
            config.matcher.python
        );
    }
}

fn format_matches(matches: &MatchSet) -> Result<String> {
    if matches.is_empty() {
        return Ok("No matches".to_string());
    }
    Ok(serde_json::to_string_pretty(matches)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Point;

    #[test]
    fn test_format_empty_matches() {
        assert_eq!(format_matches(&MatchSet::default()).unwrap(), "No matches");
    }

    #[test]
    fn test_format_matches_as_json() {
        let matches = MatchSet::new(vec![Match {
            point: Point::new(49.0, 19.0),
            confidence: 1.0,
        }]);
        let out = format_matches(&matches).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(parsed[0]["point"]["x"], 49.0);
    }

    #[test]
    fn test_action_is_named_in_output() {
        let selected = Match {
            point: Point::new(10.0, 20.0),
            confidence: 0.95,
        };
        assert!(PageAction::Click
            .describe(0, &selected)
            .starts_with("Clicked match 0 at (10, 20)"));
        assert!(PageAction::Type("hello".to_string())
            .describe(1, &selected)
            .starts_with("Typed \"hello\" into match 1"));
    }

    #[tokio::test]
    async fn test_run_match_with_missing_interpreter_is_worker_error() {
        let tmp = tempfile::tempdir().unwrap();
        let shot = tmp.path().join("shot.png");
        std::fs::write(&shot, b"png").unwrap();

        let mut config = Config::default();
        config.matcher.python = "/nonexistent/sightline-python".to_string();
        config.matcher.script_path = Some(tmp.path().join("worker.py"));

        let err = run_match(&config, &shot, &shot, &SearchConfig::default())
            .await
            .unwrap_err();
        assert!(err.is_worker_failure());
    }

    #[test]
    fn test_show_config_path_only() {
        assert!(show_config(true).ends_with("config.toml"));
        assert!(show_config(false).contains("[search]"));
    }

    #[tokio::test]
    async fn test_run_match_rejects_bad_threshold_before_reading() {
        let err = run_match(
            &Config::default(),
            Path::new("/missing/shot.png"),
            Path::new("/missing/tpl.png"),
            &SearchConfig::default().with_threshold(3.0),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, SightlineError::InvalidSearchConfig(_)));
    }
}
