//! Browser automation integration tests
//!
//! Drives a real agent-browser session and the bundled matcher.

use std::io::Cursor;
use std::sync::Arc;
use std::time::Duration;

use image::{GenericImageView, ImageFormat};
use sightline::automation::{AgentBrowser, AgentBrowserPage, AutomationPage};
use sightline::core::config::MatcherConfig;
use sightline::extend::extend;
use sightline::interaction::{ClickImageOptions, ImageSettings};
use sightline::{MatcherWorker, SearchConfig};
use tokio::time::timeout;

/// Helper to create a page on a fresh session
async fn create_page(name: &str) -> Result<AgentBrowserPage, Box<dyn std::error::Error>> {
    if !AgentBrowserPage::is_available().await {
        return Err("agent-browser not available".into());
    }

    let page = AgentBrowserPage::new(name);
    page.open("https://example.com").await?;
    Ok(page)
}

/// Crop the first block of dark pixels from a screenshot as a template
fn crop_first_content(screenshot: &[u8]) -> Vec<u8> {
    let img = image::load_from_memory(screenshot).unwrap();
    let (width, height) = img.dimensions();

    let mut dark = None;
    'scan: for y in 0..height {
        for x in 0..width {
            let p = img.get_pixel(x, y);
            if p[0] < 100 && p[1] < 100 && p[2] < 100 {
                dark = Some((x, y));
                break 'scan;
            }
        }
    }
    let (x, y) = dark.expect("page has no text");

    let left = x.saturating_sub(10);
    let top = y.saturating_sub(10);
    let w = 160.min(width - left);
    let h = 50.min(height - top);

    let mut out = Cursor::new(Vec::new());
    img.crop_imm(left, top, w, h)
        .write_to(&mut out, ImageFormat::Png)
        .unwrap();
    out.into_inner()
}

/// Test capture and viewport queries
#[tokio::test]
#[ignore] // Requires agent-browser to be installed
async fn test_screenshot_and_viewport() {
    let page = match create_page("sightline-test-viewport").await {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Skipping test: {}", e);
            return;
        }
    };

    let shot = page.screenshot_full_page().await.unwrap();
    assert!(shot.starts_with(&[0x89, b'P', b'N', b'G']));

    let viewport = page.viewport_size().await.unwrap().unwrap();
    assert!(viewport.width > 0 && viewport.height > 0);
    assert_eq!(page.scroll_y().await.unwrap(), 0.0);

    page.close().await.unwrap();
}

/// Test clicking an element found by its own pixels
#[tokio::test]
#[ignore] // Requires agent-browser, python3 and OpenCV
async fn test_click_by_cropped_template() {
    let page = match create_page("sightline-test-click").await {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Skipping test: {}", e);
            return;
        }
    };
    let template = crop_first_content(&page.screenshot_full_page().await.unwrap());
    page.close().await.unwrap();

    let worker = Arc::new(MatcherWorker::new(MatcherConfig::default()));
    let browser = extend(
        AgentBrowser::new("sightline-test-click"),
        worker.clone(),
        ImageSettings::default(),
    );
    let page = browser.new_page().await.unwrap();
    page.open("https://example.com").await.unwrap();

    let options = ClickImageOptions::default()
        .with_search(SearchConfig::default().with_timeout(Duration::from_secs(10)));
    let result = timeout(
        Duration::from_secs(60),
        page.image().click(template, &options),
    )
    .await;

    match result {
        Ok(Ok(selected)) => {
            println!("Clicked at ({}, {})", selected.point.x, selected.point.y);
            assert!(selected.confidence >= 0.8);
        }
        Ok(Err(e)) => panic!("Click failed: {}", e),
        Err(_) => panic!("Click timed out"),
    }

    browser.close().await.unwrap();
    worker.shutdown().await.unwrap();
}
