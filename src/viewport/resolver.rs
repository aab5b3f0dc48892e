//! Coordinate resolver - turns a match point into a click point
//!
//! A point is visible when its y lies within `[scroll_y, scroll_y + height]`.
//! Otherwise the page is scrolled so the point sits in the vertical centre
//! of the viewport and the click lands at `height / 2`. X is never touched.

use tracing::debug;

use crate::automation::AutomationPage;
use crate::core::{Point, Result, SightlineError, ViewportState};

/// What to do before clicking a point
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClickPlan {
    /// Relative vertical scroll to issue first, if any
    pub scroll_by: Option<f64>,
    /// Where to click once the scroll (if any) is done
    pub click: Point,
}

/// Whether `y` is inside the visible band of the page
pub fn is_visible(y: f64, viewport: &ViewportState) -> bool {
    let top = viewport.scroll_y;
    let bottom = viewport.scroll_y + f64::from(viewport.height);
    y >= top && y <= bottom
}

/// Plan the click for a match point given the current viewport
pub fn plan_click(point: Point, viewport: &ViewportState) -> ClickPlan {
    if is_visible(point.y, viewport) {
        return ClickPlan {
            scroll_by: None,
            click: point,
        };
    }

    let half = f64::from(viewport.height) / 2.0;
    let target_scroll = point.y - half;

    ClickPlan {
        scroll_by: Some(target_scroll - viewport.scroll_y),
        click: Point::new(point.x, half),
    }
}

/// Read the page's viewport state; never cached
pub async fn read_viewport<P: AutomationPage + ?Sized>(page: &P) -> Result<ViewportState> {
    let size = page
        .viewport_size()
        .await?
        .ok_or(SightlineError::ViewportUnavailable)?;
    let scroll_y = page.scroll_y().await?;
    Ok(ViewportState::new(size, scroll_y))
}

/// Resolve the click point for `point`, scrolling the page first if needed
pub async fn resolve_click_point<P: AutomationPage + ?Sized>(page: &P, point: Point) -> Result<Point> {
    let viewport = read_viewport(page).await?;
    let plan = plan_click(point, &viewport);

    if let Some(delta) = plan.scroll_by {
        debug!(
            "Point y={} outside [{}, {}], scrolling by {}",
            point.y,
            viewport.scroll_y,
            viewport.scroll_y + f64::from(viewport.height),
            delta
        );
        page.mouse_wheel(0.0, delta).await?;
    }

    Ok(plan.click)
}
