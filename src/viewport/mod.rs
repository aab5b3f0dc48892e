//! Viewport module - scroll-aware click coordinates

mod resolver;

pub use resolver::{is_visible, plan_click, read_viewport, resolve_click_point, ClickPlan};
