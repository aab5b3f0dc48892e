//! CLI module - command handlers for the sightline binary

pub mod commands;

pub use commands::{run_match, run_page_action, show_config, PageAction};
