//! Sightline - find and interact with page elements by template image
//!
//! Main entry point for the CLI application.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use sightline::cli::{self, PageAction};
use sightline::core::{ClickOptions, MouseButton};
use sightline::interaction::ClickImageOptions;
use sightline::{Config, SearchConfig};
use tracing_subscriber::EnvFilter;

/// Sightline - find and interact with page elements by template image
#[derive(Parser, Debug)]
#[command(name = "sightline")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Enable debug output
    #[arg(long, short = 'd', global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Match a template against a screenshot file
    Match {
        screenshot: PathBuf,
        template: PathBuf,
        #[command(flatten)]
        search: SearchArgs,
    },

    /// Open a URL and click the element that looks like the template
    Click {
        url: String,
        template: PathBuf,
        #[command(flatten)]
        target: TargetArgs,
        #[command(flatten)]
        search: SearchArgs,
    },

    /// Open a URL, click the template and insert text
    Type {
        url: String,
        template: PathBuf,
        text: String,
        #[command(flatten)]
        target: TargetArgs,
        #[command(flatten)]
        search: SearchArgs,
    },

    /// Show the configuration
    Config {
        /// Only print the config file path
        #[arg(long)]
        path: bool,
    },
}

#[derive(clap::Args, Debug)]
struct SearchArgs {
    /// Minimum match confidence (0-1)
    #[arg(long, short = 't')]
    threshold: Option<f64>,

    /// Give up after this many milliseconds
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Match on edge maps instead of pixels
    #[arg(long)]
    edge: bool,

    /// Save every screenshot under the debug directory
    #[arg(long)]
    debug_images: bool,
}

#[derive(clap::Args, Debug)]
struct TargetArgs {
    /// Which match to use when several are found
    #[arg(long, short = 'i', default_value_t = 0)]
    index: usize,

    /// Click with the right mouse button
    #[arg(long)]
    right: bool,

    /// Run in headed browser mode (visible window)
    #[arg(long)]
    headed: bool,
}

impl SearchArgs {
    fn apply(&self, config: &Config) -> SearchConfig {
        let mut search = config.search.search_config();
        if let Some(threshold) = self.threshold {
            search.threshold = threshold;
        }
        if let Some(timeout_ms) = self.timeout_ms {
            search.timeout = Duration::from_millis(timeout_ms);
        }
        search.edge_mode |= self.edge;
        search.save_debug_image |= self.debug_images;
        search
    }
}

impl TargetArgs {
    fn options(&self, search: SearchConfig) -> ClickImageOptions {
        let mouse = ClickOptions {
            button: if self.right {
                MouseButton::Right
            } else {
                MouseButton::Left
            },
            ..ClickOptions::default()
        };
        ClickImageOptions::default()
            .with_index(self.index)
            .with_search(search)
            .with_mouse(mouse)
    }
}

fn init_tracing(debug: bool) {
    let default_level = if debug { "sightline=debug" } else { "sightline=info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Build configuration
    let mut config = Config::load();

    if args.debug {
        config.debug = true;
    }

    init_tracing(config.debug);

    let output = match args.command {
        Command::Match {
            screenshot,
            template,
            search,
        } => {
            let search = search.apply(&config);
            cli::run_match(&config, &screenshot, &template, &search).await?
        }
        Command::Click {
            url,
            template,
            target,
            search,
        } => {
            config.browser.headed |= target.headed;
            let options = target.options(search.apply(&config));
            cli::run_page_action(&config, &url, &template, PageAction::Click, options).await?
        }
        Command::Type {
            url,
            template,
            text,
            target,
            search,
        } => {
            config.browser.headed |= target.headed;
            let options = target.options(search.apply(&config));
            cli::run_page_action(&config, &url, &template, PageAction::Type(text), options)
                .await?
        }
        Command::Config { path } => cli::show_config(path),
    };

    println!("{}", output);
    Ok(())
}
