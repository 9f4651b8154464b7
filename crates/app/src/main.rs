//! Cazza Residence - headless site preview
//!
//! Mounts the room browsing site on an in-memory page and replays a visitor
//! walkthrough, logging the page state after every step.
//!
//! Usage: `cazza-app [--config site.toml] [walkthrough.toml]`

use std::path::PathBuf;

use cazza_core::{Result, UserProfile};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod preview;
mod settings;
mod walkthrough;

use preview::Preview;
use walkthrough::Walkthrough;

#[derive(Debug, Parser)]
#[command(name = "cazza-app")]
#[command(about = "Replay a visitor walkthrough on the headless Cazza site", long_about = None)]
struct Args {
    /// Site config file (defaults to the platform config directory)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Walkthrough TOML file (defaults to the built-in tour)
    walkthrough: Option<PathBuf>,
}

fn demo_visitor() -> UserProfile {
    UserProfile {
        name: Some("Demo Visitor".to_string()),
        email: Some("visitor@cazza.test".to_string()),
        phone: Some("0917 555 0100".to_string()),
    }
}

async fn run(args: Args) -> Result<()> {
    let config = settings::load_site_config(args.config.as_deref())?;
    let catalog = settings::load_catalog(&config)?;
    let walkthrough = match &args.walkthrough {
        Some(path) => Walkthrough::load(path)?,
        None => Walkthrough::builtin()?,
    };

    let preview = Preview::mount(config, catalog, Some(demo_visitor()));
    preview.run(&walkthrough).await?;
    Ok(())
}

fn main() {
    let args = Args::parse();

    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    tracing::info!("Starting Cazza preview");

    // The page model is single-threaded; everything runs on one LocalSet
    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(e) => {
            tracing::error!("Failed to create tokio runtime: {}", e);
            std::process::exit(1);
        }
    };
    let local = tokio::task::LocalSet::new();

    if let Err(e) = local.block_on(&runtime, run(args)) {
        tracing::error!("Preview failed: {}", e);
        std::process::exit(1);
    }
}
