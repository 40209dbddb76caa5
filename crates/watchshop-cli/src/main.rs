//! WatchShop CLI - a terminal storefront for the WatchShop API.
//!
//! Browse the catalog, manage the cart, check out and administer watches
//! from the command line. The session token survives between runs.

mod app;
mod cli;
mod render;

use std::io;
use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use tracing::{debug, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use watchshop_core::view::ViewActivation;
use watchshop_core::Config;

use app::App;
use cli::Cli;

/// Exit code used when the user interrupts a command
const INTERRUPTED_EXIT_CODE: u8 = 130;

/// Initialize the tracing subscriber for logging
fn init_tracing() {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    init_tracing();
    let cli = Cli::parse();

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let config = Config::load()?;
    info!(api_url = %config.api_url, "WatchShop CLI starting");

    let app = App::new(config)?;

    // The command is the active view; Ctrl+C tears it down and any
    // response still in flight is dropped.
    let activation = ViewActivation::new(cli.command.view_name());
    let scope = activation.scope();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            activation.deactivate();
        }
    });

    match scope.run(app.execute(cli.command)).await {
        Ok(result) => {
            result?;
            Ok(ExitCode::SUCCESS)
        }
        Err(discarded) => {
            debug!(reason = %discarded, "Command interrupted");
            eprintln!("Interrupted");
            Ok(ExitCode::from(INTERRUPTED_EXIT_CODE))
        }
    }
}
