//! moodtrack - command-line client for the moodtrack service.
//!
//! Patients record a daily mood rating; doctors review the patients
//! assigned to them. The session is kept between runs in the configured
//! store (a file under the user data directory by default).

mod cli;
mod commands;
mod output;

use std::io;

use anyhow::Result;
use clap::Parser;
use moodtrack_core::{AppContext, Config};
use tracing::{debug, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::{Cli, Commands};

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
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    init_tracing();

    let cli = Cli::parse();

    let mut config = Config::load()?;
    if let Some(url) = cli.api_url {
        config.api_base_url = Some(url);
    }
    if let Some(store) = cli.store {
        config.store = store;
    }
    debug!(api = config.api_base_url(), store = ?config.store, "Configuration loaded");

    let ctx = AppContext::compose(&config)?;
    let session = ctx.session()?;
    session.wait_ready().await;
    info!(phase = ?session.phase(), "Session ready");

    match cli.command {
        Commands::Login { email } => commands::login(&ctx, &config, email).await,
        Commands::Logout => commands::logout(&ctx),
        Commands::Whoami => commands::whoami(&ctx).await,
        Commands::Health => commands::health(&ctx).await,
        Commands::Moods => commands::moods(&ctx).await,
        Commands::Mood { action } => commands::mood(&ctx, action).await,
        Commands::Patients => commands::patients(&ctx).await,
        Commands::Assign { patient_id } => commands::assign(&ctx, &patient_id).await,
        Commands::Unassign { patient_id } => commands::unassign(&ctx, &patient_id).await,
        Commands::PatientMoods { patient_id } => commands::patient_moods(&ctx, &patient_id).await,
    }
}
