//! `hostsync` command-line entry point.
//!
//! Loads `hostsync.toml`, opens the local `SQLite` store, registers a panel
//! client per configured server and runs one subcommand. Results go to stdout
//! as JSON; logs go to stderr.

mod cli;
mod commands;
mod config;

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use hostsync_app::adapters::SqliteStore;
use hostsync_app::AppStateBuilder;

use cli::Cli;
use config::Config;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!("{e:#}");
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let config = Config::load(&cli.config)?;
    init_logging(&config.log.level);

    let store = Arc::new(
        SqliteStore::new(&config.database_path)
            .await
            .context("failed to open local store")?,
    );
    let state = AppStateBuilder::new()
        .account_repository(store.clone())
        .resource_repository(store)
        .settings(config.reconcile.clone())
        .build()?;

    let registered = state
        .register_panels(&config.servers)
        .await
        .context("failed to register panel servers")?;
    tracing::debug!("{registered} panel server(s) registered");

    commands::run(cli.command, &state, &config).await
}

/// Log to stderr; `RUST_LOG` overrides the configured level.
fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .without_time()
                .with_target(false),
        )
        .with(filter)
        .init();
}
