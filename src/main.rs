//! invite-server - calendar invites and markdown notes for an assistant host
//!
//! Speaks the invite-server protocol: one JSON request per line on stdin,
//! one JSON response per line on stdout. Logs go to stderr.
//!
//! Configuration is read from ~/.config/invite-server/config.toml (or the
//! file given with --config), with INVITE_SERVER__* environment overrides.
//! Sender credentials come from the environment, optionally via a .env file.

mod server;

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use invite_core::config::ServerConfig;
use invite_core::invite::InviteService;
use invite_core::transport::SmtpRelay;
use invite_core::vault::NoteVault;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use server::Server;

#[derive(Parser)]
#[command(name = "invite-server")]
#[command(about = "Send calendar invites and manage markdown notes over JSON stdio")]
struct Cli {
    /// Path to the config file (defaults to ~/.config/invite-server/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let config = ServerConfig::load(cli.config.as_deref()).context("Failed to load config")?;

    let relay = SmtpRelay::new(&config.relay);
    tracing::info!(relay = %relay.endpoint(), timezone = %config.calendar.timezone, "starting invite-server");

    // Without routes the vault tools still run; invite commands report why.
    let invites = InviteService::new(&config, relay);
    if let Err(ref e) = invites {
        tracing::warn!(error = %e, "invite tools unavailable");
    }
    let vault = NoteVault::from_config(&config.vault);
    tracing::info!(vault = %vault.root().display(), "notes vault");

    let server = Server::new(invites, vault);

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(l) => l,
            Err(e) => {
                tracing::error!(error = %e, "failed to read stdin");
                break;
            }
        };

        if let Some(response) = server.handle_line(&line).await {
            writeln!(stdout, "{}", response)?;
            stdout.flush()?;
        }
    }

    Ok(())
}
