//! zdesk - bulk operations on Zendesk support tickets.
//!
//! Credentials are kept in the OS keychain; see `zdesk login`.
//!
//! # Configuration
//!
//! Optional environment variables (or a `.env` file):
//!
//! - `ZDESK_API_HOST`: host suffix, default `zendesk.com`
//! - `ZDESK_BASE_URL`: full base URL override
//! - `RUST_LOG`: log filter, default `zdesk=warn`
//!
//! # Usage
//!
//! ```bash
//! zdesk login
//! zdesk ls status:open -n 250
//! zdesk del tag:spam -v
//! ```

use std::io::IsTerminal;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

use zdesk::cli::{Cli, Commands, SearchArgs};
use zdesk::client::ZendeskClient;
use zdesk::commands;
use zdesk::config::Config;
use zdesk::engine::{SearchQuery, TicketEngine};
use zdesk::identity::{CredentialProvider, DialoguerPrompter, KeyringStore};
use zdesk::output::ConsoleReporter;

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    // stdout carries command output only
    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("zdesk=warn")),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::debug!(error = ?e, "Command failed");
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = Config::from_env().context("Failed to load configuration")?;
    let store = KeyringStore::new();
    let prompter = DialoguerPrompter;
    let provider = CredentialProvider::new(&store, &prompter);

    match cli.command {
        Commands::Login(args) => {
            let identity = commands::login(&provider, args).context("Login failed")?;
            println!("Logged in as {} ({})", identity.email, identity.domain);
        }
        Commands::Logout => match commands::logout(&provider).context("Logout failed")? {
            Some(email) => println!("Logged out {}", email),
            None => println!("Not logged in"),
        },
        Commands::List(args) => {
            let (query, engine) = connect(&args.search, &config, &provider)?;
            let listing = commands::list(&engine, &query, &args)
                .await
                .map_err(|e| sanitized(&engine, e))?;
            println!("{}", listing);
        }
        Commands::Delete(args) => {
            let (query, engine) = connect(&args.search, &config, &provider)?;
            let reporter = ConsoleReporter::new(args.search.verbose);
            let deleted = commands::delete(&engine, &query, &args, &reporter)
                .await
                .map_err(|e| sanitized(&engine, e))?;
            tracing::info!(deleted, "Delete finished");
        }
    }

    Ok(())
}

/// Validates the query and builds the engine. Prompts only on a terminal.
fn connect(
    search: &SearchArgs,
    config: &Config,
    provider: &CredentialProvider<'_>,
) -> Result<(SearchQuery, TicketEngine<ZendeskClient>)> {
    // Scripts get NotAuthenticated instead of a blocked prompt
    let silent = !std::io::stdin().is_terminal();
    commands::prepare(search, config, provider, silent).context("Failed to prepare search")
}

fn sanitized(engine: &TicketEngine<ZendeskClient>, e: zdesk::error::ZdeskError) -> anyhow::Error {
    anyhow::anyhow!(e.sanitized_display(engine.api().api_key_for_sanitization()))
}
