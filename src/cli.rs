//! Command line surface.

use clap::builder::TypedValueParser;
use clap::{Args, Parser, Subcommand};

use crate::engine::PAGE_SIZE;

/// Top-level arguments.
#[derive(Debug, Parser)]
#[command(name = "zdesk", version, about = "Zendesk support ticket bulk operations")]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// Command to run.
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Login with your email and API key. Stored in the OS keychain or equivalent.
    Login(LoginArgs),
    /// Remove your Zendesk API key from the OS keychain or equivalent.
    Logout,
    /// List tickets using a search string
    #[command(visible_alias = "ls")]
    List(ListArgs),
    /// Delete all tickets that match a search string
    #[command(visible_alias = "del")]
    Delete(DeleteArgs),
}

/// Arguments for `login`.
#[derive(Debug, Args)]
pub struct LoginArgs {
    /// The email address of the user with API access
    #[arg(short, long, value_name = "EMAIL")]
    pub user: Option<String>,

    /// Organization subdomain (the `acme` in acme.zendesk.com)
    #[arg(short, long)]
    pub domain: Option<String>,
}

/// Search terms and bounds shared by `list` and `delete`.
#[derive(Debug, Args)]
pub struct SearchArgs {
    /// Search terms, joined with spaces (e.g. `status:open priority:urgent`)
    #[arg(required = true, value_name = "SEARCH")]
    pub terms: Vec<String>,

    /// The number of results to return
    #[arg(
        short,
        long,
        value_name = "N",
        default_value_t = PAGE_SIZE,
        value_parser = clap::value_parser!(u64).map(num_or_default)
    )]
    pub num: usize,

    /// Output some debug logs
    #[arg(short, long)]
    pub verbose: bool,
}

/// `0` falls back to [`PAGE_SIZE`]; counts past `usize::MAX` saturate.
fn num_or_default(n: u64) -> usize {
    match n {
        0 => PAGE_SIZE,
        n => usize::try_from(n).unwrap_or(usize::MAX),
    }
}

/// Arguments for `list`.
#[derive(Debug, Args)]
pub struct ListArgs {
    #[command(flatten)]
    #[allow(missing_docs)]
    pub search: SearchArgs,

    /// Print the raw ticket records as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for `delete`.
#[derive(Debug, Args)]
pub struct DeleteArgs {
    #[command(flatten)]
    #[allow(missing_docs)]
    pub search: SearchArgs,
}
