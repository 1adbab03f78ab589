//! Command handlers.
//!
//! Each handler takes its collaborators explicitly; `main` wires in the
//! keychain, the terminal prompter and the HTTP client.

use crate::cli::{DeleteArgs, ListArgs, LoginArgs, SearchArgs};
use crate::client::ZendeskClient;
use crate::config::Config;
use crate::engine::{HelpdeskApi, ProgressReporter, SearchQuery, TicketEngine};
use crate::error::Result;
use crate::identity::{CredentialProvider, Identity};
use crate::output::{render_list, ConsoleReporter};

/// Captures and stores a new identity.
pub fn login(provider: &CredentialProvider<'_>, args: LoginArgs) -> Result<Identity> {
    provider.capture(args.domain, args.user)
}

/// Removes the stored identity, returning the email that was logged out.
pub fn logout(provider: &CredentialProvider<'_>) -> Result<Option<String>> {
    provider.clear()
}

/// Validates the search terms, then resolves credentials and builds the engine.
///
/// The query is checked first so a bad search never triggers a login prompt.
pub fn prepare(
    args: &SearchArgs,
    config: &Config,
    provider: &CredentialProvider<'_>,
    silent: bool,
) -> Result<(SearchQuery, TicketEngine<ZendeskClient>)> {
    let query = SearchQuery::new(&args.terms)?;
    let identity = provider.resolve(silent)?;
    let client = ZendeskClient::new(config, identity)?;
    Ok((query, TicketEngine::new(client)))
}

/// Searches and renders the listing text.
pub async fn list<A: HelpdeskApi>(
    engine: &TicketEngine<A>,
    query: &SearchQuery,
    args: &ListArgs,
) -> Result<String> {
    let reporter = ConsoleReporter::new(args.search.verbose);
    let tickets = engine.search(query, args.search.num, &reporter).await?;
    render_list(&tickets, args.json)
}

/// Deletes matching tickets and returns how many were removed.
pub async fn delete<A: HelpdeskApi>(
    engine: &TicketEngine<A>,
    query: &SearchQuery,
    args: &DeleteArgs,
    reporter: &dyn ProgressReporter,
) -> Result<usize> {
    engine.delete(query, args.search.num, reporter).await
}
