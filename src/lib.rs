//! # zdesk
//!
//! zdesk is a command-line client for bulk operations on Zendesk support
//! tickets: log in once, search tickets, list them, and delete what matched.
//!
//! ## Features
//!
//! - **Search**: cursor-following pagination bounded by a maximum result count
//! - **Bulk delete**: matched tickets removed in ordered windows of 100 ids
//! - **Credentials**: stored in the OS keychain, captured interactively on first use
//! - **Security**: API keys are never logged or shown in error messages
//!
//! ## Architecture
//!
//! - [`config`] - Endpoint configuration from environment variables
//! - [`error`] - Error types with API key sanitization
//! - [`identity`] - Credential lookup, capture and storage
//! - [`engine`] - Paginated search and chunked delete over [`engine::HelpdeskApi`]
//! - [`client`] - The reqwest-based Zendesk implementation of that API
//! - [`models`] - Search response and ticket types
//! - [`output`] - Listing format and progress messages
//! - [`cli`] / [`commands`] - Argument parsing and command handlers
//!
//! ## Example
//!
//! ```ignore
//! use zdesk::client::ZendeskClient;
//! use zdesk::config::Config;
//! use zdesk::engine::{SearchQuery, SilentReporter, TicketEngine};
//! use zdesk::identity::{CredentialProvider, DialoguerPrompter, KeyringStore};
//!
//! async fn example() -> Result<(), zdesk::error::ZdeskError> {
//!     let store = KeyringStore::new();
//!     let identity = CredentialProvider::new(&store, &DialoguerPrompter).resolve(true)?;
//!     let engine = TicketEngine::new(ZendeskClient::new(&Config::from_env()?, identity)?);
//!
//!     let query = SearchQuery::new(["status:open"])?;
//!     for ticket in engine.search(&query, 250, &SilentReporter).await? {
//!         println!("#{}: {}", ticket.id, ticket.display_subject());
//!     }
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod cli;
pub mod client;
pub mod commands;
pub mod config;
pub mod engine;
pub mod error;
pub mod identity;
pub mod models;
pub mod output;
