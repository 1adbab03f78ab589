//! Data models for the Zendesk API.
//!
//! This module contains the ticket record passed through from search results
//! and the page envelope returned by the search endpoint.

mod page;
mod ticket;

pub use page::*;
pub use ticket::*;
