//! Ticket model for Zendesk search results.
//!
//! Only `id` is typed. Every other field the server sends, `null` values
//! included, is kept verbatim so JSON output matches the server's record.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A support ticket as returned by the search endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ticket {
    /// Unique ticket identifier.
    pub id: u64,

    /// All remaining fields, passed through untouched.
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Ticket {
    /// Creates a ticket with no fields besides its id.
    pub fn new(id: u64) -> Self {
        Self {
            id,
            fields: Map::new(),
        }
    }

    /// Ticket subject line, if present and a string.
    pub fn subject(&self) -> Option<&str> {
        self.fields.get("subject").and_then(Value::as_str)
    }

    /// Returns the subject or an empty string.
    pub fn display_subject(&self) -> &str {
        self.subject().unwrap_or("")
    }

    /// Creation time with the offset the server sent.
    ///
    /// Returns `None` when the field is missing, `null` or not RFC 3339.
    pub fn created_at(&self) -> Option<DateTime<FixedOffset>> {
        let raw = self.fields.get("created_at")?.as_str()?;
        DateTime::parse_from_rfc3339(raw).ok()
    }
}
