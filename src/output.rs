//! Terminal output for list results and engine progress.

use std::fmt::Display;

use chrono::{DateTime, Local, TimeZone};

use crate::engine::{Progress, ProgressReporter};
use crate::error::Result;
use crate::models::Ticket;

/// Width of the right-aligned index column.
const INDEX_WIDTH: usize = 5;

/// Width of the left-aligned date column.
const DATE_WIDTH: usize = 25;

/// Medium date-time format, e.g. `Oct 18, 2026 3:04 PM`.
const DATE_FORMAT: &str = "%b %-d, %Y %-I:%M %p";

/// Prints progress to stdout.
///
/// Page and plan events only appear in verbose mode; every successful delete
/// chunk is always announced.
#[derive(Debug, Clone, Copy)]
pub struct ConsoleReporter {
    verbose: bool,
}

impl ConsoleReporter {
    /// Creates a reporter.
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }

    /// Text printed for `event`, if any.
    pub fn message(&self, event: Progress) -> Option<String> {
        match event {
            Progress::PageFetched { retrieved, .. } if self.verbose => {
                Some(format!("Retrieved {} items", retrieved))
            }
            Progress::DeletePlanned { candidates } if self.verbose => {
                Some(format!("Deleting {} items", candidates))
            }
            Progress::ChunkDeleted { deleted } => Some(format!("Deleted {} tickets", deleted)),
            _ => None,
        }
    }
}

impl ProgressReporter for ConsoleReporter {
    fn report(&self, event: Progress) {
        if let Some(line) = self.message(event) {
            println!("{}", line);
        }
    }
}

/// Formats a timestamp in the medium date-time style.
pub fn format_timestamp<Tz>(timestamp: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    timestamp.format(DATE_FORMAT).to_string()
}

/// Formats one list row: index, local creation date, subject.
pub fn format_ticket_line(index: usize, ticket: &Ticket) -> String {
    // Shown in local time; the record itself keeps the server's offset
    let date = ticket
        .created_at()
        .map(|t| format_timestamp(&t.with_timezone(&Local)))
        .unwrap_or_default();
    format_row(index, &date, ticket.display_subject())
}

fn format_row(index: usize, date: &str, subject: &str) -> String {
    format!(
        "{:>iw$} | {:<dw$} | {}",
        index,
        date,
        subject,
        iw = INDEX_WIDTH,
        dw = DATE_WIDTH
    )
}

/// Closing line of a listing.
pub fn total_line(count: usize) -> String {
    format!("Total: {} items", count)
}

/// Renders a full listing, either as pretty JSON or as aligned rows.
///
/// # Errors
///
/// Returns `ZdeskError::MalformedResponse` if JSON serialization fails.
pub fn render_list(tickets: &[Ticket], json: bool) -> Result<String> {
    let mut out = String::new();
    if json {
        out.push_str(&serde_json::to_string_pretty(tickets)?);
        out.push('\n');
    } else {
        for (i, ticket) in tickets.iter().enumerate() {
            out.push_str(&format_ticket_line(i, ticket));
            out.push('\n');
        }
    }
    out.push_str(&total_line(tickets.len()));
    Ok(out)
}
