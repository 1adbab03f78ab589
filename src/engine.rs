//! Paginated ticket search and chunked bulk delete.
//!
//! The engine follows server-provided `next_page` cursors until it holds
//! `max_results` tickets or the server runs out of pages, then (for delete)
//! walks the result set in windows of [`BULK_DELETE_LIMIT`] ids.
//!
//! All calls are sequential: each page URL comes from the previous response
//! and delete windows are issued strictly in order. Nothing is retried and
//! nothing is rolled back; a failed call stops the command where it is.

use async_trait::async_trait;

use crate::error::{Result, ZdeskError};
use crate::models::{ResultPage, Ticket};

/// Default number of results when no maximum is given.
pub const PAGE_SIZE: usize = 100;

/// Maximum number of ids accepted by one bulk delete call.
pub const BULK_DELETE_LIMIT: usize = 100;

/// Restricts search results to tickets.
const TICKET_TYPE_FILTER: &str = "type:ticket";

/// Free-text search terms, in the order given.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    terms: Vec<String>,
}

impl SearchQuery {
    /// Builds a query from terms, dropping blank ones.
    ///
    /// # Errors
    ///
    /// Returns `ZdeskError::Validation` if no non-blank term remains.
    pub fn new<I, S>(terms: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let terms: Vec<String> = terms
            .into_iter()
            .map(|t| t.as_ref().trim().to_string())
            .filter(|t| !t.is_empty())
            .collect();

        if terms.is_empty() {
            return Err(ZdeskError::validation(
                "at least one search term is required",
            ));
        }
        Ok(Self { terms })
    }

    /// The individual terms.
    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    /// Terms joined by spaces, with the ticket type restriction appended.
    pub fn expression(&self) -> String {
        format!("{} {}", self.terms.join(" "), TICKET_TYPE_FILTER)
    }

    /// URL-encoded [`expression`](Self::expression).
    pub fn encoded(&self) -> String {
        urlencoding::encode(&self.expression()).into_owned()
    }
}

/// Progress notifications emitted while the engine works.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progress {
    /// A search page arrived; `retrieved` is the running total kept so far.
    PageFetched {
        /// 1-based page number.
        page: usize,
        /// Tickets accumulated, never above the requested maximum.
        retrieved: usize,
    },
    /// The delete candidate set is known.
    DeletePlanned {
        /// Number of tickets about to be deleted.
        candidates: usize,
    },
    /// One bulk delete call succeeded.
    ChunkDeleted {
        /// Running total of deleted tickets.
        deleted: usize,
    },
}

/// Receives [`Progress`] events.
pub trait ProgressReporter: Send + Sync {
    /// Handles one event.
    fn report(&self, event: Progress);
}

/// Reporter that discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentReporter;

impl ProgressReporter for SilentReporter {
    fn report(&self, _event: Progress) {}
}

/// Remote operations the engine needs.
#[async_trait]
pub trait HelpdeskApi: Send + Sync {
    /// URL of the first search page for `query`.
    fn search_url(&self, query: &SearchQuery) -> String;

    /// Fetches and parses one search page.
    async fn fetch_page(&self, url: &str) -> Result<ResultPage>;

    /// Deletes up to [`BULK_DELETE_LIMIT`] tickets in one call.
    async fn destroy_many(&self, ids: &[u64]) -> Result<()>;
}

/// Ticket ids split into consecutive fixed-size windows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchDeletePlan {
    ids: Vec<u64>,
    window: usize,
}

impl BatchDeletePlan {
    /// Plans deletion of `tickets` in their current order.
    pub fn new(tickets: &[Ticket], window: usize) -> Self {
        Self {
            ids: tickets.iter().map(|t| t.id).collect(),
            window: window.max(1),
        }
    }

    /// Windows of ids, in order. The last one may be shorter.
    pub fn chunks(&self) -> std::slice::Chunks<'_, u64> {
        self.ids.chunks(self.window)
    }

    /// Number of bulk delete calls the plan needs.
    pub fn call_count(&self) -> usize {
        self.ids.len().div_ceil(self.window)
    }

    /// Number of tickets in the plan.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Returns true if there is nothing to delete.
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// Search and bulk delete over a [`HelpdeskApi`].
pub struct TicketEngine<A> {
    api: A,
}

impl<A: HelpdeskApi> TicketEngine<A> {
    /// Creates an engine over `api`.
    pub fn new(api: A) -> Self {
        Self { api }
    }

    /// The underlying API.
    pub fn api(&self) -> &A {
        &self.api
    }

    /// Returns at most `max_results` tickets matching `query`, in server order.
    ///
    /// Pages are fetched only while the budget is not yet met. Items of the
    /// last page beyond the budget are discarded.
    pub async fn search(
        &self,
        query: &SearchQuery,
        max_results: usize,
        reporter: &dyn ProgressReporter,
    ) -> Result<Vec<Ticket>> {
        let mut tickets: Vec<Ticket> = Vec::new();
        let mut next_url = Some(self.api.search_url(query));
        let mut pages = 0usize;

        tracing::debug!(query = %query.expression(), max_results, "Searching tickets");

        while tickets.len() < max_results {
            let Some(url) = next_url.take() else {
                break;
            };

            let page = self.api.fetch_page(&url).await?;
            pages += 1;

            let fetched = page.results.len();
            let remaining = max_results - tickets.len();
            tickets.extend(page.results.into_iter().take(remaining));

            tracing::debug!(
                page = pages,
                fetched,
                kept = tickets.len(),
                total_matches = ?page.count,
                "Fetched search page"
            );
            reporter.report(Progress::PageFetched {
                page: pages,
                retrieved: tickets.len(),
            });

            if fetched == 0 {
                break;
            }
            next_url = page.next_page;
        }

        Ok(tickets)
    }

    /// Deletes the tickets `search` returns for the same query and bound.
    ///
    /// Returns the number of tickets deleted. Chunks already deleted stay
    /// deleted when a later chunk fails; the error then reports how many.
    pub async fn delete(
        &self,
        query: &SearchQuery,
        max_results: usize,
        reporter: &dyn ProgressReporter,
    ) -> Result<usize> {
        let tickets = self.search(query, max_results, reporter).await?;
        let plan = BatchDeletePlan::new(&tickets, BULK_DELETE_LIMIT);

        reporter.report(Progress::DeletePlanned {
            candidates: plan.len(),
        });
        tracing::debug!(
            candidates = plan.len(),
            calls = plan.call_count(),
            "Planned bulk delete"
        );

        let mut deleted = 0usize;
        for chunk in plan.chunks() {
            if deleted >= max_results {
                break;
            }

            if let Err(e) = self.api.destroy_many(chunk).await {
                if deleted == 0 {
                    return Err(e);
                }
                return Err(ZdeskError::PartialDelete {
                    deleted,
                    source: Box::new(e),
                });
            }

            deleted += chunk.len();
            reporter.report(Progress::ChunkDeleted { deleted });
        }

        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::sync::Mutex;

    const FAKE_PAGE_SIZE: usize = 100;

    /// Serves `matches` tickets (ids 1..=matches) in pages of 100.
    struct FakeApi {
        matches: usize,
        fetched_urls: Mutex<Vec<String>>,
        delete_calls: Mutex<Vec<Vec<u64>>>,
        fail_delete_call: Option<usize>,
    }

    impl FakeApi {
        fn with_matches(matches: usize) -> Self {
            Self {
                matches,
                fetched_urls: Mutex::new(Vec::new()),
                delete_calls: Mutex::new(Vec::new()),
                fail_delete_call: None,
            }
        }

        fn failing_delete_at(mut self, call: usize) -> Self {
            self.fail_delete_call = Some(call);
            self
        }

        fn requests(&self) -> usize {
            self.fetched_urls.lock().unwrap().len()
        }

        fn delete_calls(&self) -> Vec<Vec<u64>> {
            self.delete_calls.lock().unwrap().clone()
        }
    }

    fn ticket(id: u64) -> Ticket {
        let mut t = Ticket::new(id);
        t.fields
            .insert("subject".to_string(), format!("ticket {}", id).into());
        t
    }

    #[async_trait]
    impl HelpdeskApi for FakeApi {
        fn search_url(&self, query: &SearchQuery) -> String {
            format!("fake://search?query={}&page=0", query.encoded())
        }

        async fn fetch_page(&self, url: &str) -> Result<ResultPage> {
            self.fetched_urls.lock().unwrap().push(url.to_string());
            let page: usize = url.rsplit("page=").next().unwrap().parse().unwrap();

            let start = page * FAKE_PAGE_SIZE;
            let end = (start + FAKE_PAGE_SIZE).min(self.matches);
            let results = (start..end).map(|i| ticket(i as u64 + 1)).collect();
            let next_page = (end < self.matches).then(|| format!("fake://search?page={}", page + 1));

            Ok(ResultPage {
                results,
                next_page,
                count: Some(self.matches as u64),
            })
        }

        async fn destroy_many(&self, ids: &[u64]) -> Result<()> {
            let mut calls = self.delete_calls.lock().unwrap();
            if self.fail_delete_call == Some(calls.len()) {
                return Err(ZdeskError::ServiceUnavailable {
                    status: reqwest::StatusCode::SERVICE_UNAVAILABLE,
                });
            }
            calls.push(ids.to_vec());
            Ok(())
        }
    }

    #[derive(Default)]
    struct RecordingReporter {
        events: Mutex<Vec<Progress>>,
    }

    impl ProgressReporter for RecordingReporter {
        fn report(&self, event: Progress) {
            self.events.lock().unwrap().push(event);
        }
    }

    fn query(terms: &[&str]) -> SearchQuery {
        SearchQuery::new(terms.iter().copied()).unwrap()
    }

    #[test]
    fn test_query_expression_appends_ticket_filter() {
        let q = query(&["status:open", " priority:urgent "]);
        assert_eq!(q.terms(), &["status:open", "priority:urgent"]);
        assert_eq!(q.expression(), "status:open priority:urgent type:ticket");
        assert_eq!(
            q.encoded(),
            "status%3Aopen%20priority%3Aurgent%20type%3Aticket"
        );
    }

    #[test]
    fn test_query_rejects_blank_terms() {
        assert!(SearchQuery::new(["", "   "]).is_err());
        assert!(SearchQuery::new(Vec::<String>::new()).is_err());
    }

    #[test]
    fn test_plan_chunks_in_order() {
        let tickets: Vec<Ticket> = (1..=250).map(ticket).collect();
        let plan = BatchDeletePlan::new(&tickets, BULK_DELETE_LIMIT);

        let sizes: Vec<usize> = plan.chunks().map(<[u64]>::len).collect();
        assert_eq!(sizes, vec![100, 100, 50]);
        assert_eq!(plan.call_count(), 3);
        assert_eq!(plan.chunks().next().unwrap()[0], 1);
        assert_eq!(plan.chunks().last().unwrap().last(), Some(&250));
    }

    #[test]
    fn test_search_three_pages_for_250() {
        let engine = TicketEngine::new(FakeApi::with_matches(250));
        let tickets =
            tokio_test::block_on(engine.search(&query(&["status:open"]), 250, &SilentReporter))
                .unwrap();

        assert_eq!(tickets.len(), 250);
        assert_eq!(engine.api().requests(), 3);
    }

    #[test]
    fn test_search_stops_when_budget_met() {
        let engine = TicketEngine::new(FakeApi::with_matches(1000));
        let tickets =
            tokio_test::block_on(engine.search(&query(&["x"]), 150, &SilentReporter)).unwrap();

        assert_eq!(tickets.len(), 150);
        assert_eq!(engine.api().requests(), 2);
        let ids: Vec<u64> = tickets.iter().map(|t| t.id).collect();
        assert_eq!(ids, (1..=150).collect::<Vec<u64>>());
    }

    #[test]
    fn test_search_returns_all_when_fewer_matches() {
        let engine = TicketEngine::new(FakeApi::with_matches(30));
        let tickets =
            tokio_test::block_on(engine.search(&query(&["x"]), PAGE_SIZE, &SilentReporter))
                .unwrap();

        assert_eq!(tickets.len(), 30);
        assert_eq!(engine.api().requests(), 1);
    }

    #[test]
    fn test_search_with_no_matches_is_empty() {
        let engine = TicketEngine::new(FakeApi::with_matches(0));
        let tickets =
            tokio_test::block_on(engine.search(&query(&["nothing"]), PAGE_SIZE, &SilentReporter))
                .unwrap();

        assert!(tickets.is_empty());
        assert_eq!(engine.api().requests(), 1);
    }

    #[test]
    fn test_search_with_zero_budget_sends_nothing() {
        let engine = TicketEngine::new(FakeApi::with_matches(10));
        let tickets =
            tokio_test::block_on(engine.search(&query(&["x"]), 0, &SilentReporter)).unwrap();

        assert!(tickets.is_empty());
        assert_eq!(engine.api().requests(), 0);
    }

    #[test]
    fn test_search_reports_running_totals() {
        let engine = TicketEngine::new(FakeApi::with_matches(250));
        let reporter = RecordingReporter::default();
        tokio_test::block_on(engine.search(&query(&["x"]), 220, &reporter)).unwrap();

        assert_eq!(
            *reporter.events.lock().unwrap(),
            vec![
                Progress::PageFetched { page: 1, retrieved: 100 },
                Progress::PageFetched { page: 2, retrieved: 200 },
                Progress::PageFetched { page: 3, retrieved: 220 },
            ]
        );
    }

    #[test]
    fn test_delete_150_in_two_calls() {
        let engine = TicketEngine::new(FakeApi::with_matches(150));
        let deleted =
            tokio_test::block_on(engine.delete(&query(&["priority:urgent"]), 150, &SilentReporter))
                .unwrap();

        assert_eq!(deleted, 150);
        let calls = engine.api().delete_calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0], (1..=100).collect::<Vec<u64>>());
        assert_eq!(calls[1], (101..=150).collect::<Vec<u64>>());
    }

    #[test]
    fn test_delete_only_touches_search_results() {
        let engine = TicketEngine::new(FakeApi::with_matches(500));
        let deleted =
            tokio_test::block_on(engine.delete(&query(&["x"]), 120, &SilentReporter)).unwrap();

        assert_eq!(deleted, 120);
        let all: Vec<u64> = engine.api().delete_calls().concat();
        assert_eq!(all, (1..=120).collect::<Vec<u64>>());
    }

    #[test]
    fn test_delete_with_no_matches_issues_no_calls() {
        let engine = TicketEngine::new(FakeApi::with_matches(0));
        let reporter = RecordingReporter::default();
        let deleted = tokio_test::block_on(engine.delete(&query(&["x"]), 100, &reporter)).unwrap();

        assert_eq!(deleted, 0);
        assert!(engine.api().delete_calls().is_empty());
        assert!(reporter
            .events
            .lock()
            .unwrap()
            .contains(&Progress::DeletePlanned { candidates: 0 }));
    }

    #[test]
    fn test_delete_failure_after_first_chunk_is_partial() {
        let engine = TicketEngine::new(FakeApi::with_matches(300).failing_delete_at(1));
        let err =
            tokio_test::block_on(engine.delete(&query(&["x"]), 300, &SilentReporter)).unwrap_err();

        match err {
            ZdeskError::PartialDelete { deleted, source } => {
                assert_eq!(deleted, 100);
                assert!(matches!(*source, ZdeskError::ServiceUnavailable { .. }));
            }
            other => panic!("expected PartialDelete, got {other:?}"),
        }
        assert_eq!(engine.api().delete_calls().len(), 1);
    }

    #[test]
    fn test_delete_failure_on_first_chunk_is_plain_error() {
        let engine = TicketEngine::new(FakeApi::with_matches(50).failing_delete_at(0));
        let err =
            tokio_test::block_on(engine.delete(&query(&["x"]), 100, &SilentReporter)).unwrap_err();

        assert!(matches!(err, ZdeskError::ServiceUnavailable { .. }));
    }

    #[test]
    fn test_delete_reports_running_deleted_count() {
        let engine = TicketEngine::new(FakeApi::with_matches(150));
        let reporter = RecordingReporter::default();
        tokio_test::block_on(engine.delete(&query(&["x"]), 150, &reporter)).unwrap();

        let events = reporter.events.lock().unwrap();
        let deleted: Vec<Progress> = events
            .iter()
            .copied()
            .filter(|e| matches!(e, Progress::ChunkDeleted { .. }))
            .collect();
        assert_eq!(
            deleted,
            vec![
                Progress::ChunkDeleted { deleted: 100 },
                Progress::ChunkDeleted { deleted: 150 },
            ]
        );
    }
}
