//! Search response envelope.

use serde::Deserialize;

use super::Ticket;

/// One page of search results.
///
/// `next_page` is an opaque, server-built URL; it is followed verbatim and
/// never constructed on the client.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResultPage {
    /// Tickets on this page, in server order.
    #[serde(default)]
    pub results: Vec<Ticket>,

    /// URL of the next page, absent on the last page.
    #[serde(default)]
    pub next_page: Option<String>,

    /// Total number of matches reported by the server.
    #[serde(default)]
    pub count: Option<u64>,
}

/// Body returned by the bulk delete endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct DestroyManyResponse {
    /// Background job tracking the deletion.
    #[serde(default)]
    pub job_status: Option<JobStatus>,
}

/// Status of a background job on the server.
#[derive(Debug, Clone, Deserialize)]
pub struct JobStatus {
    /// Job identifier.
    pub id: String,

    /// Job state, e.g. `queued` or `completed`.
    #[serde(default)]
    pub status: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_last_page_has_no_cursor() {
        let page: ResultPage = serde_json::from_str(
            r#"{"results":[{"id":1,"subject":"a"}],"next_page":null,"count":1}"#,
        )
        .unwrap();
        assert_eq!(page.results.len(), 1);
        assert!(page.next_page.is_none());
        assert_eq!(page.count, Some(1));
    }

    #[test]
    fn test_empty_body_object_is_empty_page() {
        let page: ResultPage = serde_json::from_str("{}").unwrap();
        assert!(page.results.is_empty());
        assert!(page.next_page.is_none());
    }

    #[test]
    fn test_destroy_many_job_status() {
        let body: DestroyManyResponse = serde_json::from_str(
            r#"{"job_status":{"id":"82de0b044094f0c67893ac9fe64f1a99","status":"queued","url":"x"}}"#,
        )
        .unwrap();
        let job = body.job_status.unwrap();
        assert_eq!(job.id, "82de0b044094f0c67893ac9fe64f1a99");
        assert_eq!(job.status.as_deref(), Some("queued"));
    }
}
