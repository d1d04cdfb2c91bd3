//! The paginated query protocol.
//!
//! Pages are strictly sequential: the cursor from page N's response is the
//! only way to address page N+1, so page N+1 is never requested before
//! page N is known.

use tracing::{debug, warn};

use super::{LeakRecord, QueryField, QueryRequest, QueryTransport};

#[derive(Debug, Clone)]
pub struct QueryParams {
    pub field: QueryField,
    pub keyword: String,
    /// Single-page mode when true, accumulate-all otherwise.
    pub paginate: bool,
    /// Target page, 1-based; only meaningful when `paginate` is set.
    pub page: u32,
}

/// What a session run produced.
#[derive(Debug)]
pub enum QueryOutcome {
    /// The result set ended before the requested page; no records to show.
    EndedEarly { pages: u32 },
    /// The requested page, plus the page number to ask for next when the
    /// backend hinted that more results exist.
    Page {
        leaks: Vec<LeakRecord>,
        next_page: Option<u32>,
    },
    /// Every page of the result set, in call order.
    All { leaks: Vec<LeakRecord> },
}

/// Drives the cursor protocol against an injected transport.
pub struct QuerySession<'a, T: QueryTransport + ?Sized> {
    transport: &'a T,
}

impl<'a, T: QueryTransport + ?Sized> QuerySession<'a, T> {
    pub fn new(transport: &'a T) -> Self {
        Self { transport }
    }

    pub fn run(&self, params: &QueryParams) -> QueryOutcome {
        debug!(field = params.field.key(), keyword = %params.keyword, paginate = params.paginate, page = params.page, "run: called");
        let mut request = QueryRequest {
            key: params.field.key(),
            value: params.keyword.clone(),
            token: None,
        };
        let response = self.transport.query(&request);

        if params.paginate {
            let mut current_page = 1;
            let mut response = response;
            while current_page != params.page {
                if response.is_final {
                    warn!("this search query ended after only {current_page} pages");
                    return QueryOutcome::EndedEarly { pages: current_page };
                }
                request.token = Some(response.end_cursor);
                response = self.transport.query(&request);
                current_page += 1;
            }
            // An empty cursor means the backend has nothing past this page.
            let next_page = (!response.end_cursor.is_empty()).then_some(current_page + 1);
            QueryOutcome::Page {
                leaks: response.leaks,
                next_page,
            }
        } else {
            let mut leaks = response.leaks;
            let mut is_final = response.is_final;
            let mut cursor = response.end_cursor;
            // Only is_final terminates accumulation; an empty cursor while
            // is_final is false is passed through as-is.
            while !is_final {
                request.token = Some(cursor);
                let next = self.transport.query(&request);
                leaks.extend(next.leaks);
                is_final = next.is_final;
                cursor = next.end_cursor;
            }
            QueryOutcome::All { leaks }
        }
    }
}
