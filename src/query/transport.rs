//! Backend query transport.
//!
//! The trait is deliberately infallible: any failure reaching the backend
//! is absorbed here and surfaces as a terminal empty response, so a flaky
//! network truncates a result set instead of aborting the session. That
//! trade is part of the protocol contract and is tested.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::config::Config;

use super::LeakRecord;

/// Request timeout for one backend call.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// JSON body of one query call. The token is omitted on the first call of
/// a session; afterwards it carries the cursor from the previous response.
#[derive(Debug, Clone, Serialize)]
pub struct QueryRequest {
    pub key: &'static str,
    pub value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

/// One page of results from the backend.
///
/// `end_cursor == ""` conventionally hints that no further page exists,
/// but only `is_final` is authoritative for loop termination.
#[derive(Debug, Clone, Deserialize)]
pub struct QueryResponse {
    pub is_final: bool,
    #[serde(default)]
    pub leaks: Vec<LeakRecord>,
    #[serde(default)]
    pub end_cursor: String,
}

impl QueryResponse {
    /// The response substituted for any transport failure.
    pub fn terminal_empty() -> Self {
        Self {
            is_final: true,
            leaks: Vec::new(),
            end_cursor: String::new(),
        }
    }
}

/// Seam to the backend's query endpoint.
pub trait QueryTransport {
    fn query(&self, request: &QueryRequest) -> QueryResponse;
}

/// HTTP POST transport against the configured query endpoint.
pub struct HttpTransport {
    url: String,
    client: reqwest::blocking::Client,
}

impl HttpTransport {
    pub fn new(config: &Config) -> reqwest::Result<Self> {
        let client = reqwest::blocking::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            url: config.query_url(),
            client,
        })
    }

    fn try_query(&self, request: &QueryRequest) -> reqwest::Result<QueryResponse> {
        debug!(url = %self.url, key = request.key, has_token = request.token.is_some(), "try_query: posting");
        self.client
            .post(&self.url)
            .json(request)
            .send()?
            .error_for_status()?
            .json()
    }
}

impl QueryTransport for HttpTransport {
    fn query(&self, request: &QueryRequest) -> QueryResponse {
        match self.try_query(request) {
            Ok(response) => response,
            Err(e) => {
                error!(error = %e, "couldn't receive response from storage module");
                QueryResponse::terminal_empty()
            }
        }
    }
}
