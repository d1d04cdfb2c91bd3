//! Paginated queries against the storage backend.
//!
//! [`QuerySession`] drives the cursor protocol in either single-page or
//! accumulate-all mode; [`QueryTransport`] is the seam to the backend's
//! query endpoint; [`render`] formats results for the terminal.

use clap::ValueEnum;

pub mod render;
mod session;
mod transport;

pub use session::{QueryOutcome, QueryParams, QuerySession};
pub use transport::{HttpTransport, QueryRequest, QueryResponse, QueryTransport};

/// A leak record as returned by the backend.
///
/// The server side is schemaless here, so records are keyed lookups rather
/// than a fixed struct; [`render`] pulls out the fields it knows about.
pub type LeakRecord = serde_json::Map<String, serde_json::Value>;

/// Which record field a query matches the keyword against.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum QueryField {
    Domain,
    Email,
    Password,
}

impl QueryField {
    /// Wire key, also the lookup key inside a [`LeakRecord`].
    pub const fn key(self) -> &'static str {
        match self {
            QueryField::Domain => "domain",
            QueryField::Email => "email",
            QueryField::Password => "password",
        }
    }
}
