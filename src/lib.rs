//! Plumchecker - parse and query leaked password DBs
//!
//! Plumchecker ingests bulk credential dumps (plain files or nested
//! archives) and forwards each leaf file to the normalizer worker, and
//! queries the storage backend for leaks matching a domain, email or
//! password with cursor-based pagination.
//!
//! # Modules
//!
//! - [`archive`] - content sniffing and uniform container readers (zip/tar/gzip)
//! - [`ingest`] - recursive ingestion engine and the worker-facing leaf sink
//! - [`query`] - paginated query session, backend transport and rendering
//! - [`config`] - configuration types and loading
//! - [`cli`] - command-line interface

pub mod archive;
pub mod cli;
pub mod config;
pub mod ingest;
pub mod query;

// Re-export commonly used types
pub use archive::{ArchiveError, ArchiveKind, ByteSource, Classification, Container, ContainerEntry};
pub use config::{Config, ConfigError};
pub use ingest::{Engine, IngestOptions, IngestSummary, LeafPayload, LeafSink, WorkerSender};
pub use query::{
    HttpTransport, LeakRecord, QueryField, QueryOutcome, QueryParams, QueryRequest, QueryResponse, QuerySession,
    QueryTransport,
};
