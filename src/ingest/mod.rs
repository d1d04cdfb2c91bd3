//! Recursive ingestion of leaked dumps.
//!
//! [`Engine`] flattens a filesystem tree plus arbitrarily nested archives
//! into a stream of leaf payloads; [`LeafSink`] is the boundary with the
//! external normalizer worker that turns those payloads into records for
//! the storage backend.

use std::io;

use thiserror::Error;

use crate::archive::ArchiveError;

mod engine;
mod sender;

pub use engine::{DEFAULT_MAX_DEPTH, Engine, IngestOptions, IngestSummary};
pub use sender::{LeafPayload, LeafSink, SendError, WorkerSender};

/// Errors raised while ingesting a root path.
///
/// Per-item failures are caught and logged inside the engine; what escapes
/// here is either a root-level problem or a sink failure.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("Nothing found at path {0}. Please check your input.")]
    NothingFound(String),

    #[error(transparent)]
    Archive(#[from] ArchiveError),

    #[error(transparent)]
    Send(#[from] SendError),

    #[error(transparent)]
    Io(#[from] io::Error),
}
