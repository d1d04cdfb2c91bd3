//! Uniform container readers for the archive formats found in leaked dumps.
//!
//! The three supported formats share one contract but keep their native
//! entry semantics: zip is hierarchical, tar is a flat member list that
//! ignores the requested directory, and gzip is a single unnamed stream.
//! The asymmetry is load-bearing for the traversal logic in [`crate::ingest`];
//! do not try to unify entry addressing beyond this contract.

use std::fs::File;
use std::io::{self, Cursor, Read, Seek};
use std::path::PathBuf;

use thiserror::Error;

mod factory;
mod gzip;
pub mod sniff;
mod tar;
mod zip;

pub use factory::open;
pub use gzip::GzipContainer;
pub use sniff::{Classification, classify, classify_bytes};
pub use tar::TarContainer;
pub use zip::ZipContainer;

/// Archive container kind. Closed set: every kind has a registered reader.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ArchiveKind {
    Zip,
    Tar,
    Gzip,
}

impl ArchiveKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            ArchiveKind::Zip => "zip",
            ArchiveKind::Tar => "tar",
            ArchiveKind::Gzip => "gzip",
        }
    }
}

/// Where a container's bytes come from.
///
/// `Buffer` backs containers extracted from other containers; those bytes
/// never touch disk. A container owns its source, so entries can never
/// outlive the backing buffer.
#[derive(Debug, Clone)]
pub enum ByteSource {
    Path(PathBuf),
    Buffer(Vec<u8>),
}

impl ByteSource {
    /// Human-readable origin for diagnostics.
    pub fn display_name(&self) -> String {
        match self {
            ByteSource::Path(p) => p.display().to_string(),
            ByteSource::Buffer(b) => format!("<{} bytes in memory>", b.len()),
        }
    }

    /// Open a fresh reader positioned at the start of the source.
    ///
    /// Stream-based readers consume their input, so containers reopen the
    /// source for every listing or read instead of sharing one stream.
    pub(crate) fn reader(&self) -> io::Result<Box<dyn ReadSeek + '_>> {
        match self {
            ByteSource::Path(p) => Ok(Box::new(File::open(p)?)),
            ByteSource::Buffer(b) => Ok(Box::new(Cursor::new(b.as_slice()))),
        }
    }
}

pub(crate) trait ReadSeek: Read + Seek {}
impl<T: Read + Seek> ReadSeek for T {}

/// One addressable item inside an open container.
///
/// Only meaningful for the traversal of the container that produced it;
/// no handle equality is guaranteed across formats.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerEntry {
    /// Format-dependent name: a full path for zip/tar, empty for gzip.
    pub name: String,
    pub is_dir: bool,
    /// Member position for flat formats; unused by zip and gzip.
    pub(crate) index: usize,
}

/// Errors raised by sniffing, opening and reading containers.
#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("we don't know how to process archive type '{kind}' for file {path}")]
    UnsupportedFormat { path: String, kind: &'static str },

    #[error("nested archives exceed the depth limit of {max}")]
    DepthExceeded { max: u32 },

    #[error("entry '{name}' not found in container")]
    NoSuchEntry { name: String },

    #[error("zip error: {0}")]
    Zip(#[from] ::zip::result::ZipError),

    #[error(transparent)]
    Io(#[from] io::Error),
}

/// An open archive, polymorphic over the supported formats.
#[derive(Debug)]
pub enum Container {
    Zip(ZipContainer),
    Tar(TarContainer),
    Gzip(GzipContainer),
}

impl Container {
    /// List the entries at `dir`, honoring each format's native semantics:
    /// direct children for zip, every member for tar (the directory argument
    /// is ignored), a single sentinel entry for gzip.
    ///
    /// Listings are finite but not restartable in general; stream-based
    /// formats reopen their source on every call.
    pub fn entries(&self, dir: &str) -> Result<Vec<ContainerEntry>, ArchiveError> {
        match self {
            Container::Zip(c) => c.entries(dir),
            Container::Tar(c) => c.entries(),
            Container::Gzip(c) => Ok(c.entries()),
        }
    }

    /// Read the full content of one entry.
    pub fn read(&self, entry: &ContainerEntry) -> Result<Vec<u8>, ArchiveError> {
        match self {
            Container::Zip(c) => c.read(entry),
            Container::Tar(c) => c.read(entry),
            Container::Gzip(c) => c.read(),
        }
    }

    pub fn kind(&self) -> ArchiveKind {
        match self {
            Container::Zip(_) => ArchiveKind::Zip,
            Container::Tar(_) => ArchiveKind::Tar,
            Container::Gzip(_) => ArchiveKind::Gzip,
        }
    }
}
