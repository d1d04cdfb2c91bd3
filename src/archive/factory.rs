//! Container construction, dispatched on the sniffed kind.

use tracing::debug;

use super::{ArchiveError, ArchiveKind, ByteSource, Container, GzipContainer, TarContainer, ZipContainer};

/// Open a container of a known kind over a byte source.
///
/// The match is exhaustive over the closed [`ArchiveKind`] set, so every
/// sniffable kind has a reader; open failures come from the format codecs
/// themselves (corrupt central directory and the like).
pub fn open(kind: ArchiveKind, source: ByteSource) -> Result<Container, ArchiveError> {
    debug!(kind = kind.as_str(), source = %source.display_name(), "factory open: called");
    match kind {
        ArchiveKind::Zip => Ok(Container::Zip(ZipContainer::open(source)?)),
        ArchiveKind::Tar => Ok(Container::Tar(TarContainer::open(source)?)),
        ArchiveKind::Gzip => Ok(Container::Gzip(GzipContainer::open(source)?)),
    }
}
