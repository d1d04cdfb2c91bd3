//! Gzip container reader.
//!
//! Gzip compresses a single logical stream and has no entry concept. The
//! listing yields exactly one sentinel entry for "the decompressed
//! payload": never a directory, never named. Reads decompress the whole
//! stream regardless of which entry is passed, since there is only one.

use std::io::Read;

use flate2::read::GzDecoder;

use super::{ArchiveError, ByteSource, ContainerEntry};

#[derive(Debug)]
pub struct GzipContainer {
    source: ByteSource,
}

impl GzipContainer {
    pub fn open(source: ByteSource) -> Result<Self, ArchiveError> {
        Ok(Self { source })
    }

    /// The single sentinel entry representing the decompressed payload.
    pub fn entries(&self) -> Vec<ContainerEntry> {
        vec![ContainerEntry {
            name: String::new(),
            is_dir: false,
            index: 0,
        }]
    }

    pub fn read(&self) -> Result<Vec<u8>, ArchiveError> {
        let mut decoder = GzDecoder::new(self.source.reader()?);
        let mut buf = Vec::new();
        decoder.read_to_end(&mut buf)?;
        Ok(buf)
    }
}
