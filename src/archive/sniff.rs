//! Content-based format sniffing.
//!
//! Classification inspects magic bytes only, never the filename: leaked
//! dumps are routinely mislabeled or extension-less. Formats we detect but
//! cannot read come back as [`Classification::Unknown`] with the detected
//! kind, so callers can report the file and move on.

use std::fs::File;
use std::io::{self, Read};

use super::{ArchiveKind, ByteSource};

/// Bytes inspected from the head of a stream. Enough for every magic we
/// check, including the ustar tag at offset 257.
const SNIFF_LEN: usize = 512;

/// Result of sniffing a byte stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    NotArchive,
    Known(ArchiveKind),
    /// Archive-like content with no registered reader; carries the detected
    /// kind for diagnostics.
    Unknown(&'static str),
}

pub fn is_gzip_magic(header: &[u8]) -> bool {
    header.len() >= 2 && header[0] == 0x1f && header[1] == 0x8b
}

pub fn is_zip_magic(header: &[u8]) -> bool {
    // Local file header, empty-archive end record, or spanned marker.
    header.len() >= 4
        && header[0] == b'P'
        && header[1] == b'K'
        && matches!((header[2], header[3]), (3, 4) | (5, 6) | (7, 8))
}

pub fn is_ustar_header(header: &[u8]) -> bool {
    // Covers both POSIX "ustar\0" and GNU "ustar  " magics.
    header.len() >= 262 && &header[257..262] == b"ustar"
}

/// Magic signatures for archive-like formats we refuse to unpack.
const UNKNOWN_MAGICS: &[(&[u8], &str)] = &[
    (&[0x37, 0x7a, 0xbc, 0xaf, 0x27, 0x1c], "7z"),
    (b"Rar!\x1a\x07", "rar"),
    (&[0xfd, b'7', b'z', b'X', b'Z', 0x00], "xz"),
    (b"BZh", "bzip2"),
    (&[0x28, 0xb5, 0x2f, 0xfd], "zstd"),
    (&[0x04, 0x22, 0x4d, 0x18], "lz4"),
    (b"MSCF", "cab"),
];

/// Classify an in-memory buffer by its leading bytes.
pub fn classify_bytes(data: &[u8]) -> Classification {
    if is_gzip_magic(data) {
        return Classification::Known(ArchiveKind::Gzip);
    }
    if is_zip_magic(data) {
        return Classification::Known(ArchiveKind::Zip);
    }
    if is_ustar_header(data) {
        return Classification::Known(ArchiveKind::Tar);
    }
    for (magic, kind) in UNKNOWN_MAGICS {
        if data.len() >= magic.len() && &data[..magic.len()] == *magic {
            return Classification::Unknown(kind);
        }
    }
    Classification::NotArchive
}

/// Classify a byte source, reading at most [`SNIFF_LEN`] bytes from disk
/// for the path variant.
pub fn classify(source: &ByteSource) -> io::Result<Classification> {
    match source {
        ByteSource::Buffer(data) => Ok(classify_bytes(data)),
        ByteSource::Path(path) => {
            let mut head = [0u8; SNIFF_LEN];
            let mut file = File::open(path)?;
            let mut filled = 0;
            // read() may return short counts; fill as much of the window
            // as the file allows.
            loop {
                let n = file.read(&mut head[filled..])?;
                if n == 0 {
                    break;
                }
                filled += n;
                if filled == SNIFF_LEN {
                    break;
                }
            }
            Ok(classify_bytes(&head[..filled]))
        }
    }
}
