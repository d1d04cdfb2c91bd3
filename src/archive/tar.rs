//! Tar container reader.
//!
//! Tar stores a flat member list with no hierarchical addressing, so the
//! directory argument of the common contract is ignored: every listing
//! yields every member of the archive. Traversal relies on this and gives a
//! tar container exactly one full-member pass per open; do not "fix" the
//! flattening.

use std::io::Read;

use tracing::debug;

use super::{ArchiveError, ByteSource, ContainerEntry};

#[derive(Debug)]
pub struct TarContainer {
    source: ByteSource,
}

impl TarContainer {
    pub fn open(source: ByteSource) -> Result<Self, ArchiveError> {
        Ok(Self { source })
    }

    /// Every member of the archive, in archive order.
    ///
    /// The stream is consumed by a listing, so the source is reopened on
    /// every call; entry indices are only valid against this container.
    pub fn entries(&self) -> Result<Vec<ContainerEntry>, ArchiveError> {
        let mut archive = tar::Archive::new(self.source.reader()?);
        let mut out = Vec::new();
        for (index, entry) in archive.entries()?.enumerate() {
            let entry = entry?;
            let name = String::from_utf8_lossy(&entry.path_bytes()).into_owned();
            out.push(ContainerEntry {
                name,
                is_dir: entry.header().entry_type().is_dir(),
                index,
            });
        }
        debug!(members = out.len(), "tar entries: listed");
        Ok(out)
    }

    pub fn read(&self, entry: &ContainerEntry) -> Result<Vec<u8>, ArchiveError> {
        let mut archive = tar::Archive::new(self.source.reader()?);
        for (index, member) in archive.entries()?.enumerate() {
            let mut member = member?;
            if index == entry.index {
                let mut buf = Vec::with_capacity(member.size() as usize);
                member.read_to_end(&mut buf)?;
                return Ok(buf);
            }
        }
        Err(ArchiveError::NoSuchEntry {
            name: entry.name.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    pub(crate) fn fixture_tar(members: &[(&str, &[u8])]) -> Vec<u8> {
        let mut builder = tar::Builder::new(Vec::new());
        for (name, data) in members {
            let mut header = tar::Header::new_ustar();
            header.set_size(data.len() as u64);
            header.set_mode(0o644);
            header.set_cksum();
            builder.append_data(&mut header, *name, *data).unwrap();
        }
        builder.into_inner().unwrap()
    }

    #[test]
    fn test_tar_round_trip() {
        let data = fixture_tar(&[("dump.txt", b"bob@example.org:pw2\n")]);
        let container = TarContainer::open(ByteSource::Buffer(data)).unwrap();
        let entries = container.entries().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].name, "dump.txt");
        assert!(!entries[0].is_dir);
        assert_eq!(container.read(&entries[0]).unwrap(), b"bob@example.org:pw2\n");
    }

    #[test]
    fn test_tar_listing_is_flat_and_repeatable() {
        let data = fixture_tar(&[("a.txt", b"a" as &[u8]), ("dir/b.txt", b"b")]);
        let container = TarContainer::open(ByteSource::Buffer(data)).unwrap();

        // Members keep their full paths; nothing is grouped by directory.
        let first = container.entries().unwrap();
        let names: Vec<_> = first.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["a.txt", "dir/b.txt"]);

        // Listing again after a full read still works (source is reopened).
        assert_eq!(container.read(&first[1]).unwrap(), b"b");
        let second = container.entries().unwrap();
        assert_eq!(first, second);
    }
}
