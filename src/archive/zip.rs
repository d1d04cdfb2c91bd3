//! Zip container reader.
//!
//! Zip is the only supported format with true hierarchical addressing:
//! `entries(dir)` yields the direct children of `dir` per the archive's
//! internal directory structure, and a subdirectory entry can be passed
//! back in to descend. Intermediate directories with no explicit record in
//! the central directory are derived from member paths.

use std::collections::BTreeSet;
use std::io::Read;

use tracing::debug;

use super::{ArchiveError, ByteSource, ContainerEntry};

#[derive(Debug)]
pub struct ZipContainer {
    source: ByteSource,
}

impl ZipContainer {
    pub fn open(source: ByteSource) -> Result<Self, ArchiveError> {
        // Validate the central directory up front so a corrupt file fails
        // at open rather than on first listing.
        zip::ZipArchive::new(source.reader()?)?;
        Ok(Self { source })
    }

    /// Direct children of `dir` ("" for the container root).
    pub fn entries(&self, dir: &str) -> Result<Vec<ContainerEntry>, ArchiveError> {
        let dir = normalize_dir(dir);
        let archive = zip::ZipArchive::new(self.source.reader()?)?;
        let names: Vec<String> = archive.file_names().map(str::to_string).collect();
        debug!(dir = %dir, members = names.len(), "zip entries: listing");

        let mut files = Vec::new();
        let mut dirs = BTreeSet::new();
        for name in &names {
            let Some(rest) = name.strip_prefix(dir.as_str()) else {
                continue;
            };
            if rest.is_empty() {
                continue;
            }
            match rest.find('/') {
                None => files.push(ContainerEntry {
                    name: name.clone(),
                    is_dir: false,
                    index: 0,
                }),
                // Deeper member: its first path segment is a direct child
                // directory, explicit or implicit.
                Some(pos) => {
                    dirs.insert(format!("{dir}{}", &rest[..=pos]));
                }
            }
        }
        files.extend(dirs.into_iter().map(|name| ContainerEntry {
            name,
            is_dir: true,
            index: 0,
        }));
        Ok(files)
    }

    pub fn read(&self, entry: &ContainerEntry) -> Result<Vec<u8>, ArchiveError> {
        let mut archive = zip::ZipArchive::new(self.source.reader()?)?;
        let mut file = archive.by_name(&entry.name)?;
        let mut buf = Vec::with_capacity(file.size() as usize);
        file.read_to_end(&mut buf)?;
        Ok(buf)
    }
}

fn normalize_dir(dir: &str) -> String {
    if dir.is_empty() || dir.ends_with('/') {
        dir.to_string()
    } else {
        format!("{dir}/")
    }
}
