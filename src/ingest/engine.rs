//! Recursive ingestion engine.
//!
//! Turns a root filesystem path into a flat stream of leaf payloads,
//! transparently unwrapping nested archives. Candidates are classified by
//! content, never by extension: leaked dumps are routinely mislabeled.
//! One bad file never aborts the batch; every per-item failure is caught,
//! logged with the offending path, and traversal continues.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::archive::{self, ArchiveError, ArchiveKind, ByteSource, Classification, Container, ContainerEntry, sniff};

use super::{IngestError, LeafPayload, LeafSink};

/// Nested-archive recursion cap. A pathological archive chain (or an
/// archive containing itself) stops here instead of exhausting the stack.
pub const DEFAULT_MAX_DEPTH: u32 = 16;

#[derive(Debug, Clone, Copy)]
pub struct IngestOptions {
    /// Descend into subdirectories of a root folder.
    pub recursive_folders: bool,
    /// Descend into directory entries found inside archives.
    pub recursive_archives: bool,
    /// Maximum nested-archive depth before an item is skipped.
    pub max_depth: u32,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self {
            recursive_folders: false,
            recursive_archives: false,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// Counts for one root traversal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestSummary {
    /// Leaf payloads handed to the sink.
    pub forwarded: usize,
    /// Items skipped by a recoverable per-item failure.
    pub skipped: usize,
}

/// The recursive ingestion engine. Holds no global state: options and the
/// sink are injected at construction.
pub struct Engine<'a, S: LeafSink> {
    options: IngestOptions,
    sink: &'a mut S,
    summary: IngestSummary,
}

impl<'a, S: LeafSink> Engine<'a, S> {
    pub fn new(options: IngestOptions, sink: &'a mut S) -> Self {
        Self {
            options,
            sink,
            summary: IngestSummary::default(),
        }
    }

    /// Ingest everything under `root`.
    ///
    /// A directory root enumerates plain files (recursively with
    /// `recursive_folders`, one level otherwise; directories are only
    /// descended, never treated as payload). A file root is ingested
    /// directly. Anything else is a filesystem error.
    pub fn run(mut self, root: &Path) -> Result<IngestSummary, IngestError> {
        if root.is_dir() {
            for file in self.candidates(root)? {
                info!(path = %file.display(), "adding file");
                if let Err(e) = self.add_file(&file) {
                    warn!(path = %file.display(), error = %e, "unable to add file");
                    self.summary.skipped += 1;
                }
            }
        } else if root.is_file() {
            info!(path = %root.display(), "adding file");
            if let Err(e) = self.add_file(root) {
                warn!(path = %root.display(), error = %e, "unable to add file");
                self.summary.skipped += 1;
            }
        } else {
            return Err(IngestError::NothingFound(root.display().to_string()));
        }
        self.sink.finish()?;
        Ok(self.summary)
    }

    /// Enumerate candidate files under a directory root. One unreadable
    /// entry is skipped and logged; it never aborts the batch.
    fn candidates(&mut self, root: &Path) -> Result<Vec<PathBuf>, IngestError> {
        let mut files = Vec::new();
        if self.options.recursive_folders {
            for entry in walkdir::WalkDir::new(root) {
                match entry {
                    Ok(entry) if entry.file_type().is_file() => files.push(entry.into_path()),
                    Ok(_) => {}
                    Err(e) => {
                        warn!(error = %e, "skipping unreadable directory entry");
                        self.summary.skipped += 1;
                    }
                }
            }
        } else {
            for entry in fs::read_dir(root)? {
                match entry.and_then(|entry| Ok((entry.file_type()?, entry))) {
                    Ok((file_type, entry)) if file_type.is_file() => files.push(entry.path()),
                    Ok(_) => {}
                    Err(e) => {
                        warn!(error = %e, "skipping unreadable directory entry");
                        self.summary.skipped += 1;
                    }
                }
            }
        }
        Ok(files)
    }

    fn add_file(&mut self, path: &Path) -> Result<(), IngestError> {
        let source = ByteSource::Path(path.to_path_buf());
        match sniff::classify(&source)? {
            Classification::NotArchive => {
                debug!(path = %path.display(), "add_file: plain file, forwarding");
                self.sink.send(LeafPayload::File(path))?;
                self.summary.forwarded += 1;
                Ok(())
            }
            Classification::Unknown(kind) => Err(ArchiveError::UnsupportedFormat {
                path: path.display().to_string(),
                kind,
            }
            .into()),
            Classification::Known(kind) => {
                let origin = path.display().to_string();
                self.walk_container(kind, source, &origin, 0)
            }
        }
    }

    /// Explicit-stack depth-first walk over one open container.
    ///
    /// The stack holds directory positions, seeded with the container root.
    /// Tar ignores directory addressing and lists every member at once, so
    /// its directory entries are never pushed: one full-member pass per
    /// open, independent of the stack.
    fn walk_container(
        &mut self,
        kind: ArchiveKind,
        source: ByteSource,
        origin: &str,
        depth: u32,
    ) -> Result<(), IngestError> {
        if depth >= self.options.max_depth {
            return Err(ArchiveError::DepthExceeded {
                max: self.options.max_depth,
            }
            .into());
        }
        debug!(kind = kind.as_str(), container = %origin, depth, "walk_container: opening");
        let container = archive::open(kind, source)?;
        let descend = self.options.recursive_archives && kind != ArchiveKind::Tar;

        let mut stack = vec![String::new()];
        while let Some(dir) = stack.pop() {
            for entry in container.entries(&dir)? {
                if entry.is_dir {
                    if descend {
                        stack.push(entry.name.clone());
                    }
                } else if let Err(e) = self.handle_entry(&container, &entry, origin, depth) {
                    warn!(container = %origin, entry = %entry.name, error = %e, "skipping container entry");
                    self.summary.skipped += 1;
                }
            }
        }
        Ok(())
    }

    /// Read one file entry and re-classify its *content*: bytes that sniff
    /// as tar become a new nested archive root (with a synthetic name,
    /// since no filesystem path exists); everything else is a leaf payload
    /// tagged with the originating container.
    fn handle_entry(
        &mut self,
        container: &Container,
        entry: &ContainerEntry,
        origin: &str,
        depth: u32,
    ) -> Result<(), IngestError> {
        let data = container.read(entry)?;
        match sniff::classify_bytes(&data) {
            Classification::Known(ArchiveKind::Tar) => {
                let nested = synthetic_name(origin, &entry.name);
                self.walk_container(ArchiveKind::Tar, ByteSource::Buffer(data), &nested, depth + 1)
            }
            _ => {
                self.sink.send(LeafPayload::Bytes {
                    origin,
                    data: &data,
                })?;
                self.summary.forwarded += 1;
                Ok(())
            }
        }
    }
}

fn synthetic_name(container: &str, entry: &str) -> String {
    if entry.is_empty() {
        format!("{container}!<stream>")
    } else {
        format!("{container}!{entry}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::sender::mock::{CollectSink, RecordedPayload};
    use std::io::Write;

    fn tar_bytes(members: &[(&str, &[u8])]) -> Vec<u8> {
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

    fn zip_bytes(members: &[(&str, &[u8])]) -> Vec<u8> {
        let mut cursor = std::io::Cursor::new(Vec::new());
        let mut writer = zip::ZipWriter::new(&mut cursor);
        let options =
            zip::write::SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);
        for (name, data) in members {
            writer.start_file(*name, options.clone()).unwrap();
            writer.write_all(data).unwrap();
        }
        writer.finish().unwrap();
        cursor.into_inner()
    }

    fn run_over(dir: &Path, options: IngestOptions) -> (IngestSummary, CollectSink) {
        let mut sink = CollectSink::default();
        let summary = Engine::new(options, &mut sink).run(dir).unwrap();
        (summary, sink)
    }

    #[test]
    fn test_mixed_directory_ingestion() {
        let dir = tempfile::TempDir::new().unwrap();
        fs::write(dir.path().join("plain.txt"), b"eve@example.com:pw\n").unwrap();

        let inner_tar = tar_bytes(&[("creds.txt", b"frank@example.com:pw\n")]);
        fs::write(dir.path().join("nest.zip"), zip_bytes(&[("inner.tar", &inner_tar)])).unwrap();

        // 7z magic: detected as archive-like, but no registered reader.
        fs::write(dir.path().join("bogus.7z"), [0x37, 0x7a, 0xbc, 0xaf, 0x27, 0x1c, 0, 0]).unwrap();

        let (summary, sink) = run_over(dir.path(), IngestOptions::default());

        assert_eq!(summary.forwarded, 2);
        assert_eq!(summary.skipped, 1);
        assert!(sink.finished);

        let mut plain_seen = 0;
        let mut nested_seen = 0;
        for payload in &sink.payloads {
            match payload {
                RecordedPayload::File(p) => {
                    assert_eq!(p.file_name().unwrap(), "plain.txt");
                    plain_seen += 1;
                }
                RecordedPayload::Bytes { origin, data } => {
                    assert_eq!(data.as_slice(), b"frank@example.com:pw\n");
                    // The synthetic name traces the whole container chain.
                    assert!(origin.contains("nest.zip"), "origin should name the container: {origin}");
                    assert!(origin.contains("inner.tar"), "origin should name the nested member: {origin}");
                    nested_seen += 1;
                }
            }
        }
        assert_eq!(plain_seen, 1, "plain file forwarded exactly once");
        assert_eq!(nested_seen, 1, "nested tar's inner file forwarded exactly once");
    }

    #[test]
    fn test_single_file_root() {
        let dir = tempfile::TempDir::new().unwrap();
        let file = dir.path().join("dump.txt");
        fs::write(&file, b"one line\n").unwrap();

        let mut sink = CollectSink::default();
        let summary = Engine::new(IngestOptions::default(), &mut sink).run(&file).unwrap();
        assert_eq!(summary.forwarded, 1);
        assert_eq!(sink.payloads, vec![RecordedPayload::File(file)]);
    }

    #[test]
    fn test_missing_root_is_filesystem_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut sink = CollectSink::default();
        let err = Engine::new(IngestOptions::default(), &mut sink)
            .run(&dir.path().join("no-such"))
            .unwrap_err();
        assert!(matches!(err, IngestError::NothingFound(_)));
    }

    #[test]
    fn test_flat_enumeration_skips_subdirectories() {
        let dir = tempfile::TempDir::new().unwrap();
        fs::write(dir.path().join("top.txt"), b"top\n").unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("sub").join("deep.txt"), b"deep\n").unwrap();

        let (summary, _) = run_over(dir.path(), IngestOptions::default());
        assert_eq!(summary.forwarded, 1);

        let recursive = IngestOptions {
            recursive_folders: true,
            ..Default::default()
        };
        let (summary, _) = run_over(dir.path(), recursive);
        assert_eq!(summary.forwarded, 2);
    }

    #[test]
    #[cfg(unix)]
    fn test_unreadable_subdirectory_is_skipped() {
        use std::os::unix::fs::PermissionsExt;

        // Root bypasses permission checks; nothing to verify in that case.
        if unsafe { nix::libc::geteuid() } == 0 {
            return;
        }

        let dir = tempfile::TempDir::new().unwrap();
        fs::write(dir.path().join("ok.txt"), b"ok\n").unwrap();
        let locked = dir.path().join("locked");
        fs::create_dir(&locked).unwrap();
        fs::write(locked.join("hidden.txt"), b"hidden\n").unwrap();
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

        let options = IngestOptions {
            recursive_folders: true,
            ..Default::default()
        };
        let mut sink = CollectSink::default();
        let result = Engine::new(options, &mut sink).run(dir.path());
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

        let summary = result.expect("an unreadable entry must not abort the batch");
        assert_eq!(summary.forwarded, 1);
        assert!(summary.skipped >= 1, "the unreadable entry should be counted as skipped");
    }

    #[test]
    fn test_gzip_wrapped_tar_recurses() {
        let dir = tempfile::TempDir::new().unwrap();
        let inner_tar = tar_bytes(&[("creds.txt", b"grace@example.com:pw\n")]);
        let mut encoder = flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
        encoder.write_all(&inner_tar).unwrap();
        fs::write(dir.path().join("dump.tar.gz"), encoder.finish().unwrap()).unwrap();

        let (summary, sink) = run_over(dir.path(), IngestOptions::default());
        assert_eq!(summary.forwarded, 1);
        assert_eq!(summary.skipped, 0);
        match &sink.payloads[0] {
            RecordedPayload::Bytes { data, .. } => assert_eq!(data.as_slice(), b"grace@example.com:pw\n"),
            other => panic!("expected extracted bytes, got {other:?}"),
        }
    }

    #[test]
    fn test_depth_limit_skips_overdeep_nesting() {
        let dir = tempfile::TempDir::new().unwrap();
        let inner = tar_bytes(&[("creds.txt", b"x\n")]);
        let outer = tar_bytes(&[("inner.tar", &inner)]);
        fs::write(dir.path().join("nested.tar"), outer).unwrap();

        // Depth 1 admits the outer tar but not the nested one.
        let options = IngestOptions {
            max_depth: 1,
            ..Default::default()
        };
        let (summary, sink) = run_over(dir.path(), options);
        assert_eq!(summary.forwarded, 0);
        assert_eq!(summary.skipped, 1);
        assert!(sink.payloads.is_empty());

        // The default cap admits it fine.
        let (summary, _) = run_over(dir.path(), IngestOptions::default());
        assert_eq!(summary.forwarded, 1);
    }

    #[test]
    fn test_zip_directory_descent_requires_flag() {
        let dir = tempfile::TempDir::new().unwrap();
        let data = zip_bytes(&[("top.txt", b"t" as &[u8]), ("sub/inner.txt", b"i")]);
        fs::write(dir.path().join("tree.zip"), data).unwrap();

        let (summary, _) = run_over(dir.path(), IngestOptions::default());
        assert_eq!(summary.forwarded, 1);

        let options = IngestOptions {
            recursive_archives: true,
            ..Default::default()
        };
        let (summary, _) = run_over(dir.path(), options);
        assert_eq!(summary.forwarded, 2);
    }
}
