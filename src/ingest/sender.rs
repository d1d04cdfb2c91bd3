//! Leaf sink boundary with the normalizer worker.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info};

use crate::config::Config;

/// Scratch file used to host payloads extracted from archives, so the
/// worker boundary always receives a filesystem path.
const SCRATCH_FILE: &str = "from_archive.txt";

/// One leaf file's full content, ready for normalization.
#[derive(Debug)]
pub enum LeafPayload<'a> {
    /// A plain file on disk, handed over untouched.
    File(&'a Path),
    /// Bytes extracted from a container; `origin` names the container the
    /// payload came from, for diagnostics.
    Bytes { origin: &'a str, data: &'a [u8] },
}

#[derive(Debug, Error)]
pub enum SendError {
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Receives leaf payloads from the ingestion engine, exactly once each.
pub trait LeafSink {
    fn send(&mut self, payload: LeafPayload<'_>) -> Result<(), SendError>;

    /// Called once after a root traversal completes.
    fn finish(&mut self) -> Result<(), SendError> {
        Ok(())
    }
}

/// Production sink: spills in-memory payloads to [`SCRATCH_FILE`] and hands
/// each resulting path to the worker together with the add endpoint and
/// batch size it needs.
pub struct WorkerSender {
    add_url: String,
    batch_size: u64,
    scratch: PathBuf,
}

impl WorkerSender {
    pub fn new(config: &Config) -> Self {
        Self {
            add_url: config.add_url(),
            batch_size: config.worker.batch_size,
            scratch: PathBuf::from(SCRATCH_FILE),
        }
    }

    fn forward_to_worker(&self, path: &Path) {
        info!(path = %path.display(), add_url = %self.add_url, batch_size = self.batch_size, "passing file to worker");
        // TODO: invoke the normalizer worker here (line parsing and batched
        // posting to the add endpoint) once it is wired into this binary.
    }
}

impl LeafSink for WorkerSender {
    fn send(&mut self, payload: LeafPayload<'_>) -> Result<(), SendError> {
        match payload {
            LeafPayload::File(path) => self.forward_to_worker(path),
            LeafPayload::Bytes { origin, data } => {
                debug!(origin = %origin, len = data.len(), "send: spilling extracted payload to scratch file");
                fs::write(&self.scratch, data)?;
                let scratch = self.scratch.clone();
                self.forward_to_worker(&scratch);
            }
        }
        Ok(())
    }

    fn finish(&mut self) -> Result<(), SendError> {
        // The scratch file only exists if some archive payload was spilled.
        match fs::remove_file(&self.scratch) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    fn test_config(dir: &Path) -> Config {
        let path = dir.join("config.json");
        fs::write(
            &path,
            r#"{
                "storage": {
                    "host": "localhost",
                    "port": 8080,
                    "endpoints": { "add": "add", "query": "query" }
                },
                "worker": { "batch_size": 100 }
            }"#,
        )
        .unwrap();
        Config::load(Some(&path)).unwrap()
    }

    #[test]
    fn test_bytes_payload_spills_to_scratch_and_finish_cleans_up() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = test_config(dir.path());
        let mut sender = WorkerSender::new(&config);
        sender.scratch = dir.path().join(SCRATCH_FILE);

        sender
            .send(LeafPayload::Bytes {
                origin: "nest.zip",
                data: b"dave@example.com:pw\n",
            })
            .unwrap();
        assert_eq!(fs::read(&sender.scratch).unwrap(), b"dave@example.com:pw\n");

        sender.finish().unwrap();
        assert!(!sender.scratch.exists());
    }

    #[test]
    fn test_finish_without_scratch_is_not_an_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = test_config(dir.path());
        let mut sender = WorkerSender::new(&config);
        sender.scratch = dir.path().join(SCRATCH_FILE);
        sender.finish().unwrap();
    }
}
