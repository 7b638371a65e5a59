// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Artifact sinks: where rendered artifacts (and the manifest) end up.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use scanwerk_core::error::{Result, ScanwerkError};
use tracing::debug;

/// Destination for named artifacts.
///
/// Sinks are shared across worker threads, so writes take `&self`.
pub trait ArtifactSink: Send + Sync {
    fn write(&self, name: &str, bytes: &[u8]) -> Result<()>;
}

/// Writes each artifact as a file under a root directory.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    root: PathBuf,
}

impl DirectorySink {
    /// Use `root` as the output directory, creating it if needed.
    pub fn create(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl ArtifactSink for DirectorySink {
    fn write(&self, name: &str, bytes: &[u8]) -> Result<()> {
        let path = self.root.join(name);
        std::fs::write(&path, bytes)?;
        debug!(path = %path.display(), bytes = bytes.len(), "Artifact written");
        Ok(())
    }
}

/// Keeps artifacts in memory, keyed by name.
#[derive(Debug, Default)]
pub struct MemorySink {
    artifacts: Mutex<BTreeMap<String, Vec<u8>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Artifact names in sorted order.
    pub fn names(&self) -> Vec<String> {
        self.lock()
            .map(|map| map.keys().cloned().collect())
            .unwrap_or_default()
    }

    pub fn get(&self, name: &str) -> Option<Vec<u8>> {
        self.lock().ok().and_then(|map| map.get(name).cloned())
    }

    pub fn len(&self) -> usize {
        self.lock().map(|map| map.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, BTreeMap<String, Vec<u8>>>> {
        self.artifacts
            .lock()
            .map_err(|_| ScanwerkError::Io(std::io::Error::other("memory sink lock poisoned")))
    }
}

impl ArtifactSink for MemorySink {
    fn write(&self, name: &str, bytes: &[u8]) -> Result<()> {
        self.lock()?.insert(name.to_string(), bytes.to_vec());
        Ok(())
    }
}
