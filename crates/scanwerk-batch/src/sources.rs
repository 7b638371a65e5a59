// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Source images: directory discovery and byte loading.

use std::path::{Path, PathBuf};

use scanwerk_core::error::{Result, ScanwerkError};
use tracing::{debug, instrument};

/// File extensions accepted as sources (compared case-insensitively).
pub const SOURCE_EXTENSIONS: [&str; 3] = ["png", "jpg", "jpeg"];

/// Where a source image's bytes come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceOrigin {
    File(PathBuf),
    Bytes(Vec<u8>),
}

/// One input raster, identified by its 1-based position in the batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceImage {
    pub ordinal: usize,
    pub name: String,
    pub origin: SourceOrigin,
}

impl SourceImage {
    pub fn from_path(ordinal: usize, path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self {
            ordinal,
            name,
            origin: SourceOrigin::File(path),
        }
    }

    pub fn from_bytes(ordinal: usize, name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            ordinal,
            name: name.into(),
            origin: SourceOrigin::Bytes(bytes),
        }
    }

    /// Raw encoded bytes. A read failure counts as a decode failure.
    pub fn read(&self) -> Result<Vec<u8>> {
        match &self.origin {
            SourceOrigin::Bytes(bytes) => Ok(bytes.clone()),
            SourceOrigin::File(path) => std::fs::read(path).map_err(|err| ScanwerkError::Decode {
                source_name: self.name.clone(),
                reason: err.to_string(),
            }),
        }
    }
}

fn has_source_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            SOURCE_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
}

/// List the image files directly inside `dir`, sorted by file name and
/// numbered from 1.
#[instrument(skip_all, fields(dir = %dir.as_ref().display()))]
pub fn discover_sources(dir: impl AsRef<Path>) -> Result<Vec<SourceImage>> {
    let mut paths = Vec::new();
    for entry in std::fs::read_dir(dir.as_ref())? {
        let path = entry?.path();
        if path.is_file() && has_source_extension(&path) {
            paths.push(path);
        }
    }
    paths.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

    debug!(count = paths.len(), "Sources discovered");
    Ok(paths
        .into_iter()
        .enumerate()
        .map(|(index, path)| SourceImage::from_path(index + 1, path))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn discovers_images_case_insensitively_in_name_order() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.PNG", "a.jpg", "c.JpEg", "notes.txt", "d.gif"] {
            std::fs::write(dir.path().join(name), b"x").unwrap();
        }
        std::fs::create_dir(dir.path().join("nested.png")).unwrap();

        let sources = discover_sources(dir.path()).unwrap();
        let names: Vec<_> = sources.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["a.jpg", "b.PNG", "c.JpEg"]);
        let ordinals: Vec<_> = sources.iter().map(|s| s.ordinal).collect();
        assert_eq!(ordinals, [1, 2, 3]);
    }

    #[test]
    fn missing_directory_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(discover_sources(dir.path().join("nope")).is_err());
    }

    #[test]
    fn unreadable_file_is_a_decode_failure() {
        let dir = tempfile::tempdir().unwrap();
        let source = SourceImage::from_path(1, dir.path().join("gone.png"));
        let err = source.read().unwrap_err();
        assert!(matches!(err, ScanwerkError::Decode { ref source_name, .. } if source_name == "gone.png"));
    }

    #[test]
    fn in_memory_source_reads_its_bytes() {
        let source = SourceImage::from_bytes(4, "mem.png", vec![1, 2, 3]);
        assert_eq!(source.read().unwrap(), vec![1, 2, 3]);
    }
}
