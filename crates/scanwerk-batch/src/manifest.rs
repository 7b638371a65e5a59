// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Label manifest: one JSON line per artifact recording how it was made.

use scanwerk_core::error::Result;
use scanwerk_core::{EffectKind, Intensity};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// File name of the manifest in the output directory.
pub const MANIFEST_FILE: &str = "manifest.jsonl";

/// Provenance of one artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub artifact: String,
    pub source: String,
    /// SHA-256 of the source's encoded bytes, lowercase hex.
    pub source_sha256: String,
    pub effect: EffectKind,
    pub intensity: Intensity,
    pub bytes: u64,
}

/// SHA-256 of `data` as a lowercase hex string.
pub fn hash_bytes(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// Serialise entries as JSON Lines, one object per line.
pub fn to_jsonl(entries: &[ManifestEntry]) -> Result<String> {
    let mut out = String::new();
    for entry in entries {
        out.push_str(&serde_json::to_string(entry)?);
        out.push('\n');
    }
    Ok(out)
}

/// Parse JSON Lines back into entries, skipping blank lines.
pub fn from_jsonl(text: &str) -> Result<Vec<ManifestEntry>> {
    text.lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| Ok(serde_json::from_str(line)?))
        .collect()
}
