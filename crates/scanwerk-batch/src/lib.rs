// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// scanwerk-batch: Run the degradation pipeline over a set of source images.
//
// Discovers sources, applies one or all effects per image with independently
// sampled intensities, renders each degraded raster to a PDF artifact,
// isolates per-image and per-effect failures, and reports run statistics and
// a label manifest.

pub mod data_dir;
pub mod manifest;
pub mod naming;
pub mod orchestrator;
pub mod single;
pub mod sink;
pub mod sources;
pub mod summary;

pub use manifest::{MANIFEST_FILE, ManifestEntry};
pub use orchestrator::{BatchOrchestrator, BatchReport};
pub use single::{SingleImageJob, augment_one};
pub use sink::{ArtifactSink, DirectorySink, MemorySink};
pub use sources::{SourceImage, SourceOrigin, discover_sources};
pub use summary::{BatchSummary, FailureRecord};
