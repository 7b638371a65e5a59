// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Batch orchestrator: drives every source image through load, degrade,
// render and write, isolating failures per image and per effect branch.
//
// Per image:  Discovered → Loaded → Degraded(k) → Rendered(k) → Counted
//
// A decode failure drops the whole image. An effect, render or write
// failure drops only that branch; sibling effects still run.

use std::time::Instant;

use image::RgbImage;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use scanwerk_core::error::{Result, ScanwerkError};
use scanwerk_core::{AugmentConfig, EffectKind, RunMode};
use scanwerk_document::{
    EffectRegistry, ImageProcessor, ParameterSampler, PdfRenderer, apply_effect_with, effect_for,
};
use tracing::{error, info, instrument, warn};

use crate::manifest::{self, MANIFEST_FILE, ManifestEntry};
use crate::naming::artifact_name;
use crate::sink::ArtifactSink;
use crate::sources::SourceImage;
use crate::summary::{BatchSummary, FailureRecord};

/// Result of a batch: counters plus one manifest entry per artifact.
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    pub summary: BatchSummary,
    pub manifest: Vec<ManifestEntry>,
}

/// What happened to one source image.
#[derive(Debug, Default)]
struct ImageOutcome {
    loaded: bool,
    artifacts: Vec<ManifestEntry>,
    failures: Vec<FailureRecord>,
}

/// Applies the configured effects to a batch of sources.
pub struct BatchOrchestrator {
    config: AugmentConfig,
    sampler: ParameterSampler,
    renderer: PdfRenderer,
    effects: EffectRegistry,
}

impl BatchOrchestrator {
    /// Validate `config` and build the sampler and renderer it describes.
    pub fn new(config: AugmentConfig) -> Result<Self> {
        config.validate()?;
        let sampler = ParameterSampler::new(config.intensity)?;
        let renderer = PdfRenderer::new(config.paper_size, config.render_quality);
        Ok(Self {
            config,
            sampler,
            renderer,
            effects: effect_for,
        })
    }

    /// Replace the renderer (e.g. to move its temporary files).
    pub fn with_renderer(mut self, renderer: PdfRenderer) -> Self {
        self.renderer = renderer;
        self
    }

    /// Replace the recipe lookup used for each effect branch.
    pub fn with_effects(mut self, effects: EffectRegistry) -> Self {
        self.effects = effects;
        self
    }

    /// Process every source and write artifacts to `sink`.
    ///
    /// Never fails as a whole: item failures are counted in the summary.
    /// Results are folded in ordinal order whatever the worker count, so a
    /// seeded run yields the same summary and manifest on one thread or many.
    #[instrument(skip_all, fields(sources = sources.len(), mode = ?self.config.mode, workers = self.config.workers))]
    pub fn run(&self, sources: &[SourceImage], sink: &dyn ArtifactSink) -> BatchReport {
        let started = Instant::now();
        info!("Batch started");

        let outcomes = self.process_all(sources, sink);

        let mut report = BatchReport::default();
        report.summary.images_discovered = sources.len();
        for outcome in outcomes {
            if outcome.loaded {
                report.summary.images_loaded += 1;
            }
            for entry in outcome.artifacts {
                report.summary.record_artifact(entry.bytes);
                report.manifest.push(entry);
            }
            for failure in outcome.failures {
                report.summary.record_failure(failure);
            }
        }

        if self.config.write_manifest {
            if let Err(err) = write_manifest(&report.manifest, sink) {
                error!(error = %err, "Failed to write manifest");
            }
        }

        report.summary.elapsed = started.elapsed();
        info!(
            artifacts = report.summary.artifacts_produced,
            errors = report.summary.errors(),
            bytes = report.summary.total_artifact_bytes,
            elapsed_ms = report.summary.elapsed.as_millis() as u64,
            "Batch finished"
        );
        report
    }

    fn process_all(&self, sources: &[SourceImage], sink: &dyn ArtifactSink) -> Vec<ImageOutcome> {
        if self.config.workers > 1 {
            match rayon::ThreadPoolBuilder::new()
                .num_threads(self.config.workers)
                .build()
            {
                Ok(pool) => {
                    return pool.install(|| {
                        sources
                            .par_iter()
                            .map(|source| self.process_image(source, sink))
                            .collect()
                    });
                }
                Err(err) => {
                    warn!(error = %err, "Worker pool unavailable, running sequentially");
                }
            }
        }
        sources
            .iter()
            .map(|source| self.process_image(source, sink))
            .collect()
    }

    fn process_image(&self, source: &SourceImage, sink: &dyn ArtifactSink) -> ImageOutcome {
        let mut outcome = ImageOutcome::default();

        let (raster, source_sha256) = match load(source) {
            Ok(loaded) => loaded,
            Err(err) => {
                error!(ordinal = source.ordinal, source = %source.name, error = %err, "Skipping image");
                outcome
                    .failures
                    .push(failure_record(source, None, &err));
                return outcome;
            }
        };
        outcome.loaded = true;

        let mut rng = image_rng(self.config.seed, source.ordinal);
        for effect in self.effects_for_image(&mut rng) {
            match self.run_branch(source, &raster, effect, &source_sha256, &mut rng, sink) {
                Ok(entry) => {
                    info!(artifact = %entry.artifact, intensity = %entry.intensity, bytes = entry.bytes, "Artifact produced");
                    outcome.artifacts.push(entry);
                }
                Err(err) => {
                    warn!(
                        ordinal = source.ordinal,
                        source = %source.name,
                        %effect,
                        stage = %err.stage(),
                        error = %err,
                        "Effect branch failed"
                    );
                    outcome
                        .failures
                        .push(failure_record(source, Some(effect), &err));
                }
            }
        }
        outcome
    }

    /// The effects this image gets, in application order.
    fn effects_for_image(&self, rng: &mut StdRng) -> Vec<EffectKind> {
        match self.config.mode {
            RunMode::AllEffects => self.config.effects.clone(),
            RunMode::SingleRandom => {
                let pick = rng.random_range(0..self.config.effects.len());
                vec![self.config.effects[pick]]
            }
        }
    }

    /// sample → degrade → render → write for one effect.
    fn run_branch(
        &self,
        source: &SourceImage,
        raster: &RgbImage,
        effect: EffectKind,
        source_sha256: &str,
        rng: &mut StdRng,
        sink: &dyn ArtifactSink,
    ) -> Result<ManifestEntry> {
        let intensity = self
            .sampler
            .sample(rng)
            .map_err(|err| ScanwerkError::effect(effect, err.to_string()))?;
        let degraded = apply_effect_with((self.effects)(effect), raster, intensity, rng)?;
        let bytes = self.renderer.render(&degraded.image)?;

        let name = artifact_name(source.ordinal, effect, self.config.mode);
        sink.write(&name, &bytes)?;

        Ok(ManifestEntry {
            artifact: name,
            source: source.name.clone(),
            source_sha256: source_sha256.to_string(),
            effect,
            intensity,
            bytes: bytes.len() as u64,
        })
    }
}

/// Read and decode a source, returning the raster and its content hash.
fn load(source: &SourceImage) -> Result<(RgbImage, String)> {
    let bytes = source.read()?;
    let raster = ImageProcessor::from_bytes(&bytes, &source.name)?.into_rgb();
    Ok((raster, manifest::hash_bytes(&bytes)))
}

fn write_manifest(entries: &[ManifestEntry], sink: &dyn ArtifactSink) -> Result<()> {
    let text = manifest::to_jsonl(entries)?;
    sink.write(MANIFEST_FILE, text.as_bytes())
}

fn failure_record(
    source: &SourceImage,
    effect: Option<EffectKind>,
    err: &ScanwerkError,
) -> FailureRecord {
    FailureRecord {
        ordinal: source.ordinal,
        source: source.name.clone(),
        effect,
        stage: err.stage(),
        reason: err.to_string(),
    }
}

/// Random stream for one image.
///
/// With a base seed, the stream depends only on the seed and the ordinal,
/// so it does not matter which worker processes the image or when.
pub fn image_rng(seed: Option<u64>, ordinal: usize) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(mix_seed(seed, ordinal as u64)),
        None => StdRng::from_os_rng(),
    }
}

/// SplitMix64 finaliser over `seed + ordinal * golden gamma`.
fn mix_seed(seed: u64, ordinal: u64) -> u64 {
    let mut z = seed.wrapping_add(ordinal.wrapping_mul(0x9E37_79B9_7F4A_7C15));
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}
