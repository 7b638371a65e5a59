// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Single-image mode: degrade one image with one or all effects, drawing
// intensity from each effect's own sub-range unless one is given.

use std::path::{Path, PathBuf};

use rand::RngCore;
use scanwerk_core::error::{Result, ScanwerkError};
use scanwerk_core::{EffectKind, Intensity, PaperSize};
use scanwerk_document::{ImageProcessor, ParameterSampler, PdfRenderer, apply_effect};
use tracing::{info, instrument};

use crate::manifest::{self, ManifestEntry};
use crate::naming::single_image_name;
use crate::sink::ArtifactSink;

/// What to do with one image.
#[derive(Debug, Clone)]
pub struct SingleImageJob {
    pub source: PathBuf,
    /// `None` applies all three effects.
    pub effect: Option<EffectKind>,
    /// `None` samples from the effect's default range.
    pub intensity: Option<Intensity>,
    pub paper_size: PaperSize,
    pub render_quality: u8,
}

impl SingleImageJob {
    pub fn new(source: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            effect: None,
            intensity: None,
            paper_size: PaperSize::A4,
            render_quality: scanwerk_document::pdf::writer::DEFAULT_QUALITY,
        }
    }

    fn effects(&self) -> Vec<EffectKind> {
        match self.effect {
            Some(kind) => vec![kind],
            None => EffectKind::ALL.to_vec(),
        }
    }
}

/// Run `job`, writing `<stem>_<effect>.pdf` artifacts to `sink`.
///
/// Unlike a batch, any failure aborts: there is only one image.
#[instrument(skip_all, fields(source = %job.source.display()))]
pub fn augment_one(
    job: &SingleImageJob,
    sink: &dyn ArtifactSink,
    rng: &mut dyn RngCore,
) -> Result<Vec<ManifestEntry>> {
    let bytes = std::fs::read(&job.source).map_err(|err| ScanwerkError::Decode {
        source_name: display_name(&job.source),
        reason: err.to_string(),
    })?;
    let raster = ImageProcessor::from_bytes(&bytes, &display_name(&job.source))?.into_rgb();
    let source_sha256 = manifest::hash_bytes(&bytes);
    let renderer = PdfRenderer::new(job.paper_size, job.render_quality);

    let mut entries = Vec::new();
    for effect in job.effects() {
        let intensity = match job.intensity {
            Some(value) => value,
            None => ParameterSampler::new(effect.default_range())?.sample(rng)?,
        };
        let degraded = apply_effect(effect, &raster, intensity, rng)?;
        let pdf = renderer.render(&degraded.image)?;
        let name = single_image_name(&job.source, effect);
        sink.write(&name, &pdf)?;

        info!(artifact = %name, %intensity, bytes = pdf.len(), "Artifact produced");
        entries.push(ManifestEntry {
            artifact: name,
            source: display_name(&job.source),
            source_sha256: source_sha256.clone(),
            effect,
            intensity,
            bytes: pdf.len() as u64,
        });
    }
    Ok(entries)
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::MemorySink;
    use image::{Rgb, RgbImage};
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use scanwerk_core::FailureStage;

    fn write_png(dir: &Path) -> PathBuf {
        let path = dir.join("invoice.png");
        let raster = RgbImage::from_fn(80, 60, |x, _| Rgb([240, (x * 3) as u8, 240]));
        std::fs::write(&path, ImageProcessor::from_rgb(raster).to_png_bytes().unwrap()).unwrap();
        path
    }

    #[test]
    fn all_effects_by_default() {
        let dir = tempfile::tempdir().unwrap();
        let job = SingleImageJob::new(write_png(dir.path()));
        let sink = MemorySink::new();
        let entries = augment_one(&job, &sink, &mut StdRng::seed_from_u64(1)).unwrap();

        assert_eq!(entries.len(), 3);
        assert_eq!(
            sink.names(),
            ["invoice_phone.pdf", "invoice_photocopy.pdf", "invoice_scanner.pdf"]
        );
        for entry in entries {
            assert!(EffectKind::Scanner.default_range().contains(entry.intensity.value()));
        }
    }

    #[test]
    fn fixed_effect_and_intensity() {
        let dir = tempfile::tempdir().unwrap();
        let mut job = SingleImageJob::new(write_png(dir.path()));
        job.effect = Some(EffectKind::Photocopy);
        job.intensity = Some(Intensity::new(1.3).unwrap());
        let sink = MemorySink::new();
        let entries = augment_one(&job, &sink, &mut StdRng::seed_from_u64(2)).unwrap();

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].artifact, "invoice_photocopy.pdf");
        assert_eq!(entries[0].intensity.value(), 1.3);
    }

    #[test]
    fn missing_image_is_a_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        let job = SingleImageJob::new(dir.path().join("missing.png"));
        let err = augment_one(&job, &MemorySink::new(), &mut StdRng::seed_from_u64(3)).unwrap_err();
        assert_eq!(err.stage(), FailureStage::Decode);
    }
}
