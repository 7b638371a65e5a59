// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Flatbed scanner recipe: slight skew, local contrast, sensor noise, lid
// light falloff and dust.

use image::{Rgb, RgbImage};
use rand::{Rng, RngCore};
use scanwerk_core::error::Result;
use scanwerk_core::{EffectKind, Intensity};
use tracing::debug;

use super::DegradationEffect;
use super::sampler::{uniform_between, uniform_int};
use crate::image::masks::Mask;
use crate::image::processor::{ImageProcessor, Speck};

/// CLAHE tile grid (tiles per side).
const CONTRAST_GRID: u32 = 8;

/// Flatbed scanner degradation.
#[derive(Debug, Clone, Copy, Default)]
pub struct Scanner;

impl DegradationEffect for Scanner {
    fn kind(&self) -> EffectKind {
        EffectKind::Scanner
    }

    fn degrade(
        &self,
        source: &RgbImage,
        intensity: Intensity,
        rng: &mut dyn RngCore,
    ) -> Result<RgbImage> {
        let i = intensity.value();
        let (width, height) = source.dimensions();

        let angle = uniform_between(rng, -1.5 * i, 1.5 * i);
        let fill = Rgb([
            rng.random_range(235..250),
            rng.random_range(235..250),
            rng.random_range(235..250),
        ]);
        let clip_limit = 1.0 + i;
        let noise_sigma = 2.0 + 4.0 * i;
        let noise_seed = rng.random::<u64>();
        let band = (20.0 + 20.0 * i) as u32;

        debug!(angle, clip_limit, noise_sigma, band, "Scanner parameters");

        let processed = ImageProcessor::from_rgb(source.clone())
            .rotate_with_fill(angle, fill)
            .equalize_lightness(clip_limit, CONTRAST_GRID)
            .add_gaussian_noise(noise_sigma, noise_seed)
            .apply_mask(&Mask::border_ramp(width, height, band, 0.0));

        let specks = dust_specks(rng, width, height, i);
        Ok(processed.draw_specks(&specks).into_rgb())
    }
}

/// Between 3 and `15 * i` dust specks of radius 1-2 px at random positions.
fn dust_specks(rng: &mut dyn RngCore, width: u32, height: u32, i: f32) -> Vec<Speck> {
    // The upper bound is exclusive; keep at least one choice for small i.
    let count = uniform_int(rng, 3, ((15.0 * i) as i32).max(4));
    (0..count)
        .map(|_| Speck {
            center: (
                uniform_int(rng, 0, width as i32),
                uniform_int(rng, 0, height as i32),
            ),
            radius: rng.random_range(1..3),
            gray: rng.random_range(80..200),
        })
        .collect()
}
