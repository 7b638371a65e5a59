// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Photocopier recipe: grayscale, harsh contrast, toner threshold, drum
// streaks, edge falloff and noise.

use image::{DynamicImage, GrayImage, Luma, RgbImage};
use imageproc::noise::gaussian_noise_mut;
use rand::{Rng, RngCore};
use scanwerk_core::error::Result;
use scanwerk_core::{EffectKind, Intensity};
use tracing::debug;

use super::DegradationEffect;
use super::sampler::{uniform_between, uniform_int};
use crate::image::masks::Mask;

/// Brightness multiplier at the outermost pixel of the edge band.
const EDGE_FLOOR: f32 = 0.6;

/// Photocopier degradation. Output is gray expanded to three equal channels.
#[derive(Debug, Clone, Copy, Default)]
pub struct Photocopy;

/// One darkened scanline.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Streak {
    row: i64,
    alpha: f32,
}

impl DegradationEffect for Photocopy {
    fn kind(&self) -> EffectKind {
        EffectKind::Photocopy
    }

    fn degrade(
        &self,
        source: &RgbImage,
        intensity: Intensity,
        rng: &mut dyn RngCore,
    ) -> Result<RgbImage> {
        let i = intensity.value();
        let (width, height) = source.dimensions();

        let alpha = 1.2 + 0.3 * i;
        let beta = -20.0 - 20.0 * i;
        let cutoff = 190 + (10.0 * i) as i32;
        let blend = 0.6 + 0.1 * i;
        let streaks = drum_streaks(rng, height, i);
        let band = (15.0 + 15.0 * i) as u32;
        let noise_sigma = 3.0 + 3.0 * i;
        let noise_seed = rng.random::<u64>();

        debug!(
            alpha,
            beta,
            cutoff,
            blend,
            streaks = streaks.len(),
            band,
            noise_sigma,
            "Photocopy parameters"
        );

        let mut gray = luma_bt601(source);
        stretch_and_threshold(&mut gray, alpha, beta, cutoff, blend);
        darken_rows(&mut gray, &streaks);
        Mask::border_ramp(width, height, band, EDGE_FLOOR).apply(&mut gray);
        gaussian_noise_mut(&mut gray, 0.0, f64::from(noise_sigma), noise_seed);

        Ok(DynamicImage::ImageLuma8(gray).into_rgb8())
    }
}

/// BT.601 luma: `0.299 R + 0.587 G + 0.114 B`, rounded.
fn luma_bt601(source: &RgbImage) -> GrayImage {
    GrayImage::from_fn(source.width(), source.height(), |x, y| {
        let [r, g, b] = source.get_pixel(x, y).0;
        let luma = 0.299 * f32::from(r) + 0.587 * f32::from(g) + 0.114 * f32::from(b);
        Luma([luma.round().clamp(0.0, 255.0) as u8])
    })
}

/// Contrast stretch `alpha * v + beta` (clipped), then blend with the binary
/// mask of pixels above `cutoff` at `blend : 1 - blend`.
fn stretch_and_threshold(gray: &mut GrayImage, alpha: f32, beta: f32, cutoff: i32, blend: f32) {
    for pixel in gray.pixels_mut() {
        let stretched = (alpha * f32::from(pixel.0[0]) + beta).round().clamp(0.0, 255.0);
        let toner = if stretched as i32 > cutoff { 255.0 } else { 0.0 };
        let mixed = stretched * blend + toner * (1.0 - blend);
        pixel.0[0] = mixed.round().clamp(0.0, 255.0) as u8;
    }
}

/// One streak every `spacing` rows (spacing drawn from `60..130`), each
/// jittered by `-3..4` rows with its own darkening alpha.
fn drum_streaks(rng: &mut dyn RngCore, height: u32, i: f32) -> Vec<Streak> {
    let spacing = uniform_int(rng, 60, 130) as usize;
    (0..i64::from(height))
        .step_by(spacing)
        .map(|y| {
            let alpha = uniform_between(rng, 0.02, 0.06 * i);
            let jitter = i64::from(uniform_int(rng, -3, 4));
            Streak {
                row: y + jitter,
                alpha,
            }
        })
        .collect()
}

/// Darkens each streak row; rows pushed off the image, or onto the last
/// row, by jitter are skipped.
fn darken_rows(gray: &mut GrayImage, streaks: &[Streak]) {
    let (width, height) = gray.dimensions();
    for streak in streaks {
        if streak.row < 0 || streak.row >= i64::from(height) - 1 {
            continue;
        }
        let y = streak.row as u32;
        let keep = 1.0 - streak.alpha;
        for x in 0..width {
            let px = gray.get_pixel_mut(x, y);
            px.0[0] = (f32::from(px.0[0]) * keep) as u8;
        }
    }
}
