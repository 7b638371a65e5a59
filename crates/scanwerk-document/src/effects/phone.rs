// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Handheld phone photo recipe: perspective skew, uneven lighting, lens blur,
// white-balance drift, sensor noise and JPEG recompression.

use image::{Rgb, RgbImage};
use rand::{Rng, RngCore};
use scanwerk_core::error::Result;
use scanwerk_core::{EffectKind, Intensity};
use tracing::debug;

use super::DegradationEffect;
use super::sampler::{uniform_between, uniform_int};
use crate::image::masks::Mask;
use crate::image::processor::ImageProcessor;

/// Lowest JPEG quality the recompression step will use.
pub const QUALITY_FLOOR: u8 = 45;

/// Phone camera degradation.
#[derive(Debug, Clone, Copy, Default)]
pub struct PhoneCamera;

impl DegradationEffect for PhoneCamera {
    fn kind(&self) -> EffectKind {
        EffectKind::Phone
    }

    fn degrade(
        &self,
        source: &RgbImage,
        intensity: Intensity,
        rng: &mut dyn RngCore,
    ) -> Result<RgbImage> {
        let i = intensity.value();
        let (width, height) = source.dimensions();

        let corners = skewed_corners(rng, width, height, i);
        let background = Rgb([
            rng.random_range(230..245),
            rng.random_range(230..245),
            rng.random_range(230..245),
        ]);

        let light_center = (
            uniform_int(rng, (width / 4) as i32, (3 * width / 4) as i32) as f32,
            uniform_int(rng, (height / 4) as i32, (3 * height / 4) as i32) as f32,
        );
        let falloff = 0.15 + 0.15 * i;

        let kernel_size = if i < 1.0 { 3 } else { 5 };
        let blur_sigma = 0.5 + 0.5 * i;

        // Blue cools slightly, red warms slightly.
        let blue = uniform_between(rng, 0.95, 1.0);
        let red = uniform_between(rng, 1.0, 1.05);

        let noise_sigma = 3.0 + 5.0 * i;
        let noise_seed = rng.random::<u64>();
        let quality = recompression_quality(intensity);

        debug!(
            ?corners,
            falloff, kernel_size, blur_sigma, red, blue, noise_sigma, quality,
            "Phone parameters"
        );

        let warped = match corners {
            Some(corners) => {
                ImageProcessor::from_rgb(source.clone()).warp_corners(corners, background)?
            }
            None => ImageProcessor::from_rgb(source.clone()),
        };
        let degraded = warped
            .apply_mask(&Mask::radial(width, height, light_center, falloff))
            .gaussian_blur(kernel_size, blur_sigma)
            .scale_channels([red, 1.0, blue])
            .add_gaussian_noise(noise_sigma, noise_seed)
            .recompress(quality)?;

        Ok(degraded.into_rgb())
    }
}

/// JPEG quality for the recompression step: `80 - 20 * i`, never below
/// [`QUALITY_FLOOR`].
pub fn recompression_quality(intensity: Intensity) -> u8 {
    let quality = (80.0 - 20.0 * intensity.value()) as i32;
    quality.clamp(i32::from(QUALITY_FLOOR), 100) as u8
}

/// Destination corners (TL, TR, BR, BL) for the handheld skew, or `None`
/// when the raster is too small to skew.
///
/// Each corner moves inward by up to `margin = 0.015 * i * min(w, h)` px
/// (at least 1) on each axis. The top-right corner's vertical offset, the
/// bottom-right's horizontal offset and the bottom-left's horizontal offset
/// may reach twice the margin. The margin never exceeds
/// `(min(w, h) - 1) / 4`, so every corner stays inside its own quadrant and
/// the quadrilateral cannot collapse.
fn skewed_corners(
    rng: &mut dyn RngCore,
    width: u32,
    height: u32,
    i: f32,
) -> Option<[(f32, f32); 4]> {
    let short_side = width.min(height);
    let margin = ((short_side as f32 * 0.015 * i) as u32)
        .max(1)
        .min(short_side.saturating_sub(1) / 4);
    if margin == 0 {
        return None;
    }
    let (w, h) = (width as f32, height as f32);
    let mut offset = |bound: u32| rng.random_range(0..=bound) as f32;

    let top_left = (offset(margin), offset(margin));
    let top_right = (w - offset(margin), offset(2 * margin));
    let bottom_right = (w - offset(2 * margin), h - offset(margin));
    let bottom_left = (offset(2 * margin), h - offset(margin));
    Some([top_left, top_right, bottom_right, bottom_left])
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn quality_follows_intensity_with_floor() {
        let q = |i: f32| recompression_quality(Intensity::new(i).unwrap());
        assert_eq!(q(0.4), 72);
        assert_eq!(q(1.0), 60);
        assert_eq!(q(1.6), 48);
        assert_eq!(q(1.75), 45);
        assert_eq!(q(3.0), QUALITY_FLOOR);
    }

    #[test]
    fn corners_stay_within_margins() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..100 {
            let [tl, tr, br, bl] = skewed_corners(&mut rng, 1000, 800, 1.0).unwrap();
            // margin = 0.015 * 800 = 12
            assert!((0.0..=12.0).contains(&tl.0) && (0.0..=12.0).contains(&tl.1));
            assert!((988.0..=1000.0).contains(&tr.0) && (0.0..=24.0).contains(&tr.1));
            assert!((976.0..=1000.0).contains(&br.0) && (788.0..=800.0).contains(&br.1));
            assert!((0.0..=24.0).contains(&bl.0) && (788.0..=800.0).contains(&bl.1));
        }
    }

    #[test]
    fn small_images_get_a_one_pixel_margin() {
        let mut rng = StdRng::seed_from_u64(4);
        let [tl, ..] = skewed_corners(&mut rng, 20, 20, 0.4).unwrap();
        assert!(tl.0 <= 1.0 && tl.1 <= 1.0);
    }

    #[test]
    fn tiny_images_skip_the_skew() {
        let mut rng = StdRng::seed_from_u64(4);
        for (w, h) in [(1, 1), (2, 2), (4, 4), (1, 50), (50, 1)] {
            assert!(skewed_corners(&mut rng, w, h, 1.6).is_none(), "{w}x{h}");
        }
        assert!(skewed_corners(&mut rng, 5, 5, 0.4).is_some());
    }

    #[test]
    fn tiny_and_thin_rasters_keep_their_size() {
        let sizes = [(1, 1), (2, 2), (3, 3), (5, 5), (6, 9), (1, 50), (50, 1), (2, 40)];
        for (w, h) in sizes {
            let src = RgbImage::from_fn(w, h, |x, y| Rgb([(x * 40) as u8, (y * 5) as u8, 200]));
            for seed in 0..50 {
                let mut rng = StdRng::seed_from_u64(seed);
                let out = PhoneCamera
                    .degrade(&src, Intensity::new(1.0).unwrap(), &mut rng)
                    .unwrap_or_else(|err| panic!("{w}x{h} seed {seed}: {err}"));
                assert_eq!(out.dimensions(), (w, h));
            }
        }
    }

    #[test]
    fn keeps_dimensions_at_quality_floor() {
        let src = RgbImage::from_fn(160, 120, |x, y| Rgb([(x % 256) as u8, (y * 2) as u8, 90]));
        let mut rng = StdRng::seed_from_u64(10);
        let out = PhoneCamera
            .degrade(&src, Intensity::new(2.5).unwrap(), &mut rng)
            .unwrap();
        assert_eq!(out.dimensions(), (160, 120));
    }

    #[test]
    fn lighting_darkens_away_from_the_hotspot() {
        let src = RgbImage::from_pixel(400, 300, Rgb([200, 200, 200]));
        let mut rng = StdRng::seed_from_u64(12);
        let out = PhoneCamera
            .degrade(&src, Intensity::new(1.2).unwrap(), &mut rng)
            .unwrap();
        let mean = |x0: u32, y0: u32| {
            let mut sum = 0u64;
            for y in y0..y0 + 20 {
                for x in x0..x0 + 20 {
                    sum += u64::from(out.get_pixel(x, y).0[1]);
                }
            }
            sum as f64 / 400.0
        };
        // The hotspot lies in the middle half, so the centre is always closer
        // to it than the far corners are on average.
        let centre = mean(190, 140);
        let corners = (mean(30, 30) + mean(350, 30) + mean(30, 250) + mean(350, 250)) / 4.0;
        assert!(corners < centre, "corners {corners} vs centre {centre}");
    }
}
