// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Multiplicative brightness masks: border light falloff and radial gradients.
//
// A mask holds one factor per pixel and is applied to every channel of an
// 8-bit image in a single pass. Results are clamped and truncated to 8 bits.

use image::{ImageBuffer, Pixel};

/// Per-pixel brightness multipliers, row-major.
#[derive(Debug, Clone)]
pub struct Mask {
    width: u32,
    height: u32,
    factors: Vec<f32>,
}

impl Mask {
    /// A mask of ones.
    pub fn identity(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            factors: vec![1.0; width as usize * height as usize],
        }
    }

    /// Border falloff over a band `band` pixels wide on all four sides.
    ///
    /// At distance `d < band` from an edge the factor for that edge is
    /// `edge + (1 - edge) * d / band`, so it ramps from `edge` on the outermost
    /// pixel up to 1 at the inner edge of the band. The four edge factors are
    /// multiplied together, which darkens corners (and the centre of images
    /// narrower than two bands) more than straight edges.
    pub fn border_ramp(width: u32, height: u32, band: u32, edge: f32) -> Self {
        let columns = edge_profile(width, band, edge);
        let rows = edge_profile(height, band, edge);

        let mut factors = Vec::with_capacity(columns.len() * rows.len());
        for row in &rows {
            factors.extend(columns.iter().map(|column| row * column));
        }

        Self {
            width,
            height,
            factors,
        }
    }

    /// Radial falloff around `center`: `1 - strength * dist / diagonal`.
    pub fn radial(width: u32, height: u32, center: (f32, f32), strength: f32) -> Self {
        let diagonal = (width as f32).hypot(height as f32).max(f32::EPSILON);
        let (cx, cy) = center;

        let mut factors = Vec::with_capacity(width as usize * height as usize);
        for y in 0..height {
            let dy = y as f32 - cy;
            factors.extend((0..width).map(|x| {
                let dist = (x as f32 - cx).hypot(dy);
                1.0 - strength * dist / diagonal
            }));
        }

        Self {
            width,
            height,
            factors,
        }
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Factor at pixel (x, y).
    pub fn factor(&self, x: u32, y: u32) -> f32 {
        self.factors[y as usize * self.width as usize + x as usize]
    }

    /// Multiply every channel of `image` by the mask, in place.
    ///
    /// Panics if the mask and image dimensions differ.
    pub fn apply<P>(&self, image: &mut ImageBuffer<P, Vec<u8>>)
    where
        P: Pixel<Subpixel = u8>,
    {
        assert_eq!(
            image.dimensions(),
            self.dimensions(),
            "mask and image dimensions differ"
        );
        let channels = usize::from(P::CHANNEL_COUNT);
        for (pixel, &factor) in image.chunks_exact_mut(channels).zip(&self.factors) {
            for value in pixel {
                *value = (f32::from(*value) * factor).clamp(0.0, 255.0) as u8;
            }
        }
    }
}

/// Product of the near-edge and far-edge factors for each index along one axis.
fn edge_profile(len: u32, band: u32, edge: f32) -> Vec<f32> {
    let ramp = |d: u32| {
        if d < band {
            edge + (1.0 - edge) * d as f32 / band as f32
        } else {
            1.0
        }
    };
    (0..len).map(|i| ramp(i) * ramp(len - 1 - i)).collect()
}
