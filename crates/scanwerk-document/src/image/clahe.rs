// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Contrast-limited adaptive histogram equalization (CLAHE) on 8-bit planes.

use image::{GrayImage, Luma};

const BINS: usize = 256;

/// Equalize `gray` per tile of a `grid_x` x `grid_y` grid.
///
/// `clip_limit` is relative to the mean bin height of a tile: each histogram
/// bin is capped at `clip_limit * tile_area / 256` (at least 1) and the clipped
/// excess is spread evenly across all bins before the cumulative lookup table
/// is built. Pixels are mapped by bilinear interpolation between the lookup
/// tables of the four nearest tile centres, which avoids visible tile seams.
///
/// A grid larger than the image collapses to one tile per pixel row/column.
pub fn clahe(gray: &GrayImage, clip_limit: f32, grid_x: u32, grid_y: u32) -> GrayImage {
    let (width, height) = gray.dimensions();
    if width == 0 || height == 0 {
        return gray.clone();
    }

    let tile_w = width.div_ceil(grid_x.clamp(1, width));
    let tile_h = height.div_ceil(grid_y.clamp(1, height));
    let tiles_x = width.div_ceil(tile_w);
    let tiles_y = height.div_ceil(tile_h);

    let mut luts: Vec<[u8; BINS]> = Vec::with_capacity((tiles_x * tiles_y) as usize);
    for ty in 0..tiles_y {
        for tx in 0..tiles_x {
            let x0 = tx * tile_w;
            let y0 = ty * tile_h;
            let x1 = (x0 + tile_w).min(width);
            let y1 = (y0 + tile_h).min(height);
            luts.push(tile_lut(gray, (x0, y0, x1, y1), clip_limit));
        }
    }

    let inv_tw = 1.0 / tile_w as f32;
    let inv_th = 1.0 / tile_h as f32;
    let last_tx = tiles_x as i64 - 1;
    let last_ty = tiles_y as i64 - 1;

    // Horizontal neighbours and weights depend only on the column.
    let columns: Vec<(usize, usize, f32)> = (0..width)
        .map(|x| {
            let txf = x as f32 * inv_tw - 0.5;
            let tx1 = txf.floor() as i64;
            let weight = txf - tx1 as f32;
            (
                tx1.clamp(0, last_tx) as usize,
                (tx1 + 1).clamp(0, last_tx) as usize,
                weight,
            )
        })
        .collect();

    let mut out = GrayImage::new(width, height);
    for y in 0..height {
        let tyf = y as f32 * inv_th - 0.5;
        let ty1 = tyf.floor() as i64;
        let ya = tyf - ty1 as f32;
        let row1 = ty1.clamp(0, last_ty) as usize * tiles_x as usize;
        let row2 = (ty1 + 1).clamp(0, last_ty) as usize * tiles_x as usize;

        for (x, &(tx1, tx2, xa)) in columns.iter().enumerate() {
            let value = gray.get_pixel(x as u32, y).0[0] as usize;
            let top = f32::from(luts[row1 + tx1][value]) * (1.0 - xa)
                + f32::from(luts[row1 + tx2][value]) * xa;
            let bottom = f32::from(luts[row2 + tx1][value]) * (1.0 - xa)
                + f32::from(luts[row2 + tx2][value]) * xa;
            let mapped = top * (1.0 - ya) + bottom * ya;
            out.put_pixel(x as u32, y, Luma([mapped.round().clamp(0.0, 255.0) as u8]));
        }
    }

    out
}

/// Build the clipped, equalized lookup table of one tile.
fn tile_lut(
    gray: &GrayImage,
    (x0, y0, x1, y1): (u32, u32, u32, u32),
    clip_limit: f32,
) -> [u8; BINS] {
    let mut histogram = [0u32; BINS];
    for y in y0..y1 {
        for x in x0..x1 {
            histogram[gray.get_pixel(x, y).0[0] as usize] += 1;
        }
    }

    let area = (x1 - x0) * (y1 - y0);

    if clip_limit > 0.0 {
        let limit = ((clip_limit * area as f32 / BINS as f32) as u32).max(1);
        let mut excess: u32 = 0;
        for bin in histogram.iter_mut() {
            if *bin > limit {
                excess += *bin - limit;
                *bin = limit;
            }
        }

        let batch = excess / BINS as u32;
        let mut residual = excess - batch * BINS as u32;
        for bin in histogram.iter_mut() {
            *bin += batch;
        }
        if residual > 0 {
            let step = (BINS / residual as usize).max(1);
            for bin in histogram.iter_mut().step_by(step) {
                if residual == 0 {
                    break;
                }
                *bin += 1;
                residual -= 1;
            }
        }
    }

    let scale = 255.0 / area as f32;
    let mut lut = [0u8; BINS];
    let mut cumulative: u32 = 0;
    for (entry, count) in lut.iter_mut().zip(histogram.iter()) {
        cumulative += count;
        *entry = (cumulative as f32 * scale).round().clamp(0.0, 255.0) as u8;
    }
    lut
}

#[cfg(test)]
mod tests {
    use super::*;

    fn std_dev(img: &GrayImage) -> f32 {
        let n = img.len() as f32;
        let mean = img.iter().map(|&v| f32::from(v)).sum::<f32>() / n;
        (img.iter().map(|&v| (f32::from(v) - mean).powi(2)).sum::<f32>() / n).sqrt()
    }

    #[test]
    fn white_stays_white() {
        let img = GrayImage::from_pixel(64, 48, Luma([255]));
        let out = clahe(&img, 2.0, 8, 8);
        assert!(out.iter().all(|&v| v == 255));
    }

    fn low_contrast_texture() -> GrayImage {
        GrayImage::from_fn(128, 128, |x, y| Luma([100 + ((x + y) % 16) as u8]))
    }

    #[test]
    fn low_contrast_texture_gains_contrast() {
        let img = low_contrast_texture();
        let out = clahe(&img, 2.0, 8, 8);
        assert_eq!(out.dimensions(), img.dimensions());
        assert!(std_dev(&out) > std_dev(&img) * 1.5);
    }

    #[test]
    fn higher_clip_limit_means_stronger_stretch() {
        let img = low_contrast_texture();
        let soft = clahe(&img, 1.4, 8, 8);
        let hard = clahe(&img, 2.6, 8, 8);
        assert!(std_dev(&hard) > std_dev(&soft));
    }

    #[test]
    fn tiny_images_do_not_panic() {
        let img = GrayImage::from_pixel(3, 2, Luma([40]));
        let out = clahe(&img, 2.0, 8, 8);
        assert_eq!(out.dimensions(), (3, 2));
    }
}
