// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// sRGB <-> CIE L*a*b* conversion on 8-bit planes.
//
// The 8-bit encoding scales L* from 0..100 to 0..255 and offsets a* and b* by
// 128, so each channel fits a `GrayImage` plane. White point is D65.

use image::{GrayImage, Rgb, RgbImage};

const XN: f32 = 0.950_456;
const ZN: f32 = 1.088_754;
const EPSILON: f32 = 0.008_856;
const KAPPA: f32 = 903.3;

/// Lightness plus the two chroma planes of an image.
pub struct LabPlanes {
    pub lightness: GrayImage,
    pub a: GrayImage,
    pub b: GrayImage,
}

fn srgb_to_linear(c: f32) -> f32 {
    if c <= 0.040_45 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

fn linear_to_srgb(c: f32) -> f32 {
    if c <= 0.003_130_8 {
        12.92 * c
    } else {
        1.055 * c.powf(1.0 / 2.4) - 0.055
    }
}

fn lab_f(t: f32) -> f32 {
    if t > EPSILON {
        t.cbrt()
    } else {
        7.787 * t + 16.0 / 116.0
    }
}

fn lab_f_inv(f: f32) -> f32 {
    let cube = f * f * f;
    if cube > EPSILON {
        cube
    } else {
        (f - 16.0 / 116.0) / 7.787
    }
}

fn to_u8(v: f32) -> u8 {
    v.round().clamp(0.0, 255.0) as u8
}

/// Convert one sRGB pixel to 8-bit encoded L*a*b*.
pub fn rgb_to_lab_pixel(rgb: [u8; 3]) -> [u8; 3] {
    let [r, g, b] = rgb.map(|c| srgb_to_linear(f32::from(c) / 255.0));

    let x = (0.412_453 * r + 0.357_580 * g + 0.180_423 * b) / XN;
    let y = 0.212_671 * r + 0.715_160 * g + 0.072_169 * b;
    let z = (0.019_334 * r + 0.119_193 * g + 0.950_227 * b) / ZN;

    let (fx, fy, fz) = (lab_f(x), lab_f(y), lab_f(z));
    let l = if y > EPSILON { 116.0 * fy - 16.0 } else { KAPPA * y };

    [
        to_u8(l * 255.0 / 100.0),
        to_u8(500.0 * (fx - fy) + 128.0),
        to_u8(200.0 * (fy - fz) + 128.0),
    ]
}

/// Convert one 8-bit encoded L*a*b* pixel back to sRGB.
pub fn lab_to_rgb_pixel(lab: [u8; 3]) -> [u8; 3] {
    let l = f32::from(lab[0]) * 100.0 / 255.0;
    let a = f32::from(lab[1]) - 128.0;
    let b = f32::from(lab[2]) - 128.0;

    let fy = (l + 16.0) / 116.0;
    let fx = fy + a / 500.0;
    let fz = fy - b / 200.0;

    let y = if l > KAPPA * EPSILON { fy * fy * fy } else { l / KAPPA };
    let x = lab_f_inv(fx) * XN;
    let z = lab_f_inv(fz) * ZN;

    let r = 3.240_479 * x - 1.537_150 * y - 0.498_535 * z;
    let g = -0.969_256 * x + 1.875_991 * y + 0.041_556 * z;
    let bl = 0.055_648 * x - 0.204_043 * y + 1.057_311 * z;

    [r, g, bl].map(|c| to_u8(linear_to_srgb(c.clamp(0.0, 1.0)) * 255.0))
}

/// Split an RGB image into its L*a*b* planes.
pub fn rgb_to_lab(image: &RgbImage) -> LabPlanes {
    let (width, height) = image.dimensions();
    let mut lightness = GrayImage::new(width, height);
    let mut a = GrayImage::new(width, height);
    let mut b = GrayImage::new(width, height);

    for (((src, l_out), a_out), b_out) in image
        .pixels()
        .zip(lightness.iter_mut())
        .zip(a.iter_mut())
        .zip(b.iter_mut())
    {
        let [l, ca, cb] = rgb_to_lab_pixel(src.0);
        *l_out = l;
        *a_out = ca;
        *b_out = cb;
    }

    LabPlanes { lightness, a, b }
}

/// Merge L*a*b* planes back into an RGB image.
pub fn lab_to_rgb(planes: &LabPlanes) -> RgbImage {
    let (width, height) = planes.lightness.dimensions();
    let mut out = RgbImage::new(width, height);
    for (((dst, l), a), b) in out
        .pixels_mut()
        .zip(planes.lightness.iter())
        .zip(planes.a.iter())
        .zip(planes.b.iter())
    {
        *dst = Rgb(lab_to_rgb_pixel([*l, *a, *b]));
    }
    out
}
