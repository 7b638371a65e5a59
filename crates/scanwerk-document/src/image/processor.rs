// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image processor: decode, geometric warps, local contrast, noise, masks,
// blur, channel scaling and lossy recompression on 8-bit RGB rasters.
// Operates on in-memory images using the `image` and `imageproc` crates.

use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use imageproc::drawing::draw_filled_circle_mut;
use imageproc::filter::separable_filter_equal;
use imageproc::geometric_transformations::{self, Interpolation, Projection, warp_into};
use imageproc::noise::gaussian_noise_mut;
use scanwerk_core::error::{Result, ScanwerkError};
use tracing::{debug, instrument};

use super::clahe::clahe;
use super::color::{lab_to_rgb, rgb_to_lab};
use super::masks::Mask;

/// A filled grey dot drawn on top of a raster (dust, toner specks).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Speck {
    pub center: (i32, i32),
    pub radius: i32,
    pub gray: u8,
}

/// Degradation pipeline operating on a single in-memory RGB raster.
///
/// Every operation preserves the raster's width and height. Methods consume
/// `self` and return a new `ImageProcessor`, enabling method chaining.
///
/// ```ignore
/// let degraded = ImageProcessor::from_rgb(source.clone())
///     .rotate_with_fill(0.8, Rgb([240, 240, 240]))
///     .equalize_lightness(2.0, 8)
///     .add_gaussian_noise(6.0, seed)
///     .into_rgb();
/// ```
pub struct ImageProcessor {
    /// The current working raster.
    image: RgbImage,
}

impl ImageProcessor {
    // -- Construction ---------------------------------------------------------

    /// Decode raw encoded bytes (PNG, JPEG, ...). Alpha is discarded.
    #[instrument(skip(data), fields(data_len = data.len()))]
    pub fn from_bytes(data: &[u8], source_name: &str) -> Result<Self> {
        let decoded = image::load_from_memory(data).map_err(|err| ScanwerkError::Decode {
            source_name: source_name.to_string(),
            reason: err.to_string(),
        })?;
        if decoded.width() == 0 || decoded.height() == 0 {
            return Err(ScanwerkError::Decode {
                source_name: source_name.to_string(),
                reason: "image has no pixels".into(),
            });
        }
        debug!(
            width = decoded.width(),
            height = decoded.height(),
            "Image decoded from bytes"
        );
        Ok(Self {
            image: decoded.to_rgb8(),
        })
    }

    /// Wrap an already-decoded raster.
    pub fn from_rgb(image: RgbImage) -> Self {
        Self { image }
    }

    // -- Accessors ------------------------------------------------------------

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn into_rgb(self) -> RgbImage {
        self.image
    }

    // -- Geometry -------------------------------------------------------------

    /// Rotate about the centre by `degrees`, keeping the canvas size.
    ///
    /// Pixels uncovered by the rotation take the `fill` colour.
    pub fn rotate_with_fill(self, degrees: f32, fill: Rgb<u8>) -> Self {
        let rotated = geometric_transformations::rotate_about_center(
            &self.image,
            degrees.to_radians(),
            Interpolation::Bilinear,
            fill,
        );
        Self { image: rotated }
    }

    /// Map the raster's corners (top-left, top-right, bottom-right,
    /// bottom-left) onto `corners`, keeping the canvas size.
    ///
    /// Returns `Err` if the corner quadrilateral is degenerate.
    pub fn warp_corners(self, corners: [(f32, f32); 4], fill: Rgb<u8>) -> Result<Self> {
        let (w, h) = (self.width() as f32, self.height() as f32);
        let source = [(0.0, 0.0), (w, 0.0), (w, h), (0.0, h)];
        let projection = Projection::from_control_points(source, corners).ok_or_else(|| {
            ScanwerkError::Image(format!("degenerate perspective corners {corners:?}"))
        })?;

        let mut output = RgbImage::new(self.width(), self.height());
        warp_into(
            &self.image,
            &projection,
            Interpolation::Bilinear,
            fill,
            &mut output,
        );
        Ok(Self { image: output })
    }

    // -- Photometric ----------------------------------------------------------

    /// CLAHE on the L* channel, leaving chroma untouched.
    pub fn equalize_lightness(self, clip_limit: f32, grid: u32) -> Self {
        let mut planes = rgb_to_lab(&self.image);
        planes.lightness = clahe(&planes.lightness, clip_limit, grid, grid);
        Self {
            image: lab_to_rgb(&planes),
        }
    }

    /// Add zero-mean Gaussian noise with standard deviation `sigma`,
    /// independently per channel, clipped to 0..=255.
    pub fn add_gaussian_noise(mut self, sigma: f32, seed: u64) -> Self {
        gaussian_noise_mut(&mut self.image, 0.0, f64::from(sigma), seed);
        self
    }

    /// Multiply by a brightness mask of the same dimensions.
    pub fn apply_mask(mut self, mask: &Mask) -> Self {
        mask.apply(&mut self.image);
        self
    }

    /// Gaussian blur with an explicit odd `kernel_size` and `sigma`.
    pub fn gaussian_blur(self, kernel_size: usize, sigma: f32) -> Self {
        let kernel = gaussian_kernel(kernel_size, sigma);
        Self {
            image: separable_filter_equal(&self.image, &kernel),
        }
    }

    /// Scale the red, green and blue channels by the given factors.
    pub fn scale_channels(mut self, factors: [f32; 3]) -> Self {
        for pixel in self.image.pixels_mut() {
            for (value, factor) in pixel.0.iter_mut().zip(factors) {
                *value = (f32::from(*value) * factor).clamp(0.0, 255.0) as u8;
            }
        }
        self
    }

    /// Draw filled specks over the raster. Specks may overlap the border.
    pub fn draw_specks(mut self, specks: &[Speck]) -> Self {
        for speck in specks {
            draw_filled_circle_mut(
                &mut self.image,
                speck.center,
                speck.radius,
                Rgb([speck.gray; 3]),
            );
        }
        self
    }

    /// Encode as JPEG at `quality` and decode again, keeping the artifacts.
    pub fn recompress(self, quality: u8) -> Result<Self> {
        let bytes = self.to_jpeg_bytes(quality)?;
        let decoded = image::load_from_memory_with_format(&bytes, ImageFormat::Jpeg)
            .map_err(|err| ScanwerkError::Image(format!("JPEG decoding failed: {err}")))?;
        Ok(Self {
            image: decoded.to_rgb8(),
        })
    }

    // -- Output ---------------------------------------------------------------

    /// Encode the current raster as PNG bytes.
    pub fn to_png_bytes(&self) -> Result<Vec<u8>> {
        let mut buffer = Vec::new();
        let mut cursor = std::io::Cursor::new(&mut buffer);
        DynamicImage::ImageRgb8(self.image.clone())
            .write_to(&mut cursor, ImageFormat::Png)
            .map_err(|err| ScanwerkError::Image(format!("PNG encoding failed: {err}")))?;
        Ok(buffer)
    }

    /// Encode the current raster as JPEG bytes with the given quality (1-100).
    pub fn to_jpeg_bytes(&self, quality: u8) -> Result<Vec<u8>> {
        let mut buffer = Vec::new();
        let encoder = JpegEncoder::new_with_quality(&mut buffer, quality);
        self.image
            .write_with_encoder(encoder)
            .map_err(|err| ScanwerkError::Image(format!("JPEG encoding failed: {err}")))?;
        Ok(buffer)
    }
}

/// Normalised 1-D Gaussian kernel of `size` taps centred on the middle tap.
pub fn gaussian_kernel(size: usize, sigma: f32) -> Vec<f32> {
    let size = size.max(1);
    let half = (size - 1) as f32 / 2.0;
    let denom = 2.0 * sigma * sigma;
    let weights: Vec<f32> = (0..size)
        .map(|i| {
            let d = i as f32 - half;
            (-d * d / denom).exp()
        })
        .collect();
    let total: f32 = weights.iter().sum();
    weights.into_iter().map(|w| w / total).collect()
}
