// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF renderer: wrap a degraded raster as a single fixed-size page using
// `lopdf`.
//
// The raster is JPEG-encoded once into a scoped temporary file and the
// encoded stream is embedded as-is (DCTDecode), the same way img2pdf-style
// tools avoid a second lossy pass.

use std::io::Write;
use std::path::PathBuf;

use image::RgbImage;
use image::codecs::jpeg::JpegEncoder;
use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, Stream, dictionary};
use scanwerk_core::PaperSize;
use scanwerk_core::error::{Result, ScanwerkError};
use tracing::{debug, instrument};

/// JPEG quality of the embedded page image.
pub const DEFAULT_QUALITY: u8 = 90;

/// Name of the page image inside the page's XObject resources.
const IMAGE_NAME: &str = "Im0";

/// Where the image lands on the page, in PDF points from the bottom-left.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Placement {
    /// Largest placement of a `image_w`×`image_h` raster that fits inside the
    /// page without cropping, centred on both axes. Scales up as well as down.
    pub fn fit_inside(image_w: u32, image_h: u32, page_w: f32, page_h: f32) -> Self {
        let (w, h) = (image_w.max(1) as f32, image_h.max(1) as f32);
        let scale = (page_w / w).min(page_h / h);
        let width = w * scale;
        let height = h * scale;
        Self {
            x: (page_w - width) / 2.0,
            y: (page_h - height) / 2.0,
            width,
            height,
        }
    }
}

/// Renders rasters into single-page PDF artifacts.
#[derive(Debug, Clone)]
pub struct PdfRenderer {
    /// Physical page size of every artifact.
    paper_size: PaperSize,
    /// JPEG quality of the intermediate encode.
    quality: u8,
    /// Directory for the intermediate encode; the system temp dir if `None`.
    temp_dir: Option<PathBuf>,
}

impl Default for PdfRenderer {
    fn default() -> Self {
        Self::a4()
    }
}

impl PdfRenderer {
    pub fn new(paper_size: PaperSize, quality: u8) -> Self {
        Self {
            paper_size,
            quality: quality.clamp(1, 100),
            temp_dir: None,
        }
    }

    /// A4 pages at quality 90.
    pub fn a4() -> Self {
        Self::new(PaperSize::A4, DEFAULT_QUALITY)
    }

    /// Put intermediate encodes under `dir` instead of the system temp dir.
    pub fn with_temp_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.temp_dir = Some(dir.into());
        self
    }

    /// Render `raster` as a one-page PDF and return the document bytes.
    #[instrument(skip(self, raster), fields(width = raster.width(), height = raster.height()))]
    pub fn render(&self, raster: &RgbImage) -> Result<Vec<u8>> {
        if raster.width() == 0 || raster.height() == 0 {
            return Err(ScanwerkError::Render("cannot render an empty raster".into()));
        }

        let jpeg = self.encode_intermediate(raster)?;
        let (page_w, page_h) = self.paper_size.dimensions_pt();
        let placement = Placement::fit_inside(raster.width(), raster.height(), page_w, page_h);
        let bytes = build_page(&jpeg, raster.width(), raster.height(), page_w, page_h, placement)?;

        debug!(
            jpeg_bytes = jpeg.len(),
            pdf_bytes = bytes.len(),
            ?placement,
            "Artifact rendered"
        );
        Ok(bytes)
    }

    /// JPEG-encode through a temporary file that is removed on every path:
    /// explicitly via `close` on success, by `Drop` on any early return.
    fn encode_intermediate(&self, raster: &RgbImage) -> Result<Vec<u8>> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("scanwerk-").suffix(".jpg");
        let mut temp = match &self.temp_dir {
            Some(dir) => builder.tempfile_in(dir),
            None => builder.tempfile(),
        }
        .map_err(|err| ScanwerkError::Render(format!("cannot create intermediate file: {err}")))?;

        {
            let encoder = JpegEncoder::new_with_quality(temp.as_file_mut(), self.quality);
            raster
                .write_with_encoder(encoder)
                .map_err(|err| ScanwerkError::Render(format!("JPEG encoding failed: {err}")))?;
        }
        temp.as_file_mut()
            .flush()
            .map_err(|err| ScanwerkError::Render(format!("flushing intermediate: {err}")))?;

        let jpeg = std::fs::read(temp.path())
            .map_err(|err| ScanwerkError::Render(format!("reading intermediate: {err}")))?;
        temp.close()
            .map_err(|err| ScanwerkError::Render(format!("removing intermediate: {err}")))?;
        Ok(jpeg)
    }
}

/// Assemble a one-page document showing `jpeg` at `placement`.
fn build_page(
    jpeg: &[u8],
    image_w: u32,
    image_h: u32,
    page_w: f32,
    page_h: f32,
    placement: Placement,
) -> Result<Vec<u8>> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let image = Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => i64::from(image_w),
            "Height" => i64::from(image_h),
            "ColorSpace" => "DeviceRGB",
            "BitsPerComponent" => 8,
            "Filter" => "DCTDecode",
        },
        jpeg.to_vec(),
    )
    .with_compression(false);
    let image_id = doc.add_object(image);

    let content = Content {
        operations: vec![
            Operation::new("q", vec![]),
            Operation::new(
                "cm",
                vec![
                    placement.width.into(),
                    0.into(),
                    0.into(),
                    placement.height.into(),
                    placement.x.into(),
                    placement.y.into(),
                ],
            ),
            Operation::new("Do", vec![Object::Name(IMAGE_NAME.as_bytes().to_vec())]),
            Operation::new("Q", vec![]),
        ],
    };
    let encoded = content
        .encode()
        .map_err(|err| ScanwerkError::Render(format!("page content encoding failed: {err}")))?;
    let content_id = doc.add_object(Stream::new(dictionary! {}, encoded));

    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "MediaBox" => vec![0.into(), 0.into(), page_w.into(), page_h.into()],
        "Contents" => content_id,
        "Resources" => dictionary! {
            "XObject" => dictionary! {
                IMAGE_NAME => image_id,
            },
        },
    });

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut output = Vec::new();
    doc.save_to(&mut output)
        .map_err(|err| ScanwerkError::Render(format!("PDF serialisation failed: {err}")))?;
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::reader::PdfReader;
    use image::Rgb;

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 0.05
    }

    #[test]
    fn landscape_fits_width_and_centres_vertically() {
        let p = Placement::fit_inside(1000, 800, 595.2756, 841.8898);
        assert!(close(p.width, 595.2756));
        assert!(close(p.height, 476.2205));
        assert!(close(p.x, 0.0));
        assert!(close(p.y, (841.8898 - 476.2205) / 2.0));
    }

    #[test]
    fn tall_image_fits_height() {
        let p = Placement::fit_inside(100, 1000, 595.2756, 841.8898);
        assert!(close(p.height, 841.8898));
        assert!(close(p.width, 84.18898));
        assert!(close(p.y, 0.0));
        assert!(close(p.x + p.width / 2.0, 595.2756 / 2.0));
    }

    #[test]
    fn small_images_are_scaled_up() {
        let p = Placement::fit_inside(21, 29, 595.2756, 841.8898);
        assert!(p.width > 500.0);
    }

    #[test]
    fn renders_one_a4_page_with_centred_image() {
        let raster = RgbImage::from_pixel(400, 300, Rgb([200, 180, 160]));
        let bytes = PdfRenderer::a4().render(&raster).unwrap();
        assert!(bytes.starts_with(b"%PDF-"));

        let reader = PdfReader::from_bytes(&bytes).unwrap();
        assert_eq!(reader.page_count(), 1);

        let (w_mm, h_mm) = reader.page_size_mm(1).unwrap();
        assert!((w_mm - 210.0).abs() < 0.1);
        assert!((h_mm - 297.0).abs() < 0.1);

        let placement = reader.image_placement(1).unwrap();
        let (page_w, page_h) = reader.page_size_pt(1).unwrap();
        assert!(placement.x >= -0.01 && placement.y >= -0.01);
        assert!(placement.x + placement.width <= page_w + 0.01);
        assert!(placement.y + placement.height <= page_h + 0.01);
        assert!(close(placement.width / placement.height, 400.0 / 300.0));
        assert!(close(placement.x + placement.width / 2.0, page_w / 2.0));
        assert!(close(placement.y + placement.height / 2.0, page_h / 2.0));

        let info = reader.embedded_image(1).unwrap();
        assert_eq!((info.width, info.height), (400, 300));
        assert_eq!(info.filter.as_deref(), Some("DCTDecode"));
    }

    #[test]
    fn custom_paper_size_is_honoured() {
        let raster = RgbImage::from_pixel(50, 50, Rgb([0, 0, 0]));
        let renderer = PdfRenderer::new(PaperSize::Letter, 80);
        let bytes = renderer.render(&raster).unwrap();
        let reader = PdfReader::from_bytes(&bytes).unwrap();
        let (w_mm, h_mm) = reader.page_size_mm(1).unwrap();
        let (expected_w, expected_h) = PaperSize::Letter.dimensions_mm();
        assert!((w_mm - expected_w as f32).abs() < 0.1);
        assert!((h_mm - expected_h as f32).abs() < 0.1);
    }

    #[test]
    fn intermediate_file_is_removed() {
        let dir = tempfile::tempdir().unwrap();
        let renderer = PdfRenderer::a4().with_temp_dir(dir.path());
        let raster = RgbImage::from_pixel(64, 48, Rgb([10, 20, 30]));
        renderer.render(&raster).unwrap();
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn missing_temp_dir_is_a_render_failure() {
        let dir = tempfile::tempdir().unwrap();
        let renderer = PdfRenderer::a4().with_temp_dir(dir.path().join("absent"));
        let raster = RgbImage::from_pixel(8, 8, Rgb([10, 20, 30]));
        let err = renderer.render(&raster).unwrap_err();
        assert!(matches!(err, ScanwerkError::Render(_)));
    }

    #[test]
    fn empty_raster_is_rejected() {
        assert!(PdfRenderer::a4().render(&RgbImage::new(0, 0)).is_err());
    }
}
