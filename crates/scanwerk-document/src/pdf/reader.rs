// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF reader: open rendered artifacts and report page geometry and the
// embedded page image using the `lopdf` crate.

use std::path::Path;

use lopdf::content::Content;
use lopdf::{Dictionary, Document, Object, ObjectId};
use scanwerk_core::error::{Result, ScanwerkError};
use scanwerk_core::pt_to_mm;
use tracing::{debug, instrument};

use super::writer::Placement;

/// Metadata of an image XObject drawn on a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbeddedImage {
    pub width: u32,
    pub height: u32,
    /// Stream filter name (`DCTDecode` for JPEG), if any.
    pub filter: Option<String>,
    /// Size of the raw (still encoded) stream.
    pub encoded_len: usize,
}

/// Read-only view over an existing PDF.
pub struct PdfReader {
    /// The underlying lopdf document.
    document: Document,
    /// Source path, if opened from a file (useful for diagnostics).
    source_path: Option<String>,
}

impl PdfReader {
    // -- Construction ---------------------------------------------------------

    /// Open a PDF from the filesystem.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path_ref = path.as_ref();
        let document = Document::load(path_ref).map_err(|err| {
            ScanwerkError::Inspect(format!("failed to open {}: {}", path_ref.display(), err))
        })?;

        debug!(pages = document.get_pages().len(), "PDF loaded");

        Ok(Self {
            document,
            source_path: Some(path_ref.display().to_string()),
        })
    }

    /// Create a reader from raw PDF bytes already in memory.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let document = Document::load_mem(data).map_err(|err| {
            ScanwerkError::Inspect(format!("failed to load PDF from memory: {}", err))
        })?;

        Ok(Self {
            document,
            source_path: None,
        })
    }

    // -- Inspection -----------------------------------------------------------

    /// Number of pages in the document.
    pub fn page_count(&self) -> usize {
        self.document.get_pages().len()
    }

    /// Return the source path if the reader was created via [`PdfReader::open`].
    pub fn source_path(&self) -> Option<&str> {
        self.source_path.as_deref()
    }

    /// Page size from the MediaBox, in points. Pages are 1-indexed.
    pub fn page_size_pt(&self, page_number: u32) -> Result<(f32, f32)> {
        let page = self.page_dict(page_number)?;
        let media_box = page
            .get(b"MediaBox")
            .and_then(|obj| self.resolve(obj))
            .and_then(Object::as_array)
            .map_err(|err| inspect_err("MediaBox", err))?;

        let coords = media_box
            .iter()
            .map(Object::as_float)
            .collect::<std::result::Result<Vec<f32>, _>>()
            .map_err(|err| inspect_err("MediaBox", err))?;
        match coords.as_slice() {
            [x0, y0, x1, y1] => Ok((x1 - x0, y1 - y0)),
            other => Err(ScanwerkError::Inspect(format!(
                "MediaBox has {} entries",
                other.len()
            ))),
        }
    }

    /// Page size in millimetres.
    pub fn page_size_mm(&self, page_number: u32) -> Result<(f32, f32)> {
        let (w, h) = self.page_size_pt(page_number)?;
        Ok((pt_to_mm(w), pt_to_mm(h)))
    }

    /// Placement of the first image on the page, taken from the `cm`
    /// operator that precedes its `Do`.
    pub fn image_placement(&self, page_number: u32) -> Result<Placement> {
        let page_id = self.page_id(page_number)?;
        let raw = self
            .document
            .get_page_content(page_id)
            .map_err(|err| inspect_err("page content", err))?;
        let content = Content::decode(&raw).map_err(|err| inspect_err("page content", err))?;

        let mut matrix: Option<[f32; 6]> = None;
        for op in &content.operations {
            match op.operator.as_str() {
                "cm" => {
                    let values = op
                        .operands
                        .iter()
                        .map(Object::as_float)
                        .collect::<std::result::Result<Vec<f32>, _>>()
                        .map_err(|err| inspect_err("cm operands", err))?;
                    if let [a, b, c, d, e, f] = values.as_slice() {
                        matrix = Some([*a, *b, *c, *d, *e, *f]);
                    }
                }
                "Do" => {
                    let [a, _, _, d, e, f] = matrix.ok_or_else(|| {
                        ScanwerkError::Inspect("image drawn without a transform".into())
                    })?;
                    return Ok(Placement {
                        x: e,
                        y: f,
                        width: a,
                        height: d,
                    });
                }
                _ => {}
            }
        }

        Err(ScanwerkError::Inspect(format!(
            "page {page_number} draws no image"
        )))
    }

    /// Dimensions and encoding of the first image XObject on the page.
    pub fn embedded_image(&self, page_number: u32) -> Result<EmbeddedImage> {
        let page = self.page_dict(page_number)?;
        let xobjects = page
            .get(b"Resources")
            .and_then(|obj| self.resolve(obj))
            .and_then(Object::as_dict)
            .and_then(|resources| resources.get(b"XObject"))
            .and_then(|obj| self.resolve(obj))
            .and_then(Object::as_dict)
            .map_err(|err| inspect_err("XObject resources", err))?;

        let (_, first) = xobjects
            .iter()
            .next()
            .ok_or_else(|| ScanwerkError::Inspect("page has no XObjects".into()))?;
        let stream = self
            .resolve(first)
            .and_then(Object::as_stream)
            .map_err(|err| inspect_err("image XObject", err))?;

        let dimension = |key: &[u8]| -> Result<u32> {
            stream
                .dict
                .get(key)
                .and_then(Object::as_i64)
                .map(|v| v.max(0) as u32)
                .map_err(|err| inspect_err("image dimensions", err))
        };
        let filter = stream
            .dict
            .get(b"Filter")
            .ok()
            .and_then(|obj| obj.as_name().ok())
            .map(|name| String::from_utf8_lossy(name).into_owned());

        Ok(EmbeddedImage {
            width: dimension(b"Width")?,
            height: dimension(b"Height")?,
            filter,
            encoded_len: stream.content.len(),
        })
    }

    // -- Helpers --------------------------------------------------------------

    fn page_id(&self, page_number: u32) -> Result<ObjectId> {
        let pages = self.document.get_pages();
        pages.get(&page_number).copied().ok_or_else(|| {
            ScanwerkError::Inspect(format!(
                "page {} out of range (document has {} pages)",
                page_number,
                pages.len()
            ))
        })
    }

    fn page_dict(&self, page_number: u32) -> Result<&Dictionary> {
        let id = self.page_id(page_number)?;
        self.document
            .get_object(id)
            .and_then(Object::as_dict)
            .map_err(|err| inspect_err("page dictionary", err))
    }

    /// Follow a reference to its target; other objects are returned as-is.
    fn resolve<'a>(&'a self, obj: &'a Object) -> lopdf::Result<&'a Object> {
        match obj {
            Object::Reference(id) => self.document.get_object(*id),
            other => Ok(other),
        }
    }
}

fn inspect_err(what: &str, err: lopdf::Error) -> ScanwerkError {
    ScanwerkError::Inspect(format!("{what}: {err}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::writer::PdfRenderer;
    use image::{Rgb, RgbImage};

    fn artifact() -> Vec<u8> {
        PdfRenderer::a4()
            .render(&RgbImage::from_pixel(300, 600, Rgb([120, 120, 120])))
            .unwrap()
    }

    #[test]
    fn garbage_is_an_inspect_error() {
        let err = PdfReader::from_bytes(b"not a pdf").err().unwrap();
        assert!(matches!(err, ScanwerkError::Inspect(_)));
    }

    #[test]
    fn page_out_of_range() {
        let reader = PdfReader::from_bytes(&artifact()).unwrap();
        assert!(reader.page_size_pt(0).is_err());
        assert!(reader.page_size_pt(2).is_err());
    }

    #[test]
    fn portrait_image_fills_page_height() {
        let reader = PdfReader::from_bytes(&artifact()).unwrap();
        let (_, page_h) = reader.page_size_pt(1).unwrap();
        let placement = reader.image_placement(1).unwrap();
        assert!((placement.height - page_h).abs() < 0.05);
        assert!((placement.width - page_h / 2.0).abs() < 0.05);
        assert!(placement.y.abs() < 0.05);
    }

    #[test]
    fn open_reads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("page.pdf");
        std::fs::write(&path, artifact()).unwrap();
        let reader = PdfReader::open(&path).unwrap();
        assert_eq!(reader.page_count(), 1);
        assert!(reader.source_path().is_some());
        assert!(reader.embedded_image(1).unwrap().encoded_len > 0);
    }
}
