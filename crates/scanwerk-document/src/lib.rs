// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// scanwerk-document: Capture degradations and artifact rendering.
//
// Provides the raster primitives (rotation, perspective warp, CLAHE, noise,
// masks, blur, recompression), the three degradation effects built from them
// (scanner, phone camera, photocopy), the intensity sampler, and single-page
// PDF rendering and inspection of the degraded rasters.

pub mod effects;
pub mod image;
pub mod pdf;

// Re-export the primary entry points so callers can use `scanwerk_document::PdfRenderer` etc.
pub use crate::effects::sampler::ParameterSampler;
pub use crate::effects::{
    DegradationEffect, DegradedRaster, EffectRegistry, apply_effect, apply_effect_with, effect_for,
};
pub use crate::image::processor::ImageProcessor;
pub use crate::pdf::reader::{EmbeddedImage, PdfReader};
pub use crate::pdf::writer::{PdfRenderer, Placement};
