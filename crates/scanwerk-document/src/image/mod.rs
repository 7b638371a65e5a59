// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image module: raster primitives the degradation effects are composed from.

pub mod clahe;
pub mod color;
pub mod masks;
pub mod processor;

pub use masks::Mask;
pub use processor::ImageProcessor;
