// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF module: rendering degraded rasters to single-page artifacts, and
// inspecting those artifacts.

pub mod reader;
pub mod writer;

pub use reader::{EmbeddedImage, PdfReader};
pub use writer::{PdfRenderer, Placement};
