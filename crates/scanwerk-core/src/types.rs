// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the Scanwerk degradation pipeline.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ScanwerkError;

// 1 in = 25.4 mm = 72 pt.
const MM_PER_INCH: f32 = 25.4;
const PT_PER_INCH: f32 = 72.0;

/// The capture device a degradation recipe imitates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EffectKind {
    /// Flatbed scanner: slight skew, local contrast, dust, light falloff.
    Scanner,
    /// Handheld phone photo: perspective skew, uneven light, blur, recompression.
    Phone,
    /// Photocopier: grayscale, hard contrast, drum streaks, dark edges.
    Photocopy,
}

impl EffectKind {
    /// All effects, in the order batch mode applies them.
    pub const ALL: [EffectKind; 3] = [Self::Scanner, Self::Phone, Self::Photocopy];

    /// Name used in artifact file names and manifests.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Scanner => "scanner",
            Self::Phone => "phone",
            Self::Photocopy => "photocopy",
        }
    }

    /// Intensity sub-range used when a single image is degraded on its own.
    pub fn default_range(&self) -> IntensityRange {
        IntensityRange::SINGLE_IMAGE
    }
}

impl std::fmt::Display for EffectKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for EffectKind {
    type Err = ScanwerkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "scanner" | "scan" => Ok(Self::Scanner),
            "phone" | "camera" => Ok(Self::Phone),
            "photocopy" | "copy" => Ok(Self::Photocopy),
            other => Err(ScanwerkError::InvalidConfig(format!(
                "unknown effect '{other}' (expected scanner, phone or photocopy)"
            ))),
        }
    }
}

/// Severity of one effect invocation.
///
/// Always within (0, [`Intensity::MAX`]]. Batch runs draw it from [0.4, 1.6].
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f32", into = "f32")]
pub struct Intensity(f32);

impl Intensity {
    /// Largest accepted intensity. Effect parameters such as speck counts
    /// scale linearly with it.
    pub const MAX: f32 = 10.0;

    pub fn new(value: f32) -> Result<Self, ScanwerkError> {
        if value.is_finite() && value > 0.0 && value <= Self::MAX {
            Ok(Self(value))
        } else {
            Err(ScanwerkError::InvalidIntensity(value))
        }
    }

    pub fn value(self) -> f32 {
        self.0
    }
}

impl TryFrom<f32> for Intensity {
    type Error = ScanwerkError;

    fn try_from(value: f32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Intensity> for f32 {
    fn from(intensity: Intensity) -> Self {
        intensity.0
    }
}

impl std::fmt::Display for Intensity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

/// Closed interval intensities are sampled from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IntensityRange {
    pub min: f32,
    pub max: f32,
}

impl IntensityRange {
    /// Range used for every effect invocation in batch mode.
    pub const BATCH: Self = Self { min: 0.4, max: 1.6 };
    /// Narrower range used when degrading a single image.
    pub const SINGLE_IMAGE: Self = Self { min: 0.5, max: 1.5 };

    pub fn new(min: f32, max: f32) -> Result<Self, ScanwerkError> {
        let range = Self { min, max };
        range.validate()?;
        Ok(range)
    }

    /// Reject non-finite, non-positive or inverted bounds.
    pub fn validate(&self) -> Result<(), ScanwerkError> {
        if !(self.min.is_finite() && self.max.is_finite())
            || self.min <= 0.0
            || self.max > Intensity::MAX
        {
            return Err(ScanwerkError::InvalidConfig(format!(
                "intensity bounds must lie within (0, {}], got [{}, {}]",
                Intensity::MAX,
                self.min,
                self.max
            )));
        }
        if self.min > self.max {
            return Err(ScanwerkError::InvalidConfig(format!(
                "intensity range is inverted: [{}, {}]",
                self.min, self.max
            )));
        }
        Ok(())
    }

    pub fn contains(&self, value: f32) -> bool {
        (self.min..=self.max).contains(&value)
    }
}

impl Default for IntensityRange {
    fn default() -> Self {
        Self::BATCH
    }
}

/// How many effects each source image receives in a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RunMode {
    /// Every configured effect, one artifact each.
    #[default]
    AllEffects,
    /// One randomly chosen effect, one artifact per image.
    SingleRandom,
}

/// Standard paper sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PaperSize {
    #[default]
    A4,
    A3,
    A5,
    Letter,
    Legal,
    Custom { width_mm: u32, height_mm: u32 },
}

impl PaperSize {
    /// Dimensions in millimetres (width, height).
    pub fn dimensions_mm(&self) -> (u32, u32) {
        match self {
            Self::A4 => (210, 297),
            Self::A3 => (297, 420),
            Self::A5 => (148, 210),
            Self::Letter => (216, 279),
            Self::Legal => (216, 356),
            Self::Custom {
                width_mm,
                height_mm,
            } => (*width_mm, *height_mm),
        }
    }

    /// Dimensions in PDF points (width, height).
    pub fn dimensions_pt(&self) -> (f32, f32) {
        let (w, h) = self.dimensions_mm();
        (mm_to_pt(w as f32), mm_to_pt(h as f32))
    }
}

impl FromStr for PaperSize {
    type Err = ScanwerkError;

    /// Accepts a named size (`a4`, `letter`, ...) or `WIDTHxHEIGHT` in mm.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_ascii_lowercase();
        match lower.as_str() {
            "a4" => return Ok(Self::A4),
            "a3" => return Ok(Self::A3),
            "a5" => return Ok(Self::A5),
            "letter" => return Ok(Self::Letter),
            "legal" => return Ok(Self::Legal),
            _ => {}
        }
        let invalid = || ScanwerkError::InvalidConfig(format!("unknown paper size '{s}'"));
        let (w, h) = lower.split_once('x').ok_or_else(invalid)?;
        let width_mm: u32 = w.trim().parse().map_err(|_| invalid())?;
        let height_mm: u32 = h.trim().parse().map_err(|_| invalid())?;
        if width_mm == 0 || height_mm == 0 {
            return Err(invalid());
        }
        Ok(Self::Custom {
            width_mm,
            height_mm,
        })
    }
}

/// Convert millimetres to PDF points.
pub fn mm_to_pt(mm: f32) -> f32 {
    mm * PT_PER_INCH / MM_PER_INCH
}

/// Convert PDF points to millimetres.
pub fn pt_to_mm(pt: f32) -> f32 {
    pt * MM_PER_INCH / PT_PER_INCH
}
