// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Augmentation run configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, ScanwerkError};
use crate::types::{EffectKind, IntensityRange, PaperSize, RunMode};

/// Settings for one augmentation run.
///
/// Every field has a default, so a JSON config file only needs to name the
/// fields it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AugmentConfig {
    /// Page size every artifact is laid out on.
    pub paper_size: PaperSize,
    /// All effects per image, or one random effect per image.
    pub mode: RunMode,
    /// Effects to apply, in application order.
    pub effects: Vec<EffectKind>,
    /// Range each effect invocation draws its intensity from.
    pub intensity: IntensityRange,
    /// JPEG quality of the image embedded in each artifact (1-100).
    pub render_quality: u8,
    /// Base seed for reproducible runs. `None` draws from OS entropy.
    pub seed: Option<u64>,
    /// Worker threads. 1 processes images strictly in sequence.
    pub workers: usize,
    /// Write a `manifest.jsonl` label file next to the artifacts.
    pub write_manifest: bool,
}

impl Default for AugmentConfig {
    fn default() -> Self {
        Self {
            paper_size: PaperSize::A4,
            mode: RunMode::AllEffects,
            effects: EffectKind::ALL.to_vec(),
            intensity: IntensityRange::BATCH,
            render_quality: 90,
            seed: None,
            workers: 1,
            write_manifest: true,
        }
    }
}

impl AugmentConfig {
    /// Load a config from a JSON file and validate it.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// Check invariants that serde cannot express.
    pub fn validate(&self) -> Result<()> {
        if self.effects.is_empty() {
            return Err(ScanwerkError::InvalidConfig(
                "at least one effect must be enabled".into(),
            ));
        }
        self.intensity.validate()?;
        if !(1..=100).contains(&self.render_quality) {
            return Err(ScanwerkError::InvalidConfig(format!(
                "render quality must be within 1..=100, got {}",
                self.render_quality
            )));
        }
        if self.workers == 0 {
            return Err(ScanwerkError::InvalidConfig(
                "worker count must be at least 1".into(),
            ));
        }
        let (w, h) = self.paper_size.dimensions_mm();
        if w == 0 || h == 0 {
            return Err(ScanwerkError::InvalidConfig(format!(
                "paper size must be non-empty, got {w}x{h} mm"
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = AugmentConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.effects, EffectKind::ALL.to_vec());
        assert_eq!(config.render_quality, 90);
        assert_eq!(config.paper_size, PaperSize::A4);
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config: AugmentConfig =
            serde_json::from_str(r#"{ "mode": "single-random", "seed": 7 }"#).unwrap();
        assert_eq!(config.mode, RunMode::SingleRandom);
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.workers, 1);
        assert_eq!(config.intensity, IntensityRange::BATCH);
    }

    #[test]
    fn validation_rejects_bad_values() {
        let mut config = AugmentConfig::default();
        config.effects.clear();
        assert!(config.validate().is_err());

        let mut config = AugmentConfig::default();
        config.render_quality = 0;
        assert!(config.validate().is_err());

        let mut config = AugmentConfig::default();
        config.workers = 0;
        assert!(config.validate().is_err());

        let mut config = AugmentConfig::default();
        config.intensity = IntensityRange { min: 1.5, max: 0.5 };
        assert!(config.validate().is_err());
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scanwerk.json");
        std::fs::write(&path, r#"{ "effects": ["photocopy"], "workers": 4 }"#).unwrap();

        let config = AugmentConfig::load(&path).unwrap();
        assert_eq!(config.effects, vec![EffectKind::Photocopy]);
        assert_eq!(config.workers, 4);

        std::fs::write(&path, r#"{ "render_quality": 0 }"#).unwrap();
        assert!(matches!(
            AugmentConfig::load(&path),
            Err(ScanwerkError::InvalidConfig(_))
        ));
    }
}
