// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Degradation effects: each recipe turns a clean raster into one that looks
// captured by a particular device.

pub mod phone;
pub mod photocopy;
pub mod sampler;
pub mod scanner;

use image::RgbImage;
use rand::RngCore;
use scanwerk_core::error::{Result, ScanwerkError};
use scanwerk_core::{EffectKind, Intensity};
use tracing::{debug, instrument};

pub use phone::PhoneCamera;
pub use photocopy::Photocopy;
pub use scanner::Scanner;

/// One degradation recipe.
///
/// Implementations read the source without modifying it and return a new
/// raster of the same size. Every random draw comes from `rng`, so a seeded
/// generator reproduces the output exactly.
pub trait DegradationEffect: Send + Sync {
    fn kind(&self) -> EffectKind;

    fn degrade(
        &self,
        source: &RgbImage,
        intensity: Intensity,
        rng: &mut dyn RngCore,
    ) -> Result<RgbImage>;
}

static SCANNER: Scanner = Scanner;
static PHONE: PhoneCamera = PhoneCamera;
static PHOTOCOPY: Photocopy = Photocopy;

/// Maps each kind to the recipe that implements it.
pub type EffectRegistry = fn(EffectKind) -> &'static dyn DegradationEffect;

/// The recipe registered for `kind`.
pub fn effect_for(kind: EffectKind) -> &'static dyn DegradationEffect {
    match kind {
        EffectKind::Scanner => &SCANNER,
        EffectKind::Phone => &PHONE,
        EffectKind::Photocopy => &PHOTOCOPY,
    }
}

/// A degraded raster tagged with the effect and intensity that produced it.
#[derive(Debug, Clone)]
pub struct DegradedRaster {
    pub image: RgbImage,
    pub effect: EffectKind,
    pub intensity: Intensity,
}

impl DegradedRaster {
    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }
}

/// Run the registered recipe for `kind` on `source`.
pub fn apply_effect(
    kind: EffectKind,
    source: &RgbImage,
    intensity: Intensity,
    rng: &mut dyn RngCore,
) -> Result<DegradedRaster> {
    apply_effect_with(effect_for(kind), source, intensity, rng)
}

/// Run `effect` on `source`.
///
/// Any failure inside the recipe comes back as [`ScanwerkError::Effect`]
/// naming its kind, so callers can isolate it to this branch.
#[instrument(
    skip_all,
    fields(effect = %effect.kind(), width = source.width(), height = source.height())
)]
pub fn apply_effect_with(
    effect: &dyn DegradationEffect,
    source: &RgbImage,
    intensity: Intensity,
    rng: &mut dyn RngCore,
) -> Result<DegradedRaster> {
    let kind = effect.kind();
    if source.width() == 0 || source.height() == 0 {
        return Err(ScanwerkError::effect(kind, "source raster is empty"));
    }

    let image = effect
        .degrade(source, intensity, rng)
        .map_err(|err| match err {
            ScanwerkError::Effect { .. } => err,
            other => ScanwerkError::effect(kind, other.to_string()),
        })?;

    if image.dimensions() != source.dimensions() {
        return Err(ScanwerkError::effect(
            kind,
            format!(
                "output {:?} does not match source {:?}",
                image.dimensions(),
                source.dimensions()
            ),
        ));
    }

    debug!(effect = %kind, %intensity, "Effect applied");
    Ok(DegradedRaster {
        image,
        effect: kind,
        intensity,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn sample_page() -> RgbImage {
        RgbImage::from_fn(96, 64, |x, y| {
            if (x / 8 + y / 8) % 2 == 0 {
                Rgb([250, 250, 250])
            } else {
                Rgb([30, 40, 50])
            }
        })
    }

    #[test]
    fn registry_matches_kinds() {
        for kind in EffectKind::ALL {
            assert_eq!(effect_for(kind).kind(), kind);
        }
    }

    #[test]
    fn apply_tags_output() {
        let mut rng = StdRng::seed_from_u64(1);
        let intensity = Intensity::new(1.1).unwrap();
        let out = apply_effect(EffectKind::Phone, &sample_page(), intensity, &mut rng).unwrap();
        assert_eq!(out.effect, EffectKind::Phone);
        assert_eq!(out.intensity, intensity);
        assert_eq!(out.dimensions(), (96, 64));
    }

    #[test]
    fn empty_source_is_an_effect_failure() {
        let mut rng = StdRng::seed_from_u64(1);
        let err = apply_effect(
            EffectKind::Scanner,
            &RgbImage::new(0, 0),
            Intensity::new(1.0).unwrap(),
            &mut rng,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ScanwerkError::Effect {
                effect: EffectKind::Scanner,
                ..
            }
        ));
    }

    struct Shrinking;

    impl DegradationEffect for Shrinking {
        fn kind(&self) -> EffectKind {
            EffectKind::Photocopy
        }

        fn degrade(
            &self,
            _source: &RgbImage,
            _intensity: Intensity,
            _rng: &mut dyn RngCore,
        ) -> Result<RgbImage> {
            Ok(RgbImage::new(4, 4))
        }
    }

    #[test]
    fn resized_output_is_an_effect_failure() {
        let mut rng = StdRng::seed_from_u64(1);
        let intensity = Intensity::new(1.0).unwrap();
        let err = apply_effect_with(&Shrinking, &sample_page(), intensity, &mut rng).unwrap_err();
        assert!(matches!(
            err,
            ScanwerkError::Effect {
                effect: EffectKind::Photocopy,
                ..
            }
        ));
    }

    #[test]
    fn source_is_left_untouched() {
        let src = sample_page();
        let before = src.clone();
        let mut rng = StdRng::seed_from_u64(9);
        for kind in EffectKind::ALL {
            apply_effect(kind, &src, Intensity::new(1.4).unwrap(), &mut rng).unwrap();
        }
        assert_eq!(src, before);
    }

    #[test]
    fn same_seed_same_pixels() {
        let src = sample_page();
        for kind in EffectKind::ALL {
            let a = apply_effect(
                kind,
                &src,
                Intensity::new(0.8).unwrap(),
                &mut StdRng::seed_from_u64(77),
            )
            .unwrap();
            let b = apply_effect(
                kind,
                &src,
                Intensity::new(0.8).unwrap(),
                &mut StdRng::seed_from_u64(77),
            )
            .unwrap();
            assert_eq!(a.image, b.image, "{kind}");
        }
    }
}
