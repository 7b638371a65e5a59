// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Deterministic artifact file names. Names depend only on the source's
// ordinal and the effect, never on completion order or random draws.

use std::path::Path;

use scanwerk_core::{EffectKind, RunMode};

/// Artifact name for `ordinal` in the given run mode.
///
/// All-effects runs produce `page-007_scanner.pdf`; single-random runs
/// produce `screen-007.pdf`.
pub fn artifact_name(ordinal: usize, effect: EffectKind, mode: RunMode) -> String {
    match mode {
        RunMode::AllEffects => format!("page-{ordinal:03}_{effect}.pdf"),
        RunMode::SingleRandom => format!("screen-{ordinal:03}.pdf"),
    }
}

/// Artifact name for single-image mode: `<stem>_<effect>.pdf`.
pub fn single_image_name(source: &Path, effect: EffectKind) -> String {
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string());
    format!("{stem}_{effect}.pdf")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn batch_names_are_zero_padded() {
        assert_eq!(
            artifact_name(7, EffectKind::Photocopy, RunMode::AllEffects),
            "page-007_photocopy.pdf"
        );
        assert_eq!(
            artifact_name(1234, EffectKind::Phone, RunMode::AllEffects),
            "page-1234_phone.pdf"
        );
        assert_eq!(
            artifact_name(12, EffectKind::Scanner, RunMode::SingleRandom),
            "screen-012.pdf"
        );
    }

    #[test]
    fn single_image_names_use_the_stem() {
        assert_eq!(
            single_image_name(Path::new("/tmp/shots/login.page.png"), EffectKind::Scanner),
            "login.page_scanner.pdf"
        );
    }
}
