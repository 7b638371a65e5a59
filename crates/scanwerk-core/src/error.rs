// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Scanwerk.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::EffectKind;

/// Top-level error type for all Scanwerk operations.
#[derive(Debug, Error)]
pub enum ScanwerkError {
    // -- Pipeline errors --
    #[error("cannot decode {source_name}: {reason}")]
    Decode { source_name: String, reason: String },

    #[error("{effect} effect failed: {reason}")]
    Effect { effect: EffectKind, reason: String },

    #[error("image processing failed: {0}")]
    Image(String),

    #[error("artifact rendering failed: {0}")]
    Render(String),

    #[error("artifact inspection failed: {0}")]
    Inspect(String),

    #[error("intensity must lie within (0, 10], got {0}")]
    InvalidIntensity(f32),

    // -- Configuration --
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    // -- Storage / persistence --
    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// The pipeline stage an error belongs to.
///
/// The batch orchestrator uses this to decide whether a failure skips the
/// whole source image (`Decode`) or only the effect branch it occurred in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailureStage {
    Decode,
    Effect,
    Render,
    Write,
}

impl ScanwerkError {
    /// Classify this error by pipeline stage.
    pub fn stage(&self) -> FailureStage {
        match self {
            Self::Decode { .. } => FailureStage::Decode,
            Self::Effect { .. } | Self::Image(_) | Self::InvalidIntensity(_) => {
                FailureStage::Effect
            }
            Self::Render(_) | Self::Inspect(_) => FailureStage::Render,
            Self::Io(_) | Self::Serialization(_) | Self::InvalidConfig(_) => FailureStage::Write,
        }
    }

    /// Shorthand for an effect failure.
    pub fn effect(effect: EffectKind, reason: impl Into<String>) -> Self {
        Self::Effect {
            effect,
            reason: reason.into(),
        }
    }
}

impl std::fmt::Display for FailureStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Decode => "decode",
            Self::Effect => "effect",
            Self::Render => "render",
            Self::Write => "write",
        };
        f.write_str(name)
    }
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, ScanwerkError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stages_follow_variants() {
        let decode = ScanwerkError::Decode {
            source_name: "a.png".into(),
            reason: "truncated".into(),
        };
        assert_eq!(decode.stage(), FailureStage::Decode);
        assert_eq!(
            ScanwerkError::effect(EffectKind::Phone, "warp").stage(),
            FailureStage::Effect
        );
        assert_eq!(ScanwerkError::InvalidIntensity(-1.0).stage(), FailureStage::Effect);
        assert_eq!(ScanwerkError::Render("jpeg".into()).stage(), FailureStage::Render);
        let io = ScanwerkError::from(std::io::Error::other("disk full"));
        assert_eq!(io.stage(), FailureStage::Write);
    }

    #[test]
    fn messages_name_the_effect() {
        let err = ScanwerkError::effect(EffectKind::Photocopy, "empty raster");
        assert_eq!(err.to_string(), "photocopy effect failed: empty raster");
    }
}
