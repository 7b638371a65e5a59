// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Run statistics reported at the end of a batch.

use std::fmt;
use std::time::Duration;

use scanwerk_core::{EffectKind, FailureStage};
use serde::{Deserialize, Serialize};

/// One isolated failure: which image, which effect (if any), which stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailureRecord {
    pub ordinal: usize,
    pub source: String,
    /// `None` for decode failures, which happen before any effect runs.
    pub effect: Option<EffectKind>,
    pub stage: FailureStage,
    pub reason: String,
}

/// Aggregate counters for one batch run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub images_discovered: usize,
    pub images_loaded: usize,
    pub artifacts_produced: usize,
    pub decode_failures: usize,
    pub effect_failures: usize,
    pub render_failures: usize,
    pub write_failures: usize,
    pub total_artifact_bytes: u64,
    pub elapsed: Duration,
    pub failures: Vec<FailureRecord>,
}

impl BatchSummary {
    /// Count a failure under its stage and keep its detail.
    pub fn record_failure(&mut self, failure: FailureRecord) {
        match failure.stage {
            FailureStage::Decode => self.decode_failures += 1,
            FailureStage::Effect => self.effect_failures += 1,
            FailureStage::Render => self.render_failures += 1,
            FailureStage::Write => self.write_failures += 1,
        }
        self.failures.push(failure);
    }

    pub fn record_artifact(&mut self, bytes: u64) {
        self.artifacts_produced += 1;
        self.total_artifact_bytes += bytes;
    }

    /// Total failures across all stages.
    pub fn errors(&self) -> usize {
        self.decode_failures + self.effect_failures + self.render_failures + self.write_failures
    }
}

impl fmt::Display for BatchSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Images discovered:  {}", self.images_discovered)?;
        writeln!(f, "Images loaded:      {}", self.images_loaded)?;
        writeln!(f, "Artifacts produced: {}", self.artifacts_produced)?;
        writeln!(
            f,
            "Errors:             {} (decode {}, effect {}, render {}, write {})",
            self.errors(),
            self.decode_failures,
            self.effect_failures,
            self.render_failures,
            self.write_failures
        )?;
        writeln!(
            f,
            "Total size:         {:.2} MB",
            self.total_artifact_bytes as f64 / (1024.0 * 1024.0)
        )?;
        write!(f, "Elapsed:            {:.1} s", self.elapsed.as_secs_f64())
    }
}
