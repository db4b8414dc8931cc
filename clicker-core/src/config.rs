//! Tunable engine constants.

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// Lifetime points required before the first prestige.
pub const DEFAULT_PRESTIGE_THRESHOLD: f64 = 1_000_000.0;

/// Multiplier gained per prestige level.
pub const DEFAULT_MULTIPLIER_STEP: f64 = 0.5;

/// Longest idle gap (seconds) rewarded by a single passive tick: 8 hours.
pub const DEFAULT_MAX_IDLE_SECS: u64 = 8 * 60 * 60;

/// Engine tuning shared by every session.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Points that must be earned in a run before prestige is allowed.
    pub prestige_threshold: f64,
    /// Multiplier increase per prestige level.
    pub multiplier_step: f64,
    /// Cap on the elapsed time credited by one passive tick.
    pub max_idle_secs: u64,
}

impl EngineConfig {
    /// Override the prestige threshold.
    #[must_use]
    pub fn with_prestige_threshold(mut self, threshold: f64) -> Self {
        self.prestige_threshold = threshold;
        self
    }

    /// Override the passive accrual cap.
    #[must_use]
    pub fn with_max_idle_secs(mut self, secs: u64) -> Self {
        self.max_idle_secs = secs;
        self
    }

    /// Check that every tunable is usable.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidInput`] for a non-positive threshold or
    /// multiplier step.
    pub fn validate(&self) -> EngineResult<()> {
        if !(self.prestige_threshold > 0.0 && self.prestige_threshold.is_finite()) {
            return Err(EngineError::InvalidInput(format!(
                "prestige_threshold must be positive, got {}",
                self.prestige_threshold
            )));
        }
        if !(self.multiplier_step > 0.0 && self.multiplier_step.is_finite()) {
            return Err(EngineError::InvalidInput(format!(
                "multiplier_step must be positive, got {}",
                self.multiplier_step
            )));
        }
        Ok(())
    }

    /// Override the per-level multiplier step.
    #[must_use]
    pub fn with_multiplier_step(mut self, step: f64) -> Self {
        self.multiplier_step = step;
        self
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            prestige_threshold: DEFAULT_PRESTIGE_THRESHOLD,
            multiplier_step: DEFAULT_MULTIPLIER_STEP,
            max_idle_secs: DEFAULT_MAX_IDLE_SECS,
        }
    }
}
