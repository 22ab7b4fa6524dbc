//! Engine Configuration
//!
//! Every numeric constant of the forgetting curve, the stability growth
//! formula, the mastery ladder, and the hysteresis rules lives here as an
//! injectable struct, so hosts and test suites can exercise edge-case
//! parameterizations deterministically.

use serde::{Deserialize, Serialize};

use crate::scheduler::SchedulerError;
use crate::types::{MAX_DIFFICULTY, MIN_DIFFICULTY};

/// Forgetting-curve and rating-transition parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchedulerConfig {
    /// Power-law decay exponent of the forgetting curve. Negative.
    pub decay: f64,
    /// Curve scale factor. With 19/81 and decay -0.5, retrievability at
    /// elapsed == stability is exactly 0.9.
    pub factor: f64,
    /// Recall probability targeted when inverting the curve for the next
    /// interval. In (0, 1).
    pub target_retention: f64,
    /// Multiplicative stability gain applied on a Hard rating.
    pub hard_gain: f64,
    /// Multiplicative stability gain applied on a Good rating.
    pub good_gain: f64,
    /// Multiplicative stability gain applied on an Easy rating.
    pub easy_gain: f64,
    /// Exponent damping growth as stability rises (diminishing returns).
    pub stability_damp: f64,
    /// Extra growth per unit of forgotten probability when a hard-to-recall
    /// card is still recalled.
    pub retention_boost: f64,
    /// Floor on the growth multiplier for any successful rating. Above 1.
    pub min_success_growth: f64,
    /// Stability multiplier applied on a lapse. In (0, 1).
    pub lapse_penalty: f64,
    /// How much of the lapse penalty survives independent of
    /// retrievability. In [0, 1]; the remainder scales with recall
    /// probability at the time of the lapse.
    pub lapse_retention_weight: f64,
    /// Difficulty delta unit: Again +2 steps, Hard +1, Good 0, Easy -1.
    pub difficulty_step: f64,
    pub min_difficulty: f64,
    pub max_difficulty: f64,
    /// Interval clamp, in days.
    pub min_interval_days: f64,
    pub max_interval_days: f64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            decay: -0.5,
            factor: 19.0 / 81.0,
            target_retention: 0.9,
            hard_gain: 0.1,
            good_gain: 0.3,
            easy_gain: 0.7,
            stability_damp: 0.25,
            retention_boost: 1.0,
            min_success_growth: 1.05,
            lapse_penalty: 0.35,
            lapse_retention_weight: 0.5,
            difficulty_step: 0.6,
            min_difficulty: MIN_DIFFICULTY,
            max_difficulty: MAX_DIFFICULTY,
            min_interval_days: 1.0,
            max_interval_days: 36500.0,
        }
    }
}

impl SchedulerConfig {
    /// Reject parameterizations that would break the scheduling contract.
    pub fn validate(&self) -> Result<(), SchedulerError> {
        if !self.decay.is_finite() || self.decay >= 0.0 {
            return Err(SchedulerError::InvalidConfig(format!(
                "decay must be negative, got {}",
                self.decay
            )));
        }
        if !self.factor.is_finite() || self.factor <= 0.0 {
            return Err(SchedulerError::InvalidConfig(format!(
                "factor must be positive, got {}",
                self.factor
            )));
        }
        if !(self.target_retention > 0.0 && self.target_retention < 1.0) {
            return Err(SchedulerError::InvalidConfig(format!(
                "target retention must be in (0, 1), got {}",
                self.target_retention
            )));
        }
        if self.hard_gain <= 0.0 || self.good_gain <= 0.0 || self.easy_gain <= 0.0 {
            return Err(SchedulerError::InvalidConfig(
                "rating gains must be positive".to_string(),
            ));
        }
        if self.min_success_growth <= 1.0 {
            return Err(SchedulerError::InvalidConfig(format!(
                "min success growth must exceed 1, got {}",
                self.min_success_growth
            )));
        }
        if !(self.lapse_penalty > 0.0 && self.lapse_penalty < 1.0) {
            return Err(SchedulerError::InvalidConfig(format!(
                "lapse penalty must be in (0, 1), got {}",
                self.lapse_penalty
            )));
        }
        if !(0.0..=1.0).contains(&self.lapse_retention_weight) {
            return Err(SchedulerError::InvalidConfig(format!(
                "lapse retention weight must be in [0, 1], got {}",
                self.lapse_retention_weight
            )));
        }
        if self.min_difficulty >= self.max_difficulty || self.min_difficulty <= 0.0 {
            return Err(SchedulerError::InvalidConfig(
                "difficulty bounds out of order".to_string(),
            ));
        }
        if self.min_interval_days <= 0.0 || self.min_interval_days >= self.max_interval_days {
            return Err(SchedulerError::InvalidConfig(
                "interval bounds out of order".to_string(),
            ));
        }
        Ok(())
    }
}

/// Mastery ladder cutoffs and hysteresis parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MasteryConfig {
    /// Stability (days) required for Fragile.
    pub fragile_cutoff: f64,
    /// Stability (days) required for Developing.
    pub developing_cutoff: f64,
    /// Stability (days) required for Solid.
    pub solid_cutoff: f64,
    /// Stability (days) required for Mastered.
    pub mastered_cutoff: f64,
    /// Slope of the cutoff shift per unit of difficulty above the default;
    /// harder concepts need more stability for the same label.
    pub difficulty_shift: f64,
    /// Mastered is withheld from cards with more total lapses than this.
    pub mastered_max_lapses: i32,
    /// How many recent ratings are inspected for the misconception signal.
    pub misconception_window: usize,
    /// Lapses within the window that flag a concept as misconceived.
    pub misconception_lapses: usize,
    /// Consecutive successes required to clear a misconception.
    pub recovery_run: usize,
}

impl Default for MasteryConfig {
    fn default() -> Self {
        Self {
            fragile_cutoff: 1.0,
            developing_cutoff: 3.0,
            solid_cutoff: 10.0,
            mastered_cutoff: 21.0,
            difficulty_shift: 0.5,
            mastered_max_lapses: 2,
            misconception_window: 8,
            misconception_lapses: 3,
            recovery_run: 4,
        }
    }
}

/// Bundled configuration for the whole engine.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineConfig {
    pub scheduler: SchedulerConfig,
    pub mastery: MasteryConfig,
}
