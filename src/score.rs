//! Daily recovery score computation.
//!
//! # Sports Science Background
//!
//! Readiness to train is approximated from three signals with defined
//! numeric semantics:
//!
//! - **Sleep duration**: restorative capacity ramps linearly between a
//!   5-hour floor and an 8-hour ceiling.
//!
//! - **HRV vs. personal median**: heart rate variability at or above the
//!   athlete's trailing-window median indicates full autonomic recovery;
//!   below the median it scales down linearly. There is no extra credit
//!   for exceeding the median.
//!
//! - **Load vs. personal 75th percentile**: training strain relative to
//!   what is a heavy day *for this athlete*. The relationship is inverse:
//!   a rest day contributes full credit, twice the p75 contributes none.
//!
//! The three sub-scores, each clamped to `[0, 1]`, blend into a 0-100
//! score with fixed weights (sleep 40%, HRV 35%, load 25%). The
//! computation is a pure function of the visible history: no I/O, no
//! logging, no mutation of its inputs, and identical output for
//! identical input.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

use crate::baseline::{BaselineStats, BaselineWindow};
use crate::models::DailyRecord;

/// Weight of the sleep sub-score in the blended result.
pub const SLEEP_WEIGHT: f64 = 0.40;
/// Weight of the HRV sub-score in the blended result.
pub const HRV_WEIGHT: f64 = 0.35;
/// Weight of the load sub-score in the blended result.
pub const LOAD_WEIGHT: f64 = 0.25;

/// Sleep hours at or below which the sleep sub-score is 0.0.
const SLEEP_FLOOR_HOURS: f64 = 5.0;
/// Sleep hours at or above which the sleep sub-score is 1.0.
const SLEEP_CEILING_HOURS: f64 = 8.0;

/// Scoring errors
///
/// Both conditions are caller-visible failures: the engine never
/// substitutes a default score when its inputs are unusable. Callers
/// decide the product-level fallback (skip the day, show "insufficient
/// data", and so on).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScoreError {
    /// No daily record exists for the requested target date.
    #[error("No daily record for {0}")]
    MissingRecord(NaiveDate),

    /// The trailing window cannot produce a usable baseline.
    #[error("Insufficient baseline for {metric}: {reason}")]
    InsufficientBaseline {
        metric: &'static str,
        reason: String,
    },
}

/// Core recovery score engine.
///
/// Stateless apart from its window configuration; safe to share across
/// threads and to invoke concurrently for different athletes or dates.
#[derive(Debug, Clone)]
pub struct RecoveryCalculator {
    window: BaselineWindow,
}

impl RecoveryCalculator {
    /// Create a calculator with the default 30-day trailing window.
    pub fn new() -> Self {
        RecoveryCalculator {
            window: BaselineWindow::default(),
        }
    }

    /// Create a calculator with a custom trailing window.
    pub fn with_window(window: BaselineWindow) -> Self {
        RecoveryCalculator { window }
    }

    /// The window this calculator derives baselines from.
    pub fn window(&self) -> &BaselineWindow {
        &self.window
    }

    /// Compute the recovery score for `target` from an athlete's history.
    ///
    /// `history` is the athlete's daily series keyed by unique date; the
    /// record for `target` must be present. The returned score is in
    /// `[0.0, 100.0]` by construction: each sub-score is clamped to
    /// `[0, 1]` and the weights sum to 1.0.
    ///
    /// # Errors
    ///
    /// - [`ScoreError::MissingRecord`] if `target` has no record.
    /// - [`ScoreError::InsufficientBaseline`] if the trailing window is
    ///   empty, or yields a zero HRV median or zero load p75 (the ratio
    ///   against the baseline would be undefined).
    pub fn compute(
        &self,
        target: NaiveDate,
        history: &BTreeMap<NaiveDate, DailyRecord>,
    ) -> Result<f64, ScoreError> {
        let record = history
            .get(&target)
            .ok_or(ScoreError::MissingRecord(target))?;

        let stats = BaselineStats::from_history(history, target, &self.window).ok_or_else(|| {
            ScoreError::InsufficientBaseline {
                metric: "window",
                reason: format!(
                    "no records in the {} days ending {}",
                    self.window.days, target
                ),
            }
        })?;

        self.compute_from_baseline(record, &stats)
    }

    /// Compute the score for a record against already-derived baselines.
    ///
    /// Useful when the caller assembled the window itself (e.g. batch
    /// scoring a date range with one baseline pass per day).
    pub fn compute_from_baseline(
        &self,
        record: &DailyRecord,
        stats: &BaselineStats,
    ) -> Result<f64, ScoreError> {
        let sleep = sleep_score(record.sleep_hours);
        let hrv = hrv_score(record.hrv, stats.hrv_median)?;
        let load = load_score(record.load_score, stats.load_p75)?;

        Ok(100.0 * (SLEEP_WEIGHT * sleep + HRV_WEIGHT * hrv + LOAD_WEIGHT * load))
    }
}

impl Default for RecoveryCalculator {
    fn default() -> Self {
        Self::new()
    }
}

/// Normalize sleep duration to `[0, 1]`.
///
/// Linear ramp from 5 hours (0.0) to 8 hours (1.0); clamped outside
/// that range. Needs no history.
pub fn sleep_score(sleep_hours: f64) -> f64 {
    ((sleep_hours - SLEEP_FLOOR_HOURS) / (SLEEP_CEILING_HOURS - SLEEP_FLOOR_HOURS)).clamp(0.0, 1.0)
}

/// Normalize HRV against the athlete's window median, to `[0, 1]`.
///
/// The ratio `current / median` is capped at 1.0: HRV at or above the
/// personal median scores full credit, below it scales linearly toward
/// zero. A zero median leaves the ratio undefined and fails.
pub fn hrv_score(current_hrv: f64, hrv_median: f64) -> Result<f64, ScoreError> {
    if hrv_median <= 0.0 {
        return Err(ScoreError::InsufficientBaseline {
            metric: "hrv_median",
            reason: format!("window median is {hrv_median}"),
        });
    }

    Ok((current_hrv / hrv_median).clamp(0.0, 1.0))
}

/// Normalize training load against the athlete's window p75, to `[0, 1]`.
///
/// Inverse relationship: `1 - 0.5 * current / p75`, clamped. Zero load
/// scores 1.0, load at the p75 scores 0.5, and twice the p75 or more
/// scores 0.0. A zero p75 leaves the ratio undefined and fails.
pub fn load_score(current_load: f64, load_p75: f64) -> Result<f64, ScoreError> {
    if load_p75 <= 0.0 {
        return Err(ScoreError::InsufficientBaseline {
            metric: "load_p75",
            reason: format!("window p75 is {load_p75}"),
        });
    }

    Ok((1.0 - 0.5 * (current_load / load_p75)).clamp(0.0, 1.0))
}

/// Interpretation bands over the 0-100 recovery score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecoveryBand {
    /// 75 and above: fully recovered
    Ready,
    /// 50 to 75: partially recovered
    Moderate,
    /// 25 to 50: compromised recovery
    Strained,
    /// Below 25: inadequate recovery
    Overreached,
}

impl RecoveryBand {
    /// Classify a 0-100 recovery score.
    pub fn from_score(score: f64) -> Self {
        if score >= 75.0 {
            RecoveryBand::Ready
        } else if score >= 50.0 {
            RecoveryBand::Moderate
        } else if score >= 25.0 {
            RecoveryBand::Strained
        } else {
            RecoveryBand::Overreached
        }
    }

    /// Get band description
    pub fn description(&self) -> &'static str {
        match self {
            RecoveryBand::Ready => "Well recovered and ready to train",
            RecoveryBand::Moderate => "Partially recovered (normal training)",
            RecoveryBand::Strained => "Recovery is compromised (monitor closely)",
            RecoveryBand::Overreached => "Inadequate recovery (rest needed)",
        }
    }

    /// Get training recommendation
    pub fn recommendation(&self) -> &'static str {
        match self {
            RecoveryBand::Ready => "Good day for high-intensity sessions or racing",
            RecoveryBand::Moderate => "Continue normal training progression",
            RecoveryBand::Strained => "Reduce intensity, favor easy sessions",
            RecoveryBand::Overreached => "Prioritize sleep and rest before resuming training",
        }
    }
}

impl fmt::Display for RecoveryBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecoveryBand::Ready => write!(f, "Ready"),
            RecoveryBand::Moderate => write!(f, "Moderate"),
            RecoveryBand::Strained => write!(f, "Strained"),
            RecoveryBand::Overreached => write!(f, "Overreached"),
        }
    }
}
