//! Personal baseline statistics over a trailing window of daily records.
//!
//! The recovery score normalizes the current day's signals against the
//! athlete's own recent history rather than population norms: HRV against
//! the window median, training load against the window's 75th percentile.
//! Baselines are recomputed from the raw window on every invocation; they
//! are not stored entities.

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::models::DailyRecord;

/// Trailing window over which baselines are computed.
///
/// The window covers `days` calendar days ending at the target date. When
/// `include_target` is set (the default) the target date's own record is
/// part of the window, matching how the source data was collected.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BaselineWindow {
    /// Window length in calendar days (default: 30)
    pub days: u32,

    /// Whether the target date's record participates in the baseline
    pub include_target: bool,
}

impl Default for BaselineWindow {
    fn default() -> Self {
        BaselineWindow {
            days: 30,
            include_target: true,
        }
    }
}

impl BaselineWindow {
    /// Inclusive date range `[start, end]` the window covers for a target date.
    ///
    /// Returns `None` for a zero-length window, or when excluding the
    /// target leaves no representable end date.
    pub fn range(&self, target: NaiveDate) -> Option<(NaiveDate, NaiveDate)> {
        if self.days == 0 {
            return None;
        }

        let end = if self.include_target {
            target
        } else {
            target.pred_opt()?
        };

        let start = end
            .checked_sub_days(Days::new(u64::from(self.days) - 1))
            .unwrap_or(NaiveDate::MIN);

        Some((start, end))
    }
}

/// Derived reference statistics for one athlete's trailing window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BaselineStats {
    /// Median HRV across the window
    pub hrv_median: f64,

    /// 75th percentile of daily load scores across the window
    pub load_p75: f64,

    /// Number of records the window actually contained
    pub sample_count: usize,
}

impl BaselineStats {
    /// Compute baselines from the records falling inside the window.
    ///
    /// Returns `None` when the window contains no records at all; callers
    /// decide how to surface that (the engine fails rather than guessing).
    pub fn from_history(
        history: &BTreeMap<NaiveDate, DailyRecord>,
        target: NaiveDate,
        window: &BaselineWindow,
    ) -> Option<Self> {
        let (start, end) = window.range(target)?;

        let mut hrv_values = Vec::new();
        let mut load_values = Vec::new();
        for record in history.range(start..=end).map(|(_, r)| r) {
            hrv_values.push(record.hrv);
            load_values.push(record.load_score);
        }

        if hrv_values.is_empty() {
            return None;
        }

        Some(BaselineStats {
            hrv_median: median(&mut hrv_values),
            load_p75: percentile(&mut load_values, 0.75),
            sample_count: load_values.len(),
        })
    }
}

/// Median with the conventional even-length rule: the average of the two
/// middle order statistics. Sorts the slice in place.
fn median(values: &mut [f64]) -> f64 {
    debug_assert!(!values.is_empty());
    values.sort_by(f64::total_cmp);

    let n = values.len();
    if n % 2 == 1 {
        values[n / 2]
    } else {
        (values[n / 2 - 1] + values[n / 2]) / 2.0
    }
}

/// Percentile via linear interpolation between closest ranks, at rank
/// `(n - 1) * q` over the sorted values. Sorts the slice in place.
fn percentile(values: &mut [f64], q: f64) -> f64 {
    debug_assert!(!values.is_empty());
    debug_assert!((0.0..=1.0).contains(&q));
    values.sort_by(f64::total_cmp);

    let rank = (values.len() - 1) as f64 * q;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    if lower == upper {
        values[lower]
    } else {
        let fraction = rank - lower as f64;
        values[lower] + (values[upper] - values[lower]) * fraction
    }
}
