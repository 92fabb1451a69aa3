use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One physiological sample for an athlete on a calendar date.
///
/// At most one record exists per athlete per date. The sample store
/// enforces that invariant, not the scoring engine: the engine treats
/// whatever history it is handed as immutable input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyRecord {
    /// Unique identifier for this record
    pub id: Uuid,

    /// Athlete identifier
    pub athlete_id: Option<String>,

    /// Calendar date of the sample (day granularity)
    pub date: NaiveDate,

    /// Hours slept in the night preceding this date
    ///
    /// Non-negative. Conceptually capped at 24, but the cap is checked
    /// at the ingestion boundary rather than here.
    pub sleep_hours: f64,

    /// Heart rate variability in the source device's unit
    ///
    /// Unit-agnostic: only the ratio to the athlete's personal median
    /// matters for scoring.
    pub hrv: f64,

    /// Resting/average heart rate in beats per minute
    ///
    /// Carried for other consumers; the score formula does not use it.
    pub avg_hr: f64,

    /// Cumulative training load for the day
    ///
    /// E.g. session RPE x duration, or an equivalent strain measure.
    pub load_score: f64,

    /// Computed recovery score (0-100)
    ///
    /// Written back by the scoring caller after computation; the engine
    /// never reads it.
    pub recovery_score: Option<f64>,

    /// Source device or application
    pub source: Option<String>,
}

impl DailyRecord {
    /// Create a new unscored record for an athlete and date.
    pub fn new(
        athlete_id: impl Into<String>,
        date: NaiveDate,
        sleep_hours: f64,
        hrv: f64,
        avg_hr: f64,
        load_score: f64,
    ) -> Self {
        DailyRecord {
            id: Uuid::new_v4(),
            athlete_id: Some(athlete_id.into()),
            date,
            sleep_hours,
            hrv,
            avg_hr,
            load_score,
            recovery_score: None,
            source: None,
        }
    }
}
