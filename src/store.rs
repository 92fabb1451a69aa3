//! SQLite-backed sample store for daily physiological records.
//!
//! The store owns persistence and the one-record-per-athlete-per-date
//! invariant (a UNIQUE constraint, surfaced as [`StoreError::Duplicate`]).
//! The scoring engine only ever sees the read-only window this store
//! assembles; score write-back goes through [`SampleStore::save_score`]
//! so the engine itself never touches storage.

use chrono::{Days, NaiveDate};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;
use uuid::Uuid;

use crate::models::DailyRecord;

/// Store error types
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("No record for athlete {athlete} on {date}")]
    NotFound { athlete: String, date: NaiveDate },

    #[error("Duplicate record for athlete {athlete} on {date}")]
    Duplicate { athlete: String, date: NaiveDate },
}

/// Connection wrapper over the daily-record table.
pub struct SampleStore {
    conn: Connection,
}

impl SampleStore {
    /// Create or open a store at the specified path.
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self, StoreError> {
        let conn = Connection::open(db_path)?;
        let store = Self { conn };
        store.init_schema()?;
        Ok(store)
    }

    /// Open an in-memory store (used by tests).
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> Result<(), StoreError> {
        // WAL mode for better concurrent access
        self.conn.pragma_update(None, "journal_mode", "WAL")?;
        self.conn.pragma_update(None, "synchronous", "NORMAL")?;

        self.conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS daily_records (
                id TEXT PRIMARY KEY,
                athlete_id TEXT NOT NULL,
                date DATE NOT NULL,
                sleep_hours REAL NOT NULL,
                hrv REAL NOT NULL,
                avg_hr REAL NOT NULL,
                load_score REAL NOT NULL,
                recovery_score REAL,
                source TEXT,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
                updated_at DATETIME DEFAULT CURRENT_TIMESTAMP,

                UNIQUE (athlete_id, date)
            )
            "#,
            [],
        )?;

        self.conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_daily_records_athlete_date
             ON daily_records (athlete_id, date)",
            [],
        )?;
        self.conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_daily_records_date
             ON daily_records (date)",
            [],
        )?;

        Ok(())
    }

    /// Insert a new record, failing on an existing (athlete, date) pair.
    pub fn insert_record(&self, record: &DailyRecord) -> Result<(), StoreError> {
        let athlete = Self::athlete_of(record)?;

        let result = self.conn.execute(
            r#"
            INSERT INTO daily_records
                (id, athlete_id, date, sleep_hours, hrv, avg_hr, load_score,
                 recovery_score, source)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
            params![
                record.id.to_string(),
                athlete,
                record.date,
                record.sleep_hours,
                record.hrv,
                record.avg_hr,
                record.load_score,
                record.recovery_score,
                record.source,
            ],
        );

        match result {
            Ok(_) => Ok(()),
            Err(rusqlite::Error::SqliteFailure(e, _))
                if e.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                Err(StoreError::Duplicate {
                    athlete: athlete.to_string(),
                    date: record.date,
                })
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Insert a record, or update the sample fields of an existing one.
    ///
    /// The original record id and any previously persisted score survive
    /// an update; re-importing a day's sample invalidates nothing by
    /// itself.
    pub fn upsert_record(&self, record: &DailyRecord) -> Result<(), StoreError> {
        let athlete = Self::athlete_of(record)?;

        self.conn.execute(
            r#"
            INSERT INTO daily_records
                (id, athlete_id, date, sleep_hours, hrv, avg_hr, load_score,
                 recovery_score, source)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            ON CONFLICT (athlete_id, date) DO UPDATE SET
                sleep_hours = excluded.sleep_hours,
                hrv = excluded.hrv,
                avg_hr = excluded.avg_hr,
                load_score = excluded.load_score,
                source = excluded.source,
                updated_at = CURRENT_TIMESTAMP
            "#,
            params![
                record.id.to_string(),
                athlete,
                record.date,
                record.sleep_hours,
                record.hrv,
                record.avg_hr,
                record.load_score,
                record.recovery_score,
                record.source,
            ],
        )?;

        debug!(athlete, date = %record.date, "upserted daily record");
        Ok(())
    }

    /// Fetch one athlete's record for a date, if present.
    pub fn get_record(
        &self,
        athlete: &str,
        date: NaiveDate,
    ) -> Result<Option<DailyRecord>, StoreError> {
        self.conn
            .query_row(
                r#"
                SELECT id, athlete_id, date, sleep_hours, hrv, avg_hr,
                       load_score, recovery_score, source
                FROM daily_records
                WHERE athlete_id = ?1 AND date = ?2
                "#,
                params![athlete, date],
                Self::row_to_record,
            )
            .optional()
            .map_err(Into::into)
    }

    /// Read the trailing window ending at `end`, keyed by date.
    ///
    /// This is the read the scoring engine consumes: `days` calendar days
    /// of history up to and including `end`. Missing days are simply
    /// absent from the map.
    pub fn get_window(
        &self,
        athlete: &str,
        end: NaiveDate,
        days: u32,
    ) -> Result<BTreeMap<NaiveDate, DailyRecord>, StoreError> {
        let start = end
            .checked_sub_days(Days::new(u64::from(days.saturating_sub(1))))
            .unwrap_or(NaiveDate::MIN);

        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, athlete_id, date, sleep_hours, hrv, avg_hr,
                   load_score, recovery_score, source
            FROM daily_records
            WHERE athlete_id = ?1 AND date BETWEEN ?2 AND ?3
            ORDER BY date
            "#,
        )?;

        let rows = stmt.query_map(params![athlete, start, end], Self::row_to_record)?;

        let mut window = BTreeMap::new();
        for row in rows {
            let record = row?;
            window.insert(record.date, record);
        }

        debug!(
            athlete,
            %end,
            days,
            records = window.len(),
            "assembled baseline window"
        );
        Ok(window)
    }

    /// Persist a computed recovery score onto an existing record.
    pub fn save_score(
        &self,
        athlete: &str,
        date: NaiveDate,
        score: f64,
    ) -> Result<(), StoreError> {
        let updated = self.conn.execute(
            r#"
            UPDATE daily_records
            SET recovery_score = ?3, updated_at = CURRENT_TIMESTAMP
            WHERE athlete_id = ?1 AND date = ?2
            "#,
            params![athlete, date, score],
        )?;

        if updated == 0 {
            return Err(StoreError::NotFound {
                athlete: athlete.to_string(),
                date,
            });
        }
        Ok(())
    }

    /// Most recent records for an athlete, newest first.
    pub fn recent(&self, athlete: &str, limit: usize) -> Result<Vec<DailyRecord>, StoreError> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, athlete_id, date, sleep_hours, hrv, avg_hr,
                   load_score, recovery_score, source
            FROM daily_records
            WHERE athlete_id = ?1
            ORDER BY date DESC
            LIMIT ?2
            "#,
        )?;

        let rows = stmt.query_map(params![athlete, limit as i64], Self::row_to_record)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    fn athlete_of(record: &DailyRecord) -> Result<&str, StoreError> {
        record
            .athlete_id
            .as_deref()
            .ok_or_else(|| StoreError::Serialization("record has no athlete_id".to_string()))
    }

    fn row_to_record(row: &Row<'_>) -> rusqlite::Result<DailyRecord> {
        let id_text: String = row.get("id")?;
        let id = Uuid::parse_str(&id_text).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(
                0,
                rusqlite::types::Type::Text,
                Box::new(e),
            )
        })?;

        Ok(DailyRecord {
            id,
            athlete_id: row.get("athlete_id")?,
            date: row.get("date")?,
            sleep_hours: row.get("sleep_hours")?,
            hrv: row.get("hrv")?,
            avg_hr: row.get("avg_hr")?,
            load_score: row.get("load_score")?,
            recovery_score: row.get("recovery_score")?,
            source: row.get("source")?,
        })
    }
}
