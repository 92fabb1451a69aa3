//! Ingestion of daily physiological samples from CSV and JSON files.
//!
//! Range validation lives here at the ingestion boundary: the scoring
//! engine assumes its inputs were sanity-checked before storage and does
//! not re-validate them.

use anyhow::{anyhow, bail, Context, Result};
use chrono::NaiveDate;
use csv::ReaderBuilder;
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

use crate::models::DailyRecord;

/// CSV importer with flexible column mapping
pub struct CsvImporter {
    column_mapping: HashMap<String, String>,
}

impl CsvImporter {
    pub fn new() -> Self {
        let mut column_mapping = HashMap::new();

        // Common column name variations
        Self::add_mapping(&mut column_mapping, "date", &["date", "day", "record_date"]);
        Self::add_mapping(
            &mut column_mapping,
            "sleep_hours",
            &["sleep_hours", "sleep", "sleep_h", "hours_slept", "sleep_duration"],
        );
        Self::add_mapping(
            &mut column_mapping,
            "hrv",
            &["hrv", "rmssd", "hrv_ms", "heart_rate_variability"],
        );
        Self::add_mapping(
            &mut column_mapping,
            "avg_hr",
            &["avg_hr", "avghr", "resting_hr", "rhr", "heart_rate", "avg_heart_rate"],
        );
        Self::add_mapping(
            &mut column_mapping,
            "load_score",
            &["load_score", "load", "training_load", "strain", "tss"],
        );

        Self { column_mapping }
    }

    fn add_mapping(mapping: &mut HashMap<String, String>, standard: &str, variations: &[&str]) {
        for variation in variations {
            mapping.insert(variation.to_lowercase(), standard.to_string());
        }
    }

    /// Import daily records for one athlete from a CSV file.
    pub fn import<P: AsRef<Path>>(&self, path: P, athlete_id: &str) -> Result<Vec<DailyRecord>> {
        let path = path.as_ref();
        let mut reader = ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_path(path)
            .with_context(|| format!("Failed to open CSV file: {}", path.display()))?;

        // Map each standard field to its column index via the alias table
        let headers = reader.headers()?.clone();
        let mut columns: HashMap<String, usize> = HashMap::new();
        for (index, header) in headers.iter().enumerate() {
            if let Some(standard) = self.column_mapping.get(&header.to_lowercase()) {
                columns.entry(standard.clone()).or_insert(index);
            }
        }

        for required in ["date", "sleep_hours", "hrv", "load_score"] {
            if !columns.contains_key(required) {
                bail!(
                    "CSV file {} has no recognizable '{}' column",
                    path.display(),
                    required
                );
            }
        }

        let mut records = Vec::new();
        for (line, row) in reader.records().enumerate() {
            let row = row.with_context(|| format!("Failed to read CSV row {}", line + 2))?;

            let field = |name: &str| -> Option<&str> {
                columns.get(name).and_then(|&i| row.get(i))
            };

            let date = parse_date(
                field("date").ok_or_else(|| anyhow!("Row {}: missing date", line + 2))?,
            )
            .with_context(|| format!("Row {}: unparseable date", line + 2))?;

            let sleep_hours = parse_number(field("sleep_hours"), "sleep_hours", line)?;
            let hrv = parse_number(field("hrv"), "hrv", line)?;
            let load_score = parse_number(field("load_score"), "load_score", line)?;
            // avg_hr is optional in source files; absent means 0 (unused by scoring)
            let avg_hr = match field("avg_hr") {
                Some(value) if !value.is_empty() => parse_number(Some(value), "avg_hr", line)?,
                _ => 0.0,
            };

            let mut record =
                DailyRecord::new(athlete_id, date, sleep_hours, hrv, avg_hr, load_score);
            record.source = Some(format!("csv:{}", path.display()));

            if let Err(e) = validate_record(&record) {
                warn!(row = line + 2, error = %e, "skipping invalid row");
                continue;
            }
            records.push(record);
        }

        debug!(count = records.len(), file = %path.display(), "imported CSV records");
        Ok(records)
    }
}

impl Default for CsvImporter {
    fn default() -> Self {
        Self::new()
    }
}

/// Shape of one record in a JSON import file.
#[derive(Debug, Deserialize)]
struct JsonSample {
    date: NaiveDate,
    sleep_hours: f64,
    hrv: f64,
    #[serde(default)]
    avg_hr: f64,
    load_score: f64,
}

/// JSON importer for an array of daily samples
pub struct JsonImporter;

impl JsonImporter {
    /// Import daily records for one athlete from a JSON array file.
    pub fn import<P: AsRef<Path>>(path: P, athlete_id: &str) -> Result<Vec<DailyRecord>> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read JSON file: {}", path.display()))?;

        let samples: Vec<JsonSample> = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse JSON file: {}", path.display()))?;

        let mut records = Vec::new();
        for sample in samples {
            let mut record = DailyRecord::new(
                athlete_id,
                sample.date,
                sample.sleep_hours,
                sample.hrv,
                sample.avg_hr,
                sample.load_score,
            );
            record.source = Some(format!("json:{}", path.display()));

            validate_record(&record)
                .with_context(|| format!("Invalid sample for {}", sample.date))?;
            records.push(record);
        }

        debug!(count = records.len(), file = %path.display(), "imported JSON records");
        Ok(records)
    }
}

fn parse_date(value: &str) -> Result<NaiveDate> {
    // Try different date formats
    let formats = ["%Y-%m-%d", "%Y/%m/%d", "%d.%m.%Y", "%d/%m/%Y", "%m/%d/%Y"];

    for format in &formats {
        if let Ok(date) = NaiveDate::parse_from_str(value, format) {
            return Ok(date);
        }
    }

    bail!("Unrecognized date format: {value}")
}

fn parse_number(value: Option<&str>, name: &str, line: usize) -> Result<f64> {
    let raw = value.ok_or_else(|| anyhow!("Row {}: missing {}", line + 2, name))?;
    raw.parse::<f64>()
        .with_context(|| format!("Row {}: invalid {} value '{}'", line + 2, name, raw))
}

/// Sanity-check a record's ranges before it reaches storage.
pub fn validate_record(record: &DailyRecord) -> Result<()> {
    if !record.sleep_hours.is_finite() || !(0.0..=24.0).contains(&record.sleep_hours) {
        bail!("sleep_hours {} outside 0-24", record.sleep_hours);
    }
    if !record.hrv.is_finite() || record.hrv < 0.0 {
        bail!("hrv {} must be non-negative", record.hrv);
    }
    if !record.avg_hr.is_finite() || !(0.0..=250.0).contains(&record.avg_hr) {
        bail!("avg_hr {} outside 0-250", record.avg_hr);
    }
    if !record.load_score.is_finite() || record.load_score < 0.0 {
        bail!("load_score {} must be non-negative", record.load_score);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(content: &str, ext: &str) -> tempfile::TempPath {
        let mut file = tempfile::Builder::new()
            .suffix(ext)
            .tempfile()
            .unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.into_temp_path()
    }

    #[test]
    fn test_csv_import_standard_headers() {
        let path = write_temp(
            "date,sleep_hours,hrv,avg_hr,load_score\n\
             2024-09-01,7.5,52,58,640\n\
             2024-09-02,6.0,47.5,61,810\n",
            ".csv",
        );

        let records = CsvImporter::new().import(&path, "athlete_1").unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].date, NaiveDate::from_ymd_opt(2024, 9, 1).unwrap());
        assert_eq!(records[0].sleep_hours, 7.5);
        assert_eq!(records[1].hrv, 47.5);
        assert_eq!(records[1].load_score, 810.0);
        assert_eq!(records[0].athlete_id.as_deref(), Some("athlete_1"));
    }

    #[test]
    fn test_csv_import_aliased_headers() {
        let path = write_temp(
            "Day,Sleep,RMSSD,RHR,Strain\n\
             2024-09-01,8,55,56,500\n",
            ".csv",
        );

        let records = CsvImporter::new().import(&path, "athlete_1").unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].sleep_hours, 8.0);
        assert_eq!(records[0].hrv, 55.0);
        assert_eq!(records[0].avg_hr, 56.0);
        assert_eq!(records[0].load_score, 500.0);
    }

    #[test]
    fn test_csv_import_missing_required_column() {
        let path = write_temp("date,sleep_hours,hrv\n2024-09-01,7,50\n", ".csv");

        let result = CsvImporter::new().import(&path, "athlete_1");
        assert!(result.is_err());
    }

    #[test]
    fn test_csv_import_skips_out_of_range_rows() {
        let path = write_temp(
            "date,sleep_hours,hrv,load_score\n\
             2024-09-01,7.5,52,640\n\
             2024-09-02,30,47,810\n",
            ".csv",
        );

        let records = CsvImporter::new().import(&path, "athlete_1").unwrap();

        // The 30-hour sleep row is dropped, the valid row survives
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].date, NaiveDate::from_ymd_opt(2024, 9, 1).unwrap());
    }

    #[test]
    fn test_csv_date_format_variants() {
        let path = write_temp(
            "date,sleep_hours,hrv,load_score\n\
             01.09.2024,7,50,500\n",
            ".csv",
        );

        let records = CsvImporter::new().import(&path, "athlete_1").unwrap();
        assert_eq!(records[0].date, NaiveDate::from_ymd_opt(2024, 9, 1).unwrap());
    }

    #[test]
    fn test_json_import() {
        let path = write_temp(
            r#"[
                {"date": "2024-09-01", "sleep_hours": 7.5, "hrv": 52.0, "avg_hr": 58.0, "load_score": 640.0},
                {"date": "2024-09-02", "sleep_hours": 6.0, "hrv": 47.0, "load_score": 810.0}
            ]"#,
            ".json",
        );

        let records = JsonImporter::import(&path, "athlete_1").unwrap();

        assert_eq!(records.len(), 2);
        // avg_hr defaults when absent
        assert_eq!(records[1].avg_hr, 0.0);
        assert_eq!(records[1].load_score, 810.0);
    }

    #[test]
    fn test_json_import_rejects_invalid_sample() {
        let path = write_temp(
            r#"[{"date": "2024-09-01", "sleep_hours": -2.0, "hrv": 52.0, "load_score": 640.0}]"#,
            ".json",
        );

        let result = JsonImporter::import(&path, "athlete_1");
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_record_bounds() {
        let date = NaiveDate::from_ymd_opt(2024, 9, 1).unwrap();

        let ok = DailyRecord::new("a", date, 24.0, 0.0, 0.0, 0.0);
        assert!(validate_record(&ok).is_ok());

        let bad_hrv = DailyRecord::new("a", date, 7.0, -1.0, 60.0, 500.0);
        assert!(validate_record(&bad_hrv).is_err());

        let bad_load = DailyRecord::new("a", date, 7.0, 50.0, 60.0, -0.5);
        assert!(validate_record(&bad_load).is_err());

        let bad_hr = DailyRecord::new("a", date, 7.0, 50.0, 400.0, 500.0);
        assert!(validate_record(&bad_hr).is_err());
    }
}
