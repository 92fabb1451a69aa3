use anyhow::{anyhow, bail, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use colored::*;
use std::fs;
use std::path::PathBuf;
use tabled::{Table, Tabled};

use recoverrs::baseline::BaselineWindow;
use recoverrs::config::AppConfig;
use recoverrs::import::{CsvImporter, JsonImporter};
use recoverrs::logging::{init_logging, LogConfig, LogLevel};
use recoverrs::models::DailyRecord;
use recoverrs::score::{RecoveryBand, RecoveryCalculator};
use recoverrs::store::SampleStore;

/// RecoverRS - Recovery Score Analysis CLI
///
/// A Rust-based tool for tracking daily physiological samples and
/// computing 0-100 recovery scores from sleep, HRV, and training load.
#[derive(Parser)]
#[command(name = "recoverrs")]
#[command(version = "0.1.0")]
#[command(about = "Recovery Score Analysis CLI", long_about = None)]
struct Cli {
    /// Sets a custom config file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Increase verbosity of output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Import daily samples from a CSV or JSON file
    Import {
        /// Input file path
        #[arg(short, long)]
        file: PathBuf,

        /// Athlete the samples belong to
        #[arg(short, long)]
        athlete: Option<String>,

        /// File format (auto-detect from extension if not specified)
        #[arg(long)]
        format: Option<String>,
    },

    /// Compute and persist the recovery score for a date
    Score {
        /// Target date (YYYY-MM-DD, default: today)
        #[arg(short, long)]
        date: Option<String>,

        /// Athlete to score
        #[arg(short, long)]
        athlete: Option<String>,

        /// Baseline window length in days (overrides config)
        #[arg(short, long)]
        window: Option<u32>,
    },

    /// Display recent samples and their scores
    History {
        /// Number of recent days to show
        #[arg(short, long, default_value = "14")]
        limit: usize,

        /// Athlete to display
        #[arg(short, long)]
        athlete: Option<String>,
    },

    /// Show the effective configuration
    Config,
}

#[derive(Tabled)]
struct HistoryRow {
    #[tabled(rename = "Date")]
    date: NaiveDate,
    #[tabled(rename = "Sleep (h)")]
    sleep: String,
    #[tabled(rename = "HRV")]
    hrv: String,
    #[tabled(rename = "Load")]
    load: String,
    #[tabled(rename = "Score")]
    score: String,
    #[tabled(rename = "Band")]
    band: String,
}

impl From<&DailyRecord> for HistoryRow {
    fn from(record: &DailyRecord) -> Self {
        let (score, band) = match record.recovery_score {
            Some(s) => (format!("{:.1}", s), RecoveryBand::from_score(s).to_string()),
            None => ("-".to_string(), "-".to_string()),
        };
        HistoryRow {
            date: record.date,
            sleep: format!("{:.1}", record.sleep_hours),
            hrv: format!("{:.1}", record.hrv),
            load: format!("{:.0}", record.load_score),
            score,
            band,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_config = LogConfig {
        level: LogLevel::from_verbosity(cli.verbose),
        ..LogConfig::default()
    };
    init_logging(&log_config)?;

    let config_path = match &cli.config {
        Some(path) => path.clone(),
        None => AppConfig::default_path()?,
    };
    let config = AppConfig::load(&config_path)?;

    match cli.command {
        Commands::Import { file, athlete, format } => {
            let athlete = resolve_athlete(athlete, &config)?;
            let store = open_store(&config)?;

            println!("{}", "Importing daily samples...".green().bold());

            let format = format.unwrap_or_else(|| detect_format(&file));
            let records = match format.as_str() {
                "csv" => CsvImporter::new().import(&file, &athlete)?,
                "json" => JsonImporter::import(&file, &athlete)?,
                other => bail!("Unsupported import format: {other}"),
            };

            for record in &records {
                store.upsert_record(record)?;
            }

            println!(
                "{}",
                format!("✓ Imported {} records for {}", records.len(), athlete).green()
            );
        }

        Commands::Score { date, athlete, window } => {
            let athlete = resolve_athlete(athlete, &config)?;
            let store = open_store(&config)?;

            let target = match date {
                Some(d) => NaiveDate::parse_from_str(&d, "%Y-%m-%d")
                    .with_context(|| format!("Invalid date '{d}', expected YYYY-MM-DD"))?,
                None => chrono::Utc::now().date_naive(),
            };

            println!("{}", "Computing recovery score...".blue().bold());

            let mut baseline_window = BaselineWindow::from(&config.engine);
            if let Some(days) = window {
                baseline_window.days = days;
            }

            // A window that excludes the target still needs the target's
            // own record, so fetch one extra day of history in that case.
            let fetch_days = baseline_window.days + u32::from(!baseline_window.include_target);
            let history = store.get_window(&athlete, target, fetch_days)?;
            let calculator = RecoveryCalculator::with_window(baseline_window);
            let score = calculator
                .compute(target, &history)
                .map_err(recoverrs::RecoverrsError::from)
                .map_err(|e| anyhow!(e.user_message()))?;

            store.save_score(&athlete, target, score)?;

            let band = RecoveryBand::from_score(score);
            println!("  Athlete: {athlete}");
            println!("  Date:    {target}");
            println!("  Score:   {}", format!("{score:.1}").bold());
            println!("  Status:  {} ({})", band.to_string().cyan(), band.description());
            println!("  Advice:  {}", band.recommendation());
            println!("{}", "✓ Score saved".blue());
        }

        Commands::History { limit, athlete } => {
            let athlete = resolve_athlete(athlete, &config)?;
            let store = open_store(&config)?;

            println!("{}", format!("Recent samples for {athlete}").magenta().bold());

            let records = store.recent(&athlete, limit)?;
            if records.is_empty() {
                println!("  No samples recorded yet.");
            } else {
                let rows: Vec<HistoryRow> = records.iter().map(HistoryRow::from).collect();
                println!("{}", Table::new(rows));
            }
        }

        Commands::Config => {
            println!("{}", "Effective configuration".white().bold());
            println!("  File: {}", config_path.display());
            print!("{}", toml::to_string_pretty(&config)?);
        }
    }

    Ok(())
}

fn resolve_athlete(cli_athlete: Option<String>, config: &AppConfig) -> Result<String> {
    cli_athlete
        .or_else(|| config.settings.default_athlete.clone())
        .ok_or_else(|| {
            anyhow!("No athlete given: pass --athlete or set default_athlete in the config")
        })
}

fn open_store(config: &AppConfig) -> Result<SampleStore> {
    fs::create_dir_all(&config.settings.data_dir).with_context(|| {
        format!(
            "Failed to create data directory: {}",
            config.settings.data_dir.display()
        )
    })?;
    SampleStore::new(config.database_path()).context("Failed to open sample store")
}

fn detect_format(path: &std::path::Path) -> String {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("json") => "json".to_string(),
        _ => "csv".to_string(),
    }
}
