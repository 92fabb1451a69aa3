// Library interface for recoverrs modules
// This allows integration tests to access the core functionality

pub mod baseline;
pub mod config;
pub mod error;
pub mod import;
pub mod logging;
pub mod models;
pub mod score;
pub mod store;

// Re-export commonly used types for convenience
pub use models::*;
pub use baseline::{BaselineStats, BaselineWindow};
pub use score::{
    hrv_score, load_score, sleep_score, RecoveryBand, RecoveryCalculator, ScoreError,
    HRV_WEIGHT, LOAD_WEIGHT, SLEEP_WEIGHT,
};
pub use store::{SampleStore, StoreError};
pub use import::{CsvImporter, JsonImporter};
pub use config::{AppConfig, EngineSettings};
pub use error::{RecoverrsError, Result};
pub use logging::{LogConfig, LogFormat, LogLevel};
