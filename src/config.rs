use anyhow::Result;
use chrono::{DateTime, Local, NaiveDate, TimeZone, Utc};
use std::path::PathBuf;
use std::str::FromStr;
use tracing::warn;

use crate::db::Database;
use crate::error::TrackerError;

/// Which clock decides where one calendar day ends and the next begins.
/// Digest cache keys are derived from this, so it must stay consistent
/// for a given store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DayBoundary {
    #[default]
    Local,
    Utc,
}

impl DayBoundary {
    pub fn date_of(&self, instant: DateTime<Utc>) -> NaiveDate {
        match self {
            DayBoundary::Local => calendar_date(instant, &Local),
            DayBoundary::Utc => calendar_date(instant, &Utc),
        }
    }

    /// Parse an optional setting; unknown values fall back to the default.
    pub fn from_setting(raw: Option<&str>) -> Self {
        let Some(raw) = raw else {
            return DayBoundary::default();
        };
        raw.parse().unwrap_or_else(|e| {
            warn!(error = %e, "Falling back to local day boundary");
            DayBoundary::default()
        })
    }

    pub fn today(&self) -> NaiveDate {
        self.date_of(Utc::now())
    }
}

/// The calendar date `instant` falls on in `tz`.
pub fn calendar_date<Tz: TimeZone>(instant: DateTime<Utc>, tz: &Tz) -> NaiveDate {
    instant.with_timezone(tz).date_naive()
}

impl FromStr for DayBoundary {
    type Err = TrackerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "local" => Ok(DayBoundary::Local),
            "utc" => Ok(DayBoundary::Utc),
            _ => Err(TrackerError::InvalidDayBoundary(s.to_string())),
        }
    }
}

/// Runtime configuration, read from the environment (and `.env` if present).
#[derive(Debug, Clone)]
pub struct Config {
    pub db_path: PathBuf,
    pub catalog_path: PathBuf,
    pub day_boundary: DayBoundary,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let day_boundary =
            DayBoundary::from_setting(std::env::var("JOBDIGEST_DAY_BOUNDARY").ok().as_deref());

        Ok(Config {
            db_path: std::env::var("JOBDIGEST_DB")
                .map(PathBuf::from)
                .unwrap_or_else(|_| Database::default_path()),
            catalog_path: std::env::var("JOBDIGEST_CATALOG")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("data/jobs.json")),
            day_boundary,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}
