use thiserror::Error;

/// Validation failures at the user-facing write boundary.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TrackerError {
    #[error("Unknown status '{0}' (expected not-applied, applied, rejected or selected)")]
    InvalidStatus(String),

    #[error("Unknown work mode '{0}' (expected any, remote, hybrid or onsite)")]
    InvalidMode(String),

    #[error("Unknown sort mode '{0}' (expected latest, oldest or match)")]
    InvalidSortMode(String),

    #[error("Unknown day boundary '{0}' (expected local or utc)")]
    InvalidDayBoundary(String),

    #[error("Minimum match score must be between 0 and 100, got {0}")]
    MinScoreOutOfRange(i64),

    #[error("Invalid date '{0}' (expected YYYY-MM-DD)")]
    InvalidDate(String),
}
