use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::TrackerError;

pub const DEFAULT_MIN_MATCH_SCORE: u32 = 40;
pub const MAX_SCORE: u32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobMode {
    Remote,
    Hybrid,
    Onsite,
}

impl JobMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobMode::Remote => "remote",
            JobMode::Hybrid => "hybrid",
            JobMode::Onsite => "onsite",
        }
    }
}

impl fmt::Display for JobMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for JobMode {
    type Err = TrackerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "remote" => Ok(JobMode::Remote),
            "hybrid" => Ok(JobMode::Hybrid),
            "onsite" => Ok(JobMode::Onsite),
            _ => Err(TrackerError::InvalidMode(s.to_string())),
        }
    }
}

/// A catalog posting. Supplied externally and never mutated here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: String,
    pub title: String,
    pub company: String,
    pub location: String,
    pub mode: JobMode,
    pub experience: String,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub description: String,
    pub posted_days_ago: u32,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub salary_range: String,
    #[serde(default)]
    pub apply_url: String,
}

/// The user's matching criteria, persisted under the `preferences` key.
///
/// The comma-delimited fields are kept as the user typed them; tokenizing
/// happens at scoring time (see [`crate::scoring::split_list`]).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Preferences {
    pub role_keywords: String,
    pub skills: String,
    pub preferred_locations: String,
    pub preferred_mode: Vec<String>,
    pub experience_level: String,
    #[serde(deserialize_with = "clamped_score")]
    pub min_match_score: u32,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            role_keywords: String::new(),
            skills: String::new(),
            preferred_locations: String::new(),
            preferred_mode: vec!["any".to_string()],
            experience_level: String::new(),
            min_match_score: DEFAULT_MIN_MATCH_SCORE,
        }
    }
}

impl Preferences {
    /// Scoring stays disabled until at least one role keyword or skill is set.
    pub fn is_configured(&self) -> bool {
        !crate::scoring::split_list(&self.role_keywords).is_empty()
            || !crate::scoring::split_list(&self.skills).is_empty()
    }
}

// Stored values come from outside our control; anything out of range is
// pulled back into 0..=100 rather than rejected.
fn clamped_score<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = i64::deserialize(deserializer)?;
    Ok(raw.clamp(0, MAX_SCORE as i64) as u32)
}

/// A partial edit to [`Preferences`]. `None` leaves the field untouched.
#[derive(Debug, Clone, Default)]
pub struct PreferencesUpdate {
    pub role_keywords: Option<String>,
    pub skills: Option<String>,
    pub preferred_locations: Option<String>,
    pub preferred_mode: Option<Vec<String>>,
    pub experience_level: Option<String>,
    pub min_match_score: Option<i64>,
}

impl PreferencesUpdate {
    /// Validate and apply onto `prefs`. Nothing is changed if any field is invalid.
    pub fn apply(self, prefs: &Preferences) -> Result<Preferences, TrackerError> {
        let mut next = prefs.clone();

        if let Some(score) = self.min_match_score {
            if !(0..=MAX_SCORE as i64).contains(&score) {
                return Err(TrackerError::MinScoreOutOfRange(score));
            }
            next.min_match_score = score as u32;
        }

        if let Some(modes) = self.preferred_mode {
            let mut normalized = Vec::with_capacity(modes.len());
            for mode in modes {
                let mode = mode.trim().to_lowercase();
                if mode != "any" {
                    mode.parse::<JobMode>()?;
                }
                if !normalized.contains(&mode) {
                    normalized.push(mode);
                }
            }
            next.preferred_mode = normalized;
        }

        if let Some(v) = self.role_keywords {
            next.role_keywords = v;
        }
        if let Some(v) = self.skills {
            next.skills = v;
        }
        if let Some(v) = self.preferred_locations {
            next.preferred_locations = v;
        }
        if let Some(v) = self.experience_level {
            next.experience_level = v.trim().to_string();
        }

        Ok(next)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ApplicationStatus {
    #[default]
    NotApplied,
    Applied,
    Rejected,
    Selected,
}

impl ApplicationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::NotApplied => "not-applied",
            ApplicationStatus::Applied => "applied",
            ApplicationStatus::Rejected => "rejected",
            ApplicationStatus::Selected => "selected",
        }
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for ApplicationStatus {
    type Err = TrackerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "not-applied" | "not applied" | "notapplied" => Ok(ApplicationStatus::NotApplied),
            "applied" => Ok(ApplicationStatus::Applied),
            "rejected" => Ok(ApplicationStatus::Rejected),
            "selected" => Ok(ApplicationStatus::Selected),
            _ => Err(TrackerError::InvalidStatus(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusLogEntry {
    pub job_id: String,
    pub title: String,
    pub company: String,
    pub status: ApplicationStatus,
    pub timestamp: DateTime<Utc>,
}

/// A job paired with the score it had when this value was built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredJob {
    #[serde(flatten)]
    pub job: Job,
    pub score: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preferences_defaults() {
        let prefs = Preferences::default();
        assert_eq!(prefs.preferred_mode, vec!["any".to_string()]);
        assert_eq!(prefs.min_match_score, 40);
        assert!(!prefs.is_configured());
    }

    #[test]
    fn test_preferences_partial_record_fills_defaults() {
        let prefs: Preferences = serde_json::from_str(r#"{"roleKeywords":"rust"}"#).unwrap();
        assert_eq!(prefs.role_keywords, "rust");
        assert_eq!(prefs.preferred_mode, vec!["any".to_string()]);
        assert_eq!(prefs.min_match_score, 40);
        assert!(prefs.is_configured());
    }

    #[test]
    fn test_preferences_stored_score_is_clamped() {
        let high: Preferences = serde_json::from_str(r#"{"minMatchScore":250}"#).unwrap();
        assert_eq!(high.min_match_score, 100);
        let low: Preferences = serde_json::from_str(r#"{"minMatchScore":-5}"#).unwrap();
        assert_eq!(low.min_match_score, 0);
    }

    #[test]
    fn test_preferences_json_uses_camel_case() {
        let json = serde_json::to_value(Preferences::default()).unwrap();
        assert_eq!(json["minMatchScore"], 40);
        assert_eq!(json["preferredMode"][0], "any");
        assert!(json.get("roleKeywords").is_some());
    }

    #[test]
    fn test_update_rejects_out_of_range_score() {
        let update = PreferencesUpdate {
            min_match_score: Some(101),
            role_keywords: Some("react".to_string()),
            ..Default::default()
        };
        let err = update.apply(&Preferences::default()).unwrap_err();
        assert_eq!(err, TrackerError::MinScoreOutOfRange(101));
    }

    #[test]
    fn test_update_normalizes_modes() {
        let update = PreferencesUpdate {
            preferred_mode: Some(vec!["Remote".into(), "ANY".into(), "remote".into()]),
            ..Default::default()
        };
        let prefs = update.apply(&Preferences::default()).unwrap();
        assert_eq!(prefs.preferred_mode, vec!["remote".to_string(), "any".to_string()]);
    }

    #[test]
    fn test_update_rejects_unknown_mode() {
        let update = PreferencesUpdate {
            preferred_mode: Some(vec!["moon".into()]),
            ..Default::default()
        };
        assert!(matches!(
            update.apply(&Preferences::default()),
            Err(TrackerError::InvalidMode(_))
        ));
    }

    #[test]
    fn test_status_parse_and_display() {
        assert_eq!("applied".parse::<ApplicationStatus>().unwrap(), ApplicationStatus::Applied);
        assert_eq!(
            "Not-Applied".parse::<ApplicationStatus>().unwrap(),
            ApplicationStatus::NotApplied
        );
        assert_eq!(ApplicationStatus::Selected.to_string(), "selected");
        assert!("hired".parse::<ApplicationStatus>().is_err());
    }

    #[test]
    fn test_status_serializes_kebab_case() {
        let json = serde_json::to_string(&ApplicationStatus::NotApplied).unwrap();
        assert_eq!(json, "\"not-applied\"");
    }

    #[test]
    fn test_scored_job_flattens_job_fields() {
        let job: Job = serde_json::from_str(
            r#"{"id":"job-1","title":"Rust Engineer","company":"Acme","location":"Pune",
                "mode":"onsite","experience":"3-5","postedDaysAgo":4}"#,
        )
        .unwrap();
        let json = serde_json::to_value(ScoredJob { job, score: 55 }).unwrap();
        assert_eq!(json["id"], "job-1");
        assert_eq!(json["postedDaysAgo"], 4);
        assert_eq!(json["score"], 55);
    }
}
