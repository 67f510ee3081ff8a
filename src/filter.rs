use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use tracing::debug;

use crate::catalog::Catalog;
use crate::error::TrackerError;
use crate::models::{ApplicationStatus, JobMode, Preferences, ScoredJob};
use crate::scoring::score_all;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortMode {
    #[default]
    Latest,
    Oldest,
    Match,
}

impl fmt::Display for SortMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(match self {
            SortMode::Latest => "latest",
            SortMode::Oldest => "oldest",
            SortMode::Match => "match",
        })
    }
}

impl FromStr for SortMode {
    type Err = TrackerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "latest" => Ok(SortMode::Latest),
            "oldest" => Ok(SortMode::Oldest),
            "match" | "score" => Ok(SortMode::Match),
            _ => Err(TrackerError::InvalidSortMode(s.to_string())),
        }
    }
}

/// Dashboard filters. Every `None`/empty criterion matches all jobs.
#[derive(Debug, Clone, Default)]
pub struct FilterCriteria {
    /// Substring of title or company.
    pub keyword: Option<String>,
    pub location: Option<String>,
    pub mode: Option<JobMode>,
    /// Exact experience label.
    pub experience: Option<String>,
    pub source: Option<String>,
    pub status: Option<ApplicationStatus>,
    pub above_threshold: bool,
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_lowercase)
}

impl FilterCriteria {
    pub fn matches(
        &self,
        scored: &ScoredJob,
        prefs: &Preferences,
        statuses: &HashMap<String, ApplicationStatus>,
    ) -> bool {
        let job = &scored.job;

        if let Some(kw) = non_empty(&self.keyword) {
            let in_title = job.title.to_lowercase().contains(&kw);
            let in_company = job.company.to_lowercase().contains(&kw);
            if !in_title && !in_company {
                return false;
            }
        }
        if let Some(loc) = non_empty(&self.location) {
            if !job.location.to_lowercase().contains(&loc) {
                return false;
            }
        }
        if let Some(mode) = self.mode {
            if job.mode != mode {
                return false;
            }
        }
        if let Some(exp) = self.experience.as_deref().map(str::trim) {
            if !exp.is_empty() && job.experience != exp {
                return false;
            }
        }
        if let Some(src) = non_empty(&self.source) {
            if !job.source.to_lowercase().contains(&src) {
                return false;
            }
        }
        if let Some(status) = self.status {
            let current = statuses.get(&job.id).copied().unwrap_or_default();
            if current != status {
                return false;
            }
        }
        if self.above_threshold && scored.score < prefs.min_match_score {
            return false;
        }
        true
    }
}

pub fn sort_jobs(jobs: &mut [ScoredJob], mode: SortMode) {
    // sort_by is stable, so equal keys keep catalog order
    match mode {
        SortMode::Latest => jobs.sort_by_key(|s| s.job.posted_days_ago),
        SortMode::Oldest => jobs.sort_by(|a, b| b.job.posted_days_ago.cmp(&a.job.posted_days_ago)),
        SortMode::Match => jobs.sort_by(|a, b| b.score.cmp(&a.score)),
    }
}

/// Score, filter and order the catalog for browsing. An empty result is valid.
pub fn browse(
    catalog: &Catalog,
    prefs: &Preferences,
    criteria: &FilterCriteria,
    statuses: &HashMap<String, ApplicationStatus>,
    sort: SortMode,
) -> Vec<ScoredJob> {
    let mut jobs: Vec<ScoredJob> = score_all(catalog.iter(), prefs)
        .into_iter()
        .filter(|s| criteria.matches(s, prefs, statuses))
        .collect();
    sort_jobs(&mut jobs, sort);
    debug!(
        total = catalog.len(),
        shown = jobs.len(),
        sort = %sort,
        "Filtered catalog"
    );
    jobs
}
