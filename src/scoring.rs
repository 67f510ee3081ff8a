use crate::models::{Job, MAX_SCORE, Preferences, ScoredJob};

const TITLE_KEYWORD: u32 = 25;
const DESCRIPTION_KEYWORD: u32 = 15;
const LOCATION: u32 = 15;
const MODE: u32 = 10;
const EXPERIENCE: u32 = 10;
const SKILL_OVERLAP: u32 = 15;
const FRESHNESS: u32 = 5;
const SOURCE: u32 = 5;

const FRESH_DAYS: u32 = 2;

/// Split a comma-delimited field into trimmed, lowercased, non-empty tokens.
pub fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

fn any_within(needles: &[String], haystack: &str) -> bool {
    let haystack = haystack.to_lowercase();
    needles.iter().any(|n| haystack.contains(n.as_str()))
}

/// Fitness of `job` for `prefs`, 0..=100. Pure; callers recompute on every read.
pub fn score(job: &Job, prefs: &Preferences) -> u32 {
    let keywords = split_list(&prefs.role_keywords);
    let user_skills = split_list(&prefs.skills);

    if keywords.is_empty() && user_skills.is_empty() {
        return 0;
    }

    let locations = split_list(&prefs.preferred_locations);
    let mut total = 0;

    if any_within(&keywords, &job.title) {
        total += TITLE_KEYWORD;
    }
    if any_within(&keywords, &job.description) {
        total += DESCRIPTION_KEYWORD;
    }
    if any_within(&locations, &job.location) {
        total += LOCATION;
    }

    // "any" wins even alongside specific modes
    let mode_ok = prefs.preferred_mode.iter().any(|m| {
        let m = m.trim();
        m.eq_ignore_ascii_case("any") || m.eq_ignore_ascii_case(job.mode.as_str())
    });
    if mode_ok {
        total += MODE;
    }

    let level = prefs.experience_level.trim().to_lowercase();
    if !level.is_empty() && job.experience.to_lowercase().contains(&level) {
        total += EXPERIENCE;
    }

    // Either direction counts, so "js" matches "objectivejs" and vice versa.
    let skill_hit = job.skills.iter().any(|js| {
        let js = js.to_lowercase();
        user_skills
            .iter()
            .any(|us| js.contains(us.as_str()) || us.contains(js.as_str()))
    });
    if skill_hit {
        total += SKILL_OVERLAP;
    }

    if job.posted_days_ago <= FRESH_DAYS {
        total += FRESHNESS;
    }
    if job.source.to_lowercase().contains("linkedin") {
        total += SOURCE;
    }

    total.min(MAX_SCORE)
}

pub fn score_all<'a, I>(jobs: I, prefs: &Preferences) -> Vec<ScoredJob>
where
    I: IntoIterator<Item = &'a Job>,
{
    jobs.into_iter()
        .map(|job| ScoredJob {
            score: score(job, prefs),
            job: job.clone(),
        })
        .collect()
}
