use anyhow::Result;
use chrono::NaiveDate;
use std::cmp::Ordering;
use tracing::{debug, info};

use crate::catalog::Catalog;
use crate::db::{self, DIGEST_KEY_PREFIX, Store};
use crate::error::TrackerError;
use crate::models::{Preferences, ScoredJob};
use crate::scoring::score_all;

pub const DIGEST_SIZE: usize = 10;

/// Top matches for one calendar day, frozen at generation time.
#[derive(Debug, Clone, PartialEq)]
pub struct Digest {
    pub date: NaiveDate,
    pub jobs: Vec<ScoredJob>,
}

pub fn digest_key(date: NaiveDate) -> String {
    format!("{}{}", DIGEST_KEY_PREFIX, date.format("%Y-%m-%d"))
}

pub fn parse_date(raw: &str) -> Result<NaiveDate, TrackerError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| TrackerError::InvalidDate(raw.to_string()))
}

/// Score descending, then fresher postings first.
fn digest_order(a: &ScoredJob, b: &ScoredJob) -> Ordering {
    b.score
        .cmp(&a.score)
        .then_with(|| a.job.posted_days_ago.cmp(&b.job.posted_days_ago))
}

/// Rank qualifying jobs without touching storage.
pub fn select_top(catalog: &Catalog, prefs: &Preferences) -> Vec<ScoredJob> {
    let mut qualifying: Vec<ScoredJob> = score_all(catalog.iter(), prefs)
        .into_iter()
        .filter(|s| s.score >= prefs.min_match_score)
        .collect();
    qualifying.sort_by(digest_order);
    qualifying.truncate(DIGEST_SIZE);
    qualifying
}

/// Build today's digest and cache it under `today`, replacing any earlier
/// one for that date. Returns `None`, and writes nothing, when no job
/// reaches the threshold.
pub fn generate(
    store: &impl Store,
    catalog: &Catalog,
    prefs: &Preferences,
    today: NaiveDate,
) -> Result<Option<Digest>> {
    let jobs = select_top(catalog, prefs);
    if jobs.is_empty() {
        debug!(%today, threshold = prefs.min_match_score, "No jobs qualify for digest");
        return Ok(None);
    }

    db::save(store, &digest_key(today), &jobs)?;
    info!(%today, count = jobs.len(), "Generated digest");

    Ok(Some(Digest { date: today, jobs }))
}

/// Raw cache read. Never generates and never rescores.
pub fn retrieve(store: &impl Store, date: NaiveDate) -> Result<Option<Digest>> {
    let jobs: Option<Vec<ScoredJob>> = db::load_optional(store, &digest_key(date))?;
    Ok(jobs.map(|jobs| Digest { date, jobs }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::testing::job;
    use crate::db::{Database, MemoryStore};
    use crate::models::Job;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, d).unwrap()
    }

    fn titled(id: &str, title: &str, posted: u32, source: &str) -> Job {
        let mut j = job(id, title, posted);
        j.source = source.to_string();
        j
    }

    fn rust_prefs(min: u32) -> Preferences {
        Preferences {
            role_keywords: "rust".to_string(),
            min_match_score: min,
            ..Default::default()
        }
    }

    #[test]
    fn test_digest_key_format() {
        assert_eq!(digest_key(day(3)), "digest:2024-06-03");
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(parse_date("2024-06-03").unwrap(), day(3));
        assert!(matches!(parse_date("06/03/2024"), Err(TrackerError::InvalidDate(_))));
    }

    #[test]
    fn test_equal_scores_fresher_job_first() {
        // 70 each: title 25 + description 15 + location 15 + mode 10, then
        // the older one gets +5 from LinkedIn and the newer one +5 for freshness
        let make = |id: &str, posted: u32, source: &str| {
            let mut j = titled(id, "Rust Engineer", posted, source);
            j.description = "Rust services".to_string();
            j
        };
        let catalog = Catalog::new(vec![make("older", 3, "LinkedIn"), make("newer", 1, "Indeed")]);
        let prefs = Preferences {
            preferred_locations: "pune".to_string(),
            ..rust_prefs(40)
        };

        let store = MemoryStore::new();
        let digest = generate(&store, &catalog, &prefs, day(1)).unwrap().unwrap();
        assert_eq!(digest.jobs[0].score, 70);
        assert_eq!(digest.jobs[1].score, 70);
        assert_eq!(digest.jobs[0].job.id, "newer");
        assert_eq!(digest.jobs[1].job.id, "older");
    }

    #[test]
    fn test_generate_orders_filters_and_truncates() {
        let mut jobs = Vec::new();
        for i in 0..15 {
            jobs.push(titled(&format!("rust-{i}"), "Rust Engineer", 10 + i, "Indeed"));
        }
        jobs.push(titled("li", "Rust Engineer", 50, "LinkedIn"));
        jobs.push(titled("chef", "Chef", 1, "LinkedIn"));
        let catalog = Catalog::new(jobs);

        let store = MemoryStore::new();
        let digest = generate(&store, &catalog, &rust_prefs(35), day(2))
            .unwrap()
            .unwrap();

        assert_eq!(digest.jobs.len(), DIGEST_SIZE);
        assert_eq!(digest.jobs[0].job.id, "li");
        assert!(digest.jobs.iter().all(|s| s.score >= 35));
        assert!(digest.jobs.iter().all(|s| s.job.id != "chef"));
        for pair in digest.jobs.windows(2) {
            let (a, b) = (&pair[0], &pair[1]);
            assert!(
                a.score > b.score
                    || (a.score == b.score && a.job.posted_days_ago <= b.job.posted_days_ago)
            );
        }
        assert_eq!(digest.jobs[1].job.id, "rust-0");
    }

    #[test]
    fn test_generate_none_writes_nothing() {
        let catalog = Catalog::new(vec![titled("chef", "Chef", 9, "Indeed")]);
        let store = MemoryStore::new();
        let result = generate(&store, &catalog, &rust_prefs(40), day(3)).unwrap();
        assert!(result.is_none());
        assert!(retrieve(&store, day(3)).unwrap().is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn test_generate_zero_threshold_admits_unscored_jobs() {
        // unconfigured preferences score 0, which still passes a 0 threshold
        let catalog = Catalog::new(vec![titled("a", "Rust Engineer", 1, "LinkedIn")]);
        let prefs = Preferences {
            min_match_score: 0,
            ..Default::default()
        };
        let store = MemoryStore::new();
        let digest = generate(&store, &catalog, &prefs, day(4)).unwrap().unwrap();
        assert_eq!(digest.jobs[0].score, 0);
    }

    #[test]
    fn test_retrieve_is_raw_cache_read() {
        let catalog = Catalog::new(vec![titled("a", "Rust Engineer", 5, "LinkedIn")]);
        let store = Database::open_in_memory().unwrap();

        assert!(retrieve(&store, day(5)).unwrap().is_none());
        let generated = generate(&store, &catalog, &rust_prefs(40), day(5))
            .unwrap()
            .unwrap();

        let cached = retrieve(&store, day(5)).unwrap().unwrap();
        assert_eq!(cached, generated);
        assert!(retrieve(&store, day(6)).unwrap().is_none());
    }

    #[test]
    fn test_regenerate_overwrites_same_day() {
        let catalog = Catalog::new(vec![
            titled("rust", "Rust Engineer", 5, "LinkedIn"),
            titled("go", "Go Engineer", 5, "LinkedIn"),
        ]);
        let store = MemoryStore::new();
        generate(&store, &catalog, &rust_prefs(40), day(7)).unwrap();

        let go_prefs = Preferences {
            role_keywords: "go".to_string(),
            ..rust_prefs(40)
        };
        generate(&store, &catalog, &go_prefs, day(7)).unwrap();

        let cached = retrieve(&store, day(7)).unwrap().unwrap();
        assert_eq!(cached.jobs.len(), 1);
        assert_eq!(cached.jobs[0].job.id, "go");
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_retrieve_malformed_cache_is_none() {
        let store = MemoryStore::new();
        store.set(&digest_key(day(8)), "not json").unwrap();
        assert!(retrieve(&store, day(8)).unwrap().is_none());
    }
}
