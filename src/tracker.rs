use anyhow::Result;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tracing::{debug, info};

use crate::catalog::Catalog;
use crate::db::{self, JOB_STATUS_KEY, SAVED_JOBS_KEY, STATUS_LOG_KEY, Store};
use crate::models::{ApplicationStatus, Job, StatusLogEntry};

pub const STATUS_LOG_LIMIT: usize = 50;

// --- Application status ---

pub fn status_map(store: &impl Store) -> Result<HashMap<String, ApplicationStatus>> {
    db::load_or_default(store, JOB_STATUS_KEY)
}

pub fn status_of(store: &impl Store, job_id: &str) -> Result<ApplicationStatus> {
    Ok(status_map(store)?.get(job_id).copied().unwrap_or_default())
}

/// Most recent first.
pub fn status_log(store: &impl Store) -> Result<Vec<StatusLogEntry>> {
    db::load_or_default(store, STATUS_LOG_KEY)
}

pub fn set_status(
    store: &impl Store,
    catalog: &Catalog,
    job_id: &str,
    status: ApplicationStatus,
) -> Result<()> {
    set_status_at(store, catalog, job_id, status, Utc::now())
}

/// Record `status` for `job_id`. Jobs outside the catalog still get the
/// status, but no log entry since there is no title or company to show.
pub fn set_status_at(
    store: &impl Store,
    catalog: &Catalog,
    job_id: &str,
    status: ApplicationStatus,
    now: DateTime<Utc>,
) -> Result<()> {
    let mut statuses = status_map(store)?;
    statuses.insert(job_id.to_string(), status);

    let mut writes = vec![(JOB_STATUS_KEY, db::encode(&statuses)?)];

    match catalog.find(job_id) {
        Some(job) => {
            let mut log = status_log(store)?;
            log.insert(0, log_entry(job, status, now));
            log.truncate(STATUS_LOG_LIMIT);
            writes.push((STATUS_LOG_KEY, db::encode(&log)?));
            info!(job_id, %status, "Status updated");
        }
        None => debug!(job_id, %status, "Status set for job outside catalog; not logged"),
    }

    store.set_many(&writes)
}

fn log_entry(job: &Job, status: ApplicationStatus, now: DateTime<Utc>) -> StatusLogEntry {
    StatusLogEntry {
        job_id: job.id.clone(),
        title: job.title.clone(),
        company: job.company.clone(),
        status,
        timestamp: now,
    }
}

// --- Saved jobs ---

pub fn saved_ids(store: &impl Store) -> Result<Vec<String>> {
    db::load_or_default(store, SAVED_JOBS_KEY)
}

pub fn is_saved(store: &impl Store, job_id: &str) -> Result<bool> {
    Ok(saved_ids(store)?.iter().any(|id| id == job_id))
}

/// Flip membership of `job_id` in the saved set. Returns whether it is now saved.
pub fn toggle_save(store: &impl Store, job_id: &str) -> Result<bool> {
    let mut ids = saved_ids(store)?;
    let saved = match ids.iter().position(|id| id == job_id) {
        Some(pos) => {
            ids.remove(pos);
            false
        }
        None => {
            ids.push(job_id.to_string());
            true
        }
    };
    db::save(store, SAVED_JOBS_KEY, &ids)?;
    debug!(job_id, saved, "Toggled saved job");
    Ok(saved)
}

/// Saved jobs that still exist in the catalog, in catalog order.
pub fn saved_jobs<'a>(store: &impl Store, catalog: &'a Catalog) -> Result<Vec<&'a Job>> {
    let ids = saved_ids(store)?;
    Ok(catalog
        .iter()
        .filter(|job| ids.iter().any(|id| *id == job.id))
        .collect())
}
