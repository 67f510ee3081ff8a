use anyhow::{Context, Result};
use std::collections::HashMap;
use std::path::Path;

use crate::models::Job;

/// The read-only, ordered job list everything else is computed from.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    jobs: Vec<Job>,
    index: HashMap<String, usize>,
}

impl Catalog {
    pub fn new(jobs: Vec<Job>) -> Self {
        let mut index = HashMap::with_capacity(jobs.len());
        for (i, job) in jobs.iter().enumerate() {
            // first occurrence wins
            index.entry(job.id.clone()).or_insert(i);
        }
        Self { jobs, index }
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let jobs: Vec<Job> = serde_json::from_str(json).context("Failed to parse job catalog")?;
        Ok(Self::new(jobs))
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read job catalog: {}", path.display()))?;
        Self::from_json_str(&content)
            .with_context(|| format!("Invalid job catalog: {}", path.display()))
    }

    pub fn find(&self, id: &str) -> Option<&Job> {
        self.index.get(id).map(|&i| &self.jobs[i])
    }

    pub fn jobs(&self) -> &[Job] {
        &self.jobs
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Job> {
        self.jobs.iter()
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }
}
