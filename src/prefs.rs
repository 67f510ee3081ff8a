use anyhow::Result;
use tracing::info;

use crate::db::{self, PREFERENCES_KEY, Store};
use crate::models::{Preferences, PreferencesUpdate};

pub fn load(store: &impl Store) -> Result<Preferences> {
    db::load_or_default(store, PREFERENCES_KEY)
}

pub fn save(store: &impl Store, prefs: &Preferences) -> Result<()> {
    db::save(store, PREFERENCES_KEY, prefs)
}

/// Validate `update` against the stored preferences and persist the result.
/// Invalid input leaves storage untouched.
pub fn update(store: &impl Store, update: PreferencesUpdate) -> Result<Preferences> {
    let next = update.apply(&load(store)?)?;
    save(store, &next)?;
    info!(
        min_match_score = next.min_match_score,
        configured = next.is_configured(),
        "Saved preferences"
    );
    Ok(next)
}
