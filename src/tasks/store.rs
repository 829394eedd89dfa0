//! On-disk task state
//!
//! The snapshot file holds `{statuses, dates}` and is rewritten in full after
//! every mutation: written to a sibling temp file, then renamed over the old
//! one, so a crash leaves either the previous or the new snapshot.

use crate::core::error::Result;
use crate::core::types::TaskStatus;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Task categories written to the mapping file on first run
pub const DEFAULT_CATEGORIES: &[(&str, &str)] = &[
    ("flooring", "Flooring Installation"),
    ("roofing", "Roofing"),
    ("concrete", "Concrete Pouring"),
    ("painting", "Painting and Decorating"),
    ("plumbing", "Plumbing Installation"),
    ("electrical", "Electrical Wiring"),
    ("hvac", "HVAC Installation"),
    ("drywall", "Drywall Installation"),
];

/// Persisted task state; dates are display-formatted ("March 09, 2026")
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskSnapshot {
    #[serde(default)]
    pub statuses: BTreeMap<String, TaskStatus>,
    #[serde(default)]
    pub dates: BTreeMap<String, String>,
}

impl TaskSnapshot {
    pub fn is_empty(&self) -> bool {
        self.statuses.is_empty() && self.dates.is_empty()
    }
}

/// Category mapping, short key -> display name
pub type CategoryMap = BTreeMap<String, String>;

pub fn default_categories() -> CategoryMap {
    DEFAULT_CATEGORIES
        .iter()
        .map(|(key, name)| (key.to_string(), name.to_string()))
        .collect()
}

/// Write `bytes` to `path` through a temp file and rename
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);
    fs::write(&tmp, bytes)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

/// Snapshot and mapping files
#[derive(Debug, Clone)]
pub struct TaskStore {
    state_path: PathBuf,
    mapping_path: PathBuf,
}

impl TaskStore {
    pub fn new(state_path: impl Into<PathBuf>, mapping_path: impl Into<PathBuf>) -> Self {
        Self {
            state_path: state_path.into(),
            mapping_path: mapping_path.into(),
        }
    }

    pub fn state_path(&self) -> &Path {
        &self.state_path
    }

    /// Load the snapshot; a missing file is an empty snapshot
    pub fn load(&self) -> Result<TaskSnapshot> {
        if !self.state_path.exists() {
            return Ok(TaskSnapshot::default());
        }
        let content = fs::read_to_string(&self.state_path)?;
        let snapshot: TaskSnapshot = serde_json::from_str(&content)?;
        info!(
            path = %self.state_path.display(),
            tasks = snapshot.statuses.len(),
            "Task state loaded"
        );
        Ok(snapshot)
    }

    pub fn save(&self, snapshot: &TaskSnapshot) -> Result<()> {
        let json = serde_json::to_vec_pretty(snapshot)?;
        write_atomic(&self.state_path, &json)
    }

    /// Load the category mapping, writing the defaults when the file is absent
    pub fn load_categories(&self) -> Result<CategoryMap> {
        if self.mapping_path.exists() {
            let content = fs::read_to_string(&self.mapping_path)?;
            return Ok(serde_json::from_str(&content)?);
        }
        let defaults = default_categories();
        write_atomic(&self.mapping_path, &serde_json::to_vec_pretty(&defaults)?)?;
        info!(path = %self.mapping_path.display(), "Seeded task category mapping");
        Ok(defaults)
    }
}
