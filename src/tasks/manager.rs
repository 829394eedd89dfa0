//! Task state manager
//!
//! Owns the local cache of task statuses and dates and keeps it in step
//! with the scheduling backend. Creation is remote-confirmed: the cache only
//! gains a task after the backend accepts it. Status changes, date changes
//! and deletions are local-first: the cache is updated and persisted before
//! the backend is called, and stays updated whatever the backend says.

use crate::backend::{BackendResponse, SchedulingBackend, TaskUpdates, TASK_TYPE};
use crate::core::error::Result;
use crate::core::types::{format_display_date, DateType, TaskStatus};
use crate::tasks::store::{CategoryMap, TaskSnapshot, TaskStore};
use chrono::NaiveDate;
use std::collections::BTreeSet;
use std::fmt;
use tracing::{error, info};

/// One cached task
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskRecord {
    pub name: String,
    pub status: TaskStatus,
    pub scheduled_date: Option<String>,
}

impl fmt::Display for TaskRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Task: {} | Scheduled: {} | Status: {} {}",
            self.name,
            self.scheduled_date.as_deref().unwrap_or("Not scheduled"),
            self.status.emoji(),
            self.status
        )
    }
}

pub struct TaskManager<B: SchedulingBackend> {
    backend: B,
    store: TaskStore,
    snapshot: TaskSnapshot,
    categories: CategoryMap,
}

impl<B: SchedulingBackend> TaskManager<B> {
    /// Load persisted state (missing files are fine) and seed the category
    /// mapping if needed
    pub fn open(backend: B, store: TaskStore) -> Result<Self> {
        let snapshot = store.load()?;
        let categories = store.load_categories()?;
        Ok(Self {
            backend,
            store,
            snapshot,
            categories,
        })
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn categories(&self) -> &CategoryMap {
        &self.categories
    }

    pub fn snapshot(&self) -> &TaskSnapshot {
        &self.snapshot
    }

    pub fn authenticate(&mut self, client_id: &str, client_secret: &str) -> bool {
        match self.backend.authenticate(client_id, client_secret) {
            Ok(true) => {
                info!("Authentication successful");
                true
            }
            Ok(false) => {
                error!("Authentication failed");
                false
            }
            Err(e) => {
                error!(error = %e, "Authentication error");
                false
            }
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.backend.is_authenticated()
    }

    fn persist(&self) {
        if let Err(e) = self.store.save(&self.snapshot) {
            error!(
                path = %self.store.state_path().display(),
                error = %e,
                "Failed to save task state"
            );
        }
    }

    fn remote_outcome(action: &str, name: &str, result: Result<BackendResponse>) -> bool {
        match result {
            Ok(response) if response.success => {
                info!(task = name, "Backend {} succeeded", action);
                true
            }
            Ok(response) => {
                error!(
                    task = name,
                    error = response.error.as_deref().unwrap_or("unknown error"),
                    "Backend {} failed",
                    action
                );
                false
            }
            Err(e) => {
                error!(task = name, error = %e, "Backend {} failed", action);
                false
            }
        }
    }

    /// Create on the backend; only then record the task locally
    pub fn create(&mut self, name: &str, start: NaiveDate, end: NaiveDate) -> bool {
        let result = self.backend.create_task(name, TASK_TYPE, start, end);
        if !Self::remote_outcome("create", name, result) {
            return false;
        }
        self.snapshot
            .statuses
            .insert(name.to_string(), TaskStatus::NotStarted);
        self.snapshot
            .dates
            .insert(name.to_string(), format_display_date(start));
        self.persist();
        true
    }

    /// Record and persist locally, then push to the backend
    pub fn update_status(&mut self, name: &str, status: TaskStatus) -> bool {
        self.snapshot.statuses.insert(name.to_string(), status);
        self.persist();
        let result = self.backend.update_task(name, &TaskUpdates::status(status));
        Self::remote_outcome("status update", name, result)
    }

    /// Record and persist locally, then push the start or end date
    pub fn update_date(&mut self, name: &str, date: NaiveDate, kind: DateType) -> bool {
        self.snapshot
            .dates
            .insert(name.to_string(), format_display_date(date));
        self.persist();
        let updates = match kind {
            DateType::Start => TaskUpdates::start(date),
            DateType::Finish => TaskUpdates::end(date),
        };
        let result = self.backend.update_task(name, &updates);
        Self::remote_outcome("date update", name, result)
    }

    /// Forget locally and persist, then delete on the backend
    pub fn delete(&mut self, name: &str) -> bool {
        self.snapshot.statuses.remove(name);
        self.snapshot.dates.remove(name);
        self.persist();
        let result = self.backend.delete_task(name);
        Self::remote_outcome("delete", name, result)
    }

    pub fn status(&self, name: &str) -> Option<TaskStatus> {
        self.snapshot.statuses.get(name).copied()
    }

    pub fn scheduled_date(&self, name: &str) -> Option<&str> {
        self.snapshot.dates.get(name).map(String::as_str)
    }

    pub fn record(&self, name: &str) -> Option<TaskRecord> {
        let status = self.status(name);
        let scheduled_date = self.scheduled_date(name).map(str::to_string);
        if status.is_none() && scheduled_date.is_none() {
            return None;
        }
        Some(TaskRecord {
            name: name.to_string(),
            status: status.unwrap_or(TaskStatus::NotStarted),
            scheduled_date,
        })
    }

    /// Every cached task, by name
    pub fn records(&self) -> Vec<TaskRecord> {
        let names: BTreeSet<&String> = self
            .snapshot
            .statuses
            .keys()
            .chain(self.snapshot.dates.keys())
            .collect();
        names
            .into_iter()
            .filter_map(|name| self.record(name))
            .collect()
    }
}
