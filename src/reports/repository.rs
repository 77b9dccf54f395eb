//! Report persistence seam.
//!
//! The lifecycle service only talks to storage through [`ReportRepository`], so
//! the suite runs against in-memory doubles and a database-backed
//! implementation can slot in without touching the service. Updates are
//! whole-record, last-write-wins; a version check would hang off this trait if
//! concurrent worker edits ever become real.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use super::domain::{Report, ReportId, UserId};

pub trait ReportRepository: Send + Sync {
    fn insert(&self, report: Report) -> Result<Report, RepositoryError>;
    fn update(&self, report: Report) -> Result<(), RepositoryError>;
    fn fetch(&self, id: &ReportId) -> Result<Option<Report>, RepositoryError>;
    /// Every report currently assigned to the worker, for the attention count.
    fn assigned_to(&self, worker: &UserId) -> Result<Vec<Report>, RepositoryError>;
}

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("report already exists")]
    Conflict,
    #[error("report not found")]
    NotFound,
    #[error("report store unavailable: {0}")]
    Unavailable(String),
}

/// Mutex-guarded map used by the server binary and the test suites.
#[derive(Default, Clone)]
pub struct InMemoryReportRepository {
    reports: Arc<Mutex<HashMap<ReportId, Report>>>,
}

impl ReportRepository for InMemoryReportRepository {
    fn insert(&self, report: Report) -> Result<Report, RepositoryError> {
        let mut guard = self.reports.lock().expect("repository mutex poisoned");
        if guard.contains_key(&report.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(report.id.clone(), report.clone());
        Ok(report)
    }

    fn update(&self, report: Report) -> Result<(), RepositoryError> {
        let mut guard = self.reports.lock().expect("repository mutex poisoned");
        if guard.contains_key(&report.id) {
            guard.insert(report.id.clone(), report);
            Ok(())
        } else {
            Err(RepositoryError::NotFound)
        }
    }

    fn fetch(&self, id: &ReportId) -> Result<Option<Report>, RepositoryError> {
        let guard = self.reports.lock().expect("repository mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn assigned_to(&self, worker: &UserId) -> Result<Vec<Report>, RepositoryError> {
        let guard = self.reports.lock().expect("repository mutex poisoned");
        Ok(guard
            .values()
            .filter(|report| report.assigned_worker.as_ref() == Some(worker))
            .cloned()
            .collect())
    }
}
