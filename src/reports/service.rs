//! Report lifecycle service: creation with zone and worker resolution, status
//! transitions, submitter close, and the worker attention count.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::zones::{ZoneCatalog, ZoneDirectory, WorkerRegistry};

use super::domain::{Report, ReportId, ReportStatus, ReportSubmission, StatusChange, UserId};
use super::notification::{NotificationSink, ZoneNotification};
use super::repository::{ReportRepository, RepositoryError};

/// Service composing the zone catalog, email directory, crew roster,
/// report store, and notification sink.
pub struct ReportService<R, W, N> {
    catalog: Arc<ZoneCatalog>,
    directory: Arc<ZoneDirectory>,
    registry: Arc<W>,
    repository: Arc<R>,
    notifier: Arc<N>,
}

static REPORT_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_report_id() -> ReportId {
    let id = REPORT_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    ReportId(format!("rpt-{id:06}"))
}

impl<R, W, N> ReportService<R, W, N>
where
    R: ReportRepository + 'static,
    W: WorkerRegistry + 'static,
    N: NotificationSink + 'static,
{
    pub fn new(
        catalog: Arc<ZoneCatalog>,
        directory: Arc<ZoneDirectory>,
        registry: Arc<W>,
        repository: Arc<R>,
        notifier: Arc<N>,
    ) -> Self {
        Self {
            catalog,
            directory,
            registry,
            repository,
            notifier,
        }
    }

    /// Files a new report.
    ///
    /// Zone and worker are resolved exactly once, here; both resolutions fail
    /// soft (an unknown zone yields an unassigned report, never an error).
    /// After the insert the zone mailbox is notified; notification failures
    /// are logged and absorbed so creation never fails for transport reasons.
    pub fn submit(&self, submission: ReportSubmission) -> Result<Report, ReportServiceError> {
        let resolution = self.catalog.resolve(submission.coordinates);
        let assigned_worker = resolution
            .zone_number()
            .and_then(|zone_number| self.registry.active_worker(zone_number));

        let report = Report {
            id: next_report_id(),
            submitter: submission.submitter,
            image: submission.image,
            description: submission.description,
            coordinates: submission.coordinates,
            reported_at: Utc::now(),
            status: ReportStatus::Sent,
            zone: resolution.label(),
            assigned_worker,
            completion_evidence: None,
            completed_at: None,
            viewed: false,
            worker_notes: None,
        };

        let stored = self.repository.insert(report)?;
        info!(report_id = %stored.id.0, zone = %stored.zone, "report created");

        self.notify_created(&stored);
        Ok(stored)
    }

    /// Post-create notification hook, invoked synchronously after the insert.
    ///
    /// Every failure in here belongs to a collaborator (directory config, mail
    /// transport), so it degrades to a log line instead of propagating.
    fn notify_created(&self, report: &Report) {
        let Some(recipient) = self.directory.notification_address(&report.zone) else {
            debug!(report_id = %report.id.0, zone = %report.zone, "no notification address for zone, skipping notification");
            return;
        };

        let notification = ZoneNotification {
            recipient: recipient.to_string(),
            subject: format!("New Garbage Report in {}", report.zone),
            body: format!(
                "A new garbage report has been submitted in your zone.\n\n\
                 Details:\n\
                 - Reporter: {}\n\
                 - Location: {}, {}\n\
                 - Description: {}\n\
                 - Reported at: {}\n\n\
                 Please take necessary action.\n",
                report.submitter.0,
                report.coordinates.latitude,
                report.coordinates.longitude,
                report.description,
                report.reported_at,
            ),
        };

        if let Err(error) = self.notifier.send(notification) {
            warn!(report_id = %report.id.0, %error, "zone notification failed");
        }
    }

    /// Applies a worker's status change.
    ///
    /// Any of the four worker statuses is accepted from any current state,
    /// regressions included; re-opening a completed report stays possible as
    /// an administrative escape hatch. `CLOSED` is not a requestable target because it
    /// would bypass the submitter-only check in [`Self::close`]. Completion
    /// requires evidence and stamps the completion time; non-empty notes
    /// overwrite stored notes, absent or empty notes leave them untouched.
    pub fn transition_status(
        &self,
        id: &ReportId,
        change: StatusChange,
        actor: &UserId,
    ) -> Result<Report, ReportServiceError> {
        let mut report = self.repository.fetch(id)?.ok_or(RepositoryError::NotFound)?;

        match change.status {
            ReportStatus::Closed => {
                return Err(ValidationError::ClosedNotRequestable.into());
            }
            ReportStatus::Completed => {
                let evidence = change
                    .completion_evidence
                    .ok_or(ValidationError::MissingCompletionEvidence)?;
                report.completion_evidence = Some(evidence);
                report.completed_at = Some(Utc::now());
            }
            _ => {}
        }

        report.status = change.status;
        if let Some(notes) = change.notes.filter(|notes| !notes.trim().is_empty()) {
            report.worker_notes = Some(notes);
        }

        self.repository.update(report.clone())?;
        info!(report_id = %report.id.0, status = %report.status, actor = %actor.0, "report status updated");
        Ok(report)
    }

    /// Closes a report. Submitter-only, from any non-terminal state, no
    /// evidence required.
    pub fn close(&self, id: &ReportId, actor: &UserId) -> Result<Report, ReportServiceError> {
        let mut report = self.repository.fetch(id)?.ok_or(RepositoryError::NotFound)?;

        if &report.submitter != actor {
            return Err(ReportServiceError::NotSubmitter);
        }
        if report.status.is_terminal() {
            return Err(ValidationError::AlreadyTerminal(report.status).into());
        }

        report.status = ReportStatus::Closed;
        self.repository.update(report.clone())?;
        info!(report_id = %report.id.0, "report closed by submitter");
        Ok(report)
    }

    /// Worker read receipt. Idempotent: a second call is a no-op, not an error.
    pub fn mark_viewed(&self, id: &ReportId) -> Result<Report, ReportServiceError> {
        let mut report = self.repository.fetch(id)?.ok_or(RepositoryError::NotFound)?;

        if !report.viewed {
            report.viewed = true;
            self.repository.update(report.clone())?;
        }
        Ok(report)
    }

    /// Reports needing the worker's attention: assigned to them, unviewed, and
    /// still in `SENT`. Reports in `RECEIVED` or `IN_PROGRESS` are excluded;
    /// the worker has by definition already seen those.
    pub fn unviewed_count(&self, worker: &UserId) -> Result<usize, ReportServiceError> {
        let count = self
            .repository
            .assigned_to(worker)?
            .iter()
            .filter(|report| !report.viewed && report.status == ReportStatus::Sent)
            .count();
        Ok(count)
    }

    /// Fetches a single report for the read path.
    pub fn get(&self, id: &ReportId) -> Result<Report, ReportServiceError> {
        let report = self.repository.fetch(id)?.ok_or(RepositoryError::NotFound)?;
        Ok(report)
    }
}

/// Rejections about the request itself; the report is left unmodified.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error(transparent)]
    UnknownStatus(#[from] super::domain::UnknownStatus),
    #[error("completion evidence is required to mark a report COMPLETED")]
    MissingCompletionEvidence,
    #[error("CLOSED is reserved for the submitter closing the report")]
    ClosedNotRequestable,
    #[error("report is already {0} and cannot be closed")]
    AlreadyTerminal(ReportStatus),
}

#[derive(Debug, thiserror::Error)]
pub enum ReportServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("only the reporter who submitted the report may close it")]
    NotSubmitter,
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
