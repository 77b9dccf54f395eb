//! Report intake and lifecycle: domain types, persistence seam, outbound
//! notifications, the lifecycle service, and its HTTP surface.

pub mod domain;
pub mod notification;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{
    Coordinates, MediaRef, Report, ReportId, ReportStatus, ReportSubmission, StatusChange,
    UnknownStatus, UserId,
};
pub use notification::{NotificationError, NotificationSink, SmtpNotificationSink, ZoneNotification};
pub use repository::{InMemoryReportRepository, ReportRepository, RepositoryError};
pub use router::report_router;
pub use service::{ReportService, ReportServiceError, ValidationError};
