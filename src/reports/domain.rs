//! Report domain types and the status lifecycle they move through.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Opaque report identifier minted by the service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReportId(pub String);

/// Identity reference into the (externally managed) user store. Workers are
/// users too; a report's `assigned_worker` is the owning user of the crew
/// member staffing the zone.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub String);

/// Storage key of an uploaded photo, either the submission image or the
/// completion evidence. Upload mechanics live outside this service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaRef(pub String);

/// A coordinate pair in (longitude, latitude) order.
///
/// The order is contractual: it must match the order the zone polygons were
/// authored in, and the two are easy to invert silently.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub longitude: f64,
    pub latitude: f64,
}

/// Report lifecycle: `SENT → RECEIVED → IN_PROGRESS → COMPLETED`, with
/// `CLOSED` reachable from any non-terminal state by the submitter only.
///
/// Wire casing matches the original dataset's status values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReportStatus {
    Sent,
    Received,
    InProgress,
    Completed,
    Closed,
}

impl ReportStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Sent => "SENT",
            Self::Received => "RECEIVED",
            Self::InProgress => "IN_PROGRESS",
            Self::Completed => "COMPLETED",
            Self::Closed => "CLOSED",
        }
    }

    /// Terminal states admit no further transitions.
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Closed)
    }
}

impl fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ReportStatus {
    type Err = UnknownStatus;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "SENT" => Ok(Self::Sent),
            "RECEIVED" => Ok(Self::Received),
            "IN_PROGRESS" => Ok(Self::InProgress),
            "COMPLETED" => Ok(Self::Completed),
            "CLOSED" => Ok(Self::Closed),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

/// Rejection for a status string outside the enumerated set.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("'{0}' is not a recognized report status")]
pub struct UnknownStatus(pub String);

/// A citizen-submitted garbage report.
///
/// `zone` and `assigned_worker` are resolved exactly once, at creation, and
/// never recomputed even if the underlying zone or roster data changes later.
/// The submitter owns the descriptive fields; the assigned worker owns the
/// status, completion, and notes fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub id: ReportId,
    pub submitter: UserId,
    pub image: MediaRef,
    pub description: String,
    pub coordinates: Coordinates,
    pub reported_at: DateTime<Utc>,
    pub status: ReportStatus,
    pub zone: String,
    pub assigned_worker: Option<UserId>,
    pub completion_evidence: Option<MediaRef>,
    pub completed_at: Option<DateTime<Utc>>,
    pub viewed: bool,
    pub worker_notes: Option<String>,
}

/// Everything a citizen supplies when filing a report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportSubmission {
    pub submitter: UserId,
    pub image: MediaRef,
    pub description: String,
    pub coordinates: Coordinates,
}

/// A worker's requested status change.
#[derive(Debug, Clone)]
pub struct StatusChange {
    pub status: ReportStatus,
    pub completion_evidence: Option<MediaRef>,
    pub notes: Option<String>,
}
