use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::response::Response;
use serde_json::Value;

use crate::reports::domain::{Coordinates, MediaRef, Report, ReportId, ReportSubmission, UserId};
use crate::reports::notification::{NotificationError, NotificationSink, ZoneNotification};
use crate::reports::repository::{
    InMemoryReportRepository, ReportRepository, RepositoryError,
};
use crate::reports::service::ReportService;
use crate::zones::{WorkerProfile, WorkerRoster, ZoneCatalog, ZoneDirectory, ZonePolygon};

/// A point inside the test catalog's zone 5.
pub(super) fn inside_zone_5() -> Coordinates {
    Coordinates {
        longitude: 76.95,
        latitude: 8.45,
    }
}

/// A point outside every polygon in the test catalog.
pub(super) fn outside_all_zones() -> Coordinates {
    Coordinates {
        longitude: 0.0,
        latitude: 0.0,
    }
}

pub(super) fn catalog() -> ZoneCatalog {
    ZoneCatalog::new(vec![
        ZonePolygon::new(
            5,
            vec![(76.9, 8.4), (77.0, 8.4), (77.0, 8.5), (76.9, 8.5)],
        )
        .expect("valid ring"),
        ZonePolygon::new(
            6,
            vec![(77.0, 8.4), (77.1, 8.4), (77.1, 8.5), (77.0, 8.5)],
        )
        .expect("valid ring"),
    ])
}

pub(super) fn directory() -> ZoneDirectory {
    ZoneDirectory::new(HashMap::from([(
        5,
        "zone5@sanitation.example".to_string(),
    )]))
}

pub(super) fn roster() -> WorkerRoster {
    let roster = WorkerRoster::new(12);
    roster
        .register(WorkerProfile {
            user: UserId("crew-5".to_string()),
            zone_number: 5,
            active: true,
        })
        .expect("zone 5 staffed");
    roster
}

pub(super) fn submission() -> ReportSubmission {
    ReportSubmission {
        submitter: UserId("citizen-1".to_string()),
        image: MediaRef("media/reports/overflowing-bin.jpg".to_string()),
        description: "Overflowing bin next to the bus stop".to_string(),
        coordinates: inside_zone_5(),
    }
}

/// Records every notification handed to it.
#[derive(Default, Clone)]
pub(super) struct RecordingSink {
    sent: Arc<Mutex<Vec<ZoneNotification>>>,
}

impl RecordingSink {
    pub(super) fn sent(&self) -> Vec<ZoneNotification> {
        self.sent.lock().expect("sink mutex poisoned").clone()
    }
}

impl NotificationSink for RecordingSink {
    fn send(&self, notification: ZoneNotification) -> Result<(), NotificationError> {
        self.sent
            .lock()
            .expect("sink mutex poisoned")
            .push(notification);
        Ok(())
    }
}

/// Sink whose transport always fails, for absorption tests.
pub(super) struct FailingSink;

impl NotificationSink for FailingSink {
    fn send(&self, _notification: ZoneNotification) -> Result<(), NotificationError> {
        Err(NotificationError::Address("broken transport".to_string()))
    }
}

/// Repository that reports the backing store as unavailable.
pub(super) struct UnavailableRepository;

impl ReportRepository for UnavailableRepository {
    fn insert(&self, _report: Report) -> Result<Report, RepositoryError> {
        Err(RepositoryError::Unavailable("store down".to_string()))
    }

    fn update(&self, _report: Report) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("store down".to_string()))
    }

    fn fetch(&self, _id: &ReportId) -> Result<Option<Report>, RepositoryError> {
        Err(RepositoryError::Unavailable("store down".to_string()))
    }

    fn assigned_to(&self, _worker: &UserId) -> Result<Vec<Report>, RepositoryError> {
        Err(RepositoryError::Unavailable("store down".to_string()))
    }
}

pub(super) type TestService = ReportService<InMemoryReportRepository, WorkerRoster, RecordingSink>;

pub(super) fn build_service() -> (Arc<TestService>, InMemoryReportRepository, RecordingSink) {
    let repository = InMemoryReportRepository::default();
    let sink = RecordingSink::default();
    let service = ReportService::new(
        Arc::new(catalog()),
        Arc::new(directory()),
        Arc::new(roster()),
        Arc::new(repository.clone()),
        Arc::new(sink.clone()),
    );
    (Arc::new(service), repository, sink)
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body reads");
    serde_json::from_slice(&bytes).expect("body is json")
}
