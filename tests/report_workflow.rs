//! End-to-end walk of a report through the public crate surface: intake with
//! zone resolution and crew assignment, worker status updates, completion with
//! evidence, and the submitter close path.

use std::sync::{Arc, Mutex};

use binwatch::reports::{
    Coordinates, InMemoryReportRepository, MediaRef, NotificationError, NotificationSink,
    ReportService, ReportStatus, ReportSubmission, StatusChange, UserId, ZoneNotification,
};
use binwatch::zones::{WorkerProfile, WorkerRoster, ZoneCatalog, ZoneDirectory};

const ZONE_DATASET: &str = r#"{
    "type": "FeatureCollection",
    "features": [
        {
            "type": "Feature",
            "properties": { "Zone_No": 5 },
            "geometry": {
                "type": "MultiPolygon",
                "coordinates": [[[[76.9, 8.4], [77.0, 8.4], [77.0, 8.5], [76.9, 8.5], [76.9, 8.4]]]]
            }
        }
    ]
}"#;

const ZONE_EMAILS: &str = r#"{
    "zones": [
        { "zone_number": 5, "email": "zone5@sanitation.example" }
    ]
}"#;

#[derive(Default, Clone)]
struct RecordingSink {
    sent: Arc<Mutex<Vec<ZoneNotification>>>,
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

fn build_service() -> (
    Arc<ReportService<InMemoryReportRepository, WorkerRoster, RecordingSink>>,
    RecordingSink,
) {
    let catalog = ZoneCatalog::from_geojson_str(ZONE_DATASET).expect("dataset parses");
    let directory = ZoneDirectory::from_json_str(ZONE_EMAILS).expect("directory parses");

    let roster = WorkerRoster::new(12);
    roster
        .register(WorkerProfile {
            user: UserId("crew-5".to_string()),
            zone_number: 5,
            active: true,
        })
        .expect("zone 5 staffed");

    let sink = RecordingSink::default();
    let service = ReportService::new(
        Arc::new(catalog),
        Arc::new(directory),
        Arc::new(roster),
        Arc::new(InMemoryReportRepository::default()),
        Arc::new(sink.clone()),
    );
    (Arc::new(service), sink)
}

fn submission() -> ReportSubmission {
    ReportSubmission {
        submitter: UserId("citizen-9".to_string()),
        image: MediaRef("media/reports/dumped-mattress.jpg".to_string()),
        description: "Mattress dumped by the canal".to_string(),
        coordinates: Coordinates {
            longitude: 76.95,
            latitude: 8.45,
        },
    }
}

#[test]
fn report_travels_the_full_lifecycle() {
    let (service, sink) = build_service();
    let worker = UserId("crew-5".to_string());

    let report = service.submit(submission()).expect("report filed");
    assert_eq!(report.zone, "Zone 5");
    assert_eq!(report.assigned_worker, Some(worker.clone()));
    assert_eq!(report.status, ReportStatus::Sent);

    let sent = sink.sent.lock().expect("sink mutex").clone();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].recipient, "zone5@sanitation.example");

    assert_eq!(service.unviewed_count(&worker).expect("count"), 1);
    service.mark_viewed(&report.id).expect("viewed");
    assert_eq!(service.unviewed_count(&worker).expect("count"), 0);

    for status in [ReportStatus::Received, ReportStatus::InProgress] {
        let updated = service
            .transition_status(
                &report.id,
                StatusChange {
                    status,
                    completion_evidence: None,
                    notes: None,
                },
                &worker,
            )
            .expect("worker walks the lifecycle forward");
        assert_eq!(updated.status, status);
    }

    let completed = service
        .transition_status(
            &report.id,
            StatusChange {
                status: ReportStatus::Completed,
                completion_evidence: Some(MediaRef("media/evidence/cleared.jpg".to_string())),
                notes: Some("Hauled to the transfer station".to_string()),
            },
            &worker,
        )
        .expect("completion succeeds with evidence");
    assert_eq!(completed.status, ReportStatus::Completed);
    assert!(completed.completed_at.is_some());
}

#[test]
fn submitter_can_close_an_open_report() {
    let (service, _) = build_service();
    let submitter = UserId("citizen-9".to_string());

    let report = service.submit(submission()).expect("report filed");
    let closed = service.close(&report.id, &submitter).expect("close succeeds");
    assert_eq!(closed.status, ReportStatus::Closed);

    // Terminal: neither a second close nor further worker updates apply.
    assert!(service.close(&report.id, &submitter).is_err());
}
