use rollcall_application::{
    CheckInOutcome, FanOutSummary, ReportOutcome, SessionLifecycle, StartRequest,
};
use rollcall_core::collaborator::{DirectoryLookup, LocationProvider, Notifier};
use rollcall_core::config::AttendanceSettings;
use rollcall_core::error::RollcallError;
use rollcall_core::geo::Coordinate;
use rollcall_core::session::{SessionId, SessionStore};
use rollcall_infrastructure::{InMemoryDirectory, InMemoryLocationProvider, RecordingNotifier};
use std::sync::Arc;
use std::time::Duration;

struct Harness {
    lifecycle: Arc<SessionLifecycle>,
    store: Arc<SessionStore>,
    locations: Arc<InMemoryLocationProvider>,
    notifier: Arc<RecordingNotifier>,
}

fn harness_with(locations: InMemoryLocationProvider, settings: AttendanceSettings) -> Harness {
    let store = Arc::new(SessionStore::new());
    let locations = Arc::new(locations);
    let directory = Arc::new(
        InMemoryDirectory::new()
            .with_name("org", "Organizer")
            .with_name("near", "Nora Near")
            .with_name("far", "Frank Far"),
    );
    let notifier = Arc::new(RecordingNotifier::new());

    let lifecycle = SessionLifecycle::new(
        store.clone(),
        locations.clone() as Arc<dyn LocationProvider>,
        directory as Arc<dyn DirectoryLookup>,
        notifier.clone() as Arc<dyn Notifier>,
    )
    .with_settings(settings)
    .unwrap();

    Harness {
        lifecycle: Arc::new(lifecycle),
        store,
        locations,
        notifier,
    }
}

/// Organizer and "near" at the origin, "far" roughly 157 km away.
fn harness() -> Harness {
    harness_with(
        InMemoryLocationProvider::new()
            .with_position("org", Coordinate::new(0.0, 0.0))
            .with_position("near", Coordinate::new(0.0, 0.0))
            .with_position("far", Coordinate::new(1.0, 1.0)),
        AttendanceSettings::default(),
    )
}

fn start_request() -> StartRequest {
    StartRequest::new("org", "chan")
        .with_name("Park cleanup")
        .with_radius(150.0)
        .with_candidates(["near", "far"])
}

#[tokio::test]
async fn test_end_to_end_scenario() {
    let h = harness();

    let started = h.lifecycle.start(start_request()).await.unwrap();
    assert_eq!(started.notified(), 1);
    assert_eq!(started.fan_out.out_of_range, 1);
    assert_eq!(started.fan_out.failed, 0);
    assert_eq!(h.notifier.invited(), vec!["near".to_string()]);

    let id = started.session.id;
    let outcome = h.lifecycle.check_in(&id, "near").await;
    assert!(matches!(outcome, CheckInOutcome::CheckedIn(ref r) if r.participant_id == "near"));
    let handle = h.store.handle(&id).await.unwrap();
    assert_eq!(handle.count().await, Some(1));

    let report = match h.lifecycle.end(&id, "org").await {
        ReportOutcome::Report(report) => report,
        other => panic!("expected report, got {:?}", other),
    };
    assert_eq!(report.attendee_count, 1);
    assert_eq!(report.attendees[0].display_name, "Nora Near");
    assert_eq!(h.notifier.summaries(), vec![report]);

    assert_eq!(h.lifecycle.check_in(&id, "near").await, CheckInOutcome::NotFound);
    assert_eq!(h.lifecycle.view_attendance(&id, "org").await, ReportOutcome::NotFound);
    assert_eq!(h.lifecycle.end(&id, "org").await, ReportOutcome::NotFound);
    assert!(h.store.get(&id).await.is_none());
}

#[tokio::test]
async fn test_check_in_is_idempotent() {
    let h = harness();
    let id = h.lifecycle.start(start_request()).await.unwrap().session.id;

    assert!(matches!(
        h.lifecycle.check_in(&id, "near").await,
        CheckInOutcome::CheckedIn(_)
    ));
    assert_eq!(h.lifecycle.check_in(&id, "near").await, CheckInOutcome::AlreadyPresent);

    let handle = h.store.handle(&id).await.unwrap();
    assert_eq!(handle.count().await, Some(1));
}

#[tokio::test]
async fn test_out_of_range_check_in_writes_nothing() {
    let h = harness();
    let id = h.lifecycle.start(start_request()).await.unwrap().session.id;

    match h.lifecycle.check_in(&id, "far").await {
        CheckInOutcome::OutOfRange { distance_meters } => assert!(distance_meters > 150_000.0),
        other => panic!("expected OutOfRange, got {:?}", other),
    }
    assert_eq!(h.store.handle(&id).await.unwrap().count().await, Some(0));
}

#[tokio::test]
async fn test_moving_into_range_allows_retry() {
    let h = harness();
    let id = h.lifecycle.start(start_request()).await.unwrap().session.id;

    assert!(matches!(
        h.lifecycle.check_in(&id, "far").await,
        CheckInOutcome::OutOfRange { .. }
    ));

    h.locations.set_position("far", Coordinate::new(0.0005, 0.0));
    assert!(matches!(
        h.lifecycle.check_in(&id, "far").await,
        CheckInOutcome::CheckedIn(_)
    ));
}

#[tokio::test]
async fn test_uninvited_participant_in_range_can_check_in() {
    let h = harness();
    h.locations.set_position("walk-in", Coordinate::new(0.0003, 0.0003));
    let id = h.lifecycle.start(start_request()).await.unwrap().session.id;

    assert!(!h.notifier.invited().contains(&"walk-in".to_string()));
    assert!(matches!(
        h.lifecycle.check_in(&id, "walk-in").await,
        CheckInOutcome::CheckedIn(_)
    ));

    let report = h.lifecycle.view_attendance(&id, "org").await;
    let report = report.report().unwrap();
    assert_eq!(report.attendees[0].participant_id, "walk-in");
    assert_eq!(report.attendees[0].display_name, "Unknown participant");
}

#[tokio::test]
async fn test_unknown_location_at_check_in() {
    let h = harness();
    let id = h.lifecycle.start(start_request()).await.unwrap().session.id;

    assert_eq!(
        h.lifecycle.check_in(&id, "nobody").await,
        CheckInOutcome::LocationUnavailable
    );
    assert_eq!(h.store.handle(&id).await.unwrap().count().await, Some(0));
}

#[tokio::test]
async fn test_non_organizer_is_unauthorized_and_changes_nothing() {
    let h = harness();
    let id = h.lifecycle.start(start_request()).await.unwrap().session.id;
    h.lifecycle.check_in(&id, "near").await;

    assert_eq!(h.lifecycle.view_attendance(&id, "near").await, ReportOutcome::Unauthorized);
    assert_eq!(h.lifecycle.end(&id, "near").await, ReportOutcome::Unauthorized);

    assert!(h.store.get(&id).await.is_some());
    assert_eq!(h.store.handle(&id).await.unwrap().count().await, Some(1));
    assert!(h.notifier.summaries().is_empty());
}

#[tokio::test]
async fn test_view_attendance_does_not_end_session() {
    let h = harness();
    let id = h.lifecycle.start(start_request()).await.unwrap().session.id;
    h.lifecycle.check_in(&id, "near").await;

    let first = h.lifecycle.view_attendance(&id, "org").await;
    let second = h.lifecycle.view_attendance(&id, "org").await;
    assert_eq!(first.report().unwrap().attendee_count, 1);
    assert_eq!(second.report().unwrap().attendee_count, 1);
    assert!(h.store.get(&id).await.is_some());
}

#[tokio::test]
async fn test_unknown_session_is_not_found() {
    let h = harness();
    let id = SessionId::new();

    assert_eq!(h.lifecycle.check_in(&id, "near").await, CheckInOutcome::NotFound);
    assert_eq!(h.lifecycle.view_attendance(&id, "org").await, ReportOutcome::NotFound);
    assert_eq!(h.lifecycle.end(&id, "org").await, ReportOutcome::NotFound);
}

#[tokio::test]
async fn test_start_with_no_candidates_in_range() {
    let h = harness();
    let started = h
        .lifecycle
        .start(StartRequest::new("org", "chan").with_candidates(["far"]))
        .await
        .unwrap();

    assert_eq!(started.notified(), 0);
    assert_eq!(started.session.name, "Attendance");
    assert_eq!(started.session.radius_meters, 150.0);
}

#[tokio::test]
async fn test_start_skips_organizer_and_duplicates() {
    let h = harness();
    let started = h
        .lifecycle
        .start(StartRequest::new("org", "chan").with_candidates(["org", "near", "near"]))
        .await
        .unwrap();

    assert_eq!(started.notified(), 1);
    assert_eq!(started.fan_out.evaluated(), 1);
    assert_eq!(h.notifier.invited(), vec!["near".to_string()]);
}

#[tokio::test]
async fn test_candidate_failures_are_isolated() {
    let h = harness();
    h.locations.set_position("mute", Coordinate::new(0.0, 0.0));
    h.notifier.set_unreachable("mute");

    let started = h
        .lifecycle
        .start(StartRequest::new("org", "chan").with_candidates(["ghost", "mute", "near", "far"]))
        .await
        .unwrap();

    assert_eq!(started.fan_out.notified, 1);
    assert_eq!(started.fan_out.failed, 2);
    assert_eq!(started.fan_out.out_of_range, 1);
}

#[tokio::test]
async fn test_start_fails_without_organizer_location() {
    let h = harness();
    h.locations.forget("org");

    let err = h.lifecycle.start(start_request()).await.unwrap_err();
    assert!(matches!(err, RollcallError::Location(_)));
    assert!(h.store.is_empty().await);
    assert!(h.notifier.sent().is_empty());
}

#[tokio::test]
async fn test_start_rejects_non_positive_radius() {
    let h = harness();
    let err = h
        .lifecycle
        .start(start_request().with_radius(0.0))
        .await
        .unwrap_err();
    assert!(matches!(err, RollcallError::InvalidInput(_)));
    assert!(h.store.is_empty().await);
}

#[tokio::test]
async fn test_organizer_is_told_about_check_ins() {
    let h = harness();
    let id = h.lifecycle.start(start_request()).await.unwrap().session.id;
    h.lifecycle.check_in(&id, "near").await;

    assert!(h.notifier.wait_for_updates(1, Duration::from_secs(2)).await);
    let updates = h.notifier.updates();
    assert_eq!(updates[0].0, "org");
    assert!(updates[0].1.contains("near"));
}

#[tokio::test]
async fn test_failed_update_does_not_roll_back_check_in() {
    let h = harness();
    let id = h.lifecycle.start(start_request()).await.unwrap().session.id;
    h.notifier.set_unreachable("org");

    assert!(matches!(
        h.lifecycle.check_in(&id, "near").await,
        CheckInOutcome::CheckedIn(_)
    ));
    assert_eq!(h.store.handle(&id).await.unwrap().count().await, Some(1));

    // Summary delivery fails too, yet the report is still returned.
    let report = h.lifecycle.end(&id, "org").await;
    assert_eq!(report.report().unwrap().attendee_count, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_check_ins_for_same_participant() {
    let h = harness_with(
        InMemoryLocationProvider::new()
            .with_position("org", Coordinate::new(0.0, 0.0))
            .with_position("near", Coordinate::new(0.0, 0.0))
            .with_latency(Duration::from_millis(5)),
        AttendanceSettings::default(),
    );
    let id = h.lifecycle.start(start_request()).await.unwrap().session.id;

    let attempts = 24;
    let mut tasks = Vec::new();
    for _ in 0..attempts {
        let lifecycle = h.lifecycle.clone();
        tasks.push(tokio::spawn(async move { lifecycle.check_in(&id, "near").await }));
    }

    let mut checked_in = 0;
    let mut already = 0;
    for task in tasks {
        match task.await.unwrap() {
            CheckInOutcome::CheckedIn(_) => checked_in += 1,
            CheckInOutcome::AlreadyPresent => already += 1,
            other => panic!("unexpected outcome {:?}", other),
        }
    }

    assert_eq!(checked_in, 1);
    assert_eq!(already, attempts - 1);
    assert_eq!(h.store.handle(&id).await.unwrap().count().await, Some(1));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_end_racing_check_ins_is_consistent() {
    let locations = InMemoryLocationProvider::new()
        .with_position("org", Coordinate::new(0.0, 0.0))
        .with_latency(Duration::from_millis(1));
    let participants: Vec<String> = (0..40).map(|i| format!("p{}", i)).collect();
    for p in &participants {
        locations.set_position(p.clone(), Coordinate::new(0.0, 0.0));
    }
    let h = harness_with(locations, AttendanceSettings::default());
    let id = h
        .lifecycle
        .start(StartRequest::new("org", "chan"))
        .await
        .unwrap()
        .session
        .id;

    let mut tasks = Vec::new();
    for p in participants.clone() {
        let lifecycle = h.lifecycle.clone();
        tasks.push(tokio::spawn(async move {
            let outcome = lifecycle.check_in(&id, &p).await;
            (p, outcome)
        }));
    }
    tokio::time::sleep(Duration::from_millis(2)).await;
    let report = h.lifecycle.end(&id, "org").await;
    let report = report.report().unwrap().clone();

    for task in tasks {
        let (participant, outcome) = task.await.unwrap();
        let in_report = report
            .attendees
            .iter()
            .any(|a| a.participant_id == participant);
        match outcome {
            CheckInOutcome::CheckedIn(_) => assert!(in_report, "{} missing from report", participant),
            CheckInOutcome::NotFound => assert!(!in_report, "{} recorded after end", participant),
            other => panic!("unexpected outcome {:?}", other),
        }
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_end_calls_produce_one_report() {
    let h = harness();
    let id = h.lifecycle.start(start_request()).await.unwrap().session.id;

    let a = {
        let lifecycle = h.lifecycle.clone();
        tokio::spawn(async move { lifecycle.end(&id, "org").await })
    };
    let b = {
        let lifecycle = h.lifecycle.clone();
        tokio::spawn(async move { lifecycle.end(&id, "org").await })
    };
    let outcomes = [a.await.unwrap(), b.await.unwrap()];

    let reports = outcomes.iter().filter(|o| o.report().is_some()).count();
    let not_found = outcomes
        .iter()
        .filter(|o| **o == ReportOutcome::NotFound)
        .count();
    assert_eq!(reports, 1);
    assert_eq!(not_found, 1);
    assert_eq!(h.notifier.summaries().len(), 1);
}

#[tokio::test]
async fn test_organizer_timeout_aborts_start() {
    let settings = AttendanceSettings {
        collaborator_timeout_ms: Some(20),
        ..AttendanceSettings::default()
    };
    let h = harness_with(
        InMemoryLocationProvider::new()
            .with_position("org", Coordinate::new(0.0, 0.0))
            .with_latency(Duration::from_millis(200)),
        settings,
    );

    let err = h.lifecycle.start(start_request()).await.unwrap_err();
    assert!(matches!(err, RollcallError::Timeout { .. }));
    assert!(h.store.is_empty().await);
}

#[tokio::test]
async fn test_timed_out_candidate_is_counted_as_failed() {
    let settings = AttendanceSettings {
        collaborator_timeout_ms: Some(30),
        ..AttendanceSettings::default()
    };
    let h = harness_with(
        InMemoryLocationProvider::new()
            .with_position("org", Coordinate::new(0.0, 0.0))
            .with_position("slow", Coordinate::new(0.0, 0.0))
            .with_position("fast", Coordinate::new(0.0, 0.0))
            .with_latency_for("slow", Duration::from_millis(200)),
        settings,
    );

    let request = StartRequest::new("org", "chan").with_candidates(["slow", "fast"]);
    let started = h.lifecycle.start(request).await.unwrap();

    assert_eq!(
        started.fan_out,
        FanOutSummary {
            notified: 1,
            out_of_range: 0,
            failed: 1,
        }
    );
    assert_eq!(h.notifier.invited(), vec!["fast".to_string()]);
}

#[tokio::test]
async fn test_invalid_settings_are_rejected() {
    let lifecycle = || {
        SessionLifecycle::new(
            Arc::new(SessionStore::new()),
            Arc::new(InMemoryLocationProvider::new()) as Arc<dyn LocationProvider>,
            Arc::new(InMemoryDirectory::new()) as Arc<dyn DirectoryLookup>,
            Arc::new(RecordingNotifier::new()) as Arc<dyn Notifier>,
        )
    };

    let bad_radius = AttendanceSettings {
        default_radius_meters: -5.0,
        ..AttendanceSettings::default()
    };
    let err = lifecycle().with_settings(bad_radius).err().unwrap();
    assert!(err.is_config());

    let no_concurrency = AttendanceSettings {
        max_concurrent_invites: 0,
        ..AttendanceSettings::default()
    };
    let err = lifecycle().with_settings(no_concurrency).err().unwrap();
    assert!(err.is_config());
}

#[tokio::test]
async fn test_active_sessions_listing() {
    let h = harness();
    let started = h.lifecycle.start(start_request()).await.unwrap();

    let active = h.lifecycle.active_sessions("chan").await;
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].id, started.session.id);
    assert!(h.lifecycle.active_sessions("elsewhere").await.is_empty());

    h.lifecycle.end(&started.session.id, "org").await;
    assert!(h.lifecycle.active_sessions("chan").await.is_empty());
}
