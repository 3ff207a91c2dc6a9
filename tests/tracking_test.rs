mod mock_transport;

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use aprs_tracker::aprs::EncodingMode;
use aprs_tracker::config::TrackerConfig;
use aprs_tracker::position::{DestinationTarget, GeoFix};
use aprs_tracker::session::SessionState;
use aprs_tracker::tracking::TrackingController;

use mock_transport::{MockServer, test_identity, test_session};

fn config(interval_secs: u64) -> TrackerConfig {
    let mut config = TrackerConfig::default();
    config.station = test_identity();
    config.report.interval_secs = interval_secs;
    config.report.mode = EncodingMode::TimestampedDefault;
    config
}

fn fix(latitude: f64) -> GeoFix {
    GeoFix::new(latitude, -82.136217, 10.0, 45.0)
}

fn controller(server: &MockServer, interval_secs: u64) -> TrackingController<MockServer> {
    TrackingController::new(&config(interval_secs), Arc::new(test_session(server)))
}

#[test]
fn test_first_fix_reports_immediately() {
    let server = MockServer::new();
    let mut tracker = controller(&server, 30);

    let t0 = Instant::now();
    let packet = tracker.on_fix(fix(29.1), t0).expect("report attempted").unwrap();

    assert_eq!(server.packets(), vec![packet.to_string()]);
    assert!(packet.as_str().ends_with(">Sent from my Android"));
}

#[test]
fn test_at_most_one_report_per_interval() {
    let server = MockServer::new();
    let mut tracker = controller(&server, 30);

    let t0 = Instant::now();
    assert!(tracker.on_fix(fix(29.1), t0).is_some());
    assert!(tracker.on_fix(fix(29.2), t0 + Duration::from_secs(10)).is_none());
    assert!(tracker.on_fix(fix(29.3), t0 + Duration::from_secs(29)).is_none());
    assert!(tracker.on_fix(fix(29.4), t0 + Duration::from_secs(30)).is_some());

    assert_eq!(server.packets().len(), 2);
    assert_eq!(tracker.last_fix().map(|f| f.latitude), Some(29.4));
}

#[test]
fn test_backstop_needs_a_fix() {
    let server = MockServer::new();
    let mut tracker = controller(&server, 30);

    assert!(tracker.on_backstop(Instant::now()).is_none());
    assert_eq!(server.connection_count(), 0);
}

#[test]
fn test_backstop_reuses_last_fix() {
    let server = MockServer::new();
    let mut tracker = controller(&server, 30);

    let t0 = Instant::now();
    tracker.on_fix(fix(29.1), t0);
    // Suppressed fix still becomes the most recent one
    assert!(tracker.on_fix(fix(29.5), t0 + Duration::from_secs(5)).is_none());

    assert!(tracker.on_backstop(t0 + Duration::from_secs(20)).is_none());
    let packet = tracker
        .on_backstop(t0 + Duration::from_secs(31))
        .expect("backstop due")
        .unwrap();
    assert!(packet.as_str().contains("2930.00N"), "{packet}");
    assert_eq!(server.packets().len(), 2);
}

#[test]
fn test_force_ignores_cadence() {
    let server = MockServer::new();
    let mut tracker = controller(&server, 30);

    let t0 = Instant::now();
    assert!(tracker.force(t0).is_none());

    tracker.on_fix(fix(29.1), t0);
    assert!(tracker.force(t0 + Duration::from_secs(1)).unwrap().is_ok());
    assert_eq!(server.packets().len(), 2);

    // Forced report restarts the interval
    assert!(tracker.on_fix(fix(29.2), t0 + Duration::from_secs(30)).is_none());
    assert!(tracker.on_fix(fix(29.2), t0 + Duration::from_secs(31)).is_some());
}

#[test]
fn test_failed_report_keeps_tracking() {
    let server = MockServer::new();
    server.refuse_connections(true);
    let mut tracker = controller(&server, 30);

    let t0 = Instant::now();
    assert!(tracker.on_fix(fix(29.1), t0).unwrap().is_err());
    // The failed attempt used up this cycle
    assert!(tracker.on_fix(fix(29.2), t0 + Duration::from_secs(5)).is_none());

    server.refuse_connections(false);
    let packet = tracker
        .on_fix(fix(29.3), t0 + Duration::from_secs(30))
        .unwrap()
        .unwrap();
    assert_eq!(server.packets(), vec![packet.to_string()]);
}

#[test]
fn test_destination_switching() {
    let server = MockServer::new();
    let mut tracker = controller(&server, 1);
    let target = DestinationTarget::new(29.6516, -82.3248).unwrap();

    let t0 = Instant::now();
    let plain = tracker.on_fix(fix(29.186302), t0).unwrap().unwrap();
    assert!(plain.as_str().ends_with(">Sent from my Android"));

    tracker.set_destination(Some(target));
    assert_eq!(tracker.destination(), Some(&target));
    let annotated = tracker
        .on_fix(fix(29.186302), t0 + Duration::from_secs(1))
        .unwrap()
        .unwrap();
    assert!(annotated.as_str().ends_with(" miles from destination."), "{annotated}");

    tracker.set_destination(None);
    let cleared = tracker
        .on_fix(fix(29.186302), t0 + Duration::from_secs(2))
        .unwrap()
        .unwrap();
    assert!(cleared.as_str().ends_with(">Sent from my Android"));
}

#[test]
fn test_realtime_mode_ignores_destination() {
    let server = MockServer::new();
    let mut config = config(30);
    config.report.mode = EncodingMode::Realtime;
    config.destination = Some(DestinationTarget::new(29.6516, -82.3248).unwrap());
    let mut tracker = TrackingController::new(&config, Arc::new(test_session(&server)));

    let packet = tracker.on_fix(fix(29.1), Instant::now()).unwrap().unwrap();
    assert!(packet.as_str().contains(":!"));
    assert!(!packet.as_str().contains("miles from destination"));
}

#[test]
fn test_thread_stops_when_fixes_end() {
    let server = MockServer::new();
    let session = Arc::new(test_session(&server));
    let tracker = TrackingController::new(&config(1), Arc::clone(&session));

    let (tx, rx) = crossbeam_channel::unbounded();
    let handle = tracker.spawn(rx);
    tx.send(fix(29.1)).unwrap();
    drop(tx);
    handle.wait();

    assert_eq!(server.packets().len(), 1);
    assert_eq!(session.state(), SessionState::Closed);
    assert_eq!(server.active(), 0);
}

#[test]
fn test_thread_backstop_and_shutdown() {
    let server = MockServer::new();
    let session = Arc::new(test_session(&server));
    let tracker = TrackingController::new(&config(1), Arc::clone(&session));

    let (tx, rx) = crossbeam_channel::unbounded();
    let handle = tracker.spawn(rx);
    tx.send(fix(29.1)).unwrap();

    // No new fixes: the backstop alone must keep reporting
    thread::sleep(Duration::from_millis(2600));
    handle.shutdown();

    let sent = server.packets().len();
    assert!((2..=4).contains(&sent), "sent {sent}");
    assert_eq!(session.state(), SessionState::Closed);
    assert_eq!(server.max_active(), 1);
    assert_eq!(server.connection_count(), 1);

    // Fixes after shutdown go nowhere
    let _ = tx.send(fix(29.2));
    assert_eq!(server.packets().len(), sent);
}

#[test]
fn test_thread_commands() {
    let server = MockServer::new();
    let session = Arc::new(test_session(&server));
    let tracker = TrackingController::new(&config(60), Arc::clone(&session));

    let (tx, rx) = crossbeam_channel::unbounded();
    let handle = tracker.spawn(rx);
    tx.send(fix(29.186302)).unwrap();
    thread::sleep(Duration::from_millis(100));

    handle.set_destination(Some(DestinationTarget::new(29.6516, -82.3248).unwrap()));
    handle.force_report();
    thread::sleep(Duration::from_millis(100));
    handle.shutdown();

    let packets = server.packets();
    assert_eq!(packets.len(), 2, "{packets:?}");
    assert!(packets[0].ends_with(">Sent from my Android"));
    assert!(packets[1].ends_with(">34.1 miles from destination."), "{}", packets[1]);
}
