//! Drives the detection loop against a real [`FingerprintBlocker`] backed
//! by a temp file, the same component the `tft`/`tfh` blocker kinds wire up
//! in production — verifying the block list actually round-trips through
//! disk, not just through an in-memory fake.

#[path = "../common/fixtures.rs"]
mod fixtures;

use fixtures::*;
use std::collections::BTreeMap;
use std::sync::Arc;
use tfw_guard_application::services::{DetectionLoopService, Detector, UserAgentManager};
use tfw_guard_application::{AppContext, Blocker};
use tfw_guard_domain::config::Config;
use tfw_guard_domain::DetectorVariant;
use tfw_guard_infrastructure::blockers::{AcceleratorReloader, FingerprintBlocker};

fn reloader() -> AcceleratorReloader {
    AcceleratorReloader::new("/nonexistent-accelerator-binary", "/nonexistent.cfg")
}

#[tokio::test]
async fn burst_of_tft_hashes_is_persisted_to_and_readable_from_the_fingerprint_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tft.cfg");

    let blocker = Arc::new(FingerprintBlocker::tft(path.clone(), reloader()));
    blocker.prepare().await.expect("prepare creates the file fresh");

    let now = 5_000;
    let window = 60;
    let access_log = Arc::new(ScriptedAccessLog::new(
        now,
        window,
        vec![tft_row("stable-hash", 5)],
        vec![tft_row("burst-hash-a", 90), tft_row("burst-hash-b", 95)],
    ));

    let mut config = Config::default();
    config.blocking.window_duration_sec = window;
    config.blocking.blocking_time_sec = 600;
    config
        .detectors
        .settings
        .insert(DetectorVariant::TftRps, detector_settings(10, 10, 10));

    let mut detectors: BTreeMap<String, Arc<Detector>> = BTreeMap::new();
    detectors.insert(
        "tft_rps".to_string(),
        Arc::new(Detector::new(
            "tft_rps",
            DetectorVariant::TftRps,
            config.detectors.settings.get(&DetectorVariant::TftRps).unwrap(),
        )),
    );

    let mut blockers: BTreeMap<String, Arc<dyn Blocker>> = BTreeMap::new();
    blockers.insert("tft".to_string(), blocker.clone());

    let user_agent_manager = Arc::new(UserAgentManager::new(Arc::new(EmptyAllowListSource), access_log.clone()));

    let context = Arc::new(AppContext::new(
        Arc::new(config),
        access_log,
        user_agent_manager,
        detectors,
        blockers,
    ));

    let mut loop_service = DetectionLoopService::new(context);
    let report = loop_service.run_iteration(now).await;
    assert_eq!(report.blocked, 2);

    let on_disk = tokio::fs::read_to_string(&path).await.unwrap();
    assert!(on_disk.contains("burst-hash-a"));
    assert!(on_disk.contains("burst-hash-b"));

    // A fresh blocker pointed at the same file picks up the dumped state,
    // the way a restarted process's `load()` would.
    let reloaded = FingerprintBlocker::tft(path.clone(), reloader());
    let existing = reloaded.load(now).await.unwrap();
    assert_eq!(existing.len(), 2);
}

#[tokio::test]
async fn release_pass_removes_expired_entries_from_the_fingerprint_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tfh.cfg");

    let blocker = Arc::new(FingerprintBlocker::tfh(path.clone(), reloader()));
    blocker.prepare().await.unwrap();

    let window = 60;
    let access_log = Arc::new(ScriptedAccessLog::new(
        1_000,
        window,
        vec![tfh_row("stable", 5)],
        vec![tfh_row("offender", 90)],
    ));

    let mut config = Config::default();
    config.blocking.window_duration_sec = window;
    config.blocking.blocking_time_sec = 60;
    config
        .detectors
        .settings
        .insert(DetectorVariant::TfhRps, detector_settings(10, 10, 10));

    let mut detectors: BTreeMap<String, Arc<Detector>> = BTreeMap::new();
    detectors.insert(
        "tfh_rps".to_string(),
        Arc::new(Detector::new(
            "tfh_rps",
            DetectorVariant::TfhRps,
            config.detectors.settings.get(&DetectorVariant::TfhRps).unwrap(),
        )),
    );

    let mut blockers: BTreeMap<String, Arc<dyn Blocker>> = BTreeMap::new();
    blockers.insert("tfh".to_string(), blocker.clone());

    let user_agent_manager = Arc::new(UserAgentManager::new(Arc::new(EmptyAllowListSource), access_log.clone()));

    let context = Arc::new(AppContext::new(
        Arc::new(config),
        access_log,
        user_agent_manager,
        detectors,
        blockers,
    ));

    let mut loop_service = DetectionLoopService::new(context);
    loop_service.run_iteration(1_000).await;
    assert!(tokio::fs::read_to_string(&path).await.unwrap().contains("offender"));

    // Due at t=1060 (blocking_time_sec = 60).
    let report = loop_service.run_iteration(1_060).await;
    assert_eq!(report.released, 1);
    assert!(!tokio::fs::read_to_string(&path).await.unwrap().contains("offender"));
}
