//! Runs several ticks in `training.mode = real`, the calibration mode an
//! operator uses before flipping a new deployment to live enforcement:
//! thresholds must keep adapting while the blocker back-end stays
//! untouched across the whole run.

#[path = "../common/fixtures.rs"]
mod fixtures;

use fixtures::*;
use rust_decimal_macros::dec;
use std::collections::BTreeMap;
use std::sync::Arc;
use tfw_guard_application::services::{DetectionLoopService, Detector, UserAgentManager};
use tfw_guard_application::{AppContext, Blocker};
use tfw_guard_domain::config::{Config, TrainingMode};
use tfw_guard_domain::{DetectorVariant, IdentityField};

#[tokio::test]
async fn training_real_adapts_threshold_across_ticks_without_ever_enforcing() {
    let window = 60;
    let now = 1_000;
    let access_log = Arc::new(ScriptedAccessLog::new(
        now,
        window,
        vec![ip_row("10.1.0.1", 5)],
        vec![ip_row("10.2.0.1", 50), ip_row("10.2.0.2", 40), ip_row("10.2.0.3", 30)],
    ));

    let mut config = Config::default();
    config.blocking.window_duration_sec = window;
    config.training.mode = TrainingMode::Real;
    config
        .detectors
        .settings
        .insert(DetectorVariant::IpRps, detector_settings(1, 10, 10));

    let detector = Arc::new(Detector::new(
        "ip_rps",
        DetectorVariant::IpRps,
        config.detectors.settings.get(&DetectorVariant::IpRps).unwrap(),
    ));
    let mut detectors: BTreeMap<String, Arc<Detector>> = BTreeMap::new();
    detectors.insert("ip_rps".to_string(), detector.clone());

    let blocker: Arc<dyn Blocker> = Arc::new(RecordingBlocker::new(IdentityField::Ip));
    let mut blockers: BTreeMap<String, Arc<dyn Blocker>> = BTreeMap::new();
    blockers.insert("ipset".to_string(), blocker.clone());

    let user_agent_manager = Arc::new(UserAgentManager::new(Arc::new(EmptyAllowListSource), access_log.clone()));

    let context = Arc::new(AppContext::new(
        Arc::new(config),
        access_log.clone(),
        user_agent_manager,
        detectors,
        blockers,
    ));

    let mut loop_service = DetectionLoopService::new(context);
    assert_eq!(detector.current_threshold().await, dec!(1));

    // Every tick reuses the same scripted `before`/`after` window; this
    // fake only cares that `window_finish` lines up with the access log's
    // fixed `now`, so repeating it three times models three ticks worth of
    // identical traffic.
    for _ in 0..3 {
        let report = loop_service.run_iteration(now).await;
        assert_eq!(report.candidates, 3);
        assert_eq!(report.blocked, 0, "training.real must never enforce");
        assert!(blocker.info().await.is_empty());
    }

    // Mean + population stddev of [50, 40, 30] rounded to 2dp (§4.E).
    assert_eq!(detector.current_threshold().await, dec!(48.16));
}
