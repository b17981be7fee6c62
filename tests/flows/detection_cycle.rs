//! Exercises one full detection-loop iteration the way the `cli` crate
//! wires it: several detectors and several blockers sharing one
//! `AppContext`, driven through the public `DetectionLoopService` API
//! rather than any single crate's internals.

#[path = "../common/fixtures.rs"]
mod fixtures;

use fixtures::*;
use std::collections::BTreeMap;
use std::sync::Arc;
use tfw_guard_application::services::{DetectionLoopService, Detector, UserAgentManager};
use tfw_guard_application::{AppContext, Blocker};
use tfw_guard_domain::config::Config;
use tfw_guard_domain::{DetectorVariant, IdentityField};

#[tokio::test]
async fn side_tables_refresh_before_any_detector_query_runs() {
    let now = 10_000;
    let window = 60;

    let access_log = Arc::new(ScriptedAccessLog::new(
        now,
        window,
        vec![ip_row("10.0.0.1", 5)],
        vec![ip_row("10.0.0.2", 50), ip_row("10.0.0.3", 60)],
    ));

    let mut config = Config::default();
    config.blocking.window_duration_sec = window;
    config
        .detectors
        .settings
        .insert(DetectorVariant::IpRps, detector_settings(10, 10, 10));

    let mut detectors: BTreeMap<String, Arc<Detector>> = BTreeMap::new();
    detectors.insert(
        "ip_rps".to_string(),
        Arc::new(Detector::new(
            "ip_rps",
            DetectorVariant::IpRps,
            config.detectors.settings.get(&DetectorVariant::IpRps).unwrap(),
        )),
    );

    let blocker: Arc<dyn Blocker> = Arc::new(RecordingBlocker::new(IdentityField::Ip));
    let mut blockers: BTreeMap<String, Arc<dyn Blocker>> = BTreeMap::new();
    blockers.insert("ipset".to_string(), blocker);

    let user_agent_manager = Arc::new(UserAgentManager::new(
        Arc::new(EmptyAllowListSource),
        access_log.clone(),
    ));

    let context = Arc::new(AppContext::new(
        Arc::new(config),
        access_log.clone(),
        user_agent_manager,
        detectors,
        blockers,
    ));

    let mut loop_service = DetectionLoopService::new(context);
    let report = loop_service.run_iteration(now).await;

    assert_eq!(report.detectors_run, 1);
    assert_eq!(report.blocked, 2);

    let calls = access_log.calls();
    let refresh_idx = calls.iter().position(|c| c == "replace_user_agents").unwrap();
    let query_idx = calls.iter().position(|c| c == "query_group_aggregate").unwrap();
    assert!(refresh_idx < query_idx, "expected side tables to refresh before detector queries, got {calls:?}");
}

#[tokio::test]
async fn two_detectors_union_candidates_without_duplicating_a_shared_address() {
    let now = 20_000;
    let window = 60;

    // Both variants see the same burst address; the union step (§4.F step
    // 5) must de-duplicate it rather than block it twice. `before` and
    // `after` name different addresses so the validation model's churn
    // check actually passes for both detectors.
    let access_log = Arc::new(ScriptedAccessLog::new(
        now,
        window,
        vec![ip_row("9.9.9.9", 5)],
        vec![ip_row("172.16.0.1", 80)],
    ));

    let mut config = Config::default();
    config.blocking.window_duration_sec = window;
    config
        .detectors
        .settings
        .insert(DetectorVariant::IpRps, detector_settings(10, 10, 10));
    config
        .detectors
        .settings
        .insert(DetectorVariant::IpErrors, detector_settings(10, 10, 10));

    let mut detectors: BTreeMap<String, Arc<Detector>> = BTreeMap::new();
    for variant in [DetectorVariant::IpRps, DetectorVariant::IpErrors] {
        detectors.insert(
            variant.name().to_string(),
            Arc::new(Detector::new(variant.name(), variant, config.detectors.settings.get(&variant).unwrap())),
        );
    }

    let blocker: Arc<dyn Blocker> = Arc::new(RecordingBlocker::new(IdentityField::Ip));
    let mut blockers: BTreeMap<String, Arc<dyn Blocker>> = BTreeMap::new();
    blockers.insert("ipset".to_string(), blocker.clone());

    let user_agent_manager = Arc::new(UserAgentManager::new(
        Arc::new(EmptyAllowListSource),
        access_log.clone(),
    ));

    let context = Arc::new(AppContext::new(
        Arc::new(config),
        access_log,
        user_agent_manager,
        detectors,
        blockers,
    ));

    let mut loop_service = DetectionLoopService::new(context);
    let report = loop_service.run_iteration(now).await;

    assert_eq!(report.blocked, 1);
    assert_eq!(blocker.info().await.len(), 1);
}
