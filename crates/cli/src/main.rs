//! # tfw-guard
//!
//! Entry point for the traffic-anomaly response engine: loads
//! configuration, wires the access-log client, detectors, and enforcement
//! back-ends into an [`AppContext`], then hands off to the detection-loop
//! job until a shutdown signal arrives.

mod bootstrap;

use clap::Parser;
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use tfw_guard_application::services::{DetectionLoopService, UserAgentManager};
use tfw_guard_application::{AppContext, Blocker, GeoipPort};
use tfw_guard_application::services::Detector;
use tfw_guard_domain::config::{BlockerKind, CliOverrides};
use tfw_guard_domain::DetectorVariant;
use tfw_guard_infrastructure::access_log::SqlxAccessLogClient;
use tfw_guard_infrastructure::blockers::{AcceleratorReloader, FingerprintBlocker, IpsetBlocker, NftBlocker};
use tfw_guard_infrastructure::geoip::{parse_allowed_cities, MaxMindGeoipSource};
use tfw_guard_infrastructure::user_agents::FileAllowListSource;
use tfw_guard_jobs::{DetectionLoopJob, JobRunner};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

#[derive(Parser, Debug)]
#[command(name = "tfw-guard")]
#[command(version)]
#[command(about = "Traffic-anomaly detection and enforcement engine")]
struct Cli {
    /// Path to the environment-style configuration file.
    #[arg(short = 'c', long = "config")]
    config: Option<String>,

    /// Log level override.
    #[arg(short = 'l', long = "log-level", value_parser = ["DEBUG", "INFO", "WARNING", "ERROR", "CRITICAL"])]
    log_level: Option<String>,

    /// Load and validate configuration, then exit without running.
    #[arg(long)]
    verify: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let overrides = CliOverrides {
        log_level: cli.log_level.clone().map(normalize_log_level),
        verify: cli.verify,
    };

    let config = match bootstrap::load_config(cli.config.as_deref(), overrides) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("failed to load configuration: {err:#}");
            std::process::exit(1);
        }
    };

    bootstrap::init_logging(&config);

    if cli.verify {
        info!("configuration verified successfully");
        return Ok(());
    }

    let config = Arc::new(config);

    let access_log_pool = bootstrap::init_access_log_pool(&config.access_log).await?;
    let access_log = Arc::new(SqlxAccessLogClient::new(access_log_pool));

    let geoip: Option<Arc<dyn GeoipPort>> = if config
        .detectors
        .settings
        .get(&DetectorVariant::Geoip)
        .map(|s| s.enabled)
        .unwrap_or(false)
    {
        Some(build_geoip_source(&config.geoip).await?)
    } else {
        None
    };

    let mut detectors: BTreeMap<String, Arc<Detector>> = BTreeMap::new();
    for variant in config.detectors.enabled_variants() {
        let settings = config
            .detectors
            .settings
            .get(&variant)
            .expect("enabled variant always has settings");
        let mut detector = Detector::new(variant.name(), variant, settings);
        if variant == DetectorVariant::Geoip {
            if let Some(geoip) = geoip.clone() {
                detector = detector.with_geoip(geoip);
            }
        }
        detectors.insert(variant.name().to_string(), Arc::new(detector));
    }

    let blockers = build_blockers(&config);
    if blockers.is_empty() {
        anyhow::bail!("no blockers configured; refusing to start (use --verify to check configuration only)");
    }

    let user_agent_manager = Arc::new(UserAgentManager::new(
        Arc::new(FileAllowListSource),
        access_log.clone(),
    ));

    let context = Arc::new(AppContext::new(
        config.clone(),
        access_log,
        user_agent_manager,
        detectors,
        blockers,
    ));

    let service = DetectionLoopService::new(context);
    let job = DetectionLoopJob::new(
        service,
        config.blocking.window_duration_sec,
        config.training.mode,
        config.training.duration_sec,
        config.training.historical_epoch,
    );

    let shutdown = CancellationToken::new();
    install_signal_handlers(shutdown.clone());

    JobRunner::new(shutdown).with_detection_loop(job).start().await;

    Ok(())
}

/// Translates the CLI's `{DEBUG, INFO, WARNING, ERROR, CRITICAL}` vocabulary
/// (§6) into the lowercase level names `tracing_subscriber::EnvFilter`
/// understands. `CRITICAL` has no `tracing` equivalent and maps to `error`,
/// the closest level the filter supports.
fn normalize_log_level(level: String) -> String {
    match level.to_uppercase().as_str() {
        "DEBUG" => "debug",
        "INFO" => "info",
        "WARNING" => "warn",
        "ERROR" => "error",
        "CRITICAL" => "error",
        other => other,
    }
    .to_string()
}

async fn build_geoip_source(cfg: &tfw_guard_domain::config::GeoipConfig) -> anyhow::Result<Arc<dyn GeoipPort>> {
    let cities_raw = tokio::fs::read_to_string(&cfg.path_allowed_cities_list)
        .await
        .map_err(|err| anyhow::anyhow!("failed to read allowed-cities list {}: {err}", cfg.path_allowed_cities_list))?;
    let allowed: HashSet<String> = parse_allowed_cities(&cities_raw);
    let source = MaxMindGeoipSource::open(&cfg.path_to_db, allowed)
        .map_err(|err| anyhow::anyhow!("failed to open geoip database {}: {err}", cfg.path_to_db))?;
    Ok(Arc::new(source))
}

/// Builds every configured blocker (component D). A back-end that fails to
/// construct here (vs. fails `prepare()`, which is handled per-blocker by
/// [`DetectionLoopService::prepare_blockers`]) is simply omitted — e.g. this
/// never happens today since construction is infallible for all four
/// back-ends, but keeps the door open for a back-end whose constructor
/// needs to probe something first.
fn build_blockers(config: &tfw_guard_domain::config::Config) -> BTreeMap<String, Arc<dyn Blocker>> {
    let mut blockers: BTreeMap<String, Arc<dyn Blocker>> = BTreeMap::new();
    let paths = &config.fingerprint_paths;

    for kind in &config.blocking.blocking_types {
        match kind {
            BlockerKind::Tft => {
                let reloader = AcceleratorReloader::new(
                    paths.accelerator_executable_path.clone(),
                    paths.accelerator_config_path.clone(),
                );
                blockers.insert(
                    "tft".to_string(),
                    Arc::new(FingerprintBlocker::tft(paths.tft_path.clone(), reloader)),
                );
            }
            BlockerKind::Tfh => {
                let reloader = AcceleratorReloader::new(
                    paths.accelerator_executable_path.clone(),
                    paths.accelerator_config_path.clone(),
                );
                blockers.insert(
                    "tfh".to_string(),
                    Arc::new(FingerprintBlocker::tfh(paths.tfh_path.clone(), reloader)),
                );
            }
            BlockerKind::Ipset => {
                blockers.insert(
                    "ipset".to_string(),
                    Arc::new(IpsetBlocker::new(config.blocking.ipset_name.clone())),
                );
            }
            BlockerKind::Nftables => {
                blockers.insert(
                    "nftables".to_string(),
                    Arc::new(NftBlocker::new(
                        config.blocking.nft_table_name.clone(),
                        config.blocking.nft_set_name.clone(),
                    )),
                );
            }
        }
    }
    blockers
}

/// Installs `SIGINT`/`SIGTERM` handlers that trip `shutdown` (§6
/// "Signals", §5 "Cancellation"). Unix-only, matching the platforms the
/// enforcement back-ends (ipset, nftables, the accelerator) already target.
#[cfg(unix)]
fn install_signal_handlers(shutdown: CancellationToken) {
    use tokio::signal::unix::{signal, SignalKind};

    tokio::spawn(async move {
        let mut sigterm = match signal(SignalKind::terminate()) {
            Ok(s) => s,
            Err(err) => {
                error!(error = %err, "failed to install SIGTERM handler");
                return;
            }
        };
        let mut sigint = match signal(SignalKind::interrupt()) {
            Ok(s) => s,
            Err(err) => {
                error!(error = %err, "failed to install SIGINT handler");
                return;
            }
        };

        tokio::select! {
            _ = sigterm.recv() => warn!("received SIGTERM, shutting down"),
            _ = sigint.recv() => warn!("received SIGINT, shutting down"),
        }
        shutdown.cancel();
    });
}

#[cfg(not(unix))]
fn install_signal_handlers(shutdown: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("received ctrl-c, shutting down");
            shutdown.cancel();
        }
    });
}
