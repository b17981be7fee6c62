use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tfw_guard_application::services::DetectionLoopService;
use tfw_guard_domain::config::TrainingMode;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Component F's driver: ticks [`DetectionLoopService::run_iteration`] every
/// `window_duration_sec`, computing the clock each iteration validates
/// against. In `historical` mode that clock is a virtual one anchored at
/// `historical_epoch` and advanced one window per tick — independent of
/// wall-clock time — so a replay covers the same ground a live run would,
/// at whatever pace the access-log store can answer queries.
///
/// `Config` is immutable for the life of the process (§4.G), so there is no
/// in-process transition out of `training`: an operator who wants
/// enforcement to resume restarts with `training.mode = off`. A training
/// run that outlives `duration_sec` keeps ticking in the same mode and
/// logs a warning once, rather than silently stopping.
pub struct DetectionLoopJob {
    service: Mutex<DetectionLoopService>,
    window_duration_sec: i64,
    training_mode: TrainingMode,
    training_duration_sec: i64,
    historical_epoch: Option<i64>,
    shutdown: CancellationToken,
}

impl DetectionLoopJob {
    pub fn new(
        service: DetectionLoopService,
        window_duration_sec: i64,
        training_mode: TrainingMode,
        training_duration_sec: i64,
        historical_epoch: Option<i64>,
    ) -> Self {
        Self {
            service: Mutex::new(service),
            window_duration_sec,
            training_mode,
            training_duration_sec,
            historical_epoch,
            shutdown: CancellationToken::new(),
        }
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.shutdown = token;
        self
    }

    pub async fn run(self: Arc<Self>) {
        let survived = self.service.lock().await.prepare_blockers().await;
        if survived == 0 {
            warn!("no blocker survived prepare(); exiting");
            return;
        }

        info!(
            window_duration_sec = self.window_duration_sec,
            training_mode = ?self.training_mode,
            "detection loop starting"
        );

        let start = current_unix_seconds();
        let mut virtual_clock = self.historical_epoch.unwrap_or(start);
        let mut warned_overrun = false;
        let mut interval = tokio::time::interval(Duration::from_secs(
            self.window_duration_sec.max(1) as u64,
        ));

        loop {
            tokio::select! {
                _ = self.shutdown.cancelled() => {
                    info!("detection loop shutting down");
                    break;
                }
                _ = interval.tick() => {
                    let elapsed = current_unix_seconds() - start;
                    if self.training_mode != TrainingMode::Off
                        && elapsed >= self.training_duration_sec
                        && !warned_overrun
                    {
                        warn!(
                            elapsed,
                            duration_sec = self.training_duration_sec,
                            "training duration elapsed; still running in training mode, restart with training.mode=off to enforce"
                        );
                        warned_overrun = true;
                    }

                    let now = match self.training_mode {
                        TrainingMode::Historical => {
                            let tick = virtual_clock;
                            virtual_clock += self.window_duration_sec;
                            tick
                        }
                        TrainingMode::Off | TrainingMode::Real => current_unix_seconds(),
                    };

                    let mut service = self.service.lock().await;
                    let report = service.run_iteration(now).await;
                    drop(service);
                    info!(
                        detectors_run = report.detectors_run,
                        candidates = report.candidates,
                        blocked = report.blocked,
                        released = report.released,
                        enforced = report.enforced,
                        "iteration complete"
                    );
                }
            }
        }
    }
}

fn current_unix_seconds() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as i64
}
