use crate::DetectionLoopJob;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Thin orchestrator mirroring the shape a multi-job process would use,
/// kept even though tfw-guard only ever registers one job (§4.F): the
/// detection loop is the process's reason to exist, so `start` simply
/// drives it to completion rather than spawning it and returning.
pub struct JobRunner {
    detection_loop: Option<Arc<DetectionLoopJob>>,
    shutdown: CancellationToken,
}

impl JobRunner {
    pub fn new(shutdown: CancellationToken) -> Self {
        Self {
            detection_loop: None,
            shutdown,
        }
    }

    pub fn with_detection_loop(mut self, job: DetectionLoopJob) -> Self {
        self.detection_loop = Some(Arc::new(job.with_cancellation(self.shutdown.clone())));
        self
    }

    pub async fn start(self) {
        info!("starting job runner");
        if let Some(job) = self.detection_loop {
            job.run().await;
        }
        info!("job runner stopped");
    }
}
