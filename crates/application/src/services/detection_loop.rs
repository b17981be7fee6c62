use crate::context::AppContext;
use crate::services::detector::Detector;
use crate::services::persistent_users::PersistentUsersService;
use indexmap::IndexMap;
use std::sync::Arc;
use tfw_guard_domain::config::TrainingMode;
use tfw_guard_domain::User;
use tracing::{error, info, instrument, warn};

/// Summary of one completed iteration, logged by the `jobs` crate's driver
/// (E.1: "one `info!` per completed tick summarizing candidate/blocked/
/// released counts").
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IterationReport {
    pub detectors_run: usize,
    pub candidates: usize,
    pub blocked: usize,
    pub released: usize,
    pub enforced: bool,
}

/// Component F: the executor that drives one full iteration of the
/// detection/validation/enforcement cycle (§4.F). Owns the authoritative
/// block-list; nothing else in the process may mutate it (§5 "Shared
/// resources").
pub struct DetectionLoopService {
    context: Arc<AppContext>,
    persistent_users: PersistentUsersService,
    block_list: IndexMap<User, i64>,
}

impl DetectionLoopService {
    pub fn new(context: Arc<AppContext>) -> Self {
        let persistent_users = PersistentUsersService::new(context.access_log.clone());
        Self {
            context,
            persistent_users,
            block_list: IndexMap::new(),
        }
    }

    /// Runs `prepare()` on every configured blocker. A blocker that fails
    /// is dropped from the active set and logged (§7.1); if none survive
    /// the caller should treat this as fatal and exit non-zero, per §7.1's
    /// "If no blocker survives, the process exits with a non-zero code."
    pub async fn prepare_blockers(&self) -> usize {
        let mut survived = 0;
        for (name, blocker) in &self.context.blockers {
            match blocker.prepare().await {
                Ok(()) => {
                    survived += 1;
                    let now = current_unix_seconds();
                    match blocker.load(now).await {
                        Ok(existing) => info!(blocker = %name, count = existing.len(), "blocker prepared and loaded existing state"),
                        Err(err) => warn!(blocker = %name, error = %err.message, "blocker prepared but failed to load existing state"),
                    }
                }
                Err(err) => {
                    error!(blocker = %name, error = %err.message, "blocker failed to prepare; disabling for this run");
                }
            }
        }
        survived
    }

    /// One full iteration, steps 1-8 of §4.F. `now` is the iteration's wall
    /// clock (or the training-mode anchor, computed by the caller per
    /// §4.F's `historical` semantics).
    #[instrument(skip(self))]
    pub async fn run_iteration(&mut self, now: i64) -> IterationReport {
        let window = self.context.config.blocking.window_duration_sec;
        let training = self.context.config.training.mode;
        let enforce = training == TrainingMode::Off;

        // Step 2: refresh side tables.
        self.context
            .user_agent_manager
            .refresh(&self.context.config.user_agents.allow_list_path)
            .await;
        let pu = &self.context.config.persistent_users;
        self.persistent_users
            .refresh(now, pu.window_offset_sec, pu.window_duration_sec, &pu.allow)
            .await;

        // Step 3: concurrent detector queries.
        let detectors: Vec<Arc<Detector>> = self.context.detectors.values().cloned().collect();
        let pairs = futures::future::join_all(detectors.iter().map(|detector| {
            let access_log = self.context.access_log.clone();
            let detector = detector.clone();
            async move { detector.find_users(access_log.as_ref(), now, window).await }
        }))
        .await;

        // Step 4: validate + adapt threshold per detector.
        let mut new_blocks: IndexMap<User, User> = IndexMap::new();
        let mut total_candidates = 0usize;
        for (detector, (before, after)) in detectors.iter().zip(pairs) {
            let candidates = detector.validate(&before, &after);
            detector.update_threshold(&candidates).await;
            total_candidates += candidates.len();
            // Step 5: union into `new_blocks`, de-duplicated by User equality.
            for user in candidates {
                new_blocks.insert(user.clone(), user);
            }
        }

        let mut blocked = 0usize;
        if enforce {
            // Step 6: block + apply, blockers driven sequentially.
            for (name, blocker) in &self.context.blockers {
                for user in new_blocks.values() {
                    if user.has_field(blocker.identity_domain()) {
                        if let Err(err) = blocker.block(user).await {
                            error!(blocker = %name, error = %err.message, "block failed; will reconcile on next load()");
                        }
                    }
                }
                if let Err(err) = blocker.apply().await {
                    error!(blocker = %name, error = %err.message, "apply failed; blocker remains dirty for next tick");
                }
            }

            // Step 7: reconcile authoritative block-list.
            for user in new_blocks.into_values() {
                self.block_list.insert(user, now);
                blocked += 1;
            }
        }

        // Step 8: release pass — runs regardless of training mode, though
        // in `real`/`historical` mode the block-list is always empty.
        let blocking_time = self.context.config.blocking.blocking_time_sec;
        let expired: Vec<User> = self
            .block_list
            .iter()
            .filter(|(_, blocked_at)| now - **blocked_at >= blocking_time)
            .map(|(user, _)| user.clone())
            .collect();

        let mut released = 0usize;
        for user in expired {
            for (name, blocker) in &self.context.blockers {
                if user.has_field(blocker.identity_domain()) {
                    if let Err(err) = blocker.release(&user).await {
                        error!(blocker = %name, error = %err.message, "release failed; will reconcile on next load()");
                    }
                }
            }
            self.block_list.shift_remove(&user);
            released += 1;
        }

        let report = IterationReport {
            detectors_run: detectors.len(),
            candidates: total_candidates,
            blocked,
            released,
            enforced: enforce,
        };
        info!(
            detectors_run = report.detectors_run,
            candidates = report.candidates,
            blocked = report.blocked,
            released = report.released,
            enforced = report.enforced,
            "detection loop iteration complete"
        );
        report
    }
}

fn current_unix_seconds() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}
