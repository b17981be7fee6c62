use crate::ports::{AccessLogPort, Blocker};
use crate::services::{Detector, UserAgentManager};
use std::collections::BTreeMap;
use std::sync::Arc;
use tfw_guard_domain::Config;

/// Component G: the immutable bundle handed to the detection loop.
/// Constructed once at startup by the `cli` crate's wiring and never
/// mutated afterward — §4.G.
pub struct AppContext {
    pub config: Arc<Config>,
    pub access_log: Arc<dyn AccessLogPort>,
    pub user_agent_manager: Arc<UserAgentManager>,
    pub detectors: BTreeMap<String, Arc<Detector>>,
    pub blockers: BTreeMap<String, Arc<dyn Blocker>>,
}

impl AppContext {
    pub fn new(
        config: Arc<Config>,
        access_log: Arc<dyn AccessLogPort>,
        user_agent_manager: Arc<UserAgentManager>,
        detectors: BTreeMap<String, Arc<Detector>>,
        blockers: BTreeMap<String, Arc<dyn Blocker>>,
    ) -> Self {
        Self {
            config,
            access_log,
            user_agent_manager,
            detectors,
            blockers,
        }
    }
}
