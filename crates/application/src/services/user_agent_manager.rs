use crate::ports::{AccessLogPort, AllowListFileSource};
use std::sync::Arc;
use tracing::{instrument, warn};

/// Component B: reconciles the user-agent allow-list file into the
/// `user_agents` side table once per tick. §4.B: a read failure is logged
/// and skipped — the store's previous contents remain authoritative, with
/// no retry beyond the loop's natural cadence.
pub struct UserAgentManager {
    file_source: Arc<dyn AllowListFileSource>,
    access_log: Arc<dyn AccessLogPort>,
}

impl UserAgentManager {
    pub fn new(file_source: Arc<dyn AllowListFileSource>, access_log: Arc<dyn AccessLogPort>) -> Self {
        Self {
            file_source,
            access_log,
        }
    }

    #[instrument(skip(self))]
    pub async fn refresh(&self, allow_list_path: &str) {
        let entries = match self.file_source.read_lines(allow_list_path).await {
            Ok(entries) => entries,
            Err(err) => {
                warn!(path = allow_list_path, error = %err, "failed to read user-agent allow-list; keeping previous table");
                return;
            }
        };

        if let Err(err) = self.access_log.replace_user_agents(&entries).await {
            warn!(error = %err.message, "failed to replace user_agents side table");
        }
    }
}
