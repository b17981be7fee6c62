use crate::ports::AccessLogPort;
use std::net::IpAddr;
use std::sync::Arc;
use tracing::{instrument, warn};

/// §4.F "Persistent users": periodically repopulates the `persistent_users`
/// side table with addresses active in a historical window, shielding
/// stable clients from every detector's candidate view.
pub struct PersistentUsersService {
    access_log: Arc<dyn AccessLogPort>,
}

impl PersistentUsersService {
    pub fn new(access_log: Arc<dyn AccessLogPort>) -> Self {
        Self { access_log }
    }

    /// `allow` is the configured allow-list (`PersistentUsersConfig::allow`):
    /// literal addresses that are always persistent, independent of recent
    /// activity. The feature is active only when this list is non-empty —
    /// an empty list means no persistent-users behavior at all (SPEC_FULL.md
    /// binding reading of §4.F).
    #[instrument(skip(self, allow))]
    pub async fn refresh(&self, now: i64, offset_sec: i64, duration_sec: i64, allow: &[String]) {
        if allow.is_empty() {
            return;
        }

        let mut addresses: Vec<IpAddr> = allow
            .iter()
            .filter_map(|raw| match raw.parse::<IpAddr>() {
                Ok(ip) => Some(ip),
                Err(_) => {
                    warn!(address = raw, "persistent_users.allow entry is not a valid address; skipping");
                    None
                }
            })
            .collect();

        let window_finish = now - offset_sec;
        let window_start = window_finish - duration_sec;
        match self
            .access_log
            .active_addresses_in_window(window_start, window_finish)
            .await
        {
            Ok(active) => addresses.extend(active),
            Err(err) => {
                warn!(error = %err.message, "failed to fetch historically-active addresses for persistent_users");
            }
        }

        addresses.sort();
        addresses.dedup();

        if let Err(err) = self.access_log.replace_persistent_users(&addresses).await {
            warn!(error = %err.message, "failed to replace persistent_users side table");
        }
    }
}
