use serde::{Deserialize, Serialize};

/// The persistent-users allow-list: addresses that are never candidates for
/// any detector, regardless of their activity (§4.E).
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PersistentUsersConfig {
    #[serde(default)]
    pub allow: Vec<String>,

    /// How far back from `now` the persistent-users window starts.
    #[serde(default = "default_window_offset_sec")]
    pub window_offset_sec: i64,

    #[serde(default = "default_window_duration_sec")]
    pub window_duration_sec: i64,
}

impl Default for PersistentUsersConfig {
    fn default() -> Self {
        Self {
            allow: Vec::new(),
            window_offset_sec: default_window_offset_sec(),
            window_duration_sec: default_window_duration_sec(),
        }
    }
}

fn default_window_offset_sec() -> i64 {
    0
}

fn default_window_duration_sec() -> i64 {
    86_400
}
