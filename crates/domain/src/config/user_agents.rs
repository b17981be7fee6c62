use serde::{Deserialize, Serialize};

/// The user-agent allow-list gating every detector's candidate view (§4.E).
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UserAgentsConfig {
    #[serde(default = "default_allow_list_path")]
    pub allow_list_path: String,
}

impl Default for UserAgentsConfig {
    fn default() -> Self {
        Self {
            allow_list_path: default_allow_list_path(),
        }
    }
}

fn default_allow_list_path() -> String {
    "/etc/tfw-guard/allowed_user_agents.txt".to_string()
}
