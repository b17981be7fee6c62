use serde::{Deserialize, Serialize};

/// Connection settings for the columnar access-log store.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AccessLogConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_user")]
    pub user: String,

    #[serde(default)]
    pub password: String,

    #[serde(default = "default_database")]
    pub database: String,

    #[serde(default = "default_table_name")]
    pub table_name: String,

    /// Maximum connections in the read pool against the access-log store.
    /// Default: 8.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// Seconds to wait for a new connection before failing the query.
    /// Default: 10.
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

impl Default for AccessLogConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            user: default_user(),
            password: String::new(),
            database: default_database(),
            table_name: default_table_name(),
            max_connections: default_max_connections(),
            connect_timeout_secs: default_connect_timeout_secs(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    9000
}

fn default_user() -> String {
    "default".to_string()
}

fn default_database() -> String {
    "tfw_guard".to_string()
}

fn default_table_name() -> String {
    "access_log".to_string()
}

fn default_max_connections() -> u32 {
    8
}

fn default_connect_timeout_secs() -> u64 {
    10
}
