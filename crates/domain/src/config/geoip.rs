use serde::{Deserialize, Serialize};

/// Settings for the `geoip` detector variant (SPEC_FULL.md §E.6).
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GeoipConfig {
    /// Path to a MaxMind-format (MMDB) city database.
    #[serde(default = "default_path_to_db")]
    pub path_to_db: String,

    /// Path to a newline-delimited list of allowed city names; rows whose IP
    /// resolves to a city in this list are excluded from the geoip
    /// detector's candidate view.
    #[serde(default = "default_path_allowed_cities_list")]
    pub path_allowed_cities_list: String,
}

impl Default for GeoipConfig {
    fn default() -> Self {
        Self {
            path_to_db: default_path_to_db(),
            path_allowed_cities_list: default_path_allowed_cities_list(),
        }
    }
}

fn default_path_to_db() -> String {
    "/etc/tfw-guard/GeoLite2-City.mmdb".to_string()
}

fn default_path_allowed_cities_list() -> String {
    "/etc/tfw-guard/allowed_cities.txt".to_string()
}
