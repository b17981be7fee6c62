use super::access_log::AccessLogConfig;
use super::blocking::BlockingConfig;
use super::detectors::DetectorsConfig;
use super::errors::ConfigError;
use super::fingerprint_paths::FingerprintPathsConfig;
use super::geoip::GeoipConfig;
use super::logging::LoggingConfig;
use super::persistent_users::PersistentUsersConfig;
use super::training::TrainingConfig;
use super::user_agents::UserAgentsConfig;
use crate::detector_variant::DetectorVariant;
use crate::validators::{
    validate_blockers_nonempty, validate_detectors_nonempty, validate_intersection_percent,
    validate_window_duration,
};
use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;

/// Flags the CLI layer may use to override whatever the environment file
/// says, mirroring the template's `-c`/`-l` precedence (CLI wins).
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub log_level: Option<String>,
    pub verify: bool,
}

/// The full settings surface, one field group per concern (§E.3).
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub access_log: AccessLogConfig,
    #[serde(default)]
    pub blocking: BlockingConfig,
    #[serde(default)]
    pub detectors: DetectorsConfig,
    #[serde(default)]
    pub geoip: GeoipConfig,
    #[serde(default)]
    pub training: TrainingConfig,
    #[serde(default)]
    pub persistent_users: PersistentUsersConfig,
    #[serde(default)]
    pub fingerprint_paths: FingerprintPathsConfig,
    #[serde(default)]
    pub user_agents: UserAgentsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            access_log: AccessLogConfig::default(),
            blocking: BlockingConfig::default(),
            detectors: DetectorsConfig::default(),
            geoip: GeoipConfig::default(),
            training: TrainingConfig::default(),
            persistent_users: PersistentUsersConfig::default(),
            fingerprint_paths: FingerprintPathsConfig::default(),
            user_agents: UserAgentsConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Config {
    /// Loads the environment-style settings file at `config_path` (if any,
    /// via `dotenvy` in the `cli` crate's bootstrap layer — this function
    /// itself only reads whatever is already in the process environment by
    /// the time it runs) into a `Config`, then layers `overrides` on top.
    ///
    /// Every field has a default, so a missing or partially-populated
    /// environment is not an error by itself — `validate()` is what rejects
    /// an unusable configuration.
    pub fn from_env(overrides: CliOverrides) -> Result<Self, ConfigError> {
        let mut config = Config::default();

        if let Ok(v) = env::var("ACCESS_LOG_HOST") {
            config.access_log.host = v;
        }
        if let Some(v) = env_parse("ACCESS_LOG_PORT")? {
            config.access_log.port = v;
        }
        if let Ok(v) = env::var("ACCESS_LOG_USER") {
            config.access_log.user = v;
        }
        if let Ok(v) = env::var("ACCESS_LOG_PASSWORD") {
            config.access_log.password = v;
        }
        if let Ok(v) = env::var("ACCESS_LOG_DATABASE") {
            config.access_log.database = v;
        }
        if let Ok(v) = env::var("ACCESS_LOG_TABLE_NAME") {
            config.access_log.table_name = v;
        }
        if let Some(v) = env_parse("ACCESS_LOG_MAX_CONNECTIONS")? {
            config.access_log.max_connections = v;
        }
        if let Some(v) = env_parse("ACCESS_LOG_CONNECT_TIMEOUT_SECS")? {
            config.access_log.connect_timeout_secs = v;
        }

        if let Some(v) = env_parse("BLOCKING_WINDOW_DURATION_SEC")? {
            config.blocking.window_duration_sec = v;
        }
        if let Some(v) = env_parse("BLOCKING_BLOCKING_TIME_SEC")? {
            config.blocking.blocking_time_sec = v;
        }
        if let Ok(v) = env::var("BLOCKING_IPSET_NAME") {
            config.blocking.ipset_name = v;
        }
        if let Ok(v) = env::var("BLOCKING_NFT_TABLE_NAME") {
            config.blocking.nft_table_name = v;
        }
        if let Ok(v) = env::var("BLOCKING_NFT_SET_NAME") {
            config.blocking.nft_set_name = v;
        }
        if let Ok(v) = env::var("BLOCKING_TYPES") {
            config.blocking.blocking_types = v
                .split(',')
                .filter(|s| !s.is_empty())
                .filter_map(|s| s.trim().parse().ok())
                .collect();
        }

        for variant in DetectorVariant::ALL {
            let prefix = format!("DETECTOR_{}", variant.name().to_uppercase());
            let settings = config.detectors.settings.entry(variant).or_default();
            if let Ok(v) = env::var(format!("{prefix}_ENABLED")) {
                settings.enabled = v == "1" || v.eq_ignore_ascii_case("true");
            }
            if let Ok(v) = env::var(format!("{prefix}_DEFAULT_THRESHOLD")) {
                settings.default_threshold = v.parse().map_err(|_| ConfigError::Parse {
                    field: format!("{prefix}_DEFAULT_THRESHOLD"),
                    message: "expected a decimal".to_string(),
                })?;
            }
            if let Ok(v) = env::var(format!("{prefix}_INTERSECTION_PERCENT")) {
                settings.intersection_percent = v.parse().map_err(|_| ConfigError::Parse {
                    field: format!("{prefix}_INTERSECTION_PERCENT"),
                    message: "expected a decimal".to_string(),
                })?;
            }
            if let Ok(v) = env::var(format!("{prefix}_BLOCK_USERS_PER_ITERATION")) {
                settings.block_users_per_iteration =
                    v.parse().map_err(|_| ConfigError::Parse {
                        field: format!("{prefix}_BLOCK_USERS_PER_ITERATION"),
                        message: "expected an integer".to_string(),
                    })?;
            }
            if let Ok(v) = env::var(format!("{prefix}_ALLOWED_STATUSES")) {
                settings.allowed_statuses = v
                    .split(',')
                    .filter(|s| !s.is_empty())
                    .filter_map(|s| s.trim().parse().ok())
                    .collect();
            }
        }

        if let Ok(v) = env::var("GEOIP_PATH_TO_DB") {
            config.geoip.path_to_db = v;
        }
        if let Ok(v) = env::var("GEOIP_PATH_ALLOWED_CITIES_LIST") {
            config.geoip.path_allowed_cities_list = v;
        }

        if let Ok(v) = env::var("TRAINING_MODE") {
            config.training.mode = match v.to_lowercase().as_str() {
                "historical" => super::training::TrainingMode::Historical,
                "real" => super::training::TrainingMode::Real,
                _ => super::training::TrainingMode::Off,
            };
        }
        if let Some(v) = env_parse("TRAINING_DURATION_SEC")? {
            config.training.duration_sec = v;
        }
        if let Some(v) = env_parse("TRAINING_HISTORICAL_EPOCH")? {
            config.training.historical_epoch = Some(v);
        }

        if let Ok(v) = env::var("PERSISTENT_USERS_ALLOW") {
            config.persistent_users.allow =
                v.split(',').filter(|s| !s.is_empty()).map(str::to_string).collect();
        }
        if let Some(v) = env_parse("PERSISTENT_USERS_WINDOW_OFFSET_SEC")? {
            config.persistent_users.window_offset_sec = v;
        }
        if let Some(v) = env_parse("PERSISTENT_USERS_WINDOW_DURATION_SEC")? {
            config.persistent_users.window_duration_sec = v;
        }

        if let Ok(v) = env::var("FINGERPRINT_TFT_PATH") {
            config.fingerprint_paths.tft_path = v;
        }
        if let Ok(v) = env::var("FINGERPRINT_TFH_PATH") {
            config.fingerprint_paths.tfh_path = v;
        }
        if let Ok(v) = env::var("FINGERPRINT_ACCELERATOR_EXECUTABLE_PATH") {
            config.fingerprint_paths.accelerator_executable_path = v;
        }
        if let Ok(v) = env::var("FINGERPRINT_ACCELERATOR_CONFIG_PATH") {
            config.fingerprint_paths.accelerator_config_path = v;
        }

        if let Ok(v) = env::var("USER_AGENTS_ALLOW_LIST_PATH") {
            config.user_agents.allow_list_path = v;
        }

        if let Ok(v) = env::var("LOGGING_LEVEL") {
            config.logging.level = v;
        }
        if let Some(level) = overrides.log_level {
            config.logging.level = level;
        }

        Ok(config)
    }

    /// Cross-field invariants that a single group's `Default` cannot enforce
    /// on its own (§E.3). `verify_mode` relaxes the "at least one
    /// detector/blocker enabled" requirement, since `--verify` only checks
    /// that the configured back-ends are reachable.
    pub fn validate(&self, verify_mode: bool) -> Result<(), ConfigError> {
        validate_window_duration(self.blocking.window_duration_sec)?;

        for settings in self.detectors.settings.values() {
            if settings.enabled {
                validate_intersection_percent(settings.intersection_percent)?;
            }
        }

        if !verify_mode {
            validate_detectors_nonempty(self.detectors.enabled_count())?;
            validate_blockers_nonempty(self.blocking.blocking_types.len())?;
        }

        Ok(())
    }
}

fn env_parse<T>(key: &str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
{
    match env::var(key) {
        Ok(raw) => raw
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Parse {
                field: key.to_string(),
                message: "failed to parse environment value".to_string(),
            }),
        Err(_) => Ok(None),
    }
}
