//! Configuration module for tfw-guard.
//!
//! One struct per concern, matching the groups enumerated in §E.3:
//! - `access_log`: the columnar store connection
//! - `blocking`: enforcement back-end selection and timing
//! - `detectors`: per-variant thresholds and grouping
//! - `geoip`: the geoip detector's database and allow-list
//! - `training`: threshold-calibration modes
//! - `persistent_users`: the addresses no detector ever flags
//! - `fingerprint_paths`: TFt/TFh file and accelerator locations
//! - `user_agents`: the allow-listed user agents
//! - `logging`: log level
//! - `root`: `Config` itself, `CliOverrides`, and cross-field validation
//! - `errors`: configuration errors

pub mod access_log;
pub mod blocking;
pub mod detectors;
pub mod errors;
pub mod fingerprint_paths;
pub mod geoip;
pub mod logging;
pub mod persistent_users;
pub mod root;
pub mod training;
pub mod user_agents;

pub use access_log::AccessLogConfig;
pub use blocking::{BlockerKind, BlockingConfig};
pub use detectors::{DetectorSettings, DetectorsConfig};
pub use errors::ConfigError;
pub use fingerprint_paths::FingerprintPathsConfig;
pub use geoip::GeoipConfig;
pub use logging::LoggingConfig;
pub use persistent_users::PersistentUsersConfig;
pub use root::{CliOverrides, Config};
pub use training::{TrainingConfig, TrainingMode};
pub use user_agents::UserAgentsConfig;
