use tfw_guard_domain::config::{CliOverrides, Config};
use tracing::info;

/// Default platform path for the environment-style settings file (§6 CLI
/// surface: "`-c/--config <path>` (default platform path)").
pub const DEFAULT_CONFIG_PATH: &str = "/etc/tfw-guard/tfw-guard.env";

/// Loads the environment-style config file named by `config_path` (or
/// [`DEFAULT_CONFIG_PATH`] when `None`) into the process environment via
/// `dotenvy`, then layers it into a [`Config`] through
/// `Config::from_env`. A missing file is fatal at either path — §6: "missing
/// file → exit 1" — the caller surfaces this `anyhow::Error` at the CLI
/// boundary and exits non-zero.
pub fn load_config(config_path: Option<&str>, overrides: CliOverrides) -> anyhow::Result<Config> {
    let path = config_path.unwrap_or(DEFAULT_CONFIG_PATH);
    dotenvy::from_path(path)
        .map_err(|err| anyhow::anyhow!("failed to read config file {path}: {err}"))?;

    let verify_mode = overrides.verify;
    let config = Config::from_env(overrides)?;
    config.validate(verify_mode)?;

    info!(
        config_file = path,
        access_log_host = %config.access_log.host,
        blocking_types = config.blocking.blocking_types.len(),
        detectors_enabled = config.detectors.enabled_count(),
        training_mode = ?config.training.mode,
        "configuration loaded"
    );

    Ok(config)
}
