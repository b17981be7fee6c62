use serde::{Deserialize, Serialize};

/// Filesystem locations the TFt/TFh blockers and the accelerator reload
/// shell out to (§4.D).
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FingerprintPathsConfig {
    #[serde(default = "default_tft_path")]
    pub tft_path: String,

    #[serde(default = "default_tfh_path")]
    pub tfh_path: String,

    /// Path to the accelerator's own binary, probed by `prepare()` when the
    /// service unit is not active.
    #[serde(default = "default_accelerator_executable_path")]
    pub accelerator_executable_path: String,

    #[serde(default = "default_accelerator_config_path")]
    pub accelerator_config_path: String,
}

impl Default for FingerprintPathsConfig {
    fn default() -> Self {
        Self {
            tft_path: default_tft_path(),
            tfh_path: default_tfh_path(),
            accelerator_executable_path: default_accelerator_executable_path(),
            accelerator_config_path: default_accelerator_config_path(),
        }
    }
}

fn default_tft_path() -> String {
    "/etc/tempesta/tft_fingerprints.cfg".to_string()
}

fn default_tfh_path() -> String {
    "/etc/tempesta/tfh_fingerprints.cfg".to_string()
}

fn default_accelerator_executable_path() -> String {
    "/usr/sbin/tempesta-fw".to_string()
}

fn default_accelerator_config_path() -> String {
    "/etc/tempesta/tempesta_fw.conf".to_string()
}
