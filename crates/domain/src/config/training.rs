use serde::{Deserialize, Serialize};

/// Whether, and how, the detection loop runs without enforcement to
/// calibrate thresholds (§4.F / §6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrainingMode {
    /// Normal operation: detection and enforcement both run.
    Off,
    /// Replays a historical window anchored at `historical_epoch`, updating
    /// thresholds but never enforcing.
    Historical,
    /// Runs detection against live traffic, updating thresholds but never
    /// enforcing.
    Real,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TrainingConfig {
    #[serde(default = "default_mode")]
    pub mode: TrainingMode,

    #[serde(default = "default_duration_sec")]
    pub duration_sec: i64,

    /// Anchor timestamp (unix seconds) training replays from. Only
    /// consulted when `mode == Historical`.
    #[serde(default)]
    pub historical_epoch: Option<i64>,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            mode: default_mode(),
            duration_sec: default_duration_sec(),
            historical_epoch: None,
        }
    }
}

impl TrainingConfig {
    pub fn is_training(&self) -> bool {
        self.mode != TrainingMode::Off
    }
}

fn default_mode() -> TrainingMode {
    TrainingMode::Off
}

fn default_duration_sec() -> i64 {
    3600
}
