use crate::detector_variant::DetectorVariant;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Per-detector tunables — one of these per enabled [`DetectorVariant`].
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DetectorSettings {
    #[serde(default)]
    pub enabled: bool,

    pub default_threshold: Decimal,
    pub intersection_percent: Decimal,
    pub block_users_per_iteration: u32,

    /// Only meaningful for `*_errors` variants: status codes that do *not*
    /// count as an error.
    #[serde(default)]
    pub allowed_statuses: BTreeSet<u16>,
}

impl Default for DetectorSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            default_threshold: Decimal::from(100),
            intersection_percent: Decimal::from(50),
            block_users_per_iteration: 10,
            allowed_statuses: BTreeSet::new(),
        }
    }
}

/// All ten detector variants' settings, keyed by the variant's stable name.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DetectorsConfig {
    #[serde(default = "default_detector_settings")]
    pub settings: BTreeMap<DetectorVariant, DetectorSettings>,
}

impl Default for DetectorsConfig {
    fn default() -> Self {
        Self {
            settings: default_detector_settings(),
        }
    }
}

impl DetectorsConfig {
    pub fn enabled_variants(&self) -> impl Iterator<Item = DetectorVariant> + '_ {
        self.settings
            .iter()
            .filter(|(_, settings)| settings.enabled)
            .map(|(variant, _)| *variant)
    }

    pub fn enabled_count(&self) -> usize {
        self.enabled_variants().count()
    }
}

fn default_detector_settings() -> BTreeMap<DetectorVariant, DetectorSettings> {
    DetectorVariant::ALL
        .into_iter()
        .map(|variant| (variant, DetectorSettings::default()))
        .collect()
}
