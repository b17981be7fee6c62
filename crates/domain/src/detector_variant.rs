use crate::identity::IdentityField;
use crate::metric::MetricShape;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The ten named detector variants enumerated by configuration.
///
/// Each variant fixes a `(grouping, validation_key, metric shape)` triple;
/// the small delta between e.g. `TftRps`/`TfhRps`/`IpRps` is expressed here
/// as data rather than as separate detector types, matching the spec's
/// explicit preference for parameterization over an inheritance hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectorVariant {
    IpRps,
    IpTime,
    IpErrors,
    TftRps,
    TftTime,
    TftErrors,
    TfhRps,
    TfhTime,
    TfhErrors,
    Geoip,
}

impl DetectorVariant {
    pub const ALL: [DetectorVariant; 10] = [
        DetectorVariant::IpRps,
        DetectorVariant::IpTime,
        DetectorVariant::IpErrors,
        DetectorVariant::TftRps,
        DetectorVariant::TftTime,
        DetectorVariant::TftErrors,
        DetectorVariant::TfhRps,
        DetectorVariant::TfhTime,
        DetectorVariant::TfhErrors,
        DetectorVariant::Geoip,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            DetectorVariant::IpRps => "ip_rps",
            DetectorVariant::IpTime => "ip_time",
            DetectorVariant::IpErrors => "ip_errors",
            DetectorVariant::TftRps => "tft_rps",
            DetectorVariant::TftTime => "tft_time",
            DetectorVariant::TftErrors => "tft_errors",
            DetectorVariant::TfhRps => "tfh_rps",
            DetectorVariant::TfhTime => "tfh_time",
            DetectorVariant::TfhErrors => "tfh_errors",
            DetectorVariant::Geoip => "geoip",
        }
    }

    /// Both the SQL grouping dimension and the validation-model key. The
    /// spec allows these to differ only in edge variants; none of the ten
    /// named variants here do, including `geoip`, which groups by `ip` so it
    /// can still emit a validly-keyed User (see SPEC_FULL.md §E.6).
    pub fn grouping(&self) -> IdentityField {
        match self {
            DetectorVariant::IpRps | DetectorVariant::IpTime | DetectorVariant::IpErrors => {
                IdentityField::Ip
            }
            DetectorVariant::TftRps | DetectorVariant::TftTime | DetectorVariant::TftErrors => {
                IdentityField::Tft
            }
            DetectorVariant::TfhRps | DetectorVariant::TfhTime | DetectorVariant::TfhErrors => {
                IdentityField::Tfh
            }
            DetectorVariant::Geoip => IdentityField::Ip,
        }
    }

    pub fn validation_key(&self) -> IdentityField {
        self.grouping()
    }

    pub fn metric_shape(&self) -> MetricShape {
        match self {
            DetectorVariant::IpRps | DetectorVariant::TftRps | DetectorVariant::TfhRps => {
                MetricShape::Count
            }
            DetectorVariant::IpTime | DetectorVariant::TftTime | DetectorVariant::TfhTime => {
                MetricShape::SumResponseTime
            }
            DetectorVariant::IpErrors | DetectorVariant::TftErrors | DetectorVariant::TfhErrors => {
                MetricShape::ErrorCount
            }
            DetectorVariant::Geoip => MetricShape::Count,
        }
    }
}

impl fmt::Display for DetectorVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[derive(Debug, Clone, thiserror::Error)]
#[error("unknown detector variant: {0}")]
pub struct UnknownDetectorVariant(String);

impl FromStr for DetectorVariant {
    type Err = UnknownDetectorVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DetectorVariant::ALL
            .into_iter()
            .find(|v| v.name() == s)
            .ok_or_else(|| UnknownDetectorVariant(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tfh_errors_groups_by_tfh_not_tft() {
        assert_eq!(DetectorVariant::TfhErrors.grouping(), IdentityField::Tfh);
        assert_eq!(
            DetectorVariant::TfhErrors.validation_key(),
            IdentityField::Tfh
        );
    }

    #[test]
    fn round_trips_through_name() {
        for variant in DetectorVariant::ALL {
            assert_eq!(variant.name().parse::<DetectorVariant>().unwrap(), variant);
        }
    }

    #[test]
    fn rejects_unknown_name() {
        assert!("bogus".parse::<DetectorVariant>().is_err());
    }
}
