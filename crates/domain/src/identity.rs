use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the three identity domains a [`crate::User`] can be keyed on.
///
/// A detector's `validation_key` and a blocker's enforcement domain are both
/// expressed in terms of this enum, so the validation model and the
/// block/release fan-out share one notion of "which field matters here."
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdentityField {
    Ip,
    Tft,
    Tfh,
}

impl fmt::Display for IdentityField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdentityField::Ip => write!(f, "ip"),
            IdentityField::Tft => write!(f, "tft"),
            IdentityField::Tfh => write!(f, "tfh"),
        }
    }
}
