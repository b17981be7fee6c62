//! tfw-guard domain layer: the User identity model, the fingerprint-file
//! grammar, detector variants, and configuration — no I/O, no async.
pub mod config;
pub mod detector_variant;
pub mod errors;
pub mod identity;
pub mod metric;
pub mod tf_hash;
pub mod threshold;
pub mod user;
pub mod validation;
pub mod validators;

pub use config::{CliOverrides, Config, ConfigError};
pub use detector_variant::DetectorVariant;
pub use errors::DomainError;
pub use identity::IdentityField;
pub use metric::MetricShape;
pub use tf_hash::{FingerprintTable, TfHashEntry};
pub use threshold::update_threshold;
pub use user::User;
pub use validation::validate;
