use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("user has no identity fields set")]
    EmptyIdentity,

    #[error("invalid network address: {0}")]
    InvalidAddress(String),

    #[error("intersection_percent must be within [0, 100], got {0}")]
    InvalidIntersectionPercent(rust_decimal::Decimal),

    #[error("window duration must be positive, got {0}")]
    InvalidWindowDuration(i64),

    #[error("no detectors enabled")]
    NoDetectorsEnabled,

    #[error("no blockers enabled")]
    NoBlockersEnabled,

    #[error("attempted to remove fingerprint hash not present in the table: {0}")]
    FingerprintNotFound(String),
}
