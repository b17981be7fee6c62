use crate::errors::DomainError;
use rust_decimal::Decimal;

/// §4.E: `intersection_percent` is a percentage, so it must fall in `[0, 100]`.
pub fn validate_intersection_percent(value: Decimal) -> Result<(), DomainError> {
    if value < Decimal::ZERO || value > Decimal::from(100) {
        return Err(DomainError::InvalidIntersectionPercent(value));
    }
    Ok(())
}

/// §4.F step 1: `W` is the iteration interval and must be positive — a
/// zero or negative window collapses both detector windows to the same
/// instant.
pub fn validate_window_duration(seconds: i64) -> Result<(), DomainError> {
    if seconds <= 0 {
        return Err(DomainError::InvalidWindowDuration(seconds));
    }
    Ok(())
}

/// §7: at least one detector must be enabled when the process is not
/// running in `--verify` mode, or every iteration would be a no-op.
pub fn validate_detectors_nonempty(enabled_count: usize) -> Result<(), DomainError> {
    if enabled_count == 0 {
        return Err(DomainError::NoDetectorsEnabled);
    }
    Ok(())
}

/// §7: at least one blocker must be enabled when the process is not running
/// in `--verify` mode, or detected anomalies can never be enforced.
pub fn validate_blockers_nonempty(enabled_count: usize) -> Result<(), DomainError> {
    if enabled_count == 0 {
        return Err(DomainError::NoBlockersEnabled);
    }
    Ok(())
}
