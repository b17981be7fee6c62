use thiserror::Error;

/// §7.1: startup-time failure of a blocker's enforcement surface. Fatal for
/// the affected blocker only — the detection loop disables it and carries
/// on with whatever else prepared successfully.
#[derive(Debug, Error, Clone)]
#[error("blocker {blocker} failed to prepare its enforcement surface: {message}")]
pub struct PreparationError {
    pub blocker: String,
    pub message: String,
}

impl PreparationError {
    pub fn new(blocker: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            blocker: blocker.into(),
            message: message.into(),
        }
    }
}

/// §7.2: a detector's access-log query failed. Swallowed by the caller —
/// the detector contributes an empty candidate pair for this tick.
#[derive(Debug, Error, Clone)]
#[error("access-log query failed: {message}")]
pub struct TransientStoreError {
    pub message: String,
}

impl TransientStoreError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// §7.3: a `block`/`release`/`apply` call failed against one blocker's
/// enforcement surface. Logged with the user identity and swallowed; the
/// authoritative block-list is reconciled as if the call had succeeded.
#[derive(Debug, Error, Clone)]
#[error("enforcement operation failed on blocker {blocker}: {message}")]
pub struct EnforcementError {
    pub blocker: String,
    pub message: String,
}

impl EnforcementError {
    pub fn new(blocker: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            blocker: blocker.into(),
            message: message.into(),
        }
    }
}
