use crate::errors::{EnforcementError, PreparationError};
use async_trait::async_trait;
use tfw_guard_domain::{IdentityField, User};

/// One enforcement back-end (component D). Concrete variants (TFt/TFh
/// fingerprint files, IpSet, NFT) live in the infrastructure crate; the
/// detection loop only ever depends on this trait.
#[async_trait]
pub trait Blocker: Send + Sync {
    /// Stable identifier used in logs and configuration.
    fn name(&self) -> &str;

    /// Which identity field this back-end enforces against. A User is
    /// routed to this blocker iff `user.has_field(identity_domain())`.
    fn identity_domain(&self) -> IdentityField;

    /// One-time startup check. A failure here disables this blocker for
    /// the remainder of the process (§7.1) — it does not retry.
    async fn prepare(&self) -> Result<(), PreparationError>;

    /// Enumerates what is already blocked by this back-end, stamping a
    /// fresh `blocked_at = now` on each so restarts inherit a new dwell
    /// timer rather than releasing immediately.
    async fn load(&self, now: i64) -> Result<Vec<User>, EnforcementError>;

    /// Installs one block. Idempotent: blocking an already-blocked user is
    /// a no-op, not an error.
    async fn block(&self, user: &User) -> Result<(), EnforcementError>;

    /// Removes one block. Idempotent in the same sense as `block`.
    async fn release(&self, user: &User) -> Result<(), EnforcementError>;

    /// Flushes batched state to the enforcement surface. A no-op when
    /// nothing is dirty.
    async fn apply(&self) -> Result<(), EnforcementError>;

    /// Current block-list snapshot, as seen by this back-end.
    async fn info(&self) -> Vec<User>;
}
