use crate::errors::DomainError;
use crate::identity::IdentityField;
use rust_decimal::Decimal;
use std::collections::BTreeSet;
use std::hash::{Hash, Hasher};
use std::net::IpAddr;
use std::sync::Arc;

/// A cohort candidate for blocking.
///
/// Identity is carried across three optional sets (`ip`, `tft`, `tfh`); a
/// User is meaningful only once at least one of them is non-empty.
/// `value` and `blocked_at` are metadata attached by whichever component
/// produced this record (a detector's aggregate, or the authoritative
/// block-list) and deliberately do not participate in equality: two Users
/// describing the same cohort are the same User even if one carries a
/// measurement and the other carries a block timestamp.
#[derive(Debug, Clone, Default)]
pub struct User {
    pub ip: BTreeSet<IpAddr>,
    pub tft: BTreeSet<Arc<str>>,
    pub tfh: BTreeSet<Arc<str>>,
    pub value: Option<Decimal>,
    pub blocked_at: Option<i64>,
}

impl User {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ip(mut self, ip: IpAddr) -> Self {
        self.ip.insert(ip);
        self
    }

    pub fn with_tft(mut self, value: impl Into<Arc<str>>) -> Self {
        self.tft.insert(value.into());
        self
    }

    pub fn with_tfh(mut self, value: impl Into<Arc<str>>) -> Self {
        self.tfh.insert(value.into());
        self
    }

    pub fn with_value(mut self, value: Decimal) -> Self {
        self.value = Some(value);
        self
    }

    pub fn with_blocked_at(mut self, blocked_at: i64) -> Self {
        self.blocked_at = Some(blocked_at);
        self
    }

    /// A User is only meaningful once it carries at least one identity.
    pub fn validate_identity(&self) -> Result<(), DomainError> {
        if self.ip.is_empty() && self.tft.is_empty() && self.tfh.is_empty() {
            return Err(DomainError::EmptyIdentity);
        }
        Ok(())
    }

    /// Whether `field` is non-empty on this User — used both to check a
    /// detector's validation-key invariant and to decide whether a blocker's
    /// enforcement domain intersects this User.
    pub fn has_field(&self, field: IdentityField) -> bool {
        match field {
            IdentityField::Ip => !self.ip.is_empty(),
            IdentityField::Tft => !self.tft.is_empty(),
            IdentityField::Tfh => !self.tfh.is_empty(),
        }
    }

    /// String projection of one identity field, used by the validation model
    /// so ip/tft/tfh can be compared through a single map-keying scheme.
    pub fn identity_values(&self, field: IdentityField) -> Vec<String> {
        match field {
            IdentityField::Ip => self.ip.iter().map(IpAddr::to_string).collect(),
            IdentityField::Tft => self.tft.iter().map(|s| s.to_string()).collect(),
            IdentityField::Tfh => self.tfh.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl PartialEq for User {
    fn eq(&self, other: &Self) -> bool {
        self.ip == other.ip && self.tft == other.tft && self.tfh == other.tfh
    }
}

impl Eq for User {}

impl Hash for User {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.ip.hash(state);
        self.tft.hash(state);
        self.tfh.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equality_ignores_value_and_blocked_at() {
        let a = User::new().with_ip("1.1.1.1".parse().unwrap()).with_value(Decimal::from(5));
        let b = User::new()
            .with_ip("1.1.1.1".parse().unwrap())
            .with_blocked_at(1000);
        assert_eq!(a, b);
    }

    #[test]
    fn equality_stable_under_insertion_order() {
        let a = User::new()
            .with_ip("1.1.1.1".parse().unwrap())
            .with_ip("2.2.2.2".parse().unwrap());
        let b = User::new()
            .with_ip("2.2.2.2".parse().unwrap())
            .with_ip("1.1.1.1".parse().unwrap());
        assert_eq!(a, b);
    }

    #[test]
    fn empty_user_fails_identity_validation() {
        assert!(User::new().validate_identity().is_err());
    }

    #[test]
    fn single_field_user_is_valid() {
        assert!(User::new()
            .with_tft("abcd")
            .validate_identity()
            .is_ok());
    }
}
