use async_trait::async_trait;
use rust_decimal::Decimal;
use std::net::IpAddr;
use std::sync::Mutex as StdMutex;
use tfw_guard_application::{
    AccessLogPort, AggregateQuerySpec, Blocker, EnforcementError, GroupAggregateRow,
    PreparationError, TransientStoreError,
};
use tfw_guard_domain::config::DetectorSettings;
use tfw_guard_domain::{IdentityField, User};

/// One grouped-aggregate row over a single IP, the shape every detector
/// variant in these flows groups by.
pub fn ip_row(ip: &str, value: i64) -> GroupAggregateRow {
    GroupAggregateRow {
        ip_addresses: vec![ip.parse().unwrap()],
        tft_hashes: Vec::new(),
        tfh_hashes: Vec::new(),
        value: Decimal::from(value),
    }
}

/// Same, but keyed on a transport fingerprint instead of an address.
pub fn tft_row(hash: &str, value: i64) -> GroupAggregateRow {
    GroupAggregateRow {
        ip_addresses: Vec::new(),
        tft_hashes: vec![hash.to_string()],
        tfh_hashes: Vec::new(),
        value: Decimal::from(value),
    }
}

/// Same, but keyed on an HTTP-layer fingerprint.
pub fn tfh_row(hash: &str, value: i64) -> GroupAggregateRow {
    GroupAggregateRow {
        ip_addresses: Vec::new(),
        tft_hashes: Vec::new(),
        tfh_hashes: vec![hash.to_string()],
        value: Decimal::from(value),
    }
}

pub fn detector_settings(
    default_threshold: i64,
    intersection_percent: i64,
    block_users_per_iteration: u32,
) -> DetectorSettings {
    DetectorSettings {
        enabled: true,
        default_threshold: Decimal::from(default_threshold),
        intersection_percent: Decimal::from(intersection_percent),
        block_users_per_iteration,
        allowed_statuses: Default::default(),
    }
}

/// An [`AccessLogPort`] fake that serves fixed `before`/`after` rows keyed
/// by which window a query's `window_finish` falls on, and records every
/// call it receives (in order) so flow tests can assert on the detection
/// loop's step ordering, not just its final outcome.
pub struct ScriptedAccessLog {
    pub before: Vec<GroupAggregateRow>,
    pub after: Vec<GroupAggregateRow>,
    pub now: i64,
    pub window: i64,
    pub calls: StdMutex<Vec<String>>,
}

impl ScriptedAccessLog {
    pub fn new(now: i64, window: i64, before: Vec<GroupAggregateRow>, after: Vec<GroupAggregateRow>) -> Self {
        Self {
            before,
            after,
            now,
            window,
            calls: StdMutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl AccessLogPort for ScriptedAccessLog {
    async fn query_group_aggregate(
        &self,
        spec: &AggregateQuerySpec,
    ) -> Result<Vec<GroupAggregateRow>, TransientStoreError> {
        self.calls.lock().unwrap().push("query_group_aggregate".to_string());
        if spec.window_finish == self.now {
            Ok(self.after.clone())
        } else if spec.window_finish == self.now - self.window {
            Ok(self.before.clone())
        } else {
            Ok(Vec::new())
        }
    }

    async fn replace_user_agents(&self, _entries: &[String]) -> Result<(), TransientStoreError> {
        self.calls.lock().unwrap().push("replace_user_agents".to_string());
        Ok(())
    }

    async fn replace_persistent_users(&self, _addresses: &[IpAddr]) -> Result<(), TransientStoreError> {
        self.calls.lock().unwrap().push("replace_persistent_users".to_string());
        Ok(())
    }

    async fn active_addresses_in_window(&self, _start: i64, _finish: i64) -> Result<Vec<IpAddr>, TransientStoreError> {
        self.calls.lock().unwrap().push("active_addresses_in_window".to_string());
        Ok(Vec::new())
    }
}

/// A recording [`Blocker`] fake over one [`IdentityField`] domain, tracking
/// blocked users the way a real back-end's in-memory batch would, without
/// any filesystem or subprocess I/O.
pub struct RecordingBlocker {
    domain: IdentityField,
    blocked: StdMutex<Vec<User>>,
}

impl RecordingBlocker {
    pub fn new(domain: IdentityField) -> Self {
        Self {
            domain,
            blocked: StdMutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl Blocker for RecordingBlocker {
    fn name(&self) -> &str {
        "recording"
    }

    fn identity_domain(&self) -> IdentityField {
        self.domain
    }

    async fn prepare(&self) -> Result<(), PreparationError> {
        Ok(())
    }

    async fn load(&self, _now: i64) -> Result<Vec<User>, EnforcementError> {
        Ok(Vec::new())
    }

    async fn block(&self, user: &User) -> Result<(), EnforcementError> {
        let mut blocked = self.blocked.lock().unwrap();
        if !blocked.contains(user) {
            blocked.push(user.clone());
        }
        Ok(())
    }

    async fn release(&self, user: &User) -> Result<(), EnforcementError> {
        self.blocked.lock().unwrap().retain(|u| u != user);
        Ok(())
    }

    async fn apply(&self) -> Result<(), EnforcementError> {
        Ok(())
    }

    async fn info(&self) -> Vec<User> {
        self.blocked.lock().unwrap().clone()
    }
}

pub struct EmptyAllowListSource;

#[async_trait]
impl tfw_guard_application::AllowListFileSource for EmptyAllowListSource {
    async fn read_lines(&self, _path: &str) -> std::io::Result<Vec<String>> {
        Ok(Vec::new())
    }
}
