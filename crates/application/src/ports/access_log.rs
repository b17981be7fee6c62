use crate::errors::TransientStoreError;
use async_trait::async_trait;
use rust_decimal::Decimal;
use std::collections::BTreeSet;
use std::net::IpAddr;
use tfw_guard_domain::IdentityField;

/// §4.E "aggregate query, abstract form": the detector-agnostic shape of
/// one windowed, grouped, thresholded query against `prepared_users`.
///
/// SQL text construction is out of scope for the core (§1); this struct is
/// the narrow contract the infrastructure layer's dialect-specific builder
/// consumes. `threshold` and `limit` are bound as typed parameters by that
/// builder, never interpolated as raw strings (SPEC_FULL.md §E.0).
#[derive(Debug, Clone)]
pub struct AggregateQuerySpec {
    pub grouping: IdentityField,
    pub metric: AggregateMetric,
    pub window_start: i64,
    pub window_finish: i64,
    pub threshold: Decimal,
    pub limit: u32,
}

/// The three metric shapes a detector variant may select (§4.E).
#[derive(Debug, Clone)]
pub enum AggregateMetric {
    Count,
    SumResponseTime,
    ErrorCount { allowed_statuses: BTreeSet<u16> },
}

/// One row of a grouped aggregate result. Per §4.E, a group always carries
/// the distinct values of *all three* identity fields seen within it, not
/// only the grouping key — the validation model and blocker fan-out both
/// need the full identity, not just the dimension grouped on.
#[derive(Debug, Clone, Default)]
pub struct GroupAggregateRow {
    pub ip_addresses: Vec<IpAddr>,
    pub tft_hashes: Vec<String>,
    pub tfh_hashes: Vec<String>,
    pub value: Decimal,
}

/// Contract over the columnar access-log store (component A). Only the
/// *semantics* are specified here — dialect, connection pooling, and SQL
/// text are infrastructure concerns.
#[async_trait]
pub trait AccessLogPort: Send + Sync {
    /// Runs one windowed, grouped, thresholded aggregate query.
    async fn query_group_aggregate(
        &self,
        spec: &AggregateQuerySpec,
    ) -> Result<Vec<GroupAggregateRow>, TransientStoreError>;

    /// Replaces the `user_agents` allow-list side table in full (component B).
    async fn replace_user_agents(&self, entries: &[String]) -> Result<(), TransientStoreError>;

    /// Replaces the `persistent_users` allow-list side table in full.
    async fn replace_persistent_users(
        &self,
        addresses: &[IpAddr],
    ) -> Result<(), TransientStoreError>;

    /// Addresses that issued at least one request in `[start, finish)`,
    /// used to seed the persistent-users side table (§4.F "Persistent
    /// users").
    async fn active_addresses_in_window(
        &self,
        start: i64,
        finish: i64,
    ) -> Result<Vec<IpAddr>, TransientStoreError>;
}
