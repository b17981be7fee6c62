use crate::errors::TransientStoreError;
use crate::ports::geoip::GeoipPort;
use crate::ports::{AccessLogPort, AggregateMetric, AggregateQuerySpec, GroupAggregateRow};
use rust_decimal::Decimal;
use std::collections::BTreeSet;
use std::sync::Arc;
use tfw_guard_domain::config::DetectorSettings;
use tfw_guard_domain::{DetectorVariant, IdentityField, User};
use tokio::sync::Mutex;
use tracing::{debug, instrument, warn};

/// Component E: one detector instance, parameterized by its variant and
/// per-instance settings, carrying the one piece of mutable state the spec
/// allows it — its current threshold (§3 "Detector state").
pub struct Detector {
    pub name: String,
    pub variant: DetectorVariant,
    pub default_threshold: Decimal,
    pub intersection_percent: Decimal,
    pub block_users_per_iteration: u32,
    pub allowed_statuses: BTreeSet<u16>,
    threshold: Mutex<Decimal>,
    geoip: Option<Arc<dyn GeoipPort>>,
}

impl Detector {
    pub fn new(name: impl Into<String>, variant: DetectorVariant, settings: &DetectorSettings) -> Self {
        Self {
            name: name.into(),
            variant,
            default_threshold: settings.default_threshold,
            intersection_percent: settings.intersection_percent,
            block_users_per_iteration: settings.block_users_per_iteration,
            allowed_statuses: settings.allowed_statuses.clone(),
            threshold: Mutex::new(settings.default_threshold),
            geoip: None,
        }
    }

    /// Attaches the geoip allow-list lookup used only by the `geoip`
    /// variant (SPEC_FULL.md §E.6); a no-op for every other variant.
    pub fn with_geoip(mut self, geoip: Arc<dyn GeoipPort>) -> Self {
        self.geoip = Some(geoip);
        self
    }

    pub async fn current_threshold(&self) -> Decimal {
        *self.threshold.lock().await
    }

    fn metric(&self) -> AggregateMetric {
        match self.variant.metric_shape() {
            tfw_guard_domain::MetricShape::Count => AggregateMetric::Count,
            tfw_guard_domain::MetricShape::SumResponseTime => AggregateMetric::SumResponseTime,
            tfw_guard_domain::MetricShape::ErrorCount => AggregateMetric::ErrorCount {
                allowed_statuses: self.allowed_statuses.clone(),
            },
        }
    }

    /// §4.E "Windowing": fetches the `before` = `[now-2W, now-W)` and
    /// `after` = `[now-W, now)` candidate cohorts concurrently. A query
    /// failure on either window is swallowed per §7.2 — this detector
    /// simply contributes `[]` for that window, not the whole tick.
    #[instrument(skip(self, access_log), fields(detector = %self.name))]
    pub async fn find_users(
        &self,
        access_log: &dyn AccessLogPort,
        now: i64,
        window: i64,
    ) -> (Vec<User>, Vec<User>) {
        let threshold = self.current_threshold().await;
        let before_spec = AggregateQuerySpec {
            grouping: self.variant.grouping(),
            metric: self.metric(),
            window_start: now - 2 * window,
            window_finish: now - window,
            threshold,
            limit: self.block_users_per_iteration,
        };
        let after_spec = AggregateQuerySpec {
            grouping: self.variant.grouping(),
            metric: self.metric(),
            window_start: now - window,
            window_finish: now,
            threshold,
            limit: self.block_users_per_iteration,
        };

        let (before, after) = tokio::join!(
            self.run_query(access_log, &before_spec),
            self.run_query(access_log, &after_spec),
        );

        (self.rows_to_users(before), self.rows_to_users(after))
    }

    async fn run_query(
        &self,
        access_log: &dyn AccessLogPort,
        spec: &AggregateQuerySpec,
    ) -> Vec<GroupAggregateRow> {
        match access_log.query_group_aggregate(spec).await {
            Ok(rows) => rows,
            Err(TransientStoreError { message }) => {
                warn!(detector = %self.name, error = %message, "access-log query failed; contributing no candidates");
                Vec::new()
            }
        }
    }

    fn rows_to_users(&self, rows: Vec<GroupAggregateRow>) -> Vec<User> {
        rows.into_iter()
            .filter(|row| {
                self.geoip
                    .as_ref()
                    .map(|g| !row.ip_addresses.iter().any(|ip| g.is_allowed_city(*ip)))
                    .unwrap_or(true)
            })
            .map(|row| {
                let mut user = User::new().with_value(row.value);
                for ip in row.ip_addresses {
                    user = user.with_ip(ip);
                }
                for tft in row.tft_hashes {
                    user = user.with_tft(tft);
                }
                for tfh in row.tfh_hashes {
                    user = user.with_tfh(tfh);
                }
                user
            })
            .filter(|u| u.has_field(self.validation_key()))
            .collect()
    }

    pub fn validation_key(&self) -> IdentityField {
        self.variant.validation_key()
    }

    /// §4.E validation model, delegated to the pure domain implementation.
    pub fn validate(&self, before: &[User], after: &[User]) -> Vec<User> {
        tfw_guard_domain::validate(before, after, self.validation_key(), self.intersection_percent)
    }

    /// §4.E threshold adaptation, delegated to the pure domain
    /// implementation. Deliberately lagged: the result here governs only
    /// the *next* call to `find_users`.
    #[instrument(skip(self, candidates), fields(detector = %self.name))]
    pub async fn update_threshold(&self, candidates: &[User]) {
        let next = tfw_guard_domain::update_threshold(self.default_threshold, candidates);
        let mut current = self.threshold.lock().await;
        if *current != next {
            debug!(detector = %self.name, old = %*current, new = %next, "threshold recomputed");
        }
        *current = next;
    }
}
