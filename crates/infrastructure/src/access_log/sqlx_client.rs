use super::query_builder::{build_active_addresses, build_group_aggregate};
use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::any::AnyPool;
use sqlx::Row;
use std::net::IpAddr;
use std::str::FromStr;
use tfw_guard_application::{AccessLogPort, AggregateQuerySpec, GroupAggregateRow, TransientStoreError};
use tracing::instrument;

/// Component A adapter: a pooled connection to the columnar access-log
/// store, queried through [`sqlx::Any`] so the same client binary works
/// against whatever ANSI-SQL-compatible driver the store exposes (§1 leaves
/// the concrete dialect an external-collaborator concern).
pub struct SqlxAccessLogClient {
    pool: AnyPool,
}

impl SqlxAccessLogClient {
    pub fn new(pool: AnyPool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str) -> Result<Self, sqlx::Error> {
        sqlx::any::install_default_drivers();
        let pool = AnyPool::connect(database_url).await?;
        Ok(Self::new(pool))
    }
}

fn split_csv(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[async_trait]
impl AccessLogPort for SqlxAccessLogClient {
    #[instrument(skip(self, spec), fields(grouping = ?spec.grouping))]
    async fn query_group_aggregate(
        &self,
        spec: &AggregateQuerySpec,
    ) -> Result<Vec<GroupAggregateRow>, TransientStoreError> {
        let built = build_group_aggregate(spec);
        let rows = sqlx::query(&built.sql)
            .bind(built.threshold_param.to_string())
            .bind(built.limit_param)
            .fetch_all(&self.pool)
            .await
            .map_err(|err| TransientStoreError::new(err.to_string()))?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            let ip_csv: String = row
                .try_get("ip_csv")
                .map_err(|err| TransientStoreError::new(err.to_string()))?;
            let tft_csv: String = row
                .try_get("tft_csv")
                .map_err(|err| TransientStoreError::new(err.to_string()))?;
            let tfh_csv: String = row
                .try_get("tfh_csv")
                .map_err(|err| TransientStoreError::new(err.to_string()))?;
            let value_raw: String = row
                .try_get("value")
                .map_err(|err| TransientStoreError::new(err.to_string()))?;

            let ip_addresses = split_csv(&ip_csv)
                .into_iter()
                .filter_map(|s| IpAddr::from_str(&s).ok())
                .collect();
            let value = Decimal::from_str(value_raw.trim()).unwrap_or_default();

            out.push(GroupAggregateRow {
                ip_addresses,
                tft_hashes: split_csv(&tft_csv),
                tfh_hashes: split_csv(&tfh_csv),
                value,
            });
        }
        Ok(out)
    }

    #[instrument(skip(self, entries))]
    async fn replace_user_agents(&self, entries: &[String]) -> Result<(), TransientStoreError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|err| TransientStoreError::new(err.to_string()))?;
        sqlx::query("DELETE FROM user_agents")
            .execute(&mut *tx)
            .await
            .map_err(|err| TransientStoreError::new(err.to_string()))?;
        for entry in entries {
            sqlx::query("INSERT INTO user_agents (user_agent) VALUES (?)")
                .bind(entry)
                .execute(&mut *tx)
                .await
                .map_err(|err| TransientStoreError::new(err.to_string()))?;
        }
        tx.commit()
            .await
            .map_err(|err| TransientStoreError::new(err.to_string()))
    }

    #[instrument(skip(self, addresses))]
    async fn replace_persistent_users(
        &self,
        addresses: &[IpAddr],
    ) -> Result<(), TransientStoreError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|err| TransientStoreError::new(err.to_string()))?;
        sqlx::query("DELETE FROM persistent_users")
            .execute(&mut *tx)
            .await
            .map_err(|err| TransientStoreError::new(err.to_string()))?;
        for address in addresses {
            sqlx::query("INSERT INTO persistent_users (address) VALUES (?)")
                .bind(address.to_string())
                .execute(&mut *tx)
                .await
                .map_err(|err| TransientStoreError::new(err.to_string()))?;
        }
        tx.commit()
            .await
            .map_err(|err| TransientStoreError::new(err.to_string()))
    }

    #[instrument(skip(self))]
    async fn active_addresses_in_window(
        &self,
        start: i64,
        finish: i64,
    ) -> Result<Vec<IpAddr>, TransientStoreError> {
        let sql = build_active_addresses(start, finish);
        let rows = sqlx::query(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|err| TransientStoreError::new(err.to_string()))?;
        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            let address: String = row
                .try_get("address")
                .map_err(|err| TransientStoreError::new(err.to_string()))?;
            if let Ok(ip) = IpAddr::from_str(address.trim()) {
                out.push(ip);
            }
        }
        Ok(out)
    }
}
