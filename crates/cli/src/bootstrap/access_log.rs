use sqlx::any::{AnyPool, AnyPoolOptions};
use std::time::Duration;
use tfw_guard_domain::config::AccessLogConfig;
use tracing::info;

/// Opens the pooled connection to the columnar access-log store (component
/// A), mirroring the template's `bootstrap::database::init_database` shape:
/// a single tuning-aware pool builder fed entirely from config, logged once
/// on success.
///
/// §1 leaves the store's wire dialect an external-collaborator concern, so
/// this binds through `sqlx::Any` — whichever driver the deployment's
/// connection string names.
pub async fn init_access_log_pool(cfg: &AccessLogConfig) -> anyhow::Result<AnyPool> {
    sqlx::any::install_default_drivers();

    let url = format!(
        "postgres://{user}:{password}@{host}:{port}/{database}",
        user = cfg.user,
        password = cfg.password,
        host = cfg.host,
        port = cfg.port,
        database = cfg.database,
    );

    let pool = AnyPoolOptions::new()
        .max_connections(cfg.max_connections)
        .acquire_timeout(Duration::from_secs(cfg.connect_timeout_secs))
        .connect(&url)
        .await
        .map_err(|err| anyhow::anyhow!("failed to connect to access-log store at {host}:{port}: {err}", host = cfg.host, port = cfg.port))?;

    info!(
        host = %cfg.host,
        port = cfg.port,
        database = %cfg.database,
        max_connections = cfg.max_connections,
        "access-log pool initialized"
    );

    Ok(pool)
}
