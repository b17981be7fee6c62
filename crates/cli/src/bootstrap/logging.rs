use tfw_guard_domain::config::Config;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Structured logging via `tracing-subscriber`'s `env-filter`, matching the
/// template's `bootstrap::logging` module (SPEC_FULL.md §E.1). The
/// configured level is the default; `RUST_LOG` still overrides it when set,
/// the same precedence the template's filter gives operators.
pub fn init_logging(config: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.logging.level.clone()));

    tracing_subscriber::fmt()
        .with_target(true)
        .with_thread_ids(false)
        .with_level(true)
        .with_env_filter(filter)
        .init();

    info!(level = %config.logging.level, "logging initialized");
}
