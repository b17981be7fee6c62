pub mod access_log;
pub mod config;
pub mod logging;

pub use access_log::init_access_log_pool;
pub use config::load_config;
pub use logging::init_logging;
