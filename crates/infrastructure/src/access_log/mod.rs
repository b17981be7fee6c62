pub mod query_builder;
mod sqlx_client;

pub use sqlx_client::SqlxAccessLogClient;
