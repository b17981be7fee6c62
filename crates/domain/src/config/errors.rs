use crate::errors::DomainError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config value for {field}: {message}")]
    Parse { field: String, message: String },

    #[error(transparent)]
    Invalid(#[from] DomainError),
}
