//! SEPP error types

use ogs_app::{ConfigError, YamlError};
use ogs_core::PoolError;
use ogs_sbi::SbiError;
use thiserror::Error;

/// Errors surfaced by the SEPP context layer
#[derive(Error, Debug)]
pub enum SeppError {
    /// A fixed-size pool has no free slot; the caller rejects the one
    /// request or peer and carries on
    #[error("Maximum number of {pool} [{max}] reached")]
    CapacityExceeded { pool: String, max: usize },

    /// Fatal at startup
    #[error("Malformed configuration: {0}")]
    ConfigurationMalformed(String),

    /// Fatal at startup
    #[error("Validation failed: {0}")]
    ValidationFailed(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

impl From<PoolError> for SeppError {
    fn from(e: PoolError) -> Self {
        match e {
            PoolError::Exhausted { name, capacity } => SeppError::CapacityExceeded {
                pool: name,
                max: capacity,
            },
        }
    }
}

impl From<YamlError> for SeppError {
    fn from(e: YamlError) -> Self {
        SeppError::ConfigurationMalformed(e.to_string())
    }
}

impl From<ConfigError> for SeppError {
    fn from(e: ConfigError) -> Self {
        SeppError::ConfigurationMalformed(e.to_string())
    }
}

impl From<SbiError> for SeppError {
    fn from(e: SbiError) -> Self {
        SeppError::ConfigurationMalformed(e.to_string())
    }
}

pub type SeppResult<T> = Result<T, SeppError>;
