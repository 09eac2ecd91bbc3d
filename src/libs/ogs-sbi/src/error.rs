//! SBI Error Types

use ogs_app::YamlError;
use thiserror::Error;

/// SBI Error type
#[derive(Error, Debug)]
pub enum SbiError {
    /// URI that cannot be parsed or resolved
    #[error("Invalid URI: {0}")]
    InvalidUri(String),

    /// Malformed `sbi` configuration
    #[error("Invalid SBI configuration: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Yaml(#[from] YamlError),
}

/// Result type for SBI operations
pub type SbiResult<T> = Result<T, SbiError>;
