//! NextGCore Application Framework Library
//!
//! YAML configuration parsing and global configuration for NextGCore
//! network functions.
//!
//! Ported from lib/app/ in the C implementation.

pub mod yaml;
pub mod config;

// Re-export commonly used types
pub use yaml::{OgsYamlDocument, YamlError, YamlNode};
pub use config::{ConfigError, MaxConf, OgsGlobalConf, MAX_NUM_OF_PEER, MAX_NUM_OF_UE};
