//! Global Configuration
//!
//! The `global` section shared by every NextGCore network function
//! (ogs-config.c). Only the sizing knobs are modeled here.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::yaml::{OgsYamlDocument, YamlError, YamlNode};

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration validation error: {0}")]
    ValidationError(String),
    #[error("Parse error: {0}")]
    ParseError(String),
    #[error(transparent)]
    Yaml(#[from] YamlError),
}

/// Default maximum number of UEs
pub const MAX_NUM_OF_UE: u64 = 1024;
/// Default maximum number of peers
pub const MAX_NUM_OF_PEER: u64 = 64;

/// Maximum values configuration
/// Mirrors the max struct in ogs_app_global_conf_t
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaxConf {
    pub ue: u64,
    pub peer: u64,
}

impl Default for MaxConf {
    fn default() -> Self {
        MaxConf {
            ue: MAX_NUM_OF_UE,
            peer: MAX_NUM_OF_PEER,
        }
    }
}

/// Global configuration
/// Mirrors ogs_app_global_conf_t
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OgsGlobalConf {
    pub max: MaxConf,
}

impl OgsGlobalConf {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse the `global` section of `document`, keeping defaults for
    /// anything absent (ogs_app_parse_global_conf)
    pub fn from_document(document: &OgsYamlDocument) -> Result<Self, ConfigError> {
        let mut conf = Self::new();
        if let Some(global) = document.get("global") {
            conf.parse(global)?;
        }
        conf.validate()?;
        Ok(conf)
    }

    fn parse(&mut self, global: YamlNode<'_>) -> Result<(), ConfigError> {
        for (global_key, node) in global.entries() {
            match global_key {
                "max" => self.parse_max(node)?,
                // Handled by other layers
                "parameter" | "sockopt" | "pool" => {}
                _ => log::warn!("unknown key `{}`", global_key),
            }
        }
        Ok(())
    }

    fn parse_max(&mut self, max: YamlNode<'_>) -> Result<(), ConfigError> {
        for (max_key, node) in max.entries() {
            match max_key {
                "ue" => {
                    if let Some(v) = node.parse::<u64>("max.ue")? {
                        self.max.ue = v;
                    }
                }
                "peer" | "enb" => {
                    if let Some(v) = node.parse::<u64>("max.peer")? {
                        self.max.peer = v;
                    }
                }
                "gtp_peer" => {}
                _ => log::warn!("unknown key `{}`", max_key),
            }
        }
        Ok(())
    }

    /// Mirrors global_conf_validation()
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max.ue == 0 {
            return Err(ConfigError::ValidationError(
                "`max.ue` must be greater than zero".to_string(),
            ));
        }
        if self.max.peer == 0 {
            return Err(ConfigError::ValidationError(
                "`max.peer` must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_global_conf_default() {
        let conf = OgsGlobalConf::new();
        assert_eq!(conf.max.ue, MAX_NUM_OF_UE);
        assert_eq!(conf.max.peer, MAX_NUM_OF_PEER);
        assert!(conf.validate().is_ok());
    }

    #[test]
    fn test_parse_global_conf() {
        let doc = OgsYamlDocument::from_str(
            r#"
global:
  max:
    ue: 2048
    peer: 32
    bogus: 1
  parameter:
    no_ipv6: true
"#,
        )
        .unwrap();

        let conf = OgsGlobalConf::from_document(&doc).unwrap();
        assert_eq!(conf.max.ue, 2048);
        assert_eq!(conf.max.peer, 32);
    }

    #[test]
    fn test_missing_global_keeps_defaults() {
        let doc = OgsYamlDocument::from_str("sepp: {}").unwrap();
        assert_eq!(OgsGlobalConf::from_document(&doc).unwrap(), OgsGlobalConf::default());
    }

    #[test]
    fn test_global_conf_validation() {
        let doc = OgsYamlDocument::from_str("global: {max: {ue: 0}}").unwrap();
        assert!(matches!(
            OgsGlobalConf::from_document(&doc),
            Err(ConfigError::ValidationError(_))
        ));

        let doc = OgsYamlDocument::from_str("global: {max: {peer: many}}").unwrap();
        assert!(matches!(
            OgsGlobalConf::from_document(&doc),
            Err(ConfigError::Yaml(YamlError::InvalidValue { .. }))
        ));
    }
}
