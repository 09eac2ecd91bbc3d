//! SBI Types
//!
//! NF type and URI scheme enumerations, matching lib/sbi/types.h.
//! Only the NF types this workspace publishes profiles for are listed.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// NF Type enumeration - matches OpenAPI_nf_type_e
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NfType {
    Sepp,
}

impl NfType {
    pub fn to_str(&self) -> &'static str {
        match self {
            Self::Sepp => "SEPP",
        }
    }
}

impl fmt::Display for NfType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_str())
    }
}

/// URI Scheme - matches OpenAPI_uri_scheme_e
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum UriScheme {
    #[default]
    Http,
    Https,
}

impl UriScheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Http => "http",
            Self::Https => "https",
        }
    }

    /// OGS_SBI_HTTP_PORT / OGS_SBI_HTTPS_PORT
    pub fn default_port(&self) -> u16 {
        match self {
            Self::Http => 80,
            Self::Https => 443,
        }
    }
}

impl fmt::Display for UriScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for UriScheme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "http" => Ok(Self::Http),
            "https" => Ok(Self::Https),
            other => Err(format!("unsupported scheme `{other}`")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uri_scheme() {
        assert_eq!("HTTPS".parse::<UriScheme>(), Ok(UriScheme::Https));
        assert_eq!(UriScheme::Http.default_port(), 80);
        assert_eq!(UriScheme::Https.default_port(), 443);
        assert!("ftp".parse::<UriScheme>().is_err());
    }

    #[test]
    fn test_nf_type_name() {
        assert_eq!(NfType::Sepp.to_string(), "SEPP");
    }
}
