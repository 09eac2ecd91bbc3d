//! SBI Client
//!
//! Outbound client handle matching ogs_sbi_client_t. The connection itself
//! belongs to the transport layer; this object owns the endpoint identity
//! and its lifetime marks when the transport may tear the connection down.

use std::net::SocketAddr;

use crate::types::UriScheme;

/// SBI Client configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SbiClientConfig {
    /// URI scheme (http or https)
    pub scheme: UriScheme,
    /// Target host (FQDN or IP)
    pub host: String,
    /// Target port
    pub port: u16,
    /// Pre-resolved addresses; empty means resolve `host` at connect time
    pub addresses: Vec<SocketAddr>,
}

impl SbiClientConfig {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            scheme: UriScheme::Http,
            host: host.into(),
            port,
            addresses: Vec::new(),
        }
    }

    pub fn with_scheme(mut self, scheme: UriScheme) -> Self {
        self.scheme = scheme;
        self
    }

    pub fn with_addresses(mut self, addresses: Vec<SocketAddr>) -> Self {
        self.addresses = addresses;
        self
    }

    /// Build the base URI
    pub fn base_uri(&self) -> String {
        if self.host.contains(':') {
            format!("{}://[{}]:{}", self.scheme, self.host, self.port)
        } else {
            format!("{}://{}:{}", self.scheme, self.host, self.port)
        }
    }
}

/// Outbound SBI client (ogs_sbi_client_add / ogs_sbi_client_remove)
#[derive(Debug)]
pub struct SbiClient {
    config: SbiClientConfig,
}

impl SbiClient {
    pub fn new(config: SbiClientConfig) -> Self {
        log::debug!("SBI client added [{}]", config.base_uri());
        Self { config }
    }

    pub fn config(&self) -> &SbiClientConfig {
        &self.config
    }

    pub fn scheme(&self) -> UriScheme {
        self.config.scheme
    }

    pub fn host(&self) -> &str {
        &self.config.host
    }

    pub fn port(&self) -> u16 {
        self.config.port
    }

    pub fn base_uri(&self) -> String {
        self.config.base_uri()
    }
}

impl Drop for SbiClient {
    fn drop(&mut self) {
        log::debug!("SBI client removed [{}]", self.config.base_uri());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_uri() {
        let config = SbiClientConfig::new("nrf.5gc.org", 7777);
        assert_eq!(config.base_uri(), "http://nrf.5gc.org:7777");

        let config = SbiClientConfig::new("::1", 443).with_scheme(UriScheme::Https);
        assert_eq!(config.base_uri(), "https://[::1]:443");
    }

    #[test]
    fn test_client_accessors() {
        let client = SbiClient::new(
            SbiClientConfig::new("10.0.0.1", 8443).with_scheme(UriScheme::Https),
        );
        assert_eq!(client.scheme(), UriScheme::Https);
        assert_eq!(client.host(), "10.0.0.1");
        assert_eq!(client.port(), 8443);
    }
}
