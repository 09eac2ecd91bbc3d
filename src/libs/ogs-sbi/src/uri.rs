//! URI Resolution
//!
//! Splits an SBI URI into scheme, FQDN, port and addresses
//! (ogs_sbi_getaddr_from_uri). No name lookups happen here: a hostname
//! keeps an empty address list unless the caller pins one with `resolve`,
//! and the transport resolves it when it connects.

use std::net::{IpAddr, SocketAddr};

use url::{Host, Url};

use crate::client::SbiClientConfig;
use crate::error::{SbiError, SbiResult};
use crate::types::UriScheme;

/// Result of splitting an SBI URI
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedUri {
    pub scheme: UriScheme,
    /// Host name, absent when the URI carries an IP literal
    pub fqdn: Option<String>,
    pub port: u16,
    pub addresses: Vec<SocketAddr>,
}

impl ResolvedUri {
    /// Client configuration reaching this endpoint
    pub fn client_config(&self) -> SbiClientConfig {
        let host = match (&self.fqdn, self.addresses.first()) {
            (Some(fqdn), _) => fqdn.clone(),
            (None, Some(addr)) => addr.ip().to_string(),
            (None, None) => String::new(),
        };
        SbiClientConfig::new(host, self.port)
            .with_scheme(self.scheme)
            .with_addresses(self.addresses.clone())
    }
}

/// Parse `uri`, optionally pinning the address to `resolve`
pub fn getaddr_from_uri(uri: &str, resolve: Option<&str>) -> SbiResult<ResolvedUri> {
    let url = Url::parse(uri).map_err(|e| SbiError::InvalidUri(format!("{uri} ({e})")))?;

    let scheme: UriScheme = url
        .scheme()
        .parse()
        .map_err(|e| SbiError::InvalidUri(format!("{uri} ({e})")))?;

    let port = url.port().unwrap_or_else(|| scheme.default_port());

    let (fqdn, mut addresses) = match url.host() {
        Some(Host::Domain(domain)) => (Some(domain.to_string()), Vec::new()),
        Some(Host::Ipv4(ip)) => (None, vec![SocketAddr::new(IpAddr::V4(ip), port)]),
        Some(Host::Ipv6(ip)) => (None, vec![SocketAddr::new(IpAddr::V6(ip), port)]),
        None => {
            return Err(SbiError::InvalidUri(format!("{uri} (no host)")));
        }
    };

    if let Some(resolve) = resolve {
        let ip: IpAddr = resolve
            .trim()
            .parse()
            .map_err(|_| SbiError::InvalidUri(format!("{uri} (bad resolve address `{resolve}`)")))?;
        addresses = vec![SocketAddr::new(ip, port)];
    }

    Ok(ResolvedUri {
        scheme,
        fqdn,
        port,
        addresses,
    })
}
