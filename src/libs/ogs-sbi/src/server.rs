//! SBI Server Configuration
//!
//! Listening endpoints taken from the `<nf>.sbi.server` configuration
//! (ogs_sbi_server_t). Binding and serving live in the transport layer.

use std::net::IpAddr;

use ogs_app::YamlNode;

use crate::error::{SbiError, SbiResult};
use crate::types::UriScheme;

/// Default SBI port used when neither `port` nor a scheme default applies
pub const OGS_SBI_DEFAULT_PORT: u16 = 7777;

/// Inbound request stream handed out by the transport layer.
///
/// Opaque to everything above the transport; only used to route the reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StreamId(pub u64);

impl std::fmt::Display for StreamId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "stream:{}", self.0)
    }
}

/// A configured SBI listener
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SbiServer {
    pub scheme: UriScheme,
    /// Bind address as configured (hostname or IP literal)
    pub address: String,
    pub port: u16,
    /// Advertised address as configured (hostname or IP literal)
    pub advertise: Option<String>,
    pub advertise_port: Option<u16>,
}

impl SbiServer {
    pub fn new(scheme: UriScheme, address: impl Into<String>, port: u16) -> Self {
        Self {
            scheme,
            address: address.into(),
            port,
            advertise: None,
            advertise_port: None,
        }
    }

    pub fn with_advertise(mut self, advertise: impl Into<String>) -> Self {
        self.advertise = Some(advertise.into());
        self
    }

    /// Hostname of the advertised address, or of the bind address when no
    /// advertise is configured (ogs_gethostname). IP literals have none.
    pub fn hostname(&self) -> Option<&str> {
        let name = self.advertise.as_deref().unwrap_or(&self.address);
        if name.is_empty() || name.parse::<IpAddr>().is_ok() {
            None
        } else {
            Some(name)
        }
    }

    /// Port peers should use to reach this listener
    pub fn advertised_port(&self) -> u16 {
        self.advertise_port.unwrap_or(self.port)
    }

    /// Parse one `server` entry
    pub fn parse(node: YamlNode<'_>) -> SbiResult<Self> {
        let mut scheme = UriScheme::Http;
        let mut address = None;
        let mut port = None;
        let mut advertise = None;
        let mut advertise_port = None;

        for (key, value) in node.entries() {
            match key {
                "scheme" => {
                    if let Some(v) = value.scalar() {
                        scheme = v.parse().map_err(SbiError::InvalidConfig)?;
                    }
                }
                "address" => address = value.value_string(),
                "port" => port = value.parse::<u16>("server.port")?,
                "advertise" => {
                    if let Some(v) = value.value_string() {
                        let (host, p) = split_host_port(&v)?;
                        advertise = Some(host);
                        advertise_port = p;
                    }
                }
                // TLS material and socket options belong to the transport layer
                "private_key" | "cert" | "verify_client" | "verify_client_cacert"
                | "sslkeylog" | "dev" | "option" | "family" => {}
                _ => log::warn!("unknown key `{}`", key),
            }
        }

        let address = address.ok_or_else(|| {
            SbiError::InvalidConfig("`server` entry without `address`".to_string())
        })?;

        Ok(Self {
            scheme,
            address,
            port: port.unwrap_or(match scheme {
                UriScheme::Http => OGS_SBI_DEFAULT_PORT,
                UriScheme::Https => scheme.default_port(),
            }),
            advertise,
            advertise_port,
        })
    }
}

/// Split `host[:port]`, accepting bracketed IPv6 literals
fn split_host_port(text: &str) -> SbiResult<(String, Option<u16>)> {
    let bad = || SbiError::InvalidConfig(format!("invalid advertise `{text}`"));

    if let Some(rest) = text.strip_prefix('[') {
        let (host, tail) = rest.split_once(']').ok_or_else(bad)?;
        let port = match tail.strip_prefix(':') {
            Some(p) => Some(p.parse().map_err(|_| bad())?),
            None if tail.is_empty() => None,
            None => return Err(bad()),
        };
        return Ok((host.to_string(), port));
    }

    // Bare IPv6 literal without port
    if text.parse::<IpAddr>().is_ok() {
        return Ok((text.to_string(), None));
    }

    match text.rsplit_once(':') {
        Some((host, p)) => Ok((host.to_string(), Some(p.parse().map_err(|_| bad())?))),
        None => Ok((text.to_string(), None)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ogs_app::OgsYamlDocument;

    #[test]
    fn test_hostname() {
        let server = SbiServer::new(UriScheme::Http, "sepp.localdomain", 7777);
        assert_eq!(server.hostname(), Some("sepp.localdomain"));

        let server = SbiServer::new(UriScheme::Http, "127.0.0.1", 7777);
        assert_eq!(server.hostname(), None);

        let server = SbiServer::new(UriScheme::Http, "127.0.0.1", 7777)
            .with_advertise("sepp.home.org");
        assert_eq!(server.hostname(), Some("sepp.home.org"));

        // An IP advertise hides the bind hostname
        let server = SbiServer::new(UriScheme::Http, "sepp.localdomain", 7777)
            .with_advertise("10.0.0.1");
        assert_eq!(server.hostname(), None);
    }

    #[test]
    fn test_parse_server() {
        let doc = OgsYamlDocument::from_str(
            r#"
scheme: https
address: 127.0.1.250
advertise: sepp.home.org:9443
private_key: /etc/sepp.key
"#,
        )
        .unwrap();
        let server = SbiServer::parse(doc.root()).unwrap();
        assert_eq!(server.scheme, UriScheme::Https);
        assert_eq!(server.port, 443);
        assert_eq!(server.hostname(), Some("sepp.home.org"));
        assert_eq!(server.advertised_port(), 9443);
    }

    #[test]
    fn test_parse_server_requires_address() {
        let doc = OgsYamlDocument::from_str("port: 7777").unwrap();
        assert!(matches!(SbiServer::parse(doc.root()), Err(SbiError::InvalidConfig(_))));
    }

    #[test]
    fn test_split_host_port() {
        assert_eq!(split_host_port("a.org").unwrap(), ("a.org".to_string(), None));
        assert_eq!(split_host_port("a.org:80").unwrap(), ("a.org".to_string(), Some(80)));
        assert_eq!(split_host_port("[::1]:80").unwrap(), ("::1".to_string(), Some(80)));
        assert_eq!(split_host_port("::1").unwrap(), ("::1".to_string(), None));
        assert!(split_host_port("a.org:http").is_err());
    }
}
