//! SBI Context
//!
//! Per-process SBI state consumed by network functions: the configured
//! listeners, the NRF endpoint used for discovery, and the NF profile this
//! process publishes about itself (ogs_sbi_self()).

use ogs_app::{OgsYamlDocument, YamlNode};

use crate::client::SbiClientConfig;
use crate::error::SbiResult;
use crate::server::SbiServer;
use crate::types::NfType;
use crate::uri::getaddr_from_uri;

/// Per-scheme port pair published in an NF info
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PortInfo {
    pub http: Option<u16>,
    pub https: Option<u16>,
}

/// Named roaming domain served by a SEPP
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeppDomain {
    pub name: String,
    pub fqdn: Option<String>,
    pub port: PortInfo,
}

/// SEPP specific NF info (OpenAPI SeppInfo)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeppInfo {
    pub port: PortInfo,
    pub domains: Vec<SeppDomain>,
}

/// One entry of the NF info list (ogs_sbi_nf_info_t)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NfInfo {
    pub nf_type: NfType,
    pub sepp: SeppInfo,
}

/// NF instance profile (ogs_sbi_nf_instance_t)
#[derive(Debug, Clone)]
pub struct NfInstance {
    pub nf_type: NfType,
    pub fqdn: Option<String>,
    nf_info_list: Vec<NfInfo>,
}

impl NfInstance {
    pub fn new(nf_type: NfType) -> Self {
        Self {
            nf_type,
            fqdn: None,
            nf_info_list: Vec::new(),
        }
    }

    /// Add an NF info of `nf_type`, or return the existing one
    /// (ogs_sbi_nf_info_add, idempotent per type)
    pub fn nf_info_add(&mut self, nf_type: NfType) -> &mut NfInfo {
        let pos = match self.nf_info_list.iter().position(|i| i.nf_type == nf_type) {
            Some(pos) => pos,
            None => {
                self.nf_info_list.push(NfInfo {
                    nf_type,
                    sepp: SeppInfo::default(),
                });
                self.nf_info_list.len() - 1
            }
        };
        &mut self.nf_info_list[pos]
    }

    pub fn nf_info_find(&self, nf_type: NfType) -> Option<&NfInfo> {
        self.nf_info_list.iter().find(|i| i.nf_type == nf_type)
    }

    pub fn nf_info_remove(&mut self, nf_type: NfType) -> Option<NfInfo> {
        let pos = self.nf_info_list.iter().position(|i| i.nf_type == nf_type)?;
        Some(self.nf_info_list.remove(pos))
    }

    pub fn nf_info_list(&self) -> &[NfInfo] {
        &self.nf_info_list
    }
}

/// SBI Context - listeners, NRF and the self NF instance
#[derive(Debug, Clone)]
pub struct SbiContext {
    pub server_list: Vec<SbiServer>,
    /// NRF endpoint for discovery, if configured
    pub nrf: Option<SbiClientConfig>,
    nf_instance: NfInstance,
}

impl SbiContext {
    pub fn new(nf_type: NfType) -> Self {
        Self {
            server_list: Vec::new(),
            nrf: None,
            nf_instance: NfInstance::new(nf_type),
        }
    }

    pub fn nf_instance(&self) -> &NfInstance {
        &self.nf_instance
    }

    pub fn nf_instance_mut(&mut self) -> &mut NfInstance {
        &mut self.nf_instance
    }

    /// Parse `<section>.sbi` from `document` (ogs_sbi_context_parse_config)
    pub fn parse_config(&mut self, document: &OgsYamlDocument, section: &str) -> SbiResult<()> {
        let Some(sbi) = document.get(section).and_then(|s| s.get("sbi")) else {
            return Ok(());
        };

        for (sbi_key, node) in sbi.entries() {
            match sbi_key {
                "server" => {
                    for entry in node.elements() {
                        let server = SbiServer::parse(entry)?;
                        log::info!(
                            "SBI server [{}://{}:{}]",
                            server.scheme,
                            server.address,
                            server.port
                        );
                        self.server_list.push(server);
                    }
                }
                "client" => self.parse_client(node)?,
                _ => log::warn!("unknown key `{}`", sbi_key),
            }
        }

        Ok(())
    }

    fn parse_client(&mut self, client: YamlNode<'_>) -> SbiResult<()> {
        for (client_key, node) in client.entries() {
            match client_key {
                "nrf" => {
                    // First NRF wins
                    for entry in node.elements() {
                        let Some(uri) = entry.get("uri").and_then(|u| u.value_string()) else {
                            log::warn!("No `uri` in `nrf` entry");
                            continue;
                        };
                        if self.nrf.is_none() {
                            let resolved = getaddr_from_uri(&uri, None)?;
                            self.nrf = Some(resolved.client_config());
                        }
                    }
                }
                "scp" => {}
                _ => log::warn!("unknown key `{}`", client_key),
            }
        }
        Ok(())
    }
}
