//! SEPP configuration ingestion
//!
//! Reads the `sepp` section of the configuration document:
//!
//! ```yaml
//! sepp:
//!   info:
//!     port: { http: 80, https: 443 }
//!     domain:
//!       - name: visited
//!         fqdn: sepp.5gc.mnc070.mcc999.3gppnetwork.org
//!   peer:
//!     - uri: https://sepp.5gc.mnc093.mcc208.3gppnetwork.org:443
//!       resolve: 127.0.2.1
//!       target_plmn_id: { mcc: 208, mnc: 93 }
//! ```
//!
//! `sbi`, `service_name` and `discovery` belong to the shared SBI layer and
//! are skipped here.

use ogs_app::{OgsYamlDocument, YamlNode};
use ogs_sbi::{getaddr_from_uri, NfType, PortInfo, SbiClient, SbiContext, SeppDomain};

use crate::context::SeppContext;
use crate::error::{SeppError, SeppResult};
use crate::node::PlmnId;

/// Walk every `sepp` section of `document`
pub fn parse_sepp_section(
    ctx: &mut SeppContext,
    sbi: &mut SbiContext,
    document: &OgsYamlDocument,
) -> SeppResult<()> {
    for (root_key, sepp) in document.root().entries() {
        if root_key != "sepp" {
            continue;
        }

        for (sepp_key, node) in sepp.entries() {
            match sepp_key {
                "info" => parse_info(sbi, node)?,
                "peer" => {
                    let entries = node.elements();
                    if entries.is_empty() {
                        log::warn!("`peer` has no entries, ignored");
                    }
                    for entry in entries {
                        parse_peer(ctx, entry)?;
                    }
                }
                "sbi" | "service_name" | "discovery" => {}
                _ => log::warn!("unknown key `{}`", sepp_key),
            }
        }
    }

    Ok(())
}

/// `sepp.info`: published ports and served domains
fn parse_info(sbi: &mut SbiContext, info: YamlNode<'_>) -> SeppResult<()> {
    let nf_info = sbi.nf_instance_mut().nf_info_add(NfType::Sepp);

    for (info_key, node) in info.entries() {
        match info_key {
            "port" => parse_port(node, &mut nf_info.sepp.port)?,
            "domain" => {
                for entry in node.elements() {
                    if let Some(domain) = parse_domain(entry)? {
                        log::info!("SEPP domain [{}]", domain.name);
                        nf_info.sepp.domains.push(domain);
                    }
                }
            }
            _ => log::warn!("unknown key `{}`", info_key),
        }
    }

    Ok(())
}

fn parse_port(node: YamlNode<'_>, port: &mut PortInfo) -> SeppResult<()> {
    for (port_key, value) in node.entries() {
        match port_key {
            "http" => {
                if let Some(http) = value.parse::<u16>(port_key)? {
                    port.http = Some(http);
                }
            }
            "https" => {
                if let Some(https) = value.parse::<u16>(port_key)? {
                    port.https = Some(https);
                }
            }
            _ => log::warn!("unknown key `{}`", port_key),
        }
    }
    Ok(())
}

/// One `domain` entry; entries without a `name` are dropped
fn parse_domain(entry: YamlNode<'_>) -> SeppResult<Option<SeppDomain>> {
    let mut domain = SeppDomain::default();
    let mut name = None;

    for (domain_key, value) in entry.entries() {
        match domain_key {
            "name" => name = value.value_string(),
            "fqdn" => domain.fqdn = value.value_string(),
            "port" => parse_port(value, &mut domain.port)?,
            _ => log::warn!("unknown key `{}`", domain_key),
        }
    }

    match name {
        Some(name) => {
            domain.name = name;
            Ok(Some(domain))
        }
        None => {
            log::warn!("No `name` in `domain`, skipped");
            Ok(None)
        }
    }
}

/// One `peer` entry: creates the node, its client and its PLMN ID
fn parse_peer(ctx: &mut SeppContext, entry: YamlNode<'_>) -> SeppResult<()> {
    let mut uri = None;
    let mut resolve = None;
    let mut plmn_id = None;

    for (peer_key, value) in entry.entries() {
        match peer_key {
            "uri" => uri = value.value_string(),
            "resolve" => resolve = value.value_string(),
            "target_plmn_id" => plmn_id = parse_plmn_id(value)?,
            _ => log::warn!("unknown key `{}`", peer_key),
        }
    }

    let Some(uri) = uri else {
        log::warn!("No `uri` in `peer`, skipped");
        return Ok(());
    };

    let resolved = getaddr_from_uri(&uri, resolve.as_deref())?;
    let Some(receiver) = resolved.fqdn.clone() else {
        return Err(SeppError::ConfigurationMalformed(format!(
            "peer uri `{}` has no domain name",
            uri
        )));
    };

    let handle = match ctx.node_add(&receiver) {
        Ok(handle) => handle,
        Err(e @ SeppError::CapacityExceeded { .. }) => {
            log::error!("[{}] peer rejected: {}", receiver, e);
            return Ok(());
        }
        Err(e) => return Err(e),
    };

    ctx.node_set_client(handle, SbiClient::new(resolved.client_config()))?;
    if let Some(plmn_id) = plmn_id {
        ctx.node_add_plmn_id(handle, plmn_id)?;
    }

    log::info!(
        "SEPP peer [{}] {}",
        receiver,
        plmn_id.map(|p| p.to_string()).unwrap_or_default()
    );
    Ok(())
}

/// `target_plmn_id`; anything short of both MCC and MNC is ignored
fn parse_plmn_id(node: YamlNode<'_>) -> SeppResult<Option<PlmnId>> {
    let mut mcc = None;
    let mut mnc = None;

    for (plmn_key, value) in node.entries() {
        match plmn_key {
            "mcc" => mcc = value.value_string(),
            "mnc" => mnc = value.value_string(),
            _ => log::warn!("unknown key `{}`", plmn_key),
        }
    }

    match (mcc, mnc) {
        (Some(mcc), Some(mnc)) => PlmnId::from_strings(&mcc, &mnc).map(Some),
        _ => Ok(None),
    }
}
