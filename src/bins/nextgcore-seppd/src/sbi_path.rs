//! SEPP SBI Path Functions
//!
//! Port of src/sepp/sbi-path.c - request routing between NFs and peer SEPPs
//!
//! Each inbound request gets an association that records which peer it is
//! forwarded to. The association lives until the peer answers or the
//! request times out; then the reply goes back on the original stream.

use ogs_sbi::{getaddr_from_uri, SbiClient, SbiContext, StreamId};

use crate::assoc::{AssocHandle, PeerClientRef};
use crate::context::SeppContext;
use crate::error::{SeppError, SeppResult};
use crate::node::PlmnId;

/// HTTP status codes sent back on a stream
pub mod status {
    pub const NOT_FOUND: u16 = 404;
    pub const INTERNAL_SERVER_ERROR: u16 = 500;
    pub const SERVICE_UNAVAILABLE: u16 = 503;
    pub const GATEWAY_TIMEOUT: u16 = 504;
}

/// Routing hints extracted from an inbound request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoutingInfo {
    /// PLMN the request is destined to
    pub target_plmn_id: Option<PlmnId>,
    /// Value of the `3gpp-sbi-target-apiroot` header
    pub target_apiroot: Option<String>,
}

/// Reply to send on an inbound stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamReply {
    pub stream: StreamId,
    pub status: u16,
}

pub fn status_for_error(err: &SeppError) -> u16 {
    match err {
        SeppError::CapacityExceeded { .. } => status::SERVICE_UNAVAILABLE,
        SeppError::NotFound(_) => status::NOT_FOUND,
        _ => status::INTERNAL_SERVER_ERROR,
    }
}

/// Accept a request from `stream` and bind it to a peer.
///
/// On any failure the association is released again, so the caller only
/// has to answer the stream with [`status_for_error`].
pub fn handle_request(
    ctx: &mut SeppContext,
    sbi: &SbiContext,
    stream: StreamId,
    routing: RoutingInfo,
) -> SeppResult<AssocHandle> {
    let assoc = ctx.assoc_add(stream).map_err(|e| {
        log::error!("[{}] request rejected: {}", stream, e);
        e
    })?;

    let (peer, nrf_client) = match resolve_peer(ctx, sbi, &routing) {
        Ok(resolved) => resolved,
        Err(e) => {
            log::warn!("[{}] no route: {}", stream, e);
            ctx.assoc_remove(assoc);
            return Err(e);
        }
    };

    let Some(entry) = ctx.assoc_find_mut(assoc) else {
        return Err(SeppError::NotFound(assoc.to_string()));
    };
    entry.peer = peer;
    entry.nrf_client = nrf_client;
    entry.target_plmn_id = routing.target_plmn_id;
    entry.target_apiroot = routing.target_apiroot;

    match ctx.assoc_peer_client(assoc) {
        Some(client) => log::debug!("[{}] forwarding to {}", assoc, client.base_uri()),
        None => log::debug!("[{}] waiting for discovery", assoc),
    }
    Ok(assoc)
}

/// Pick the forwarding client for `routing`: a configured peer by PLMN ID,
/// then by api-root domain, then an ad-hoc client for the api-root, then
/// NRF discovery
fn resolve_peer(
    ctx: &SeppContext,
    sbi: &SbiContext,
    routing: &RoutingInfo,
) -> SeppResult<(Option<PeerClientRef>, Option<SbiClient>)> {
    if let Some(plmn_id) = routing.target_plmn_id.filter(|p| p.mcc != 0 && p.mnc != 0) {
        if let Some(node) = ctx.node_find_by_plmn_id(plmn_id.mcc, plmn_id.mnc) {
            return Ok((Some(PeerClientRef::Node(node.handle())), None));
        }
    }

    if let Some(apiroot) = routing.target_apiroot.as_deref() {
        let resolved = getaddr_from_uri(apiroot, None)
            .map_err(|e| SeppError::NotFound(format!("target apiroot: {}", e)))?;

        if let Some(node) = resolved
            .fqdn
            .as_deref()
            .and_then(|fqdn| ctx.node_find_by_receiver(fqdn))
        {
            return Ok((Some(PeerClientRef::Node(node.handle())), None));
        }

        let client = SbiClient::new(resolved.client_config());
        return Ok((Some(PeerClientRef::Owned(client)), None));
    }

    if let Some(nrf) = sbi.nrf.as_ref() {
        return Ok((None, Some(SbiClient::new(nrf.clone()))));
    }

    Err(SeppError::NotFound(match routing.target_plmn_id {
        Some(plmn_id) => format!("peer for PLMN [{}]", plmn_id),
        None => "peer for request".to_string(),
    }))
}

/// The peer answered; release the association and hand back the stream
/// the answer goes to
pub fn handle_response(ctx: &mut SeppContext, assoc: AssocHandle) -> SeppResult<StreamId> {
    let stream = ctx
        .assoc_find(assoc)
        .map(|a| a.stream())
        .ok_or_else(|| SeppError::NotFound(assoc.to_string()))?;

    ctx.assoc_remove(assoc);
    Ok(stream)
}

/// The request timed out; same as a response, logged as a warning
pub fn handle_timeout(ctx: &mut SeppContext, assoc: AssocHandle) -> SeppResult<StreamId> {
    let stream = handle_response(ctx, assoc)?;
    log::warn!("[{}] request timed out", stream);
    Ok(stream)
}
