//! SEPP Context Management
//!
//! Port of src/sepp/context.c - SEPP context with peer node and association management
//!
//! The context is created by the daemon entry point and handed by reference
//! to everything that needs it. It walks a fixed lifecycle:
//! `Uninitialized -> Initialized -> Prepared -> Validated -> Running`, and
//! [`SeppContext::fini`] brings it back to `Uninitialized`.

use ogs_app::{OgsGlobalConf, OgsYamlDocument};
use ogs_sbi::{NfType, SbiClient, SbiContext, StreamId, UriScheme};

use crate::assoc::{AssocHandle, AssocRegistry, PeerClientRef, SeppAssoc};
use crate::config;
use crate::error::{SeppError, SeppResult};
use crate::node::{NodeDirectory, NodeHandle, PlmnId, SeppNode};

/// Associations reserved per UE
pub const MAX_NUM_OF_SEPP_ASSOC_PER_UE: usize = 8;

/// Pool sizes derived from the global configuration: one slot per peer and
/// eight associations per UE
pub fn pool_sizes(global: &OgsGlobalConf) -> (usize, usize) {
    let max_node = global.max.peer as usize;
    let max_assoc = (global.max.ue as usize).saturating_mul(MAX_NUM_OF_SEPP_ASSOC_PER_UE);
    (max_node, max_assoc)
}

/// Context lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextState {
    Uninitialized,
    Initialized,
    Prepared,
    Validated,
    Running,
}

/// Security capabilities this SEPP is willing to negotiate
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SecurityCapabilityConfig {
    pub tls: bool,
    pub prins: bool,
}

/// SEPP Context - main context structure
/// Port of sepp_context_t from context.h
#[derive(Debug)]
pub struct SeppContext {
    state: ContextState,
    /// Own domain name, derived from the first server with a hostname
    sender: Option<String>,
    pub security_capability: SecurityCapabilityConfig,
    pub target_apiroot_supported: bool,
    nodes: NodeDirectory,
    assocs: AssocRegistry,
}

impl SeppContext {
    pub fn new() -> Self {
        Self {
            state: ContextState::Uninitialized,
            sender: None,
            security_capability: SecurityCapabilityConfig::default(),
            target_apiroot_supported: false,
            nodes: NodeDirectory::new(0),
            assocs: AssocRegistry::new(0),
        }
    }

    /// Port of sepp_context_init
    pub fn init(&mut self, max_node: usize, max_assoc: usize) {
        assert!(
            self.state == ContextState::Uninitialized,
            "SEPP context already initialized"
        );

        self.nodes = NodeDirectory::new(max_node);
        self.assocs = AssocRegistry::new(max_assoc);
        self.state = ContextState::Initialized;

        log::info!(
            "SEPP context initialized (max_node={}, max_assoc={})",
            max_node,
            max_assoc
        );
    }

    /// Port of sepp_context_final
    ///
    /// Tears down every association, then every node, withdraws the SEPP
    /// info from the local NF profile and leaves the context ready for
    /// another [`init`](Self::init).
    pub fn fini(&mut self, sbi: &mut SbiContext) {
        assert!(
            self.state != ContextState::Uninitialized,
            "SEPP context not initialized"
        );

        self.assocs.remove_all();
        self.nodes.remove_all();

        std::mem::replace(&mut self.assocs, AssocRegistry::new(0)).finalize();
        std::mem::replace(&mut self.nodes, NodeDirectory::new(0)).finalize();

        let nf_instance = sbi.nf_instance_mut();
        nf_instance.nf_info_remove(NfType::Sepp);
        if nf_instance.fqdn.is_some() && nf_instance.fqdn == self.sender {
            nf_instance.fqdn = None;
        }

        self.sender = None;
        self.security_capability = SecurityCapabilityConfig::default();
        self.target_apiroot_supported = false;
        self.state = ContextState::Uninitialized;

        log::info!("SEPP context finalized");
    }

    pub fn state(&self) -> ContextState {
        self.state
    }

    pub fn is_initialized(&self) -> bool {
        self.state != ContextState::Uninitialized
    }

    pub fn sender(&self) -> Option<&str> {
        self.sender.as_deref()
    }

    /// Defaults applied before the configuration is read
    pub fn prepare(&mut self, sbi: &mut SbiContext) -> SeppResult<()> {
        assert!(
            self.state == ContextState::Initialized,
            "SEPP context must be initialized before prepare"
        );

        self.sender = sbi
            .server_list
            .iter()
            .find_map(|server| server.hostname().map(str::to_string));
        self.security_capability = SecurityCapabilityConfig {
            tls: true,
            prins: false,
        };
        self.target_apiroot_supported = true;

        let mut http = None;
        let mut https = None;
        for server in &sbi.server_list {
            match server.scheme {
                UriScheme::Http => http = http.or(Some(server.advertised_port())),
                UriScheme::Https => https = https.or(Some(server.advertised_port())),
            }
        }

        let nf_instance = sbi.nf_instance_mut();
        if nf_instance.fqdn.is_none() {
            nf_instance.fqdn = self.sender.clone();
        }
        let nf_info = nf_instance.nf_info_add(NfType::Sepp);
        if nf_info.sepp.port.http.is_none() {
            nf_info.sepp.port.http = http;
        }
        if nf_info.sepp.port.https.is_none() {
            nf_info.sepp.port.https = https;
        }

        match self.sender.as_deref() {
            Some(sender) => log::info!("SEPP sender [{}]", sender),
            None => log::warn!("No SBI server with a domain name, SEPP sender unset"),
        }

        self.state = ContextState::Prepared;
        Ok(())
    }

    pub fn validate(&mut self) -> SeppResult<()> {
        assert!(
            self.state == ContextState::Prepared,
            "SEPP context must be prepared before validate"
        );

        if !self.security_capability.tls && !self.security_capability.prins {
            return Err(SeppError::ValidationFailed(
                "no security capability (TLS or PRINS) enabled".to_string(),
            ));
        }

        self.state = ContextState::Validated;
        Ok(())
    }

    /// Port of sepp_context_parse_config: prepare, ingest the `sepp`
    /// section, validate
    pub fn parse_config(
        &mut self,
        document: &OgsYamlDocument,
        sbi: &mut SbiContext,
    ) -> SeppResult<()> {
        self.prepare(sbi)?;
        config::parse_sepp_section(self, sbi, document)?;
        self.validate()
    }

    pub fn start(&mut self) {
        assert!(
            self.state == ContextState::Validated,
            "SEPP context must be validated before start"
        );
        self.state = ContextState::Running;
    }

    fn assert_initialized(&self) {
        assert!(self.is_initialized(), "SEPP context not initialized");
    }

    // ---- Peer nodes ----

    pub fn node_add(&mut self, receiver: &str) -> SeppResult<NodeHandle> {
        self.assert_initialized();
        self.nodes.add(receiver)
    }

    /// Remove a node, cutting any association still forwarding through it
    pub fn node_remove(&mut self, handle: NodeHandle) {
        self.assert_initialized();

        let unlinked = self.assocs.unlink_node(handle);
        if unlinked > 0 {
            log::warn!("[{}] {} association(s) lost their peer", handle, unlinked);
        }
        self.nodes.remove(handle);
    }

    pub fn node_remove_all(&mut self) {
        self.assert_initialized();

        for node in self.nodes.iter().map(SeppNode::handle).collect::<Vec<_>>() {
            self.assocs.unlink_node(node);
        }
        self.nodes.remove_all();
    }

    pub fn node_find(&self, handle: NodeHandle) -> Option<&SeppNode> {
        self.nodes.find(handle)
    }

    pub fn node_find_mut(&mut self, handle: NodeHandle) -> Option<&mut SeppNode> {
        self.nodes.find_mut(handle)
    }

    pub fn node_find_by_receiver(&self, receiver: &str) -> Option<&SeppNode> {
        self.nodes.find_by_receiver(receiver)
    }

    pub fn node_find_by_plmn_id(&self, mcc: u16, mnc: u16) -> Option<&SeppNode> {
        self.nodes.find_by_plmn_id(mcc, mnc)
    }

    pub fn node_add_plmn_id(&mut self, handle: NodeHandle, plmn_id: PlmnId) -> SeppResult<()> {
        self.nodes.add_plmn_id(handle, plmn_id)
    }

    pub fn node_set_client(&mut self, handle: NodeHandle, client: SbiClient) -> SeppResult<()> {
        let node = self
            .nodes
            .find_mut(handle)
            .ok_or_else(|| SeppError::NotFound(handle.to_string()))?;
        node.set_client(client);
        Ok(())
    }

    pub fn nodes(&self) -> &NodeDirectory {
        &self.nodes
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    // ---- Associations ----

    pub fn assoc_add(&mut self, stream: StreamId) -> SeppResult<AssocHandle> {
        self.assert_initialized();
        self.assocs.add(stream)
    }

    pub fn assoc_remove(&mut self, handle: AssocHandle) {
        self.assert_initialized();
        self.assocs.remove(handle);
    }

    pub fn assoc_remove_all(&mut self) {
        self.assert_initialized();
        self.assocs.remove_all();
    }

    pub fn assoc_find(&self, handle: AssocHandle) -> Option<&SeppAssoc> {
        self.assocs.find(handle)
    }

    pub fn assoc_find_mut(&mut self, handle: AssocHandle) -> Option<&mut SeppAssoc> {
        self.assocs.find_mut(handle)
    }

    pub fn assoc_find_by_stream(&self, stream: StreamId) -> Option<&SeppAssoc> {
        self.assocs.find_by_stream(stream)
    }

    /// Client the association forwards through, following a node
    /// reference into the directory
    pub fn assoc_peer_client(&self, handle: AssocHandle) -> Option<&SbiClient> {
        let assoc = self.assocs.find(handle)?;
        match assoc.peer.as_ref()? {
            PeerClientRef::Node(node) => self.nodes.find(*node)?.client(),
            PeerClientRef::Owned(client) => Some(client),
        }
    }

    pub fn assoc_count(&self) -> usize {
        self.assocs.len()
    }
}

impl Default for SeppContext {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ogs_sbi::{SbiClientConfig, SbiServer};

    fn sbi_with_servers(servers: Vec<SbiServer>) -> SbiContext {
        let mut sbi = SbiContext::new(NfType::Sepp);
        sbi.server_list = servers;
        sbi
    }

    #[test]
    fn test_lifecycle() {
        let mut ctx = SeppContext::new();
        let mut sbi = SbiContext::new(NfType::Sepp);
        assert_eq!(ctx.state(), ContextState::Uninitialized);

        ctx.init(4, 8);
        assert_eq!(ctx.state(), ContextState::Initialized);
        ctx.prepare(&mut sbi).unwrap();
        assert_eq!(ctx.state(), ContextState::Prepared);
        ctx.validate().unwrap();
        assert_eq!(ctx.state(), ContextState::Validated);
        ctx.start();
        assert_eq!(ctx.state(), ContextState::Running);

        ctx.fini(&mut sbi);
        assert_eq!(ctx.state(), ContextState::Uninitialized);

        // Re-init after fini is allowed
        ctx.init(1, 1);
        assert!(ctx.is_initialized());
    }

    #[test]
    #[should_panic(expected = "already initialized")]
    fn test_double_init_panics() {
        let mut ctx = SeppContext::new();
        ctx.init(1, 1);
        ctx.init(1, 1);
    }

    #[test]
    #[should_panic(expected = "not initialized")]
    fn test_fini_without_init_panics() {
        let mut ctx = SeppContext::new();
        let mut sbi = SbiContext::new(NfType::Sepp);
        ctx.fini(&mut sbi);
    }

    #[test]
    #[should_panic(expected = "not initialized")]
    fn test_node_add_without_init_panics() {
        let mut ctx = SeppContext::new();
        let _ = ctx.node_add("sepp.example.org");
    }

    #[test]
    fn test_pool_sizes() {
        let global = OgsGlobalConf::default();
        assert_eq!(pool_sizes(&global), (64, 1024 * 8));
    }

    #[test]
    fn test_prepare_derives_sender_and_ports() {
        let mut sbi = sbi_with_servers(vec![
            SbiServer::new(UriScheme::Http, "127.0.0.1", 7777),
            SbiServer::new(UriScheme::Https, "sepp1.localdomain", 443),
            SbiServer::new(UriScheme::Http, "sepp2.localdomain", 8080),
        ]);
        let mut ctx = SeppContext::new();
        ctx.init(4, 8);
        ctx.prepare(&mut sbi).unwrap();

        assert_eq!(ctx.sender(), Some("sepp1.localdomain"));
        assert!(ctx.security_capability.tls);
        assert!(!ctx.security_capability.prins);
        assert!(ctx.target_apiroot_supported);

        let info = sbi.nf_instance().nf_info_find(NfType::Sepp).unwrap();
        assert_eq!(info.sepp.port.http, Some(7777));
        assert_eq!(info.sepp.port.https, Some(443));
        assert_eq!(sbi.nf_instance().fqdn.as_deref(), Some("sepp1.localdomain"));
    }

    #[test]
    fn test_prepare_uses_advertise() {
        let mut sbi = sbi_with_servers(vec![
            SbiServer::new(UriScheme::Https, "0.0.0.0", 443).with_advertise("sepp.5gc.mnc070.mcc999.3gppnetwork.org"),
        ]);
        let mut ctx = SeppContext::new();
        ctx.init(1, 1);
        ctx.prepare(&mut sbi).unwrap();
        assert_eq!(ctx.sender(), Some("sepp.5gc.mnc070.mcc999.3gppnetwork.org"));
    }

    #[test]
    fn test_prepare_without_hostname() {
        let mut sbi = sbi_with_servers(vec![SbiServer::new(UriScheme::Http, "::1", 7777)]);
        let mut ctx = SeppContext::new();
        ctx.init(1, 1);
        ctx.prepare(&mut sbi).unwrap();
        assert!(ctx.sender().is_none());
    }

    #[test]
    fn test_validate_requires_security_capability() {
        let mut sbi = SbiContext::new(NfType::Sepp);
        let mut ctx = SeppContext::new();
        ctx.init(1, 1);
        ctx.prepare(&mut sbi).unwrap();
        ctx.security_capability = SecurityCapabilityConfig {
            tls: false,
            prins: false,
        };
        assert!(matches!(ctx.validate(), Err(SeppError::ValidationFailed(_))));

        ctx.security_capability.prins = true;
        ctx.validate().unwrap();
    }

    #[test]
    fn test_node_remove_unlinks_assocs() {
        let mut ctx = SeppContext::new();
        ctx.init(2, 4);
        let node = ctx.node_add("sepp.example.org").unwrap();
        ctx.node_set_client(node, SbiClient::new(SbiClientConfig::new("sepp.example.org", 443)))
            .unwrap();

        let assoc = ctx.assoc_add(StreamId(1)).unwrap();
        ctx.assoc_find_mut(assoc).unwrap().peer = Some(PeerClientRef::Node(node));
        assert_eq!(ctx.assoc_peer_client(assoc).unwrap().host(), "sepp.example.org");

        ctx.node_remove(node);
        assert!(ctx.assoc_find(assoc).unwrap().peer.is_none());
        assert!(ctx.assoc_peer_client(assoc).is_none());
    }

    #[test]
    fn test_assoc_owned_peer_client() {
        let mut ctx = SeppContext::new();
        ctx.init(1, 1);
        let assoc = ctx.assoc_add(StreamId(7)).unwrap();
        ctx.assoc_find_mut(assoc).unwrap().peer = Some(PeerClientRef::Owned(SbiClient::new(
            SbiClientConfig::new("adhoc.example.org", 443),
        )));
        assert_eq!(ctx.assoc_peer_client(assoc).unwrap().host(), "adhoc.example.org");
        assert_eq!(ctx.assoc_find_by_stream(StreamId(7)).unwrap().handle(), assoc);
    }

    #[test]
    fn test_reinit_publishes_new_identity() {
        let mut ctx = SeppContext::new();
        let mut sbi = sbi_with_servers(vec![SbiServer::new(UriScheme::Http, "old.example.org", 7777)]);
        ctx.init(1, 1);
        ctx.prepare(&mut sbi).unwrap();
        assert_eq!(sbi.nf_instance().fqdn.as_deref(), Some("old.example.org"));

        ctx.fini(&mut sbi);
        assert!(sbi.nf_instance().fqdn.is_none());

        sbi.server_list = vec![SbiServer::new(UriScheme::Http, "new.example.org", 7777)];
        ctx.init(1, 1);
        ctx.prepare(&mut sbi).unwrap();
        assert_eq!(ctx.sender(), Some("new.example.org"));
        assert_eq!(sbi.nf_instance().fqdn.as_deref(), Some("new.example.org"));
    }

    #[test]
    fn test_fini_keeps_foreign_fqdn() {
        let mut ctx = SeppContext::new();
        let mut sbi = sbi_with_servers(vec![SbiServer::new(UriScheme::Http, "sepp.example.org", 7777)]);
        sbi.nf_instance_mut().fqdn = Some("profile.example.org".to_string());
        ctx.init(1, 1);
        ctx.prepare(&mut sbi).unwrap();

        ctx.fini(&mut sbi);
        assert_eq!(sbi.nf_instance().fqdn.as_deref(), Some("profile.example.org"));
    }

    #[test]
    fn test_fini_releases_everything() {
        let mut sbi = SbiContext::new(NfType::Sepp);
        let mut ctx = SeppContext::new();
        ctx.init(2, 2);
        ctx.prepare(&mut sbi).unwrap();
        ctx.node_add("a.example.org").unwrap();
        ctx.node_add("b.example.org").unwrap();
        ctx.assoc_add(StreamId(1)).unwrap();
        assert!(sbi.nf_instance().nf_info_find(NfType::Sepp).is_some());

        ctx.fini(&mut sbi);
        assert_eq!(ctx.node_count(), 0);
        assert_eq!(ctx.assoc_count(), 0);
        assert!(ctx.sender().is_none());
        assert!(sbi.nf_instance().nf_info_find(NfType::Sepp).is_none());
    }
}
