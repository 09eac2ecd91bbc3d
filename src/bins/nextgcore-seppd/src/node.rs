//! Peer SEPP node directory
//!
//! Every remote SEPP this process talks to over N32 is a [`SeppNode`] living
//! in a fixed-size pool. The directory also keeps insertion order so that
//! listing and teardown walk peers the way they were configured.

use std::fmt;

use ogs_core::{OgsPool, PoolHandle};
use ogs_sbi::SbiClient;

use crate::error::{SeppError, SeppResult};

/// Maximum number of PLMN IDs per SEPP node
pub const MAX_NUM_OF_PLMN: usize = 16;

/// PLMN identity served by a peer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PlmnId {
    pub mcc: u16,
    pub mnc: u16,
    pub mnc_len: u8,
}

impl PlmnId {
    pub fn new(mcc: u16, mnc: u16, mnc_len: u8) -> Self {
        Self { mcc, mnc, mnc_len }
    }

    /// Build from the decimal strings found in configuration.
    ///
    /// The MNC length follows the number of digits written, so "093" keeps
    /// its three-digit form. Write such MNCs quoted in configuration: once a
    /// loader has read `093` as the number 93 only two digits reach here.
    pub fn from_strings(mcc: &str, mnc: &str) -> SeppResult<Self> {
        let mcc = mcc.trim();
        let mnc = mnc.trim();

        let digits = |s: &str| !s.is_empty() && s.len() <= 3 && s.bytes().all(|b| b.is_ascii_digit());
        if !digits(mcc) || !digits(mnc) {
            return Err(SeppError::ConfigurationMalformed(format!(
                "invalid PLMN ID [MCC:{} MNC:{}]",
                mcc, mnc
            )));
        }

        // Both are at most three ASCII digits at this point
        let mcc_value: u16 = mcc.parse().unwrap_or_default();
        let mnc_value: u16 = mnc.parse().unwrap_or_default();
        if mcc_value == 0 || mnc_value == 0 {
            return Err(SeppError::ConfigurationMalformed(format!(
                "zero PLMN ID [MCC:{} MNC:{}]",
                mcc, mnc
            )));
        }

        let mnc_len = if mnc.len() == 3 { 3 } else { 2 };
        Ok(Self::new(mcc_value, mnc_value, mnc_len))
    }

    /// Same network regardless of how the MNC was written
    pub fn matches(&self, mcc: u16, mnc: u16) -> bool {
        self.mcc == mcc && self.mnc == mnc
    }
}

impl fmt::Display for PlmnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.mnc_len == 3 {
            write!(f, "{:03}-{:03}", self.mcc, self.mnc)
        } else {
            write!(f, "{:03}-{:02}", self.mcc, self.mnc)
        }
    }
}

/// Handle to a [`SeppNode`] in the directory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeHandle(PoolHandle);

impl NodeHandle {
    pub fn pool_handle(&self) -> PoolHandle {
        self.0
    }
}

impl fmt::Display for NodeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node:{}", self.0)
    }
}

/// SEPP Node structure - represents a peer SEPP
/// Port of sepp_node_t from context.h
#[derive(Debug)]
pub struct SeppNode {
    handle: NodeHandle,
    /// Peer domain name (N32 receiver)
    receiver: String,
    /// Outbound client, owned by the node
    client: Option<SbiClient>,
    plmn_ids: Vec<PlmnId>,
}

impl SeppNode {
    fn new(handle: NodeHandle, receiver: &str) -> Self {
        Self {
            handle,
            receiver: receiver.to_string(),
            client: None,
            plmn_ids: Vec::new(),
        }
    }

    pub fn handle(&self) -> NodeHandle {
        self.handle
    }

    pub fn receiver(&self) -> &str {
        &self.receiver
    }

    pub fn client(&self) -> Option<&SbiClient> {
        self.client.as_ref()
    }

    /// Attach the outbound client, dropping any previous one
    pub fn set_client(&mut self, client: SbiClient) {
        self.client = Some(client);
    }

    pub fn plmn_ids(&self) -> &[PlmnId] {
        &self.plmn_ids
    }

    pub fn has_plmn_id(&self, mcc: u16, mnc: u16) -> bool {
        self.plmn_ids.iter().any(|p| p.matches(mcc, mnc))
    }
}

/// Pool-backed set of peer nodes
#[derive(Debug)]
pub struct NodeDirectory {
    pool: OgsPool<SeppNode>,
    list: Vec<NodeHandle>,
}

impl NodeDirectory {
    pub fn new(max_node: usize) -> Self {
        Self {
            pool: OgsPool::new("sepp_node", max_node),
            list: Vec::with_capacity(max_node),
        }
    }

    /// Port of sepp_node_add
    ///
    /// Duplicate domain names are not rejected here; configuration decides
    /// whether that is allowed.
    pub fn add(&mut self, receiver: &str) -> SeppResult<NodeHandle> {
        let handle = self
            .pool
            .alloc_with(|h| SeppNode::new(NodeHandle(h), receiver))
            .map(NodeHandle)?;
        self.list.push(handle);

        log::debug!(
            "[{}] SEPP node added (size={})",
            receiver,
            self.list.len()
        );
        Ok(handle)
    }

    /// Port of sepp_node_remove
    ///
    /// Panics on a stale handle. Dropping the node releases its client.
    pub fn remove(&mut self, handle: NodeHandle) {
        let node = self.pool.free(handle.0);
        self.list.retain(|h| *h != handle);

        log::debug!(
            "[{}] SEPP node removed (size={})",
            node.receiver,
            self.list.len()
        );
    }

    pub fn remove_all(&mut self) {
        for handle in std::mem::take(&mut self.list) {
            self.pool.free(handle.0);
        }
    }

    pub fn find(&self, handle: NodeHandle) -> Option<&SeppNode> {
        self.pool.find(handle.0)
    }

    pub fn find_mut(&mut self, handle: NodeHandle) -> Option<&mut SeppNode> {
        self.pool.find_mut(handle.0)
    }

    /// First node in insertion order with this domain name
    pub fn find_by_receiver(&self, receiver: &str) -> Option<&SeppNode> {
        self.iter().find(|node| node.receiver == receiver)
    }

    /// Node serving the given network.
    ///
    /// Both MCC and MNC are mandatory; zero for either is a caller bug.
    pub fn find_by_plmn_id(&self, mcc: u16, mnc: u16) -> Option<&SeppNode> {
        assert!(mcc != 0, "MCC is mandatory");
        assert!(mnc != 0, "MNC is mandatory");

        self.iter().find(|node| node.has_plmn_id(mcc, mnc))
    }

    /// Attach a network identity to `handle`.
    ///
    /// An identity already served by another node is a configuration error;
    /// attaching one the node already has is a no-op.
    pub fn add_plmn_id(&mut self, handle: NodeHandle, plmn_id: PlmnId) -> SeppResult<()> {
        if let Some(owner) = self
            .iter()
            .find(|node| node.has_plmn_id(plmn_id.mcc, plmn_id.mnc))
        {
            if owner.handle == handle {
                return Ok(());
            }
            return Err(SeppError::ConfigurationMalformed(format!(
                "PLMN ID [{}] already served by [{}]",
                plmn_id, owner.receiver
            )));
        }

        let node = self
            .pool
            .find_mut(handle.0)
            .ok_or_else(|| SeppError::NotFound(handle.to_string()))?;
        if node.plmn_ids.len() >= MAX_NUM_OF_PLMN {
            return Err(SeppError::CapacityExceeded {
                pool: format!("PLMN ID of [{}]", node.receiver),
                max: MAX_NUM_OF_PLMN,
            });
        }
        node.plmn_ids.push(plmn_id);
        Ok(())
    }

    /// Nodes in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &SeppNode> {
        self.list.iter().filter_map(|h| self.pool.find(h.0))
    }

    pub fn len(&self) -> usize {
        self.list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.pool.capacity()
    }

    /// Tear down the backing pool; every node must have been removed
    pub fn finalize(self) {
        self.pool.finalize();
    }
}
