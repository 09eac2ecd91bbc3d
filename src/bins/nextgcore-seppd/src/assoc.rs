//! Association registry
//!
//! An association ties one inbound request stream to the peer it is being
//! forwarded to. It lives until the peer answers, the request times out or
//! the context is torn down.

use std::fmt;

use ogs_core::{OgsPool, PoolHandle};
use ogs_sbi::{SbiClient, StreamId};

use crate::error::SeppResult;
use crate::node::{NodeHandle, PlmnId};

/// Handle to a [`SeppAssoc`] in the registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AssocHandle(PoolHandle);

impl AssocHandle {
    pub fn pool_handle(&self) -> PoolHandle {
        self.0
    }
}

impl fmt::Display for AssocHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "assoc:{}", self.0)
    }
}

/// Where the forwarding client of an association comes from
#[derive(Debug)]
pub enum PeerClientRef {
    /// Borrowed from a directory node, which keeps ownership
    Node(NodeHandle),
    /// Created for this request alone and dropped with the association
    Owned(SbiClient),
}

/// SEPP Association - one in-flight forwarded request
/// Port of sepp_assoc_t from context.h
#[derive(Debug)]
pub struct SeppAssoc {
    handle: AssocHandle,
    stream: StreamId,
    pub peer: Option<PeerClientRef>,
    /// NRF client used for discovery, owned by the association
    pub nrf_client: Option<SbiClient>,
    pub target_plmn_id: Option<PlmnId>,
    pub target_apiroot: Option<String>,
}

impl SeppAssoc {
    fn new(handle: AssocHandle, stream: StreamId) -> Self {
        Self {
            handle,
            stream,
            peer: None,
            nrf_client: None,
            target_plmn_id: None,
            target_apiroot: None,
        }
    }

    pub fn handle(&self) -> AssocHandle {
        self.handle
    }

    pub fn stream(&self) -> StreamId {
        self.stream
    }

    /// Directory node this association forwards through, if any
    pub fn peer_node(&self) -> Option<NodeHandle> {
        match self.peer {
            Some(PeerClientRef::Node(node)) => Some(node),
            _ => None,
        }
    }
}

/// Pool-backed set of associations (unordered)
#[derive(Debug)]
pub struct AssocRegistry {
    pool: OgsPool<SeppAssoc>,
}

impl AssocRegistry {
    pub fn new(max_assoc: usize) -> Self {
        Self {
            pool: OgsPool::new("sepp_assoc", max_assoc),
        }
    }

    /// Port of sepp_assoc_add
    pub fn add(&mut self, stream: StreamId) -> SeppResult<AssocHandle> {
        let handle = self
            .pool
            .alloc_with(|h| SeppAssoc::new(AssocHandle(h), stream))
            .map(AssocHandle)?;

        log::debug!(
            "[{}] SEPP assoc added for {} (size={})",
            handle,
            stream,
            self.pool.allocated()
        );
        Ok(handle)
    }

    /// Port of sepp_assoc_remove
    ///
    /// Panics on a stale handle. Owned clients are released with the
    /// association; a node client is left alone.
    pub fn remove(&mut self, handle: AssocHandle) {
        let assoc = self.pool.free(handle.0);

        log::debug!(
            "[{}] SEPP assoc removed for {} (size={})",
            handle,
            assoc.stream,
            self.pool.allocated()
        );
    }

    pub fn remove_all(&mut self) {
        for handle in self.pool.handles() {
            self.pool.free(handle);
        }
    }

    pub fn find(&self, handle: AssocHandle) -> Option<&SeppAssoc> {
        self.pool.find(handle.0)
    }

    pub fn find_mut(&mut self, handle: AssocHandle) -> Option<&mut SeppAssoc> {
        self.pool.find_mut(handle.0)
    }

    pub fn find_by_stream(&self, stream: StreamId) -> Option<&SeppAssoc> {
        self.iter().find(|assoc| assoc.stream == stream)
    }

    /// Drop every reference to `node`, returning how many were cut
    pub fn unlink_node(&mut self, node: NodeHandle) -> usize {
        let mut unlinked = 0;
        for handle in self.pool.handles() {
            if let Some(assoc) = self.pool.find_mut(handle) {
                if assoc.peer_node() == Some(node) {
                    assoc.peer = None;
                    unlinked += 1;
                }
            }
        }
        unlinked
    }

    pub fn iter(&self) -> impl Iterator<Item = &SeppAssoc> {
        self.pool.iter().map(|(_, assoc)| assoc)
    }

    pub fn len(&self) -> usize {
        self.pool.allocated()
    }

    pub fn is_empty(&self) -> bool {
        self.pool.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.pool.capacity()
    }

    pub fn finalize(self) {
        self.pool.finalize();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SeppError;
    use crate::node::NodeDirectory;
    use ogs_sbi::SbiClientConfig;

    #[test]
    fn test_add_find_remove() {
        let mut reg = AssocRegistry::new(2);
        let a = reg.add(StreamId(10)).unwrap();
        let b = reg.add(StreamId(20)).unwrap();
        assert_eq!(reg.len(), 2);

        assert_eq!(reg.find(a).unwrap().stream(), StreamId(10));
        assert_eq!(reg.find_by_stream(StreamId(20)).unwrap().handle(), b);
        assert!(reg.find_by_stream(StreamId(30)).is_none());

        reg.remove(a);
        assert!(reg.find(a).is_none());
        assert_eq!(reg.len(), 1);

        reg.remove_all();
        assert!(reg.is_empty());
        reg.finalize();
    }

    #[test]
    fn test_capacity_exceeded() {
        let mut reg = AssocRegistry::new(1);
        reg.add(StreamId(1)).unwrap();
        assert!(matches!(
            reg.add(StreamId(2)),
            Err(SeppError::CapacityExceeded { max: 1, .. })
        ));
    }

    #[test]
    fn test_owned_clients_released_with_assoc() {
        let mut reg = AssocRegistry::new(1);
        let a = reg.add(StreamId(1)).unwrap();
        {
            let assoc = reg.find_mut(a).unwrap();
            assoc.peer = Some(PeerClientRef::Owned(SbiClient::new(SbiClientConfig::new(
                "sepp.example.org",
                443,
            ))));
            assoc.nrf_client = Some(SbiClient::new(SbiClientConfig::new("nrf.example.org", 80)));
        }
        reg.remove(a);

        // Slot comes back clean
        let b = reg.add(StreamId(2)).unwrap();
        let assoc = reg.find(b).unwrap();
        assert!(assoc.peer.is_none());
        assert!(assoc.nrf_client.is_none());
    }

    #[test]
    fn test_unlink_node() {
        let mut dir = NodeDirectory::new(2);
        let n1 = dir.add("a.example.org").unwrap();
        let n2 = dir.add("b.example.org").unwrap();

        let mut reg = AssocRegistry::new(4);
        let a1 = reg.add(StreamId(1)).unwrap();
        let a2 = reg.add(StreamId(2)).unwrap();
        let a3 = reg.add(StreamId(3)).unwrap();
        reg.find_mut(a1).unwrap().peer = Some(PeerClientRef::Node(n1));
        reg.find_mut(a2).unwrap().peer = Some(PeerClientRef::Node(n2));
        reg.find_mut(a3).unwrap().peer = Some(PeerClientRef::Node(n1));

        assert_eq!(reg.unlink_node(n1), 2);
        assert!(reg.find(a1).unwrap().peer.is_none());
        assert_eq!(reg.find(a2).unwrap().peer_node(), Some(n2));
        assert!(reg.find(a3).unwrap().peer.is_none());
    }

    #[test]
    #[should_panic]
    fn test_double_remove_panics() {
        let mut reg = AssocRegistry::new(1);
        let a = reg.add(StreamId(1)).unwrap();
        reg.remove(a);
        reg.remove(a);
    }
}
