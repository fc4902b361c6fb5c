//! Regions and their replica peers.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::store::StoreId;

/// Unique identifier for a region (a replicated keyspace partition).
pub type RegionId = u64;

/// Unique identifier for a peer (one replica of a region).
pub type PeerId = u64;

/// Consensus role of a replica.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeerRole {
    /// Full voting member of the replication group.
    Voter,
    /// Non-voting member that only replicates data.
    Learner,
}

/// One replica of a region, hosted on exactly one store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Peer {
    pub id: PeerId,
    pub store_id: StoreId,
    pub role: PeerRole,
    /// Witness replicas vote but may not hold full data.
    pub is_witness: bool,
}

impl Peer {
    pub fn new(id: PeerId, store_id: StoreId) -> Self {
        Self { id, store_id, role: PeerRole::Voter, is_witness: false }
    }

    #[must_use]
    pub fn learner(mut self) -> Self {
        self.role = PeerRole::Learner;
        self
    }

    #[must_use]
    pub fn witness(mut self) -> Self {
        self.is_witness = true;
        self
    }

    pub fn is_learner(&self) -> bool {
        self.role == PeerRole::Learner
    }
}

/// Snapshot of a region: its replicas, leader, and replica health sets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionInfo {
    pub id: RegionId,
    peers: Vec<Peer>,
    leader: Option<PeerId>,
    down_peers: HashSet<PeerId>,
    pending_peers: HashSet<PeerId>,
}

impl RegionInfo {
    pub fn new(id: RegionId, peers: Vec<Peer>) -> Self {
        Self { id, peers, leader: None, down_peers: HashSet::new(), pending_peers: HashSet::new() }
    }

    #[must_use]
    pub fn with_leader(mut self, peer_id: PeerId) -> Self {
        self.leader = Some(peer_id);
        self
    }

    /// Mark a replica as down (unreachable past the liveness deadline).
    #[must_use]
    pub fn with_down_peer(mut self, peer_id: PeerId) -> Self {
        self.down_peers.insert(peer_id);
        self
    }

    /// Mark a replica as pending (lagging behind the raft log).
    #[must_use]
    pub fn with_pending_peer(mut self, peer_id: PeerId) -> Self {
        self.pending_peers.insert(peer_id);
        self
    }

    pub fn peers(&self) -> &[Peer] {
        &self.peers
    }

    pub fn leader(&self) -> Option<PeerId> {
        self.leader
    }

    pub fn is_leader(&self, peer_id: PeerId) -> bool {
        self.leader == Some(peer_id)
    }

    pub fn is_down(&self, peer_id: PeerId) -> bool {
        self.down_peers.contains(&peer_id)
    }

    pub fn is_pending(&self, peer_id: PeerId) -> bool {
        self.pending_peers.contains(&peer_id)
    }

    /// Store ids hosting down or pending replicas of this region.
    pub fn unhealthy_store_ids(&self) -> HashSet<StoreId> {
        self.peers
            .iter()
            .filter(|p| self.is_down(p.id) || self.is_pending(p.id))
            .map(|p| p.store_id)
            .collect()
    }
}
