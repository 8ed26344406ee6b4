//! Region metadata consumed from the control-plane metadata store.
//!
//! The statistics core only needs a narrow slice of region state: identity,
//! epoch version, the replica peer list with its leader, and the flow
//! counters carried by the latest heartbeat. The metadata store owns the
//! authoritative record; values here are point-in-time copies.

use serde::{Deserialize, Serialize};

/// Region identifier.
pub type RegionId = u64;
/// Store (node) identifier.
pub type StoreId = u64;
/// Peer (replica) identifier.
pub type PeerId = u64;

/// One replica of a region, resident on a specific store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Peer {
    pub id: PeerId,
    pub store_id: StoreId,
}

/// Point-in-time region descriptor plus the flow counters from its latest
/// heartbeat. Counters are deltas over the reporting period, not lifetime
/// totals.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegionInfo {
    id: RegionId,
    epoch_version: u64,
    peers: Vec<Peer>,
    leader: Option<Peer>,
    bytes_written: u64,
    keys_written: u64,
    bytes_read: u64,
    keys_read: u64,
}

impl RegionInfo {
    /// Build a descriptor with zeroed flow counters.
    ///
    /// `leader` must be one of `peers` when present; a leaderless region is
    /// representable because heartbeats can arrive during an election.
    pub fn new(
        id: RegionId,
        epoch_version: u64,
        peers: Vec<Peer>,
        leader: Option<Peer>,
    ) -> Self {
        Self {
            id,
            epoch_version,
            peers,
            leader,
            bytes_written: 0,
            keys_written: 0,
            bytes_read: 0,
            keys_read: 0,
        }
    }

    /// Attach write-flow counters from a heartbeat.
    pub fn with_write_flow(mut self, bytes_written: u64, keys_written: u64) -> Self {
        self.bytes_written = bytes_written;
        self.keys_written = keys_written;
        self
    }

    /// Attach read-flow counters from a heartbeat.
    pub fn with_read_flow(mut self, bytes_read: u64, keys_read: u64) -> Self {
        self.bytes_read = bytes_read;
        self.keys_read = keys_read;
        self
    }

    pub fn id(&self) -> RegionId {
        self.id
    }

    pub fn epoch_version(&self) -> u64 {
        self.epoch_version
    }

    pub fn peers(&self) -> &[Peer] {
        &self.peers
    }

    pub fn leader(&self) -> Option<Peer> {
        self.leader
    }

    /// The region's peer on `store_id`, if any.
    pub fn store_peer(&self, store_id: StoreId) -> Option<Peer> {
        self.peers.iter().copied().find(|p| p.store_id == store_id)
    }

    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    pub fn keys_written(&self) -> u64 {
        self.keys_written
    }

    pub fn bytes_read(&self) -> u64 {
        self.bytes_read
    }

    pub fn keys_read(&self) -> u64 {
        self.keys_read
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_peer_finds_resident_replica() {
        let peers = vec![
            Peer { id: 1, store_id: 10 },
            Peer { id: 2, store_id: 20 },
        ];
        let region = RegionInfo::new(7, 3, peers.clone(), Some(peers[0]));

        assert_eq!(region.store_peer(10), Some(peers[0]));
        assert_eq!(region.store_peer(20), Some(peers[1]));
        assert_eq!(region.store_peer(30), None);
    }

    #[test]
    fn flow_counters_default_to_zero() {
        let region = RegionInfo::new(1, 1, vec![], None);
        assert_eq!(region.bytes_written(), 0);
        assert_eq!(region.keys_read(), 0);

        let region = region.with_write_flow(4096, 16).with_read_flow(8192, 32);
        assert_eq!(region.bytes_written(), 4096);
        assert_eq!(region.keys_written(), 16);
        assert_eq!(region.bytes_read(), 8192);
        assert_eq!(region.keys_read(), 32);
    }
}
