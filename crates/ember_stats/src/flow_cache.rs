//! Per-flow-kind hot peer tracking.
//!
//! One `FlowCache` exists per flow kind. It owns the bounded peer caches
//! (one per store) and a reverse index from region to the stores currently
//! tracking it. `check_region_flow` is read-only and returns candidate
//! updates; the caller applies them through `update`, so schedulers can
//! observe a would-be change without committing it.
//!
//! Notes:
//! - The reverse index may briefly hold stale edges after a silent cache
//!   eviction. This is tolerated: the next check for that region rebuilds
//!   its store set from the union of old stores and current peers, and an
//!   expired store evaluates to a tombstone.
//! - Stores removed from a region's peer list stay in the candidate set for
//!   one more pass so the stale stat can be tombstoned.

use std::collections::{HashMap, HashSet};
use std::time::SystemTime;

use rand::seq::SliceRandom;

use crate::hot_peer::{merge_observation, FlowKind, HotPeerStat};
use crate::metrics::{store_tag, HOT_CACHE_STATUS_GAUGE, HOT_THRESHOLD_LABEL, TOTAL_LENGTH_LABEL};
use crate::peer_cache::{PeerCache, PEER_CACHE_CAPACITY};
use crate::region::{RegionId, RegionInfo, StoreId};
use crate::rolling::{RollingStats, ROLLING_WINDOW};
use crate::store_stats::StoresStats;
use crate::REGION_HEARTBEAT_INTERVAL_SECS;

/// Reports closer together than this are dropped as duplicates when
/// denoising is enabled.
pub const MIN_REPORT_INTERVAL_SECS: f64 = 3.0;

/// Divisor for adaptive thresholds: the approximate number of top peers a
/// store is expected to carry.
pub const HOT_PEER_MAX_COUNT: usize = 400;

/// Threshold floor for write flow, bytes per second.
pub const MIN_WRITE_FLOW_BYTES: f64 = 16.0 * 1024.0;
/// Threshold floor for read flow, bytes per second.
pub const MIN_READ_FLOW_BYTES: f64 = 128.0 * 1024.0;

/// Hot peer statistics for one flow kind across all stores.
pub struct FlowCache {
    kind: FlowKind,
    peers_of_store: HashMap<StoreId, PeerCache<RegionId, HotPeerStat>>,
    stores_of_region: HashMap<RegionId, HashSet<StoreId>>,
}

impl FlowCache {
    pub fn new(kind: FlowKind) -> Self {
        Self {
            kind,
            peers_of_store: HashMap::new(),
            stores_of_region: HashMap::new(),
        }
    }

    /// Evaluate one region heartbeat against every relevant store.
    ///
    /// Inputs:
    /// - `region`: the heartbeat's region descriptor and flow counters.
    /// - `stats`: fleet store rates feeding the adaptive thresholds.
    /// - `now`: evaluation time; production callers pass the wall clock,
    ///   simulation and tests drive it explicitly.
    ///
    /// Output:
    /// - Candidate updates, one per store whose stat changed. Nothing is
    ///   mutated here; apply each candidate with [`FlowCache::update`].
    pub fn check_region_flow(
        &self,
        region: &RegionInfo,
        stats: &StoresStats,
        now: SystemTime,
    ) -> Vec<HotPeerStat> {
        // Read flow tracks the leader peer only; a leaderless heartbeat
        // (mid-election) has no relevant peers.
        if self.kind == FlowKind::Read && region.leader().is_none() {
            return Vec::new();
        }
        let leader_store = region.leader().map(|peer| peer.store_id);

        let bytes_flow = self.bytes_flow(region);
        let keys_flow = self.keys_flow(region);
        let nominal_interval = REGION_HEARTBEAT_INTERVAL_SECS as f64;
        let bytes_per_sec_init = bytes_flow as f64 / nominal_interval;
        let keys_per_sec_init = keys_flow as f64 / nominal_interval;

        let mut ret = Vec::new();
        for store_id in self.candidate_stores(region) {
            let mut bytes_per_sec = bytes_per_sec_init;
            let mut keys_per_sec = keys_per_sec_init;
            let expired = self.is_peer_expired(region, store_id);
            let old = self
                .peers_of_store
                .get(&store_id)
                .and_then(|peers| peers.peek(&region.id()));

            if let Some(old) = old {
                if crate::denoising_enabled() {
                    // A regressed clock yields no usable interval: keep the
                    // nominal-interval rates and let the report land.
                    if let Ok(elapsed) = now.duration_since(old.last_update_time) {
                        let interval = elapsed.as_secs_f64();
                        if interval < MIN_REPORT_INTERVAL_SECS && !expired {
                            continue;
                        }
                        if interval > 0.0 {
                            bytes_per_sec = bytes_flow as f64 / interval;
                            keys_per_sec = keys_flow as f64 / interval;
                        }
                    }
                }
            }

            let next = HotPeerStat {
                store_id,
                region_id: region.id(),
                kind: self.kind,
                bytes_rate: bytes_per_sec,
                keys_rate: keys_per_sec,
                rolling_bytes_rate: RollingStats::new(ROLLING_WINDOW),
                hot_degree: 0,
                anti_count: 0,
                version: region.epoch_version(),
                last_update_time: now,
                is_leader: leader_store == Some(store_id),
                is_new: false,
                need_delete: expired,
            };

            let threshold = self.calc_hot_threshold(stats, store_id);
            if let Some(item) = merge_observation(next, old, bytes_per_sec, threshold) {
                ret.push(item);
            }
        }
        ret
    }

    /// Apply a candidate update, keeping both indices in step.
    pub fn update(&mut self, item: HotPeerStat) {
        if item.need_delete() {
            if let Some(peers) = self.peers_of_store.get_mut(&item.store_id) {
                peers.remove(&item.region_id);
            }
            if let Some(stores) = self.stores_of_region.get_mut(&item.region_id) {
                stores.remove(&item.store_id);
                if stores.is_empty() {
                    self.stores_of_region.remove(&item.region_id);
                }
            }
            tracing::debug!(
                region_id = item.region_id,
                store_id = item.store_id,
                kind = item.kind.as_label(),
                "hot peer removed"
            );
        } else {
            if item.is_new() {
                tracing::debug!(
                    region_id = item.region_id,
                    store_id = item.store_id,
                    kind = item.kind.as_label(),
                    "hot peer tracked"
                );
            }
            self.stores_of_region
                .entry(item.region_id)
                .or_default()
                .insert(item.store_id);
            self.peers_of_store
                .entry(item.store_id)
                .or_insert_with(|| PeerCache::new(PEER_CACHE_CAPACITY))
                .put(item.region_id, item);
        }
    }

    /// Whether the region is hot at `min_degree` for this cache's kind:
    /// any peer for write flow, the leader peer for read flow.
    pub fn is_region_hot(&self, region: &RegionInfo, min_degree: i64) -> bool {
        match self.kind {
            FlowKind::Write => region
                .peers()
                .iter()
                .any(|peer| self.is_peer_hot(region.id(), peer.store_id, min_degree)),
            FlowKind::Read => region
                .leader()
                .is_some_and(|leader| self.is_peer_hot(region.id(), leader.store_id, min_degree)),
        }
    }

    /// Point-in-time snapshot of every peer cache.
    pub fn region_stats(&self) -> HashMap<StoreId, Vec<HotPeerStat>> {
        self.peers_of_store
            .iter()
            .map(|(store_id, peers)| (*store_id, peers.elems()))
            .collect()
    }

    /// Uniform random pick among this store's stats at `min_degree` or hotter.
    pub fn rand_hot_region_from_store(
        &self,
        store_id: StoreId,
        min_degree: i64,
    ) -> Option<HotPeerStat> {
        let peers = self.peers_of_store.get(&store_id)?;
        let qualifying = peers
            .elems()
            .into_iter()
            .filter(|stat| stat.hot_degree >= min_degree)
            .collect::<Vec<_>>();
        qualifying.choose(&mut rand::thread_rng()).cloned()
    }

    /// Store-relative hot threshold for this kind, floored at the MIN flow
    /// constant. Stores missing from `stats` report zero and land on the
    /// floor.
    pub fn calc_hot_threshold(&self, stats: &StoresStats, store_id: StoreId) -> f64 {
        let (write_bytes, read_bytes) = stats.store_bytes_rate(store_id);
        let divisor = HOT_PEER_MAX_COUNT as f64;
        match self.kind {
            FlowKind::Write => (write_bytes / divisor).max(MIN_WRITE_FLOW_BYTES),
            FlowKind::Read => (read_bytes / divisor).max(MIN_READ_FLOW_BYTES),
        }
    }

    /// Export per-store gauges: tracked peer count and current threshold.
    pub fn collect_metrics(&self, stats: &StoresStats) {
        let kind = self.kind.as_label();
        for (store_id, peers) in &self.peers_of_store {
            let store = store_tag(*store_id);
            let threshold = self.calc_hot_threshold(stats, *store_id);
            HOT_CACHE_STATUS_GAUGE
                .with_label_values(&[TOTAL_LENGTH_LABEL, &store, kind])
                .set(peers.len() as f64);
            HOT_CACHE_STATUS_GAUGE
                .with_label_values(&[HOT_THRESHOLD_LABEL, &store, kind])
                .set(threshold);
        }
    }

    /// Stores to visit for this heartbeat: previously tracked stores plus
    /// the region's current peers (leader only for read flow). Old stores
    /// stay in for one more pass so departed peers can be tombstoned.
    fn candidate_stores(&self, region: &RegionInfo) -> Vec<StoreId> {
        let mut store_ids = self
            .stores_of_region
            .get(&region.id())
            .cloned()
            .unwrap_or_default();
        let leader_store = region.leader().map(|peer| peer.store_id);
        for peer in region.peers() {
            if self.kind == FlowKind::Read && Some(peer.store_id) != leader_store {
                continue;
            }
            store_ids.insert(peer.store_id);
        }
        let mut store_ids = store_ids.into_iter().collect::<Vec<_>>();
        store_ids.sort_unstable();
        store_ids
    }

    fn is_peer_expired(&self, region: &RegionInfo, store_id: StoreId) -> bool {
        match self.kind {
            FlowKind::Write => region.store_peer(store_id).is_none(),
            FlowKind::Read => region.leader().map(|leader| leader.store_id) != Some(store_id),
        }
    }

    fn is_peer_hot(&self, region_id: RegionId, store_id: StoreId, min_degree: i64) -> bool {
        self.peers_of_store
            .get(&store_id)
            .and_then(|peers| peers.peek(&region_id))
            .is_some_and(|stat| stat.hot_degree >= min_degree)
    }

    fn bytes_flow(&self, region: &RegionInfo) -> u64 {
        match self.kind {
            FlowKind::Write => region.bytes_written(),
            FlowKind::Read => region.bytes_read(),
        }
    }

    fn keys_flow(&self, region: &RegionInfo) -> u64 {
        match self.kind {
            FlowKind::Write => region.keys_written(),
            FlowKind::Read => region.keys_read(),
        }
    }
}
