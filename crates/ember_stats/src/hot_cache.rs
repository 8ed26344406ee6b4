//! Hot-spot cache façade.
//!
//! Holds one `FlowCache` per flow kind and dispatches checks, updates and
//! queries. The scheduler sees this type only. One instance serves the whole
//! control plane; the heartbeat pipeline serializes check/update cycles per
//! region, so no internal locking is needed.

use std::collections::HashMap;
use std::time::SystemTime;

use crate::flow_cache::FlowCache;
use crate::hot_peer::{FlowKind, HotPeerStat};
use crate::metrics::{
    store_tag, ADD_ITEM_LABEL, HOT_CACHE_OPS_COUNTER, REMOVE_ITEM_LABEL, UPDATE_ITEM_LABEL,
};
use crate::region::{RegionInfo, StoreId};
use crate::store_stats::StoresStats;

/// Queryable view of hot peers for both flow kinds.
pub struct HotCache {
    write_flow: FlowCache,
    read_flow: FlowCache,
}

impl HotCache {
    pub fn new() -> Self {
        Self {
            write_flow: FlowCache::new(FlowKind::Write),
            read_flow: FlowCache::new(FlowKind::Read),
        }
    }

    /// Evaluate a region heartbeat's write flow; returns candidate updates.
    pub fn check_write(&self, region: &RegionInfo, stats: &StoresStats) -> Vec<HotPeerStat> {
        self.check_write_at(region, stats, SystemTime::now())
    }

    /// `check_write` with an explicit evaluation time, for simulation and
    /// tests.
    pub fn check_write_at(
        &self,
        region: &RegionInfo,
        stats: &StoresStats,
        now: SystemTime,
    ) -> Vec<HotPeerStat> {
        self.write_flow.check_region_flow(region, stats, now)
    }

    /// Evaluate a region heartbeat's read flow; returns candidate updates.
    pub fn check_read(&self, region: &RegionInfo, stats: &StoresStats) -> Vec<HotPeerStat> {
        self.check_read_at(region, stats, SystemTime::now())
    }

    /// `check_read` with an explicit evaluation time, for simulation and
    /// tests.
    pub fn check_read_at(
        &self,
        region: &RegionInfo,
        stats: &StoresStats,
        now: SystemTime,
    ) -> Vec<HotPeerStat> {
        self.read_flow.check_region_flow(region, stats, now)
    }

    /// Apply one candidate update to the cache of its kind.
    pub fn update(&mut self, item: HotPeerStat) {
        let action = if item.need_delete() {
            REMOVE_ITEM_LABEL
        } else if item.is_new() {
            ADD_ITEM_LABEL
        } else {
            UPDATE_ITEM_LABEL
        };
        HOT_CACHE_OPS_COUNTER
            .with_label_values(&[action, &store_tag(item.store_id), item.kind.as_label()])
            .inc();

        match item.kind {
            FlowKind::Write => self.write_flow.update(item),
            FlowKind::Read => self.read_flow.update(item),
        }
    }

    /// Snapshot of every tracked stat for one kind, keyed by store.
    pub fn region_stats(&self, kind: FlowKind) -> HashMap<StoreId, Vec<HotPeerStat>> {
        self.flow(kind).region_stats()
    }

    /// Uniform random pick among a store's stats at `min_degree` or hotter.
    pub fn rand_hot_region_from_store(
        &self,
        store_id: StoreId,
        kind: FlowKind,
        min_degree: i64,
    ) -> Option<HotPeerStat> {
        self.flow(kind).rand_hot_region_from_store(store_id, min_degree)
    }

    /// Combined hotness check: hot on write flow for any peer, or hot on
    /// read flow for the leader.
    pub fn is_region_hot(&self, region: &RegionInfo, min_degree: i64) -> bool {
        self.write_flow.is_region_hot(region, min_degree)
            || self.read_flow.is_region_hot(region, min_degree)
    }

    /// Export status gauges for both kinds.
    pub fn collect_metrics(&self, stats: &StoresStats) {
        self.write_flow.collect_metrics(stats);
        self.read_flow.collect_metrics(stats);
    }

    fn flow(&self, kind: FlowKind) -> &FlowCache {
        match kind {
            FlowKind::Write => &self.write_flow,
            FlowKind::Read => &self.read_flow,
        }
    }
}

impl Default for HotCache {
    fn default() -> Self {
        Self::new()
    }
}
