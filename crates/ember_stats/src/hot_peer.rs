//! Per-peer hot statistics and the degree state machine.
//!
//! `hot_degree` tracks the streak length of over-threshold heartbeats and is
//! the ranking key consumers sort by. `anti_count` is a grace counter that
//! absorbs transient cooling: a long-running hot peer is not dropped on the
//! first under-threshold report.

use std::time::SystemTime;

use serde::{Deserialize, Serialize};

use crate::region::{RegionId, StoreId};
use crate::rolling::{RollingStats, ROLLING_WINDOW};

/// Grace ticks granted to a peer each time it reports over threshold.
pub const HOT_REGION_ANTI_COUNT: i64 = 1;

/// Which traffic direction a statistic tracks. Selects the counters, the
/// participating peers, and the threshold formula.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FlowKind {
    Write,
    Read,
}

impl FlowKind {
    /// Metric label value for this kind.
    pub fn as_label(self) -> &'static str {
        match self {
            FlowKind::Write => "write",
            FlowKind::Read => "read",
        }
    }
}

/// One (store, region, flow-kind) observation held by the hot cache, or
/// emitted as a candidate update.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HotPeerStat {
    pub store_id: StoreId,
    pub region_id: RegionId,
    pub kind: FlowKind,
    /// Smoothed bytes per second over the last report interval.
    pub bytes_rate: f64,
    /// Smoothed keys per second. Carried for consumers; the hot decision
    /// uses byte rates only.
    pub keys_rate: f64,
    /// Window of recent byte-rate samples, owned by this stat.
    pub rolling_bytes_rate: RollingStats,
    /// Streak length of consecutive over-threshold heartbeats.
    pub hot_degree: i64,
    /// Remaining cooling grace; `-1` only on a tombstone in flight.
    pub anti_count: i64,
    /// Region epoch version at the last evaluation.
    pub version: u64,
    /// Wall time of the last evaluation.
    pub last_update_time: SystemTime,
    pub(crate) is_leader: bool,
    pub(crate) is_new: bool,
    pub(crate) need_delete: bool,
}

impl HotPeerStat {
    /// Whether the peer was the region's leader as of its last evaluation.
    pub fn is_leader(&self) -> bool {
        self.is_leader
    }

    /// Whether the stat was freshly promoted by the check that emitted it.
    pub fn is_new(&self) -> bool {
        self.is_new
    }

    /// Whether applying this stat removes the peer from the cache.
    pub fn need_delete(&self) -> bool {
        self.need_delete
    }
}

/// Merge a freshly computed observation with the prior stat for the same
/// (store, region) pair.
///
/// Inputs:
/// - `next`: observation built from the current heartbeat, window empty,
///   `need_delete` preset to the expiry verdict.
/// - `old`: prior stat still held in the peer cache, if any.
/// - `bytes_per_sec`: the rate the hot comparison runs on.
/// - `hot_threshold`: store-relative threshold for this kind.
///
/// Output:
/// - `None` when the peer is cold with no history (nothing to track).
/// - Otherwise the successor stat, window inherited from `old` when present
///   and fed the current sample. Tombstones inherit degree and grace so
///   consumers see the peer's final ranking.
pub(crate) fn merge_observation(
    mut next: HotPeerStat,
    old: Option<&HotPeerStat>,
    bytes_per_sec: f64,
    hot_threshold: f64,
) -> Option<HotPeerStat> {
    if next.need_delete {
        if let Some(old) = old {
            next.rolling_bytes_rate = old.rolling_bytes_rate.clone();
            next.hot_degree = old.hot_degree;
            next.anti_count = old.anti_count;
        }
        next.rolling_bytes_rate.add(bytes_per_sec);
        return Some(next);
    }

    let is_hot = bytes_per_sec >= hot_threshold;
    match old {
        Some(old) => {
            next.rolling_bytes_rate = old.rolling_bytes_rate.clone();
            if is_hot {
                next.hot_degree = old.hot_degree + 1;
                next.anti_count = HOT_REGION_ANTI_COUNT;
            } else {
                next.hot_degree = old.hot_degree - 1;
                next.anti_count = old.anti_count - 1;
                if next.anti_count < 0 {
                    next.need_delete = true;
                }
            }
        }
        None => {
            if !is_hot {
                return None;
            }
            next.rolling_bytes_rate = RollingStats::new(ROLLING_WINDOW);
            next.anti_count = HOT_REGION_ANTI_COUNT;
            next.is_new = true;
        }
    }
    next.rolling_bytes_rate.add(bytes_per_sec);
    Some(next)
}
