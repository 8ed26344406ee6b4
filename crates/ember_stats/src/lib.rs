//! Hot-spot detection statistics for the EmberStore control plane.
//!
//! The cluster partitions its keyspace into regions replicated as peers
//! across stores. Region heartbeats report read/write traffic; this crate
//! decides, per (store, region) pair and per flow kind, whether a peer is
//! carrying a disproportionate share of load, and keeps a ranked, queryable
//! view of hot peers for the rebalancing scheduler.
//!
//! Usage is a two-step cycle per heartbeat: [`HotCache::check_write`] /
//! [`HotCache::check_read`] return candidate updates without mutating
//! anything, and the caller commits each one with [`HotCache::update`].
//! Everything is CPU-bound and synchronous; the heartbeat pipeline provides
//! serialization.

use std::sync::atomic::{AtomicBool, Ordering};

pub mod flow_cache;
pub mod hot_cache;
pub mod hot_peer;
pub mod metrics;
pub mod peer_cache;
pub mod region;
pub mod rolling;
pub mod store_stats;

pub use flow_cache::FlowCache;
pub use hot_cache::HotCache;
pub use hot_peer::{FlowKind, HotPeerStat};
pub use peer_cache::PeerCache;
pub use region::{Peer, PeerId, RegionId, RegionInfo, StoreId};
pub use rolling::RollingStats;
pub use store_stats::{StoreFlowRate, StoresStats};

/// Nominal region heartbeat report interval, seconds.
pub const REGION_HEARTBEAT_INTERVAL_SECS: u64 = 60;
/// Nominal store heartbeat report interval, seconds.
pub const STORE_HEARTBEAT_INTERVAL_SECS: u64 = 10;

// Rates are normally recomputed from the real interval between heartbeats.
// The simulator and tests turn this off to get nominal-interval rates and
// no duplicate-report suppression.
static DENOISING: AtomicBool = AtomicBool::new(true);

/// Toggle denoising process-wide. Intended for deterministic simulation and
/// tests only.
pub fn set_denoising(enabled: bool) {
    DENOISING.store(enabled, Ordering::Relaxed);
}

/// Whether rates are computed from real heartbeat intervals.
pub fn denoising_enabled() -> bool {
    DENOISING.load(Ordering::Relaxed)
}
