//! Behavior with denoising disabled: rates always use the nominal heartbeat
//! interval and fast reports are not suppressed.
//!
//! The denoising flag is process-wide, so this lives in its own integration
//! binary rather than alongside the denoising-on scenarios.

use std::time::{Duration, SystemTime};

use ember_stats::{HotCache, Peer, RegionInfo, StoresStats, REGION_HEARTBEAT_INTERVAL_SECS};

const MIB: u64 = 1024 * 1024;

fn ts(secs: u64) -> SystemTime {
    SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000 + secs)
}

#[test]
fn disabled_denoising_keeps_nominal_rates_and_skips_suppression() {
    ember_stats::set_denoising(false);

    let mut cache = HotCache::new();
    let stats = StoresStats::new();
    let peer = Peer { id: 1, store_id: 1 };
    let region =
        RegionInfo::new(1, 1, vec![peer], Some(peer)).with_write_flow(30 * MIB, 30_000);

    let nominal_rate = (30 * MIB) as f64 / REGION_HEARTBEAT_INTERVAL_SECS as f64;

    let items = cache.check_write_at(&region, &stats, ts(0));
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].bytes_rate, nominal_rate);
    for item in items {
        cache.update(item);
    }

    // Two seconds later: would be suppressed with denoising on. Here the
    // report lands and still carries the nominal-interval rate.
    let items = cache.check_write_at(&region, &stats, ts(2));
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].bytes_rate, nominal_rate);
    assert_eq!(items[0].hot_degree, 1);
}
