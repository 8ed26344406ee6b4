//! Fleet-level per-store flow rates.
//!
//! Store heartbeats arrive on a different pipeline than region heartbeats,
//! so this map is internally locked and shared by handle. Readers are the
//! adaptive threshold calculation; a store with no record reads as zero,
//! which pushes its thresholds down to the configured floors.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};

use crate::region::StoreId;

/// Aggregate byte rates for one store, bytes per second.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreFlowRate {
    pub write_bytes_per_sec: f64,
    pub read_bytes_per_sec: f64,
}

/// Best-effort per-store flow aggregates fed by store heartbeats.
#[derive(Clone, Default, Debug)]
pub struct StoresStats {
    inner: Arc<RwLock<HashMap<StoreId, StoreFlowRate>>>,
}

impl StoresStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the latest aggregate byte rates for a store.
    pub fn set_store_bytes_rate(
        &self,
        store_id: StoreId,
        write_bytes_per_sec: f64,
        read_bytes_per_sec: f64,
    ) {
        let mut guard = match self.inner.write() {
            Ok(guard) => guard,
            Err(poison) => poison.into_inner(),
        };
        guard.insert(
            store_id,
            StoreFlowRate {
                write_bytes_per_sec,
                read_bytes_per_sec,
            },
        );
    }

    /// `(write, read)` byte rates for a store; zero when unknown.
    pub fn store_bytes_rate(&self, store_id: StoreId) -> (f64, f64) {
        let guard = match self.inner.read() {
            Ok(guard) => guard,
            Err(poison) => poison.into_inner(),
        };
        let rate = guard.get(&store_id).copied().unwrap_or_default();
        (rate.write_bytes_per_sec, rate.read_bytes_per_sec)
    }

    /// Drop a store's record, e.g. after decommission.
    pub fn remove_store(&self, store_id: StoreId) {
        let mut guard = match self.inner.write() {
            Ok(guard) => guard,
            Err(poison) => poison.into_inner(),
        };
        guard.remove(&store_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_store_reads_as_zero() {
        let stats = StoresStats::new();
        assert_eq!(stats.store_bytes_rate(42), (0.0, 0.0));
    }

    #[test]
    fn set_then_read_then_remove() {
        let stats = StoresStats::new();
        stats.set_store_bytes_rate(1, 1024.0, 2048.0);
        assert_eq!(stats.store_bytes_rate(1), (1024.0, 2048.0));

        stats.set_store_bytes_rate(1, 512.0, 0.0);
        assert_eq!(stats.store_bytes_rate(1), (512.0, 0.0));

        stats.remove_store(1);
        assert_eq!(stats.store_bytes_rate(1), (0.0, 0.0));
    }

    #[test]
    fn handles_are_shared() {
        let stats = StoresStats::new();
        let handle = stats.clone();
        handle.set_store_bytes_rate(9, 100.0, 200.0);
        assert_eq!(stats.store_bytes_rate(9), (100.0, 200.0));
    }
}
