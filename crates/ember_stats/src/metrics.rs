//! Prometheus instruments for the hot cache.
//!
//! Metrics are fire-and-forget: registration happens once behind `Lazy` and
//! gauge/counter operations cannot fail, so nothing here feeds back into the
//! statistics logic.

use once_cell::sync::Lazy;
use prometheus::{register_gauge_vec, register_int_counter_vec, GaugeVec, IntCounterVec};

use crate::region::StoreId;

// Gauge `name` label values.
pub const TOTAL_LENGTH_LABEL: &str = "total_length";
pub const HOT_THRESHOLD_LABEL: &str = "hot_threshold";

// Counter `action` label values.
pub const ADD_ITEM_LABEL: &str = "add_item";
pub const UPDATE_ITEM_LABEL: &str = "update_item";
pub const REMOVE_ITEM_LABEL: &str = "remove_item";

/// Per-store status of the hot cache: tracked peer count and the current
/// adaptive threshold, labelled by store and flow kind.
pub static HOT_CACHE_STATUS_GAUGE: Lazy<GaugeVec> = Lazy::new(|| {
    register_gauge_vec!(
        "ember_hotcache_status",
        "Status of the hot spot cache per store and flow kind",
        &["name", "store", "kind"]
    )
    .unwrap()
});

/// Updates applied to the hot cache, labelled by action, store and flow kind.
pub static HOT_CACHE_OPS_COUNTER: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "ember_hotcache_ops_total",
        "Hot cache update operations per action, store and flow kind",
        &["action", "store", "kind"]
    )
    .unwrap()
});

/// Store label value, e.g. `store-4`.
pub fn store_tag(store_id: StoreId) -> String {
    format!("store-{store_id}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_tag_format() {
        assert_eq!(store_tag(42), "store-42");
    }

    #[test]
    fn instruments_register_once() {
        HOT_CACHE_STATUS_GAUGE
            .with_label_values(&[TOTAL_LENGTH_LABEL, "store-1", "write"])
            .set(3.0);
        HOT_CACHE_OPS_COUNTER
            .with_label_values(&[ADD_ITEM_LABEL, "store-1", "write"])
            .inc();
    }
}
