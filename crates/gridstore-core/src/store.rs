//! Store metadata and location-label comparison.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Unique identifier for a store in the cluster.
pub type StoreId = u64;

/// Metadata for a single store (a physical node hosting replicas).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreInfo {
    pub id: StoreId,
    /// Label key → value, e.g. `zone=z1, rack=r2, host=h3`.
    pub labels: HashMap<String, String>,
}

impl StoreInfo {
    pub fn new(id: StoreId) -> Self {
        Self { id, labels: HashMap::new() }
    }

    /// Builder-style label attachment.
    #[must_use]
    pub fn with_label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels.insert(key.into(), value.into());
        self
    }

    /// Value of a label key, or `None` if the store does not carry it.
    pub fn label_value(&self, key: &str) -> Option<&str> {
        self.labels.get(key).map(String::as_str)
    }

    /// Compare the locations of two stores over an ordered label hierarchy
    /// (most significant key first).
    ///
    /// Returns the first index at which both stores carry a value and the
    /// values differ. A store missing a label is considered co-located with
    /// any other store at that level, so `None` means no divergence was
    /// found anywhere in the hierarchy.
    pub fn compare_location(&self, other: &StoreInfo, labels: &[String]) -> Option<usize> {
        for (i, key) in labels.iter().enumerate() {
            match (self.label_value(key), other.label_value(key)) {
                (Some(v1), Some(v2)) if !v1.is_empty() && !v2.is_empty() && v1 != v2 => {
                    return Some(i);
                }
                _ => {}
            }
        }
        None
    }
}

/// Read access to the cluster's store collection.
pub trait StoreSet {
    fn get_stores(&self) -> Vec<StoreInfo>;
    fn get_store(&self, id: StoreId) -> Option<StoreInfo>;
}

impl StoreSet for Vec<StoreInfo> {
    fn get_stores(&self) -> Vec<StoreInfo> {
        self.clone()
    }

    fn get_store(&self, id: StoreId) -> Option<StoreInfo> {
        self.iter().find(|s| s.id == id).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(keys: &[&str]) -> Vec<String> {
        keys.iter().map(|k| (*k).to_string()).collect()
    }

    #[test]
    fn diverges_at_most_significant_level() {
        let a = StoreInfo::new(1).with_label("zone", "z1").with_label("rack", "r1");
        let b = StoreInfo::new(2).with_label("zone", "z2").with_label("rack", "r1");

        assert_eq!(a.compare_location(&b, &labels(&["zone", "rack"])), Some(0));
    }

    #[test]
    fn diverges_at_lower_level_when_upper_matches() {
        let a = StoreInfo::new(1).with_label("zone", "z1").with_label("rack", "r1");
        let b = StoreInfo::new(2).with_label("zone", "z1").with_label("rack", "r2");

        assert_eq!(a.compare_location(&b, &labels(&["zone", "rack"])), Some(1));
    }

    #[test]
    fn missing_label_is_colocated() {
        let a = StoreInfo::new(1).with_label("rack", "r1");
        let b = StoreInfo::new(2).with_label("zone", "z2").with_label("rack", "r2");

        // `a` has no zone, so divergence is only found at the rack level.
        assert_eq!(a.compare_location(&b, &labels(&["zone", "rack"])), Some(1));
    }

    #[test]
    fn identical_locations_do_not_diverge() {
        let a = StoreInfo::new(1).with_label("zone", "z1");
        let b = StoreInfo::new(2).with_label("zone", "z1");

        assert_eq!(a.compare_location(&b, &labels(&["zone"])), None);
        assert_eq!(a.compare_location(&b, &[]), None);
    }

    #[test]
    fn vec_store_set_lookup() {
        let stores = vec![StoreInfo::new(1), StoreInfo::new(2)];

        assert_eq!(stores.get_store(2).map(|s| s.id), Some(2));
        assert!(stores.get_store(9).is_none());
        assert_eq!(stores.get_stores().len(), 2);
    }
}
