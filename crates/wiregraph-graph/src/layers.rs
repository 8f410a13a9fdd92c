//! Integer-keyed z-order buckets. Buckets are created lazily on first use
//! and kept in ascending key order; within a bucket, insertion order is
//! paint order and its reverse is pick order.

use std::collections::BTreeMap;
use wiregraph_core::ElementId;

#[derive(Debug, Default)]
pub struct LayerRegistry {
    buckets: BTreeMap<i32, Vec<ElementId>>,
}

impl LayerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, layer: i32, id: ElementId) {
        let bucket = self.buckets.entry(layer).or_default();
        if !bucket.contains(&id) {
            bucket.push(id);
        }
    }

    pub fn remove(&mut self, layer: i32, id: ElementId) {
        if let Some(bucket) = self.buckets.get_mut(&layer) {
            bucket.retain(|e| *e != id);
            if bucket.is_empty() {
                self.buckets.remove(&layer);
            }
        }
    }

    /// Moves `id` to the top of its bucket. No-op if absent.
    pub fn raise(&mut self, layer: i32, id: ElementId) {
        if let Some(bucket) = self.buckets.get_mut(&layer) {
            if let Some(idx) = bucket.iter().position(|e| *e == id) {
                let id = bucket.remove(idx);
                bucket.push(id);
            }
        }
    }

    pub fn bucket(&self, layer: i32) -> &[ElementId] {
        self.buckets.get(&layer).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn layer_keys(&self) -> impl Iterator<Item = i32> + '_ {
        self.buckets.keys().copied()
    }

    /// Paint order: ascending layer key, insertion order within a bucket.
    pub fn iter_bottom_up(&self) -> impl Iterator<Item = ElementId> + '_ {
        self.buckets.values().flat_map(|b| b.iter().copied())
    }

    /// Pick order: descending layer key, latest-inserted first.
    pub fn iter_top_down(&self) -> impl Iterator<Item = ElementId> + '_ {
        self.buckets
            .values()
            .rev()
            .flat_map(|b| b.iter().rev().copied())
    }

    pub fn len(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.values().all(Vec::is_empty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buckets_sort_by_key() {
        let mut layers = LayerRegistry::new();
        layers.insert(3, ElementId(30));
        layers.insert(-1, ElementId(10));
        layers.insert(0, ElementId(20));

        let order: Vec<_> = layers.iter_bottom_up().collect();
        assert_eq!(order, vec![ElementId(10), ElementId(20), ElementId(30)]);

        let pick: Vec<_> = layers.iter_top_down().collect();
        assert_eq!(pick, vec![ElementId(30), ElementId(20), ElementId(10)]);
    }

    #[test]
    fn raise_moves_to_bucket_top() {
        let mut layers = LayerRegistry::new();
        layers.insert(0, ElementId(1));
        layers.insert(0, ElementId(2));
        layers.insert(0, ElementId(3));

        layers.raise(0, ElementId(1));
        assert_eq!(
            layers.bucket(0),
            &[ElementId(2), ElementId(3), ElementId(1)]
        );
        // Topmost in pick order now.
        assert_eq!(layers.iter_top_down().next(), Some(ElementId(1)));
    }

    #[test]
    fn insert_is_idempotent_and_remove_prunes() {
        let mut layers = LayerRegistry::new();
        layers.insert(2, ElementId(9));
        layers.insert(2, ElementId(9));
        assert_eq!(layers.len(), 1);

        layers.remove(2, ElementId(9));
        assert!(layers.is_empty());
        assert_eq!(layers.layer_keys().count(), 0);
    }
}
