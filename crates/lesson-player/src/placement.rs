//! Drag-and-drop placement store.
//!
//! Holds, per question, which items the learner has dropped into which
//! bucket. The store is owned by a single session; it is never shared
//! between learners and has no persistence.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Bucket label to the ordered item identifiers dropped into it.
pub type BucketMapping = BTreeMap<String, Vec<String>>;

/// Session-scoped store of drag-and-drop placements, keyed by question id.
///
/// Invariant: for a given question an item identifier appears in at most
/// one bucket. [`PlacementStore::set_placement`] enforces it on write, so
/// every read observes a consistent mapping.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacementStore {
    placements: HashMap<u64, BucketMapping>,
}

impl PlacementStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the entire bucket mapping for a question.
    ///
    /// Last writer wins; nothing is merged with the previous mapping. If the
    /// incoming mapping lists an item more than once, only its first
    /// occurrence (buckets visited in label order) is kept.
    ///
    /// # Examples
    ///
    /// ```
    /// use lesson_player::{BucketMapping, PlacementStore};
    ///
    /// let mut store = PlacementStore::new();
    /// let mut mapping = BucketMapping::new();
    /// mapping.insert("fruits".to_string(), vec!["apple".to_string()]);
    /// mapping.insert("veg".to_string(), vec!["apple".to_string(), "carrot".to_string()]);
    /// store.set_placement(1, mapping);
    ///
    /// let placement = store.placement(1);
    /// assert_eq!(placement["fruits"], vec!["apple"]);
    /// assert_eq!(placement["veg"], vec!["carrot"]);
    /// ```
    pub fn set_placement(&mut self, question_id: u64, mapping: BucketMapping) {
        let mut seen = BTreeSet::new();
        let normalized: BucketMapping = mapping
            .into_iter()
            .map(|(bucket, items)| {
                let kept = items
                    .into_iter()
                    .filter(|item| seen.insert(item.clone()))
                    .collect();
                (bucket, kept)
            })
            .collect();

        debug!(
            question_id,
            buckets = normalized.len(),
            items = seen.len(),
            "Placement replaced"
        );
        self.placements.insert(question_id, normalized);
    }

    /// Returns the current mapping for a question, or an empty mapping.
    #[must_use]
    pub fn placement(&self, question_id: u64) -> BucketMapping {
        self.placements
            .get(&question_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Returns a reference to the mapping if one has been set.
    #[must_use]
    pub fn get(&self, question_id: u64) -> Option<&BucketMapping> {
        self.placements.get(&question_id)
    }

    /// Moves an item into `bucket`, or out of every bucket when `None`.
    ///
    /// Implemented as a read-modify-write of the full mapping so the
    /// single-bucket invariant holds after the call.
    pub fn move_item(&mut self, question_id: u64, item: &str, bucket: Option<&str>) {
        let mut mapping = self.placement(question_id);
        for items in mapping.values_mut() {
            items.retain(|placed| placed != item);
        }
        if let Some(bucket) = bucket {
            mapping
                .entry(bucket.to_string())
                .or_default()
                .push(item.to_string());
        }
        self.set_placement(question_id, mapping);
    }

    /// Returns the bucket currently holding `item`, if any.
    #[must_use]
    pub fn bucket_of(&self, question_id: u64, item: &str) -> Option<&str> {
        self.placements.get(&question_id).and_then(|mapping| {
            mapping
                .iter()
                .find(|(_, items)| items.iter().any(|placed| placed == item))
                .map(|(bucket, _)| bucket.as_str())
        })
    }

    /// Returns every item placed for a question, across all buckets.
    #[must_use]
    pub fn placed_items(&self, question_id: u64) -> BTreeSet<&str> {
        self.placements
            .get(&question_id)
            .map(|mapping| mapping.values().flatten().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// Forgets the placement of one question.
    pub fn clear(&mut self, question_id: u64) {
        self.placements.remove(&question_id);
    }

    /// Forgets every placement.
    pub fn clear_all(&mut self) {
        self.placements.clear();
    }
}
