//! Per-customer favorites list.
//!
//! The list is an ordered, size-tracked structure embedded in the customer
//! row as JSON. Order is recency order, most recent first: re-adding an
//! item moves it to the front without changing the count. The `version`
//! counter is bumped on every mutation and compared-and-swapped by the
//! persistence layer, so concurrent read-modify-write cycles on the same
//! customer surface as conflicts instead of silently losing writes.
//!
//! Invariants, held after every mutation:
//! - `items` contains no duplicates
//! - `count_all == items.len()`

use serde::{Deserialize, Serialize};

use crate::types::ItemId;

/// The payload of a favorites list: running count plus the ordered items.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FavoritesData {
    /// Number of favorited items. Always equals `items.len()`.
    pub count_all: i64,
    /// Item ids, most recently touched first.
    pub items: Vec<ItemId>,
}

/// A customer's favorites, as stored in the `customers.favorites` column.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FavoritesList {
    /// Optimistic-locking counter, bumped on every mutation.
    pub version: i64,
    pub data: FavoritesData,
}

impl FavoritesList {
    /// An empty list at version 0 (customer has never favorited anything).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of favorited items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.items.len()
    }

    /// True when no items are favorited.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.items.is_empty()
    }

    /// Add an item, or refresh its recency if already present.
    ///
    /// A present item is moved to the front and the count stays unchanged
    /// ("touch" semantics). An absent item is inserted at the front and the
    /// count is incremented. Returns `true` when the item was newly added.
    pub fn add(&mut self, item: ItemId) -> bool {
        let newly_added = match self.data.items.iter().position(|&i| i == item) {
            Some(pos) => {
                self.data.items.remove(pos);
                self.data.items.insert(0, item);
                false
            }
            None => {
                self.data.items.insert(0, item);
                self.data.count_all += 1;
                true
            }
        };

        self.version += 1;
        debug_assert_eq!(self.data.count_all as usize, self.data.items.len());
        newly_added
    }

    /// Remove every item in `items` that is present; absent ids are skipped
    /// silently. Returns the number of items actually removed.
    pub fn remove_many(&mut self, items: &[ItemId]) -> usize {
        let before = self.data.items.len();
        self.data.items.retain(|i| !items.contains(i));
        self.data.count_all = self.data.items.len() as i64;
        self.version += 1;
        before - self.data.items.len()
    }

    /// Drop all items.
    pub fn clear(&mut self) {
        self.data.items.clear();
        self.data.count_all = 0;
        self.version += 1;
    }

    /// The ordered item ids, most recent first.
    #[must_use]
    pub fn items(&self) -> &[ItemId] {
        &self.data.items
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn item(id: i64) -> ItemId {
        ItemId::new(id)
    }

    fn invariants_hold(list: &FavoritesList) -> bool {
        let mut seen = std::collections::HashSet::new();
        list.data.items.iter().all(|i| seen.insert(*i))
            && list.data.count_all as usize == list.data.items.len()
    }

    #[test]
    fn test_add_inserts_at_front() {
        let mut list = FavoritesList::new();
        assert!(list.add(item(10)));
        assert!(list.add(item(20)));
        assert_eq!(list.items(), &[item(20), item(10)]);
        assert_eq!(list.data.count_all, 2);
        assert!(invariants_hold(&list));
    }

    #[test]
    fn test_add_existing_moves_to_front_without_count_change() {
        let mut list = FavoritesList::new();
        list.add(item(10));
        list.add(item(20));
        let count = list.data.count_all;

        assert!(!list.add(item(10)));
        assert_eq!(list.items(), &[item(10), item(20)]);
        assert_eq!(list.data.count_all, count);
        assert!(invariants_hold(&list));
    }

    #[test]
    fn test_add_is_idempotent_on_presence() {
        let mut list = FavoritesList::new();
        list.add(item(7));
        list.add(item(7));
        assert_eq!(list.items(), &[item(7)]);
        assert_eq!(list.data.count_all, 1);
    }

    #[test]
    fn test_remove_many_skips_absent_ids() {
        let mut list = FavoritesList::new();
        list.add(item(1));
        list.add(item(2));
        list.add(item(3));

        let removed = list.remove_many(&[item(2), item(99)]);
        assert_eq!(removed, 1);
        assert_eq!(list.items(), &[item(3), item(1)]);
        assert!(invariants_hold(&list));
    }

    #[test]
    fn test_remove_many_all() {
        let mut list = FavoritesList::new();
        list.add(item(1));
        list.add(item(2));
        assert_eq!(list.remove_many(&[item(1), item(2)]), 2);
        assert!(list.is_empty());
        assert_eq!(list.data.count_all, 0);
    }

    #[test]
    fn test_clear() {
        let mut list = FavoritesList::new();
        list.add(item(1));
        list.add(item(2));
        list.clear();
        assert!(list.is_empty());
        assert_eq!(list.data.count_all, 0);
        assert!(invariants_hold(&list));
    }

    #[test]
    fn test_version_bumps_on_every_mutation() {
        let mut list = FavoritesList::new();
        assert_eq!(list.version, 0);
        list.add(item(1));
        assert_eq!(list.version, 1);
        list.add(item(1)); // touch still counts as a write
        assert_eq!(list.version, 2);
        list.remove_many(&[item(1)]);
        assert_eq!(list.version, 3);
        list.clear();
        assert_eq!(list.version, 4);
    }

    #[test]
    fn test_readd_scenario() {
        // add 10, add 20, add 10 again -> {count_all: 2, items: [10, 20]}
        let mut list = FavoritesList::new();
        list.add(item(10));
        list.add(item(20));
        list.add(item(10));
        assert_eq!(list.data.count_all, 2);
        assert_eq!(list.items(), &[item(10), item(20)]);
    }

    #[test]
    fn test_json_shape() {
        let mut list = FavoritesList::new();
        list.add(item(10));
        list.add(item(20));
        let json = serde_json::to_value(&list).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "version": 2,
                "data": {"count_all": 2, "items": [20, 10]}
            })
        );
    }

    #[test]
    fn test_json_roundtrip() {
        let raw = r#"{"version":5,"data":{"count_all":1,"items":[42]}}"#;
        let list: FavoritesList = serde_json::from_str(raw).unwrap();
        assert_eq!(list.version, 5);
        assert_eq!(list.items(), &[item(42)]);
    }
}
