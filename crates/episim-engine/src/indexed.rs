//! # episim-engine::indexed
//!
//! A set supporting O(1) insert, O(1) remove-by-value, and O(1) uniform
//! random sampling. The Gillespie engine keeps each risk stratum in one of
//! these; std set types cannot sample a uniform member in constant time.

use fxhash::FxHashMap;
use rand::Rng;
use std::hash::Hash;

/// Dense array of items plus a map from item to its array position.
/// Removal swaps the victim with the last slot and pops.
#[derive(Debug, Clone)]
pub struct IndexedSet<T> {
    items: Vec<T>,
    positions: FxHashMap<T, usize>,
}

impl<T: Copy + Eq + Hash> IndexedSet<T> {
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            positions: FxHashMap::default(),
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn contains(&self, item: T) -> bool {
        self.positions.contains_key(&item)
    }

    /// Inserts `item`; re-adding an existing item is a no-op.
    pub fn insert(&mut self, item: T) {
        if self.positions.contains_key(&item) {
            return;
        }
        self.positions.insert(item, self.items.len());
        self.items.push(item);
    }

    /// Removes `item` by swapping it with the last slot. Returns whether the
    /// item was present.
    pub fn remove(&mut self, item: T) -> bool {
        match self.positions.remove(&item) {
            None => false,
            Some(pos) => {
                self.items.swap_remove(pos);
                if pos < self.items.len() {
                    self.positions.insert(self.items[pos], pos);
                }
                true
            }
        }
    }

    /// Uniform random member, or `None` if the set is empty.
    pub fn choose<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<T> {
        if self.items.is_empty() {
            None
        } else {
            Some(self.items[rng.gen_range(0..self.items.len())])
        }
    }
}

impl<T: Copy + Eq + Hash> Default for IndexedSet<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::seeded;

    #[test]
    fn insert_is_idempotent() {
        let mut set = IndexedSet::new();
        set.insert(5u32);
        set.insert(5);
        assert_eq!(set.len(), 1);
        assert!(set.contains(5));
    }

    #[test]
    fn swap_pop_keeps_positions_consistent() {
        let mut set = IndexedSet::new();
        for x in 0..100u32 {
            set.insert(x);
        }
        // Remove from the middle, the front, and the back.
        assert!(set.remove(50));
        assert!(set.remove(0));
        assert!(set.remove(99));
        assert!(!set.remove(50));
        assert_eq!(set.len(), 97);
        for x in 1..99u32 {
            if x != 50 {
                assert!(set.contains(x), "lost {x}");
                assert!(set.remove(x));
            }
        }
        assert!(set.is_empty());
    }

    #[test]
    fn choose_only_returns_members() {
        let mut set = IndexedSet::new();
        assert_eq!(set.choose(&mut seeded(Some(1))), None);
        for x in [2u32, 4, 8] {
            set.insert(x);
        }
        let mut rng = seeded(Some(1));
        for _ in 0..50 {
            let picked = set.choose(&mut rng).unwrap();
            assert!(set.contains(picked));
        }
    }
}
