//! Recency order for resident tiles
//!
//! Doubly linked list threaded through a slab of nodes, indexed by a hash
//! map. Touching, removing and finding the oldest entry are all O(1).

use std::collections::HashMap;

use crate::tile::TileCoords;

#[derive(Debug, Clone, Copy)]
struct Node {
    coords: TileCoords,
    /// Toward most recent
    prev: Option<usize>,
    /// Toward oldest
    next: Option<usize>,
}

#[derive(Debug, Default)]
pub struct LruOrder {
    index: HashMap<TileCoords, usize>,
    nodes: Vec<Node>,
    free: Vec<usize>,
    newest: Option<usize>,
    oldest: Option<usize>,
}

impl LruOrder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Mark as most recently used, inserting if needed
    pub fn touch(&mut self, coords: TileCoords) {
        let slot = match self.index.get(&coords) {
            Some(&slot) => {
                if self.newest == Some(slot) {
                    return;
                }
                self.unlink(slot);
                slot
            }
            None => {
                let node = Node { coords, prev: None, next: None };
                let slot = match self.free.pop() {
                    Some(slot) => {
                        self.nodes[slot] = node;
                        slot
                    }
                    None => {
                        self.nodes.push(node);
                        self.nodes.len() - 1
                    }
                };
                self.index.insert(coords, slot);
                slot
            }
        };
        self.push_front(slot);
    }

    pub fn remove(&mut self, coords: TileCoords) -> bool {
        match self.index.remove(&coords) {
            Some(slot) => {
                self.unlink(slot);
                self.free.push(slot);
                true
            }
            None => false,
        }
    }

    /// Least recently used entry
    pub fn oldest(&self) -> Option<TileCoords> {
        self.oldest.map(|slot| self.nodes[slot].coords)
    }

    /// Entries from most to least recent
    pub fn iter(&self) -> impl Iterator<Item = TileCoords> + '_ {
        std::iter::successors(self.newest, |&slot| self.nodes[slot].next)
            .map(|slot| self.nodes[slot].coords)
    }

    fn unlink(&mut self, slot: usize) {
        let Node { prev, next, .. } = self.nodes[slot];
        match prev {
            Some(p) => self.nodes[p].next = next,
            None => self.newest = next,
        }
        match next {
            Some(n) => self.nodes[n].prev = prev,
            None => self.oldest = prev,
        }
        self.nodes[slot].prev = None;
        self.nodes[slot].next = None;
    }

    fn push_front(&mut self, slot: usize) {
        self.nodes[slot].prev = None;
        self.nodes[slot].next = self.newest;
        if let Some(old_front) = self.newest {
            self.nodes[old_front].prev = Some(slot);
        }
        self.newest = Some(slot);
        if self.oldest.is_none() {
            self.oldest = Some(slot);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(x: i32) -> TileCoords {
        TileCoords::new(x, 0)
    }

    #[test]
    fn test_touch_orders_by_recency() {
        let mut lru = LruOrder::new();
        lru.touch(c(1));
        lru.touch(c(2));
        lru.touch(c(3));
        assert_eq!(lru.oldest(), Some(c(1)));

        lru.touch(c(1));
        assert_eq!(lru.oldest(), Some(c(2)));
        assert_eq!(lru.iter().collect::<Vec<_>>(), vec![c(1), c(3), c(2)]);
        assert_eq!(lru.len(), 3);
    }

    #[test]
    fn test_remove_and_reuse_slots() {
        let mut lru = LruOrder::new();
        for x in 0..4 {
            lru.touch(c(x));
        }
        assert!(lru.remove(c(0)));
        assert!(lru.remove(c(2)));
        assert!(!lru.remove(c(2)));
        assert_eq!(lru.oldest(), Some(c(1)));

        lru.touch(c(10));
        lru.touch(c(11));
        assert_eq!(lru.nodes.len(), 4);
        assert_eq!(lru.iter().collect::<Vec<_>>(), vec![c(11), c(10), c(3), c(1)]);
    }

    #[test]
    fn test_remove_last_entry() {
        let mut lru = LruOrder::new();
        lru.touch(c(5));
        lru.remove(c(5));
        assert!(lru.is_empty());
        assert_eq!(lru.oldest(), None);
        assert_eq!(lru.iter().count(), 0);

        lru.touch(c(6));
        assert_eq!(lru.oldest(), Some(c(6)));
    }
}
