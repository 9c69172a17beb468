//! Tombstone-capable node storage.
//!
//! A [`NodeArena`] never shifts live entries: removing a node marks its
//! slot as a tombstone so every other index stays valid. The frontier
//! tracker records where the trailing run of tombstones begins; every slot
//! at or past the frontier is a tombstone and is reused, in order, by the
//! next allocations of that kind. Gaps before the frontier are permanent.

use crate::node::SceneNode;

#[derive(Debug, Clone, PartialEq)]
pub struct NodeArena<T> {
    slots: Vec<T>,
    frontier: usize,
}

impl<T> Default for NodeArena<T> {
    fn default() -> Self {
        NodeArena {
            slots: Vec::new(),
            frontier: 0,
        }
    }
}

impl<T: SceneNode> NodeArena<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds an arena from decoded slots.
    ///
    /// Returns `None` when the frontier is out of range or a slot at or past
    /// it is live.
    pub(crate) fn from_parts(slots: Vec<T>, frontier: usize) -> Option<Self> {
        if frontier > slots.len() || slots[frontier..].iter().any(|s| !s.is_null()) {
            return None;
        }
        Some(NodeArena { slots, frontier })
    }

    /// Stores `node` in the frontier slot, or appends it, and returns its index.
    pub fn alloc(&mut self, mut node: T) -> u32 {
        node.base_mut().null = false;
        let index = self.frontier;
        if index < self.slots.len() {
            self.slots[index] = node;
        } else {
            self.slots.push(node);
        }
        self.frontier = index + 1;
        tracing::debug!("allocated {}@{} (frontier {})", T::KIND, index, self.frontier);
        index as u32
    }

    /// Tombstones a live slot. Returns `false` if it was absent or dead.
    pub fn remove(&mut self, index: u32) -> bool {
        let index = index as usize;
        match self.slots.get(index) {
            Some(slot) if !slot.is_null() => {}
            _ => return false,
        }
        self.slots[index] = T::tombstone();
        while self.frontier > 0 && self.slots[self.frontier - 1].is_null() {
            self.frontier -= 1;
        }
        tracing::debug!("tombstoned {}@{} (frontier {})", T::KIND, index, self.frontier);
        true
    }

    /// Returns the live node at `index`, `None` for tombstones or out of range.
    pub fn get(&self, index: u32) -> Option<&T> {
        self.slots.get(index as usize).filter(|n| !n.is_null())
    }

    pub fn get_mut(&mut self, index: u32) -> Option<&mut T> {
        self.slots.get_mut(index as usize).filter(|n| !n.is_null())
    }

    /// Number of slots, tombstones included.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.live() == 0
    }

    /// Index the next allocation will use.
    pub fn frontier(&self) -> usize {
        self.frontier
    }

    /// Number of live nodes.
    pub fn live(&self) -> usize {
        self.slots.iter().filter(|n| !n.is_null()).count()
    }

    /// All slots in index order, tombstones included.
    pub fn slots(&self) -> &[T] {
        &self.slots
    }

    /// Live nodes with their indices.
    pub fn iter(&self) -> impl Iterator<Item = (u32, &T)> {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, n)| !n.is_null())
            .map(|(i, n)| (i as u32, n))
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = (u32, &mut T)> {
        self.slots
            .iter_mut()
            .enumerate()
            .filter(|(_, n)| !n.is_null())
            .map(|(i, n)| (i as u32, n))
    }
}
