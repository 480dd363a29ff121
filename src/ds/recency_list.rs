//! Intrusive recency list backed by an [`Arena`].
//!
//! Nodes are linked by `NodeId`, so moving an entry to the most-recent end
//! is an O(1) unlink + relink with no allocation. The bounded cache keeps
//! one node per key and stores the node id next to the value.
//!
//! ## Architecture
//!
//! ```text
//!   arena (Arena<Node<T>>)
//!   ┌────────┬──────────────────────────────────────────────┐
//!   │ NodeId │ Node { value, older, newer }                 │
//!   ├────────┼──────────────────────────────────────────────┤
//!   │ id_0   │ { value: A, older: None,    newer: id_1 }    │
//!   │ id_1   │ { value: B, older: id_0,    newer: id_2 }    │
//!   │ id_2   │ { value: C, older: id_1,    newer: None }    │
//!   └────────┴──────────────────────────────────────────────┘
//!
//!   lru ─► [id_0] ◄──► [id_1] ◄──► [id_2] ◄── mru
//! ```
//!
//! ## Operations
//! - `push_mru(value)`: O(1), new node becomes most recent
//! - `touch(id)`: O(1), unlink + relink at the most-recent end
//! - `pop_lru()`: O(1), removes the least-recent node
//! - `remove(id)`: O(1)
//! - `iter()`: O(n), least recent first

use crate::ds::arena::{Arena, NodeId};
use crate::error::InvariantError;

#[derive(Debug)]
struct Node<T> {
    value: T,
    older: Option<NodeId>,
    newer: Option<NodeId>,
}

/// Doubly linked list ordered from least to most recently used.
#[derive(Debug)]
pub struct RecencyList<T> {
    arena: Arena<Node<T>>,
    lru: Option<NodeId>,
    mru: Option<NodeId>,
}

impl<T> RecencyList<T> {
    pub fn new() -> Self {
        Self {
            arena: Arena::new(),
            lru: None,
            mru: None,
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            arena: Arena::with_capacity(capacity),
            lru: None,
            mru: None,
        }
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.arena.contains(id)
    }

    pub fn get(&self, id: NodeId) -> Option<&T> {
        self.arena.get(id).map(|node| &node.value)
    }

    /// Least recently used value (the eviction end).
    pub fn lru(&self) -> Option<&T> {
        self.lru.and_then(|id| self.get(id))
    }

    /// Most recently used value.
    pub fn mru(&self) -> Option<&T> {
        self.mru.and_then(|id| self.get(id))
    }

    /// Appends `value` at the most-recent end.
    pub fn push_mru(&mut self, value: T) -> NodeId {
        let id = self.arena.alloc(Node {
            value,
            older: self.mru,
            newer: None,
        });
        match self.mru {
            Some(prev) => {
                if let Some(node) = self.arena.get_mut(prev) {
                    node.newer = Some(id);
                }
            },
            None => self.lru = Some(id),
        }
        self.mru = Some(id);
        id
    }

    /// Removes and returns the least recently used value.
    pub fn pop_lru(&mut self) -> Option<T> {
        let id = self.lru?;
        self.remove(id)
    }

    pub fn remove(&mut self, id: NodeId) -> Option<T> {
        self.unlink(id)?;
        self.arena.free(id).map(|node| node.value)
    }

    /// Marks `id` as most recently used; returns `false` if it is not in the list.
    pub fn touch(&mut self, id: NodeId) -> bool {
        if !self.arena.contains(id) {
            return false;
        }
        if self.mru == Some(id) {
            return true;
        }
        self.unlink(id);
        self.link_mru(id);
        true
    }

    pub fn clear(&mut self) {
        self.arena.clear();
        self.lru = None;
        self.mru = None;
    }

    /// Iterates from least to most recently used.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            list: self,
            cursor: self.lru,
        }
    }

    fn unlink(&mut self, id: NodeId) -> Option<()> {
        let (older, newer) = {
            let node = self.arena.get(id)?;
            (node.older, node.newer)
        };

        match older {
            Some(older_id) => {
                if let Some(node) = self.arena.get_mut(older_id) {
                    node.newer = newer;
                }
            },
            None => self.lru = newer,
        }

        match newer {
            Some(newer_id) => {
                if let Some(node) = self.arena.get_mut(newer_id) {
                    node.older = older;
                }
            },
            None => self.mru = older,
        }

        let node = self.arena.get_mut(id)?;
        node.older = None;
        node.newer = None;
        Some(())
    }

    fn link_mru(&mut self, id: NodeId) {
        let prev = self.mru;
        if let Some(node) = self.arena.get_mut(id) {
            node.older = prev;
            node.newer = None;
        } else {
            return;
        }
        match prev {
            Some(prev) => {
                if let Some(node) = self.arena.get_mut(prev) {
                    node.newer = Some(id);
                }
            },
            None => self.lru = Some(id),
        }
        self.mru = Some(id);
    }

    /// Walks the links and verifies they agree with the arena.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        if self.lru.is_none() || self.mru.is_none() {
            if self.lru.is_some() || self.mru.is_some() || !self.is_empty() {
                return Err(InvariantError::new(
                    "recency list ends disagree with node count",
                ));
            }
            return Ok(());
        }

        let mut count = 0usize;
        let mut cursor = self.lru;
        let mut older = None;
        while let Some(id) = cursor {
            let node = self
                .arena
                .get(id)
                .ok_or_else(|| InvariantError::new("recency list links a freed node"))?;
            if node.older != older {
                return Err(InvariantError::new("recency list back-link mismatch"));
            }
            if node.newer.is_none() && self.mru != Some(id) {
                return Err(InvariantError::new("recency list mru does not end the chain"));
            }
            count += 1;
            if count > self.len() {
                return Err(InvariantError::new("recency list contains a cycle"));
            }
            older = Some(id);
            cursor = node.newer;
        }

        if count != self.len() {
            return Err(InvariantError::new(format!(
                "recency list reaches {} nodes but holds {}",
                count,
                self.len()
            )));
        }
        Ok(())
    }
}

impl<T> Default for RecencyList<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator from least to most recently used.
pub struct Iter<'a, T> {
    list: &'a RecencyList<T>,
    cursor: Option<NodeId>,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.cursor?;
        let node = self.list.arena.get(id)?;
        self.cursor = node.newer;
        Some(&node.value)
    }
}
