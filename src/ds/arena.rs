//! Slot arena handing out stable `NodeId` handles.
//!
//! Freed slots are recycled LIFO through a free list, so a handle is only
//! meaningful while its node is alive. Callers that keep handles around
//! (the recency list, the bounded cache index) drop them on removal.

/// Stable handle to a node stored in an [`Arena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug)]
pub struct Arena<T> {
    slots: Vec<Option<T>>,
    free: Vec<usize>,
    live: usize,
}

impl<T> Arena<T> {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            live: 0,
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            free: Vec::new(),
            live: 0,
        }
    }

    pub fn alloc(&mut self, value: T) -> NodeId {
        let idx = match self.free.pop() {
            Some(idx) => {
                self.slots[idx] = Some(value);
                idx
            },
            None => {
                self.slots.push(Some(value));
                self.slots.len() - 1
            },
        };
        self.live += 1;
        NodeId(idx)
    }

    pub fn free(&mut self, id: NodeId) -> Option<T> {
        let value = self.slots.get_mut(id.0)?.take()?;
        self.free.push(id.0);
        self.live -= 1;
        Some(value)
    }

    pub fn get(&self, id: NodeId) -> Option<&T> {
        self.slots.get(id.0)?.as_ref()
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut T> {
        self.slots.get_mut(id.0)?.as_mut()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        matches!(self.slots.get(id.0), Some(Some(_)))
    }

    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    pub fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
        self.live = 0;
    }
}

impl<T> Default for Arena<T> {
    fn default() -> Self {
        Self::new()
    }
}
