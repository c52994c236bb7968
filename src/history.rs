use log::debug;

use crate::scene::SceneSnapshot;

pub const DEFAULT_HISTORY_CAPACITY: usize = 50;

/// Linear undo/redo history of whole-scene snapshots.
///
/// Snapshots live in a fixed ring of slots: pushing past capacity evicts
/// the oldest entry in O(1) and memory stays bounded for the whole session.
/// The entry under the cursor is the state currently shown.
#[derive(Debug)]
pub struct EditHistory {
    slots: Vec<Option<SceneSnapshot>>,
    /// Physical index of the oldest entry
    head: usize,
    /// Number of live entries, including redoable ones
    len: usize,
    /// Logical index of the current entry
    cursor: usize,
}

impl Default for EditHistory {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_HISTORY_CAPACITY)
    }
}

impl EditHistory {
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            slots: (0..capacity).map(|_| None).collect(),
            head: 0,
            len: 0,
            cursor: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn slot(&self, logical: usize) -> usize {
        (self.head + logical) % self.capacity()
    }

    /// Record a new state. Anything that could have been redone is discarded.
    pub fn push(&mut self, snapshot: SceneSnapshot) {
        if self.len > 0 {
            // Drop the abandoned future
            for logical in self.cursor + 1..self.len {
                let slot = self.slot(logical);
                self.slots[slot] = None;
            }
            self.len = self.cursor + 1;
        }

        if self.len == self.capacity() {
            let oldest = self.head;
            self.slots[oldest] = None;
            self.head = (self.head + 1) % self.capacity();
            self.len -= 1;
        }

        let slot = self.slot(self.len);
        self.slots[slot] = Some(snapshot);
        self.len += 1;
        self.cursor = self.len - 1;
        debug!("History push: {} of {} entries", self.cursor + 1, self.len);
    }

    pub fn can_undo(&self) -> bool {
        self.len > 0 && self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.len > 0 && self.cursor + 1 < self.len
    }

    /// Step back one entry. `None` when already at the oldest entry.
    pub fn undo(&mut self) -> Option<&SceneSnapshot> {
        if !self.can_undo() {
            return None;
        }
        self.cursor -= 1;
        self.current()
    }

    /// Step forward one entry. `None` when already at the newest entry.
    pub fn redo(&mut self) -> Option<&SceneSnapshot> {
        if !self.can_redo() {
            return None;
        }
        self.cursor += 1;
        self.current()
    }

    pub fn current(&self) -> Option<&SceneSnapshot> {
        if self.len == 0 {
            return None;
        }
        self.slots[self.slot(self.cursor)].as_ref()
    }

    /// Forget everything and start over from `snapshot`.
    pub fn reset(&mut self, snapshot: SceneSnapshot) {
        self.slots.iter_mut().for_each(|slot| *slot = None);
        self.head = 0;
        self.len = 0;
        self.cursor = 0;
        self.push(snapshot);
    }
}
