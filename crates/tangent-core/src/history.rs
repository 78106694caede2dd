// ── Bounded linear edit history ──
//
// One log per running application. Entries are stored oldest-first in a
// `VecDeque` so eviction from the front is O(1). `undone` counts how many
// trailing entries sit after the cursor (the redo region).
//
//   record(A) record(B) record(C)   [A, B, C]  cursor → C
//   undo() undo()                   [A, B, C]  cursor → A   (B, C redoable)
//   record(D)                       [A, D]     cursor → D   (redo branch dropped)

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::model::{EntityId, TangentValue};

/// Default number of retained entries.
pub const DEFAULT_CAPACITY: usize = 100;

/// One recorded edit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryEntry {
    pub entity: EntityId,
    pub key: String,
    pub old_value: TangentValue,
    pub new_value: TangentValue,
    pub created_at: DateTime<Utc>,
}

/// Observable undo/redo availability.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct HistoryStatus {
    pub can_undo: bool,
    pub can_redo: bool,
}

/// Append-only edit log with an undo/redo cursor.
///
/// Invariants after every operation:
/// 1. `entries.len() <= capacity`
/// 2. `undone <= entries.len()`
/// 3. a `record` always leaves `undone == 0` (the cursor tracks the newest entry,
///    including right after an eviction)
#[derive(Debug, Clone)]
pub struct HistoryLog {
    entries: VecDeque<HistoryEntry>,
    undone: usize,
    capacity: usize,
}

impl Default for HistoryLog {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl HistoryLog {
    /// Create an empty log. A capacity of zero is raised to one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity.min(DEFAULT_CAPACITY)),
            undone: 0,
            capacity,
        }
    }

    // ── Core operations ──────────────────────────────────────────────

    /// Append an edit, dropping any redoable entries first and evicting the
    /// oldest entry once the log is over capacity.
    pub fn record(
        &mut self,
        entity: EntityId,
        key: impl Into<String>,
        old_value: TangentValue,
        new_value: TangentValue,
    ) {
        let keep = self.entries.len() - self.undone;
        self.entries.truncate(keep);
        self.undone = 0;

        self.entries.push_back(HistoryEntry {
            entity,
            key: key.into(),
            old_value,
            new_value,
            created_at: Utc::now(),
        });

        while self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
    }

    /// Step the cursor back, returning the entry it was on.
    pub fn undo(&mut self) -> Option<HistoryEntry> {
        if !self.can_undo() {
            return None;
        }
        let index = self.entries.len() - self.undone - 1;
        self.undone += 1;
        self.entries.get(index).cloned()
    }

    /// Step the cursor forward, returning the entry it lands on.
    pub fn redo(&mut self) -> Option<HistoryEntry> {
        if !self.can_redo() {
            return None;
        }
        let index = self.entries.len() - self.undone;
        self.undone -= 1;
        self.entries.get(index).cloned()
    }

    /// Drop every entry.
    pub fn reset(&mut self) {
        self.entries.clear();
        self.undone = 0;
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn can_undo(&self) -> bool {
        self.undone < self.entries.len()
    }

    pub fn can_redo(&self) -> bool {
        self.undone > 0
    }

    pub fn status(&self) -> HistoryStatus {
        HistoryStatus {
            can_undo: self.can_undo(),
            can_redo: self.can_redo(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Index of the entry the cursor is on, `None` when everything is undone.
    pub fn cursor(&self) -> Option<usize> {
        (self.entries.len() - self.undone).checked_sub(1)
    }

    /// All retained entries, oldest first.
    pub fn entries(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }
}
