use crate::util::RingBuffer;
use serde::{Deserialize, Serialize};

pub const HISTORY_CAPACITY: usize = 40;

/// Both pane texts as they were right before a mutating action.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct HistorySnapshot {
    pub ja: String,
    pub en: String,
}

impl HistorySnapshot {
    pub fn new<J: Into<String>, E: Into<String>>(ja: J, en: E) -> Self {
        Self {
            ja: ja.into(),
            en: en.into(),
        }
    }
}

/// Undo log that keeps only the newest [`HISTORY_CAPACITY`] snapshots.
/// There is no redo: a popped snapshot is gone.
#[derive(Clone, Debug)]
pub struct HistoryStack {
    entries: RingBuffer<HistorySnapshot>,
}

impl Default for HistoryStack {
    fn default() -> Self {
        Self::new()
    }
}

impl HistoryStack {
    pub fn new() -> Self {
        Self::with_capacity(HISTORY_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: RingBuffer::new(capacity),
        }
    }

    pub fn push(&mut self, snapshot: HistorySnapshot) {
        if self.entries.push(snapshot).is_some() {
            tracing::trace!("history full, dropped oldest snapshot");
        }
    }

    pub fn pop(&mut self) -> Option<HistorySnapshot> {
        self.entries.pop_newest()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &HistorySnapshot> {
        self.entries.iter()
    }
}
