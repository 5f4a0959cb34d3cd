use std::collections::HashSet;

use crate::{Record, RecordId};

/// Identities accepted during one harvest run. Never persisted.
#[derive(Debug, Clone, Default)]
pub struct SeenSet {
    ids: HashSet<RecordId>,
}

impl SeenSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` and remembers the record if its identity is new.
    pub fn admit(&mut self, record: &Record) -> bool {
        self.ids.insert(record.id())
    }

    pub fn contains(&self, id: &RecordId) -> bool {
        self.ids.contains(id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}
