//! Edit ledger: the per-project, replayable record of visual edits.

pub mod edit;
pub mod replay;
pub mod scheduler;
pub mod store;

use chrono::{DateTime, Utc};
use tracing::trace;

pub use edit::StyleEdit;
pub use replay::{replay, ReplayReport};
pub use scheduler::{SuppressGuard, WriteScheduler};
pub use store::{JsonFileStore, LedgerStore, MemoryStore, StoreError};

/// Ordered edits, at most one per `(selector, property)`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditLedger {
    project_id: String,
    entries: Vec<StyleEdit>,
}

impl EditLedger {
    pub fn new(project_id: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            entries: Vec::new(),
        }
    }

    /// Rebuild a ledger from stored entries, keeping the last entry for
    /// any duplicated pair.
    pub fn from_entries(project_id: impl Into<String>, entries: Vec<StyleEdit>) -> Self {
        let mut ledger = Self::new(project_id);
        for entry in entries {
            ledger.insert(entry);
        }
        ledger
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    pub fn entries(&self) -> &[StyleEdit] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, selector: &str, property: &str) -> Option<&StyleEdit> {
        self.entries.iter().find(|e| e.same_target(selector, property))
    }

    /// Record a write now. Last write wins per pair.
    pub fn record(&mut self, selector: &str, property: &str, value: &str) -> &StyleEdit {
        self.record_at(selector, property, value, Utc::now())
    }

    /// Record with an explicit time, so writes belonging to one logical edit
    /// can share a timestamp.
    pub fn record_at(&mut self, selector: &str, property: &str, value: &str, at: DateTime<Utc>) -> &StyleEdit {
        trace!(selector, property, value, "edit recorded");
        self.insert(StyleEdit::new(selector, property, value, at))
    }

    fn insert(&mut self, edit: StyleEdit) -> &StyleEdit {
        self.entries
            .retain(|e| !e.same_target(&edit.selector, &edit.property));
        self.entries.push(edit);
        let last = self.entries.len() - 1;
        &self.entries[last]
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn last_write_wins_per_pair() {
        let mut ledger = EditLedger::new("p1");
        ledger.record(".hero-title", "color", "#ff0000");
        ledger.record(".hero-title", "fontSize", "40px");
        ledger.record(".hero-title", "color", "#00ff00");
        assert_eq!(ledger.len(), 2);
        assert_eq!(ledger.get(".hero-title", "color").unwrap().value, "#00ff00");
        // the re-recorded pair moves to the end
        assert_eq!(ledger.entries()[1].property, "color");
    }

    #[test]
    fn from_entries_dedups() {
        let entries = vec![
            StyleEdit {
                selector: "#a".into(),
                property: "color".into(),
                value: "red".into(),
                timestamp: 1,
            },
            StyleEdit {
                selector: "#a".into(),
                property: "color".into(),
                value: "blue".into(),
                timestamp: 2,
            },
        ];
        let ledger = EditLedger::from_entries("p1", entries);
        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger.entries()[0].value, "blue");
        assert_eq!(ledger.project_id(), "p1");
    }
}
