//! Per-file undo/redo snapshots.

use serde::{Deserialize, Serialize};

/// Upper bound on retained snapshots per file. Older entries are dropped first.
pub const MAX_HISTORY_ENTRIES: usize = 500;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Linear content history with a cursor.
///
/// `entries` is never empty and `index` always points at a valid entry. Recording a new snapshot
/// while the cursor is behind the newest entry discards the redo future.
pub struct History {
    entries: Vec<String>,
    index: usize,
}

impl History {
    /// Creates a history holding a single snapshot.
    pub fn new(initial: impl Into<String>) -> Self {
        Self {
            entries: vec![initial.into()],
            index: 0,
        }
    }

    /// All retained snapshots, oldest first.
    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    /// Cursor position into [`History::entries`].
    pub fn index(&self) -> usize {
        self.index
    }

    /// Number of retained snapshots.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always `false` for histories built through this API.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Snapshot under the cursor.
    pub fn current(&self) -> &str {
        self.entries
            .get(self.index)
            .map(String::as_str)
            .unwrap_or_default()
    }

    /// Whether [`History::undo`] would move the cursor.
    pub fn can_undo(&self) -> bool {
        self.index > 0
    }

    /// Whether [`History::redo`] would move the cursor.
    pub fn can_redo(&self) -> bool {
        self.index + 1 < self.entries.len()
    }

    /// Records `content` as the newest snapshot.
    ///
    /// Returns `false` (and changes nothing) when `content` equals the snapshot under the cursor.
    pub fn record(&mut self, content: &str) -> bool {
        if self.current() == content {
            return false;
        }
        self.entries.truncate(self.index + 1);
        self.entries.push(content.to_string());
        if self.entries.len() > MAX_HISTORY_ENTRIES {
            let overflow = self.entries.len() - MAX_HISTORY_ENTRIES;
            self.entries.drain(..overflow);
        }
        self.index = self.entries.len() - 1;
        true
    }

    /// Moves the cursor to `index` and returns the snapshot there. Out-of-range indices leave the
    /// cursor where it was.
    pub fn seek(&mut self, index: usize) -> Option<&str> {
        if index >= self.entries.len() {
            return None;
        }
        self.index = index;
        Some(self.current())
    }

    /// Steps the cursor back and returns the snapshot now under it.
    pub fn undo(&mut self) -> Option<&str> {
        if !self.can_undo() {
            return None;
        }
        self.index -= 1;
        Some(self.current())
    }

    /// Steps the cursor forward and returns the snapshot now under it.
    pub fn redo(&mut self) -> Option<&str> {
        if !self.can_redo() {
            return None;
        }
        self.index += 1;
        Some(self.current())
    }

    /// Returns a history satisfying the invariants for a file whose content is `content`.
    ///
    /// Histories restored from storage may be empty, have an out-of-range cursor, or disagree
    /// with the stored content; any of those collapses to `[content]`.
    pub fn repaired(self, content: &str) -> Self {
        let valid = self.index < self.entries.len()
            && self.entries.len() <= MAX_HISTORY_ENTRIES
            && self.entries[self.index] == content;
        if valid {
            self
        } else {
            Self::new(content)
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn typed(steps: &[&str]) -> History {
        let mut history = History::new(steps[0]);
        for step in &steps[1..] {
            history.record(step);
        }
        history
    }

    #[test]
    fn undo_then_redo_restores_content() {
        let mut history = typed(&["a", "ab", "abc"]);

        assert_eq!(history.undo(), Some("ab"));
        assert_eq!(history.undo(), Some("a"));
        assert_eq!(history.undo(), None);
        assert_eq!(history.redo(), Some("ab"));
        assert_eq!(history.index(), 1);
    }

    #[test]
    fn redo_at_newest_entry_is_rejected() {
        let mut history = typed(&["a", "ab"]);
        assert!(!history.can_redo());
        assert_eq!(history.redo(), None);
        assert_eq!(history.current(), "ab");
    }

    #[test]
    fn recording_after_undo_discards_redo_future() {
        let mut history = typed(&["a", "ab", "abc"]);
        history.undo();
        history.undo();

        assert!(history.record("x"));
        assert_eq!(history.entries().to_vec(), vec!["a".to_string(), "x".to_string()]);
        assert_eq!(history.index(), 1);
        assert!(!history.can_redo());
    }

    #[test]
    fn recording_identical_content_is_ignored() {
        let mut history = typed(&["a", "ab"]);
        assert!(!history.record("ab"));
        assert_eq!(history.len(), 2);
    }

    #[test]
    fn cap_drops_oldest_and_keeps_cursor_valid() {
        let mut history = History::new("0");
        for n in 1..(MAX_HISTORY_ENTRIES + 25) {
            history.record(&n.to_string());
        }

        assert_eq!(history.len(), MAX_HISTORY_ENTRIES);
        assert_eq!(history.index(), MAX_HISTORY_ENTRIES - 1);
        assert_eq!(history.current(), (MAX_HISTORY_ENTRIES + 24).to_string());
        assert_eq!(history.entries()[0], "25");

        while history.undo().is_some() {}
        assert_eq!(history.index(), 0);
        assert_eq!(history.current(), "25");
    }

    #[test]
    fn invariant_holds_across_mixed_operations() {
        let mut history = History::new("");
        let script = ["a", "u", "b", "c", "u", "u", "r", "d", "r", "u", "e", "u", "u", "u"];
        for step in script {
            match step {
                "u" => {
                    history.undo();
                }
                "r" => {
                    history.redo();
                }
                text => {
                    let next = format!("{}{text}", history.current());
                    history.record(&next);
                }
            }
            assert!(history.index() < history.len());
        }
    }

    #[test]
    fn repaired_resets_inconsistent_histories() {
        let consistent = typed(&["a", "b"]);
        assert_eq!(consistent.clone().repaired("b"), consistent);

        assert_eq!(consistent.repaired("zzz"), History::new("zzz"));

        let broken: History =
            serde_json::from_str(r#"{"entries":[],"index":4}"#).expect("deserialize");
        assert_eq!(broken.repaired("c"), History::new("c"));
    }
}
