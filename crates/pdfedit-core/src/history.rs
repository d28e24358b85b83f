//! Undo/redo history over annotation edits
//!
//! Every committed mutation is stored as a pair of full snapshots (before and
//! after), so entries never depend on each other and applying one can always
//! fall back to re-inserting its snapshot.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::model::{Annotation, AnnotationId};
use crate::store::AnnotationStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum HistoryKind {
    Add,
    Delete,
    Move,
    Resize,
    EditText,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub kind: HistoryKind,
    pub id: AnnotationId,
    /// `None` only for `Add`
    pub before: Option<Annotation>,
    /// `None` only for `Delete`
    pub after: Option<Annotation>,
}

impl HistoryEntry {
    pub fn add(created: Annotation) -> Self {
        Self {
            kind: HistoryKind::Add,
            id: created.id,
            before: None,
            after: Some(created),
        }
    }

    pub fn delete(removed: Annotation) -> Self {
        Self {
            kind: HistoryKind::Delete,
            id: removed.id,
            before: Some(removed),
            after: None,
        }
    }

    /// Entry for an in-place change (`Move`, `Resize` or `EditText`)
    pub fn change(kind: HistoryKind, before: Annotation, after: Annotation) -> Self {
        Self {
            kind,
            id: before.id,
            before: Some(before),
            after: Some(after),
        }
    }
}

/// Which way an entry was applied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HistoryDirection {
    Undo,
    Redo,
}

/// Summary of an undo/redo step, for the view layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppliedEntry {
    pub direction: HistoryDirection,
    pub kind: HistoryKind,
    pub id: AnnotationId,
    /// Page the affected annotation lives on
    pub page: u32,
}

#[derive(Debug, Clone)]
pub struct HistoryManager {
    undo: Vec<HistoryEntry>,
    redo: Vec<HistoryEntry>,
    limit: usize,
}

impl Default for HistoryManager {
    fn default() -> Self {
        Self::new(200)
    }
}

impl HistoryManager {
    pub fn new(limit: usize) -> Self {
        Self {
            undo: Vec::new(),
            redo: Vec::new(),
            limit: limit.max(1),
        }
    }

    /// Push a fresh mutation; discards the redo branch
    pub fn record(&mut self, entry: HistoryEntry) {
        debug!(kind = ?entry.kind, id = %entry.id, "history recorded");
        self.undo.push(entry);
        self.redo.clear();

        if self.undo.len() > self.limit {
            let overflow = self.undo.len() - self.limit;
            self.undo.drain(..overflow);
        }
    }

    pub fn undo(&mut self, store: &mut AnnotationStore) -> Option<AppliedEntry> {
        let entry = self.undo.pop()?;
        apply_snapshot(store, entry.id, entry.before.as_ref());
        let applied = summarize(&entry, HistoryDirection::Undo);
        self.redo.push(entry);
        Some(applied)
    }

    pub fn redo(&mut self, store: &mut AnnotationStore) -> Option<AppliedEntry> {
        let entry = self.redo.pop()?;
        apply_snapshot(store, entry.id, entry.after.as_ref());
        let applied = summarize(&entry, HistoryDirection::Redo);
        self.undo.push(entry);
        Some(applied)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    pub fn undo_len(&self) -> usize {
        self.undo.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo.len()
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.undo
    }

    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }
}

/// Make the store hold `snapshot` for `id`, or nothing at all when `None`
fn apply_snapshot(store: &mut AnnotationStore, id: AnnotationId, snapshot: Option<&Annotation>) {
    match snapshot {
        Some(snapshot) => store.restore(snapshot.clone()),
        None => {
            if store.remove(id).is_err() {
                warn!(%id, "history referenced an annotation that is already gone");
            }
        }
    }
}

fn summarize(entry: &HistoryEntry, direction: HistoryDirection) -> AppliedEntry {
    let page = entry
        .after
        .as_ref()
        .or(entry.before.as_ref())
        .map(|a| a.page)
        .unwrap_or(1);
    AppliedEntry {
        direction,
        kind: entry.kind,
        id: entry.id,
        page,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coords::DocPoint;
    use crate::model::{AnnotationPatch, DocSize};
    use pretty_assertions::assert_eq;

    fn store_with_box() -> (AnnotationStore, HistoryManager, Annotation) {
        let mut store = AnnotationStore::default();
        let mut history = HistoryManager::default();
        let created = store.add(
            DocPoint::new(100.0, 200.0),
            DocSize::new(60.0, 20.0),
            14.0,
            1,
            "New Text",
        );
        history.record(HistoryEntry::add(created.clone()));
        (store, history, created)
    }

    #[test]
    fn test_empty_history_is_noop() {
        let mut store = AnnotationStore::default();
        let mut history = HistoryManager::default();
        assert_eq!(history.undo(&mut store), None);
        assert_eq!(history.redo(&mut store), None);
    }

    #[test]
    fn test_undo_add_removes_annotation() {
        let (mut store, mut history, created) = store_with_box();

        let applied = history.undo(&mut store).unwrap();
        assert_eq!(applied.kind, HistoryKind::Add);
        assert!(store.is_empty());

        history.redo(&mut store).unwrap();
        assert_eq!(store.get(created.id), Some(&created));
    }

    #[test]
    fn test_delete_then_undo_restores_identical_annotation() {
        let (mut store, mut history, created) = store_with_box();

        let removed = store.remove(created.id).unwrap();
        history.record(HistoryEntry::delete(removed));
        assert!(store.is_empty());

        history.undo(&mut store).unwrap();
        assert_eq!(store.annotations(), &[created]);
    }

    #[test]
    fn test_undo_move_restores_snapshot() {
        let (mut store, mut history, created) = store_with_box();

        let moved = store
            .update(created.id, AnnotationPatch::position(DocPoint::new(130.0, 210.0)))
            .unwrap();
        history.record(HistoryEntry::change(HistoryKind::Move, created.clone(), moved.clone()));

        history.undo(&mut store).unwrap();
        assert_eq!(store.get(created.id), Some(&created));

        history.redo(&mut store).unwrap();
        assert_eq!(store.get(created.id), Some(&moved));
    }

    #[test]
    fn test_record_clears_redo_branch() {
        let (mut store, mut history, created) = store_with_box();
        history.undo(&mut store);
        assert!(history.can_redo());

        let again = store.add(
            DocPoint::new(0.0, 0.0),
            DocSize::new(10.0, 10.0),
            12.0,
            1,
            "Other",
        );
        history.record(HistoryEntry::add(again));

        assert!(!history.can_redo());
        assert!(!store.contains(created.id));
    }

    #[test]
    fn test_undo_change_of_missing_id_reinserts() {
        let (mut store, mut history, created) = store_with_box();
        let edited = store
            .update(created.id, AnnotationPatch::text("Edited"))
            .unwrap();
        history.record(HistoryEntry::change(
            HistoryKind::EditText,
            created.clone(),
            edited,
        ));

        // Removed behind the history's back
        store.remove(created.id).unwrap();

        history.undo(&mut store).unwrap();
        assert_eq!(store.get(created.id), Some(&created));
    }

    #[test]
    fn test_undo_add_of_missing_id_does_not_panic() {
        let (mut store, mut history, created) = store_with_box();
        store.remove(created.id).unwrap();

        assert!(history.undo(&mut store).is_some());
        assert!(store.is_empty());
    }

    #[test]
    fn test_limit_drops_oldest_entries() {
        let mut store = AnnotationStore::default();
        let mut history = HistoryManager::new(2);
        for _ in 0..3 {
            let a = store.add(
                DocPoint::new(0.0, 0.0),
                DocSize::new(10.0, 10.0),
                12.0,
                1,
                "x",
            );
            history.record(HistoryEntry::add(a));
        }
        assert_eq!(history.undo_len(), 2);
    }
}
