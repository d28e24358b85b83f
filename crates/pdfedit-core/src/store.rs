//! Annotation store
//!
//! Authoritative, ordered collection of the text boxes added in a session,
//! plus the replacements recorded for pre-existing text runs.

use tracing::debug;

use crate::coords::DocPoint;
use crate::error::EditorError;
use crate::model::{
    Annotation, AnnotationId, AnnotationPatch, DocSize, ExistingTextEdit, RunRef,
};

#[derive(Debug, Clone)]
pub struct AnnotationStore {
    next_id: u64,
    /// Kept sorted by id, which is also creation order
    annotations: Vec<Annotation>,
    text_edits: Vec<ExistingTextEdit>,
    min_extent: f64,
}

impl Default for AnnotationStore {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl AnnotationStore {
    /// Create an empty store whose boxes never shrink below `min_extent` units
    pub fn new(min_extent: f64) -> Self {
        Self {
            next_id: 1,
            annotations: Vec::new(),
            text_edits: Vec::new(),
            min_extent,
        }
    }

    pub fn add(
        &mut self,
        position: DocPoint,
        size: DocSize,
        font_size: f64,
        page: u32,
        text: impl Into<String>,
    ) -> Annotation {
        let id = AnnotationId(self.next_id);
        self.next_id += 1;

        let annotation = Annotation {
            id,
            text: text.into(),
            x: position.x,
            y: position.y,
            width: self.floor(size.width),
            height: self.floor(size.height),
            font_size,
            page,
            is_new: true,
        };
        debug!(%id, page, x = position.x, y = position.y, "annotation added");

        self.annotations.push(annotation.clone());
        annotation
    }

    pub fn update(
        &mut self,
        id: AnnotationId,
        patch: AnnotationPatch,
    ) -> Result<Annotation, EditorError> {
        let min_extent = self.min_extent;
        let annotation = self
            .annotations
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or(EditorError::NotFound(id))?;

        if let Some(text) = patch.text {
            annotation.text = text;
        }
        if let Some(x) = patch.x {
            annotation.x = x;
        }
        if let Some(y) = patch.y {
            annotation.y = y;
        }
        if let Some(width) = patch.width {
            annotation.width = clamp_extent(width, min_extent);
        }
        if let Some(height) = patch.height {
            annotation.height = clamp_extent(height, min_extent);
        }
        if let Some(font_size) = patch.font_size {
            if font_size > 0.0 {
                annotation.font_size = font_size;
            }
        }

        Ok(annotation.clone())
    }

    pub fn remove(&mut self, id: AnnotationId) -> Result<Annotation, EditorError> {
        let pos = self.position(id).map_err(|_| EditorError::NotFound(id))?;
        debug!(%id, "annotation removed");
        Ok(self.annotations.remove(pos))
    }

    /// Put a snapshot back, replacing the live entry with the same id or
    /// re-inserting it at its creation-order position.
    pub fn restore(&mut self, snapshot: Annotation) {
        match self.position(snapshot.id) {
            Ok(pos) => self.annotations[pos] = snapshot,
            Err(pos) => {
                debug!(id = %snapshot.id, "annotation re-inserted");
                self.next_id = self.next_id.max(snapshot.id.0 + 1);
                self.annotations.insert(pos, snapshot);
            }
        }
    }

    pub fn get(&self, id: AnnotationId) -> Option<&Annotation> {
        self.position(id).ok().map(|pos| &self.annotations[pos])
    }

    pub fn contains(&self, id: AnnotationId) -> bool {
        self.position(id).is_ok()
    }

    /// Annotations on `page` in insertion order
    pub fn for_page(&self, page: u32) -> Vec<&Annotation> {
        self.annotations.iter().filter(|a| a.page == page).collect()
    }

    pub fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }

    pub fn iter(&self) -> impl Iterator<Item = &Annotation> {
        self.annotations.iter()
    }

    pub fn len(&self) -> usize {
        self.annotations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.annotations.is_empty()
    }

    /// Record an edit to an existing run; a later edit of the same run replaces it
    pub fn record_text_edit(&mut self, edit: ExistingTextEdit) {
        debug!(page = edit.run.page, index = edit.run.index, "existing text edited");
        match self.text_edits.iter_mut().find(|e| e.run == edit.run) {
            Some(existing) => *existing = edit,
            None => self.text_edits.push(edit),
        }
    }

    pub fn text_edit(&self, run: RunRef) -> Option<&ExistingTextEdit> {
        self.text_edits.iter().find(|e| e.run == run)
    }

    pub fn remove_text_edit(&mut self, run: RunRef) -> Option<ExistingTextEdit> {
        let pos = self.text_edits.iter().position(|e| e.run == run)?;
        Some(self.text_edits.remove(pos))
    }

    pub fn text_edits(&self) -> &[ExistingTextEdit] {
        &self.text_edits
    }

    pub fn text_edits_for_page(&self, page: u32) -> Vec<&ExistingTextEdit> {
        self.text_edits.iter().filter(|e| e.page() == page).collect()
    }

    pub fn has_changes(&self) -> bool {
        !self.annotations.is_empty() || !self.text_edits.is_empty()
    }

    /// Drop every annotation and text edit. Ids keep increasing afterwards.
    pub fn clear(&mut self) {
        self.annotations.clear();
        self.text_edits.clear();
    }

    fn position(&self, id: AnnotationId) -> Result<usize, usize> {
        self.annotations.binary_search_by_key(&id, |a| a.id)
    }

    fn floor(&self, extent: f64) -> f64 {
        clamp_extent(extent, self.min_extent)
    }
}

fn clamp_extent(value: f64, min_extent: f64) -> f64 {
    if value.is_finite() {
        value.max(min_extent)
    } else {
        min_extent
    }
}
