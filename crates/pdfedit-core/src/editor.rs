//! One editing session: document, annotations, history and interaction
//!
//! The editor is exclusively owned and every mutating method takes `&mut self`,
//! so loads, edits and exports never interleave. Before any mutation that
//! doesn't come from the pointer (delete, undo, redo, navigation, zoom, load)
//! the interaction machine is settled first: a live drag or resize is aborted
//! and an open text edit is committed.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::EditorConfig;
use crate::coords::{DisplayPoint, Viewport};
use crate::document::{DocumentInfo, DocumentSession, PageRasterizer, RenderedPage};
use crate::error::EditorError;
use crate::flatten::{flatten, ExportedDocument};
use crate::history::{AppliedEntry, HistoryEntry, HistoryKind, HistoryManager};
use crate::interaction::{
    delete_annotation, InputEvent, InteractionContext, InteractionMachine, InteractionState,
    Outcome, PointerTarget,
};
use crate::model::{Annotation, AnnotationId, AnnotationPatch, ExistingTextEdit, RunRef, TextRun};
use crate::overlay::{self, OverlayBox, RunOverlay};
use crate::store::AnnotationStore;

/// What the UI needs to redraw its chrome
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorStatus {
    pub document: Option<DocumentInfo>,
    pub state: InteractionState,
    pub selected: Option<AnnotationId>,
    pub add_text_armed: bool,
    pub add_font_size: f64,
    pub edit_existing: bool,
    pub can_undo: bool,
    pub can_redo: bool,
    pub annotation_count: usize,
    pub text_edit_count: usize,
    /// Anything to export beyond the original bytes
    pub has_changes: bool,
}

#[derive(Debug)]
pub struct Editor {
    config: EditorConfig,
    document: Option<DocumentSession>,
    store: AnnotationStore,
    history: HistoryManager,
    machine: InteractionMachine,
    /// Runs of the current page, valid for `runs_generation`
    runs: Vec<TextRun>,
    runs_generation: Option<u64>,
}

impl Default for Editor {
    fn default() -> Self {
        Self::with_valid_config(EditorConfig::default())
    }
}

impl Editor {
    pub fn new(config: EditorConfig) -> Result<Self, EditorError> {
        config.validate()?;
        Ok(Self::with_valid_config(config))
    }

    fn with_valid_config(config: EditorConfig) -> Self {
        Self {
            store: AnnotationStore::new(config.min_extent),
            history: HistoryManager::new(config.history_limit),
            machine: InteractionMachine::new(&config),
            document: None,
            runs: Vec::new(),
            runs_generation: None,
            config,
        }
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// Load a new document, dropping every edit made to the previous one.
    /// On failure the current session is left as it was.
    pub fn load(&mut self, name: &str, bytes: &[u8]) -> Result<DocumentInfo, EditorError> {
        let session = DocumentSession::load(name, bytes, &self.config)?;
        let info = session.info();

        self.document = Some(session);
        self.store.clear();
        self.history.clear();
        self.machine.reset();
        self.runs.clear();
        self.runs_generation = None;

        info!(name, page_count = info.page_count, "editing session started");
        Ok(info)
    }

    pub fn document(&self) -> Option<&DocumentSession> {
        self.document.as_ref()
    }

    pub fn has_document(&self) -> bool {
        self.document.is_some()
    }

    pub fn store(&self) -> &AnnotationStore {
        &self.store
    }

    pub fn history(&self) -> &HistoryManager {
        &self.history
    }

    pub fn annotations(&self) -> &[Annotation] {
        self.store.annotations()
    }

    pub fn annotation(&self, id: AnnotationId) -> Option<&Annotation> {
        self.store.get(id)
    }

    pub fn state(&self) -> InteractionState {
        self.machine.state()
    }

    pub fn selected(&self) -> Option<AnnotationId> {
        self.machine.selected()
    }

    pub fn status(&self) -> EditorStatus {
        EditorStatus {
            document: self.document.as_ref().map(DocumentSession::info),
            state: self.machine.state(),
            selected: self.machine.selected(),
            add_text_armed: self.machine.add_text_armed(),
            add_font_size: self.machine.add_font_size(),
            edit_existing: self.machine.edit_existing(),
            can_undo: self.history.can_undo(),
            can_redo: self.history.can_redo(),
            annotation_count: self.store.len(),
            text_edit_count: self.store.text_edits().len(),
            has_changes: self.store.has_changes(),
        }
    }

    pub fn current_page(&self) -> Result<u32, EditorError> {
        Ok(self.session()?.current_page())
    }

    pub fn viewport(&self) -> Result<Viewport, EditorError> {
        Ok(self.session()?.viewport())
    }

    // ============ Navigation & zoom ============

    pub fn set_page(&mut self, page: u32) -> Result<u32, EditorError> {
        self.settle()?;
        self.session_mut()?.set_page(page)
    }

    pub fn next_page(&mut self) -> Result<u32, EditorError> {
        self.settle()?;
        Ok(self.session_mut()?.next_page())
    }

    pub fn prev_page(&mut self) -> Result<u32, EditorError> {
        self.settle()?;
        Ok(self.session_mut()?.prev_page())
    }

    pub fn set_scale(&mut self, scale: f64) -> Result<f64, EditorError> {
        self.settle()?;
        Ok(self.session_mut()?.set_scale(scale))
    }

    pub fn zoom_in(&mut self) -> Result<f64, EditorError> {
        self.settle()?;
        Ok(self.session_mut()?.zoom_in())
    }

    pub fn zoom_out(&mut self) -> Result<f64, EditorError> {
        self.settle()?;
        Ok(self.session_mut()?.zoom_out())
    }

    // ============ Modes ============

    pub fn toggle_add_text(&mut self) -> bool {
        let armed = !self.machine.add_text_armed();
        self.machine.set_add_text_armed(armed);
        armed
    }

    pub fn set_add_text_armed(&mut self, armed: bool) {
        self.machine.set_add_text_armed(armed);
    }

    /// Font size for boxes added from now on, clamped to the configured range
    pub fn set_add_font_size(&mut self, size: f64) -> f64 {
        self.machine.set_add_font_size(size, &self.config)
    }

    pub fn set_edit_existing(&mut self, enabled: bool) {
        self.machine.set_edit_existing(enabled);
    }

    // ============ Rendering & overlay ============

    /// Render the current page and refresh the cached text runs from it
    pub fn render(&mut self, rasterizer: &dyn PageRasterizer) -> Result<RenderedPage, EditorError> {
        let rendered = self.session_mut()?.render(rasterizer)?;
        self.runs = rendered.text_runs.clone();
        self.runs_generation = Some(rendered.generation);
        Ok(rendered)
    }

    pub fn is_current(&self, rendered: &RenderedPage) -> bool {
        self.document
            .as_ref()
            .is_some_and(|session| session.is_current(rendered))
    }

    /// Annotation boxes of the current page
    pub fn overlay(&self) -> Result<Vec<OverlayBox>, EditorError> {
        let session = self.session()?;
        let page = session.current_page();
        Ok(overlay::project(
            self.store.for_page(page),
            session.viewport(),
            &self.config,
            self.machine.selected(),
        ))
    }

    /// Existing text runs of the current page, with recorded replacements applied
    pub fn run_overlay(&mut self) -> Result<Vec<RunOverlay>, EditorError> {
        self.sync_runs()?;
        let page = self.session()?.current_page();
        Ok(overlay::project_runs(
            &self.runs,
            self.store.text_edits_for_page(page),
        ))
    }

    pub fn text_runs(&mut self) -> Result<&[TextRun], EditorError> {
        self.sync_runs()?;
        Ok(&self.runs)
    }

    /// What lies under a display point on the current page
    pub fn hit_test(&mut self, point: DisplayPoint) -> Result<PointerTarget, EditorError> {
        let boxes = self.overlay()?;
        let runs = if self.machine.edit_existing() {
            self.run_overlay()?
        } else {
            Vec::new()
        };
        Ok(overlay::hit_test(&boxes, &runs, point))
    }

    // ============ Interaction ============

    pub fn dispatch(&mut self, event: InputEvent) -> Result<Outcome, EditorError> {
        // Only run edits read the text runs, so box editing never pays for
        // (or fails on) content stream extraction.
        if self.machine.edit_existing() || targets_run(&event) {
            self.sync_runs()?;
        }
        self.interact(|machine, ctx| machine.dispatch(event, ctx))
    }

    /// Abort any live gesture and commit any open text edit
    pub fn settle(&mut self) -> Result<Outcome, EditorError> {
        if self.document.is_none() || self.machine.is_idle() {
            return Ok(Outcome::Ignored);
        }
        self.interact(|machine, ctx| machine.resolve(ctx))
    }

    // ============ Direct edits ============

    pub fn delete(&mut self, id: AnnotationId) -> Result<Annotation, EditorError> {
        self.settle()?;
        let removed = delete_annotation(&mut self.store, &mut self.history, id)?;
        self.machine.forget(id);
        Ok(removed)
    }

    pub fn delete_selected(&mut self) -> Result<Outcome, EditorError> {
        self.settle()?;
        self.interact(|machine, ctx| machine.delete_selected(ctx))
    }

    /// Replace an annotation's text outside of the inline editor
    pub fn set_text(&mut self, id: AnnotationId, text: &str) -> Result<Annotation, EditorError> {
        self.settle()?;
        let before = self.store.get(id).cloned().ok_or(EditorError::NotFound(id))?;
        if before.text == text {
            return Ok(before);
        }
        let after = self.store.update(id, AnnotationPatch::text(text))?;
        self.history
            .record(HistoryEntry::change(HistoryKind::EditText, before, after.clone()));
        Ok(after)
    }

    pub fn text_edit(&self, run: RunRef) -> Option<&ExistingTextEdit> {
        self.store.text_edit(run)
    }

    pub fn remove_text_edit(&mut self, run: RunRef) -> Option<ExistingTextEdit> {
        self.store.remove_text_edit(run)
    }

    // ============ History ============

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn undo(&mut self) -> Result<Option<AppliedEntry>, EditorError> {
        self.session()?;
        self.settle()?;
        let applied = self.history.undo(&mut self.store);
        self.after_history(applied.as_ref());
        Ok(applied)
    }

    pub fn redo(&mut self) -> Result<Option<AppliedEntry>, EditorError> {
        self.session()?;
        self.settle()?;
        let applied = self.history.redo(&mut self.store);
        self.after_history(applied.as_ref());
        Ok(applied)
    }

    fn after_history(&mut self, applied: Option<&AppliedEntry>) {
        if let Some(applied) = applied {
            debug!(id = %applied.id, kind = ?applied.kind, direction = ?applied.direction, "history applied");
            if !self.store.contains(applied.id) {
                self.machine.forget(applied.id);
            }
        }
    }

    // ============ Export ============

    /// Flatten the session into a new PDF. Editing state is not changed,
    /// apart from committing an inline edit that is still open.
    pub fn export(&mut self) -> Result<ExportedDocument, EditorError> {
        self.settle()?;
        let session = self.session()?;
        let bytes = flatten(session.document(), &self.store, &self.config)?;
        Ok(ExportedDocument {
            filename: self.config.output_filename.clone(),
            bytes,
        })
    }

    // ============ Internals ============

    fn session(&self) -> Result<&DocumentSession, EditorError> {
        self.document.as_ref().ok_or(EditorError::NoDocument)
    }

    fn session_mut(&mut self) -> Result<&mut DocumentSession, EditorError> {
        self.document.as_mut().ok_or(EditorError::NoDocument)
    }

    fn sync_runs(&mut self) -> Result<(), EditorError> {
        let session = self.document.as_mut().ok_or(EditorError::NoDocument)?;
        if self.runs_generation != Some(session.generation()) {
            self.runs = session.text_runs()?;
            self.runs_generation = Some(session.generation());
        }
        Ok(())
    }

    fn interact<R>(
        &mut self,
        f: impl FnOnce(&mut InteractionMachine, &mut InteractionContext<'_>) -> R,
    ) -> Result<R, EditorError> {
        let session = self.document.as_ref().ok_or(EditorError::NoDocument)?;
        let mut ctx = InteractionContext {
            store: &mut self.store,
            history: &mut self.history,
            config: &self.config,
            viewport: session.viewport(),
            page: session.current_page(),
            runs: &self.runs,
        };
        Ok(f(&mut self.machine, &mut ctx))
    }
}

fn targets_run(event: &InputEvent) -> bool {
    matches!(
        event,
        InputEvent::PointerDown { target: PointerTarget::Run { .. }, .. }
            | InputEvent::Click { target: PointerTarget::Run { .. }, .. }
            | InputEvent::DoubleClick { target: PointerTarget::Run { .. } }
    )
}
