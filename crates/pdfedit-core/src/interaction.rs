//! Pointer and keyboard interaction state machine
//!
//! All input goes through [`InteractionMachine::dispatch`]. At most one thing
//! is active at a time: a drag, a resize, or an inline text edit. A drag or
//! resize is owned by the pointer that started it (its [`GestureToken`]);
//! events from other pointers are ignored until that pointer is released.
//!
//! Gesture math is always relative to the snapshot taken at pointer-down, so
//! intermediate frames never accumulate rounding error.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::EditorConfig;
use crate::coords::{DisplayPoint, DisplayRect, DocRect, Viewport};
use crate::error::EditorError;
use crate::history::{HistoryEntry, HistoryKind, HistoryManager};
use crate::model::{
    Annotation, AnnotationId, AnnotationPatch, DocSize, ExistingTextEdit, ResizeHandle, RunRef,
    TextRun,
};
use crate::store::AnnotationStore;

/// What a pointer event landed on, as resolved by the overlay hit test
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum PointerTarget {
    Canvas,
    Body { id: AnnotationId },
    Handle { id: AnnotationId, handle: ResizeHandle },
    Run { run: RunRef },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Key {
    Enter,
    Escape,
    Delete,
    Backspace,
    Other,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    pub fn shift() -> Self {
        Self {
            shift: true,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum InputEvent {
    #[serde(rename_all = "camelCase")]
    PointerDown {
        pointer_id: u32,
        target: PointerTarget,
        position: DisplayPoint,
    },
    #[serde(rename_all = "camelCase")]
    PointerMove {
        pointer_id: u32,
        position: DisplayPoint,
    },
    #[serde(rename_all = "camelCase")]
    PointerUp {
        pointer_id: u32,
        position: DisplayPoint,
    },
    Click {
        target: PointerTarget,
        position: DisplayPoint,
    },
    DoubleClick {
        target: PointerTarget,
    },
    Key {
        key: Key,
        #[serde(default)]
        modifiers: Modifiers,
    },
    /// The inline editor's content changed
    DraftChanged {
        text: String,
    },
    /// The inline editor lost focus
    Blur,
}

/// Ownership of the active drag/resize
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GestureToken {
    pub pointer_id: u32,
    pub serial: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum EditTarget {
    Annotation { id: AnnotationId },
    Run { run: RunRef },
}

/// Observable state of the machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum InteractionState {
    Idle,
    Dragging { id: AnnotationId },
    Resizing { id: AnnotationId, handle: ResizeHandle },
    EditingText { target: EditTarget },
}

/// Result of dispatching one event, for the view layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Outcome {
    Ignored,
    GestureStarted {
        id: AnnotationId,
        token: GestureToken,
    },
    /// The box moved or resized live; the overlay should re-project
    GestureUpdated { annotation: Annotation },
    /// The gesture ended; `kind` is `None` when nothing changed
    GestureCommitted {
        id: AnnotationId,
        kind: Option<HistoryKind>,
    },
    GestureAborted { id: AnnotationId },
    EditStarted { target: EditTarget, text: String },
    DraftUpdated { text: String },
    EditCommitted { target: EditTarget, changed: bool },
    EditCancelled { target: EditTarget },
    Added { annotation: Annotation },
    Deleted { id: AnnotationId },
    Selected { id: Option<AnnotationId> },
}

/// Everything the machine reads or writes while handling one event
pub struct InteractionContext<'a> {
    pub store: &'a mut AnnotationStore,
    pub history: &'a mut HistoryManager,
    pub config: &'a EditorConfig,
    pub viewport: Viewport,
    /// Current 1-based page
    pub page: u32,
    /// Text runs of the current page at the current scale
    pub runs: &'a [TextRun],
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum GestureKind {
    Move,
    Resize(ResizeHandle),
}

#[derive(Debug, Clone)]
struct Gesture {
    token: GestureToken,
    kind: GestureKind,
    start: DisplayPoint,
    orig: Annotation,
    viewport: Viewport,
}

#[derive(Debug, Clone)]
struct TextEditSession {
    target: EditTarget,
    draft: String,
    /// Text shown when editing began
    initial: String,
    /// Run being replaced, with the viewport its rectangle belongs to
    run: Option<(TextRun, Viewport)>,
}

#[derive(Debug, Clone, Default)]
enum Active {
    #[default]
    Idle,
    Gesture(Gesture),
    Editing(TextEditSession),
}

#[derive(Debug, Clone)]
pub struct InteractionMachine {
    active: Active,
    selected: Option<AnnotationId>,
    add_text_armed: bool,
    add_font_size: f64,
    edit_existing: bool,
    next_serial: u64,
}

impl InteractionMachine {
    pub fn new(config: &EditorConfig) -> Self {
        Self {
            active: Active::Idle,
            selected: None,
            add_text_armed: false,
            add_font_size: config.default_font_size,
            edit_existing: false,
            next_serial: 1,
        }
    }

    pub fn state(&self) -> InteractionState {
        match &self.active {
            Active::Idle => InteractionState::Idle,
            Active::Gesture(g) => match g.kind {
                GestureKind::Move => InteractionState::Dragging { id: g.orig.id },
                GestureKind::Resize(handle) => InteractionState::Resizing {
                    id: g.orig.id,
                    handle,
                },
            },
            Active::Editing(e) => InteractionState::EditingText { target: e.target },
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.active, Active::Idle)
    }

    pub fn active_token(&self) -> Option<GestureToken> {
        match &self.active {
            Active::Gesture(g) => Some(g.token),
            _ => None,
        }
    }

    /// Current draft of the inline editor, if one is open
    pub fn draft(&self) -> Option<&str> {
        match &self.active {
            Active::Editing(e) => Some(&e.draft),
            _ => None,
        }
    }

    pub fn selected(&self) -> Option<AnnotationId> {
        self.selected
    }

    pub fn add_text_armed(&self) -> bool {
        self.add_text_armed
    }

    pub fn set_add_text_armed(&mut self, armed: bool) {
        self.add_text_armed = armed;
    }

    pub fn add_font_size(&self) -> f64 {
        self.add_font_size
    }

    pub fn set_add_font_size(&mut self, size: f64, config: &EditorConfig) -> f64 {
        self.add_font_size = config.clamp_font_size(size);
        self.add_font_size
    }

    pub fn edit_existing(&self) -> bool {
        self.edit_existing
    }

    pub fn set_edit_existing(&mut self, enabled: bool) {
        self.edit_existing = enabled;
    }

    /// Forget everything tied to the previous document
    pub fn reset(&mut self) {
        self.active = Active::Idle;
        self.selected = None;
    }

    pub fn dispatch(&mut self, event: InputEvent, ctx: &mut InteractionContext<'_>) -> Outcome {
        match event {
            InputEvent::PointerDown {
                pointer_id,
                target,
                position,
            } => self.pointer_down(pointer_id, target, position, ctx),
            InputEvent::PointerMove {
                pointer_id,
                position,
            } => self.pointer_move(pointer_id, position, ctx),
            InputEvent::PointerUp {
                pointer_id,
                position,
            } => self.pointer_up(pointer_id, position, ctx),
            InputEvent::Click { target, position } => self.click(target, position, ctx),
            InputEvent::DoubleClick { target } => self.double_click(target, ctx),
            InputEvent::Key { key, modifiers } => self.key(key, modifiers, ctx),
            InputEvent::DraftChanged { text } => match &mut self.active {
                Active::Editing(edit) => {
                    edit.draft = text;
                    Outcome::DraftUpdated {
                        text: edit.draft.clone(),
                    }
                }
                _ => Outcome::Ignored,
            },
            InputEvent::Blur => self.commit_edit(ctx),
        }
    }

    /// Settle whatever is active before an outside mutation: a gesture is
    /// aborted (its start snapshot restored) and an inline edit is committed.
    pub fn resolve(&mut self, ctx: &mut InteractionContext<'_>) -> Outcome {
        match &self.active {
            Active::Idle => Outcome::Ignored,
            Active::Gesture(_) => self.abort_gesture(ctx.store),
            Active::Editing(_) => self.commit_edit(ctx),
        }
    }

    /// Drop the selection and any inline edit of an annotation that no longer exists
    pub fn forget(&mut self, id: AnnotationId) {
        if self.selected == Some(id) {
            self.selected = None;
        }
        let editing_it = matches!(
            &self.active,
            Active::Editing(TextEditSession {
                target: EditTarget::Annotation { id: edited },
                ..
            }) if *edited == id
        );
        if editing_it {
            self.active = Active::Idle;
        }
    }

    /// Abort the active drag/resize and put the annotation back where it started
    pub fn abort_gesture(&mut self, store: &mut AnnotationStore) -> Outcome {
        match std::mem::take(&mut self.active) {
            Active::Gesture(gesture) => {
                let id = gesture.orig.id;
                if store.contains(id) {
                    store.restore(gesture.orig);
                }
                debug!(%id, "gesture aborted");
                Outcome::GestureAborted { id }
            }
            other => {
                self.active = other;
                Outcome::Ignored
            }
        }
    }

    /// Remove the selected annotation, recording a history entry
    pub fn delete_selected(&mut self, ctx: &mut InteractionContext<'_>) -> Outcome {
        match self.selected {
            Some(id) => match delete_annotation(ctx.store, ctx.history, id) {
                Ok(_) => {
                    self.forget(id);
                    Outcome::Deleted { id }
                }
                Err(e) => {
                    warn!(%id, error = %e, "delete skipped");
                    self.selected = None;
                    Outcome::Ignored
                }
            },
            None => Outcome::Ignored,
        }
    }

    fn pointer_down(
        &mut self,
        pointer_id: u32,
        target: PointerTarget,
        position: DisplayPoint,
        ctx: &mut InteractionContext<'_>,
    ) -> Outcome {
        match &self.active {
            Active::Gesture(_) => return Outcome::Ignored,
            // Pressing anywhere else blurs the inline editor
            Active::Editing(_) => return self.commit_edit(ctx),
            Active::Idle => {}
        }

        let (id, kind) = match target {
            PointerTarget::Body { id } => (id, GestureKind::Move),
            PointerTarget::Handle { id, handle } => (id, GestureKind::Resize(handle)),
            PointerTarget::Canvas | PointerTarget::Run { .. } => {
                if self.selected.take().is_some() {
                    return Outcome::Selected { id: None };
                }
                return Outcome::Ignored;
            }
        };

        let Some(orig) = ctx.store.get(id).cloned() else {
            warn!(%id, "pointer-down on an annotation that is not in the store");
            return Outcome::Ignored;
        };

        let token = GestureToken {
            pointer_id,
            serial: self.next_serial,
        };
        self.next_serial += 1;
        self.selected = Some(id);
        self.active = Active::Gesture(Gesture {
            token,
            kind,
            start: position,
            orig,
            viewport: ctx.viewport,
        });
        debug!(%id, ?kind, "gesture started");
        Outcome::GestureStarted { id, token }
    }

    fn pointer_move(
        &mut self,
        pointer_id: u32,
        position: DisplayPoint,
        ctx: &mut InteractionContext<'_>,
    ) -> Outcome {
        let Active::Gesture(gesture) = &self.active else {
            return Outcome::Ignored;
        };
        if gesture.token.pointer_id != pointer_id {
            return Outcome::Ignored;
        }

        let patch = gesture_patch(gesture, position, ctx.config);
        match ctx.store.update(gesture.orig.id, patch) {
            Ok(annotation) => Outcome::GestureUpdated { annotation },
            Err(e) => {
                warn!(error = %e, "annotation vanished mid-gesture");
                self.abort_gesture(ctx.store)
            }
        }
    }

    fn pointer_up(
        &mut self,
        pointer_id: u32,
        position: DisplayPoint,
        ctx: &mut InteractionContext<'_>,
    ) -> Outcome {
        let owned = matches!(&self.active, Active::Gesture(g) if g.token.pointer_id == pointer_id);
        if !owned {
            return Outcome::Ignored;
        }
        let Active::Gesture(gesture) = std::mem::take(&mut self.active) else {
            return Outcome::Ignored;
        };

        let id = gesture.orig.id;
        let patch = gesture_patch(&gesture, position, ctx.config);
        let after = match ctx.store.update(id, patch) {
            Ok(after) => after,
            Err(e) => {
                warn!(error = %e, "annotation vanished before release");
                return Outcome::GestureAborted { id };
            }
        };

        if after == gesture.orig {
            return Outcome::GestureCommitted { id, kind: None };
        }

        let kind = match gesture.kind {
            GestureKind::Move => HistoryKind::Move,
            GestureKind::Resize(_) => HistoryKind::Resize,
        };
        ctx.history
            .record(HistoryEntry::change(kind, gesture.orig, after));
        Outcome::GestureCommitted {
            id,
            kind: Some(kind),
        }
    }

    fn click(
        &mut self,
        target: PointerTarget,
        position: DisplayPoint,
        ctx: &mut InteractionContext<'_>,
    ) -> Outcome {
        match &self.active {
            // The click that blurs an editor never adds a box
            Active::Editing(_) => return self.commit_edit(ctx),
            Active::Gesture(_) => return Outcome::Ignored,
            Active::Idle => {}
        }

        match target {
            PointerTarget::Canvas if self.add_text_armed => self.add_at(position, ctx),
            PointerTarget::Run { run } if self.edit_existing => self.begin_run_edit(run, ctx),
            _ => Outcome::Ignored,
        }
    }

    fn double_click(&mut self, target: PointerTarget, ctx: &mut InteractionContext<'_>) -> Outcome {
        if !self.is_idle() {
            return Outcome::Ignored;
        }
        let PointerTarget::Body { id } = target else {
            return Outcome::Ignored;
        };
        let Some(annotation) = ctx.store.get(id) else {
            warn!(%id, "double-click on an annotation that is not in the store");
            return Outcome::Ignored;
        };

        let target = EditTarget::Annotation { id };
        let text = annotation.text.clone();
        self.selected = Some(id);
        self.active = Active::Editing(TextEditSession {
            target,
            draft: text.clone(),
            initial: text.clone(),
            run: None,
        });
        Outcome::EditStarted { target, text }
    }

    fn key(&mut self, key: Key, modifiers: Modifiers, ctx: &mut InteractionContext<'_>) -> Outcome {
        match &mut self.active {
            Active::Editing(edit) => match key {
                Key::Enter if modifiers.shift && matches!(edit.target, EditTarget::Annotation { .. }) => {
                    edit.draft.push('\n');
                    Outcome::DraftUpdated {
                        text: edit.draft.clone(),
                    }
                }
                Key::Enter => self.commit_edit(ctx),
                Key::Escape => self.cancel_edit(),
                _ => Outcome::Ignored,
            },
            Active::Gesture(_) => match key {
                Key::Escape => self.abort_gesture(ctx.store),
                _ => Outcome::Ignored,
            },
            Active::Idle => match key {
                Key::Delete | Key::Backspace => self.delete_selected(ctx),
                Key::Escape if self.selected.is_some() => {
                    self.selected = None;
                    Outcome::Selected { id: None }
                }
                _ => Outcome::Ignored,
            },
        }
    }

    fn add_at(&mut self, position: DisplayPoint, ctx: &mut InteractionContext<'_>) -> Outcome {
        let viewport = ctx.viewport;
        let anchor = viewport.to_document(position);
        let size = DocSize::new(
            viewport.length_to_document(ctx.config.default_box_width_px),
            viewport.length_to_document(ctx.config.default_box_height_px),
        );

        let annotation = ctx.store.add(
            anchor,
            size,
            self.add_font_size,
            ctx.page,
            ctx.config.placeholder_text.clone(),
        );
        ctx.history.record(HistoryEntry::add(annotation.clone()));
        self.selected = Some(annotation.id);
        Outcome::Added { annotation }
    }

    fn begin_run_edit(&mut self, run: RunRef, ctx: &mut InteractionContext<'_>) -> Outcome {
        let Some(text_run) = ctx.runs.iter().find(|r| r.run == run) else {
            warn!(page = run.page, index = run.index, "click on an unknown text run");
            return Outcome::Ignored;
        };

        // Show the latest replacement if this run was edited before
        let text = ctx
            .store
            .text_edit(run)
            .map(|e| e.replacement.clone())
            .unwrap_or_else(|| text_run.text.clone());

        let target = EditTarget::Run { run };
        self.active = Active::Editing(TextEditSession {
            target,
            draft: text.clone(),
            initial: text.clone(),
            run: Some((text_run.clone(), ctx.viewport)),
        });
        Outcome::EditStarted { target, text }
    }

    fn commit_edit(&mut self, ctx: &mut InteractionContext<'_>) -> Outcome {
        let edit = match std::mem::take(&mut self.active) {
            Active::Editing(edit) => edit,
            other => {
                self.active = other;
                return Outcome::Ignored;
            }
        };

        let target = edit.target;
        let changed = edit.draft != edit.initial;

        match (target, edit.run) {
            (EditTarget::Annotation { id }, _) => {
                if !changed {
                    return Outcome::EditCommitted { target, changed };
                }
                let result = commit_annotation_text(ctx.store, ctx.history, id, edit.draft);
                if let Err(e) = result {
                    warn!(error = %e, "text edit dropped");
                    return Outcome::EditCancelled { target };
                }
            }
            (EditTarget::Run { .. }, Some((run, viewport))) => {
                if changed {
                    ctx.store
                        .record_text_edit(ExistingTextEdit::from_run(&run, viewport, edit.draft));
                }
            }
            (EditTarget::Run { .. }, None) => return Outcome::EditCancelled { target },
        }

        Outcome::EditCommitted { target, changed }
    }

    fn cancel_edit(&mut self) -> Outcome {
        match std::mem::take(&mut self.active) {
            Active::Editing(edit) => Outcome::EditCancelled {
                target: edit.target,
            },
            other => {
                self.active = other;
                Outcome::Ignored
            }
        }
    }
}

fn commit_annotation_text(
    store: &mut AnnotationStore,
    history: &mut HistoryManager,
    id: AnnotationId,
    text: String,
) -> Result<(), EditorError> {
    let before = store.get(id).cloned().ok_or(EditorError::NotFound(id))?;
    let after = store.update(id, AnnotationPatch::text(text))?;
    history.record(HistoryEntry::change(HistoryKind::EditText, before, after));
    Ok(())
}

/// Remove an annotation and record the deletion
pub fn delete_annotation(
    store: &mut AnnotationStore,
    history: &mut HistoryManager,
    id: AnnotationId,
) -> Result<Annotation, EditorError> {
    let removed = store.remove(id)?;
    history.record(HistoryEntry::delete(removed.clone()));
    Ok(removed)
}

fn gesture_patch(gesture: &Gesture, position: DisplayPoint, config: &EditorConfig) -> AnnotationPatch {
    match gesture.kind {
        GestureKind::Move => {
            let delta = gesture.viewport.delta_to_document(gesture.start, position);
            AnnotationPatch {
                x: Some(gesture.orig.x + delta.x),
                y: Some(gesture.orig.y + delta.y),
                ..AnnotationPatch::default()
            }
        }
        GestureKind::Resize(handle) => {
            let (rect, font_size) = resize_geometry(
                &gesture.orig,
                handle,
                gesture.start,
                position,
                gesture.viewport,
                config,
            );
            AnnotationPatch::geometry(rect, font_size)
        }
    }
}

/// Box and font size produced by dragging `handle` from `start` to `current`.
///
/// The dragged edges follow the pointer, the opposite edges stay put, and the
/// box never gets smaller than the configured minimum in display pixels. The
/// font scales with the width relative to the gesture start.
pub fn resize_geometry(
    orig: &Annotation,
    handle: ResizeHandle,
    start: DisplayPoint,
    current: DisplayPoint,
    viewport: Viewport,
    config: &EditorConfig,
) -> (DocRect, f64) {
    let dx = current.left - start.left;
    let dy = current.top - start.top;
    let box_px = viewport.rect_to_display(&orig.rect());
    let width_px = viewport.length_to_display(orig.width);
    let height_px = viewport.length_to_display(orig.height);

    let mut left = box_px.left;
    let mut top = box_px.top;
    let mut width = width_px;
    let mut height = height_px;

    if handle.moves_east() {
        width = (width_px + dx).max(config.min_box_width_px);
    }
    if handle.moves_west() {
        width = (width_px - dx).max(config.min_box_width_px);
        left = box_px.left + width_px - width;
    }
    if handle.moves_south() {
        height = (height_px + dy).max(config.min_box_height_px);
    }
    if handle.moves_north() {
        height = (height_px - dy).max(config.min_box_height_px);
        top = box_px.top + height_px - height;
    }

    let resized = DisplayRect {
        left,
        top,
        width,
        height,
    };
    let bottom_left = viewport.to_document(DisplayPoint::new(resized.left, resized.bottom()));
    let rect = DocRect {
        x: bottom_left.x,
        y: bottom_left.y,
        width: viewport.length_to_document(width),
        height: viewport.length_to_document(height),
    };

    let font_size = if handle.moves_east() || handle.moves_west() {
        config.clamp_font_size(orig.font_size * rect.width / orig.width)
    } else {
        orig.font_size
    };

    (rect, font_size)
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn handle() -> impl Strategy<Value = ResizeHandle> {
        prop::sample::select(ResizeHandle::ALL.to_vec())
    }

    fn annotation(width: f64, height: f64) -> Annotation {
        Annotation {
            id: AnnotationId(1),
            text: "New Text".to_string(),
            x: 100.0,
            y: 200.0,
            width,
            height,
            font_size: 14.0,
            page: 1,
            is_new: true,
        }
    }

    proptest! {
        /// No drag, however far, makes a box smaller than the display-pixel floor
        #[test]
        fn resize_never_goes_below_floor(
            handle in handle(),
            width in 1.0f64..400.0,
            height in 1.0f64..200.0,
            dx in -2000.0f64..2000.0,
            dy in -2000.0f64..2000.0,
            scale in 0.5f64..3.0,
        ) {
            let config = EditorConfig::default();
            let viewport = Viewport::for_page(792.0, scale);
            let orig = annotation(width, height);
            let start = DisplayPoint::new(0.0, 0.0);
            let (rect, font) = resize_geometry(
                &orig, handle, start, DisplayPoint::new(dx, dy), viewport, &config,
            );

            let tolerance = 1e-9;
            if handle.moves_east() || handle.moves_west() {
                prop_assert!(rect.width * scale >= config.min_box_width_px - tolerance);
            }
            if handle.moves_north() || handle.moves_south() {
                prop_assert!(rect.height * scale >= config.min_box_height_px - tolerance);
            }
            prop_assert!(font >= config.min_font_size && font <= config.max_font_size);
        }

        /// Doubling the width doubles the font size, subject to the font bounds
        #[test]
        fn font_follows_width(
            width in 20.0f64..300.0,
            font_size in 1.0f64..150.0,
            scale in 0.5f64..3.0,
        ) {
            let config = EditorConfig::default();
            let viewport = Viewport::for_page(792.0, scale);
            let mut orig = annotation(width, 20.0);
            orig.font_size = font_size;
            let dx = viewport.length_to_display(width);

            let (rect, font) = resize_geometry(
                &orig,
                ResizeHandle::E,
                DisplayPoint::new(0.0, 0.0),
                DisplayPoint::new(dx, 0.0),
                viewport,
                &config,
            );

            prop_assert!((rect.width - 2.0 * width).abs() < 1e-9 * width);
            let expected = (2.0 * font_size).clamp(config.min_font_size, config.max_font_size);
            prop_assert!((font - expected).abs() < 1e-9 * expected);
        }
    }
}
