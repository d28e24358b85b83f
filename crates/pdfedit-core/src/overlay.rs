//! Overlay projection
//!
//! Turns the store's document-space state into display-space boxes for the
//! current page. Projection is a pure read: calling it twice with the same
//! inputs gives the same output and never touches the store.

use serde::{Deserialize, Serialize};

use crate::config::EditorConfig;
use crate::coords::{DisplayPoint, DisplayRect, Viewport};
use crate::interaction::PointerTarget;
use crate::model::{Annotation, AnnotationId, ExistingTextEdit, ResizeHandle, RunRef, TextRun};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HandleBox {
    pub handle: ResizeHandle,
    pub center: DisplayPoint,
    /// Square hit area around the center
    pub rect: DisplayRect,
}

/// A positioned, editable annotation box
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverlayBox {
    pub id: AnnotationId,
    pub rect: DisplayRect,
    pub text: String,
    pub font_size_px: f64,
    pub selected: bool,
    pub handles: Vec<HandleBox>,
}

/// A pre-existing text run as it should currently appear
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunOverlay {
    pub run: RunRef,
    pub rect: DisplayRect,
    pub text: String,
    pub font_size_px: f64,
    pub font_name: Option<String>,
    pub edited: bool,
}

pub fn project_annotation(
    annotation: &Annotation,
    viewport: Viewport,
    config: &EditorConfig,
    selected: bool,
) -> OverlayBox {
    let rect = viewport.rect_to_display(&annotation.rect());
    let handles = ResizeHandle::ALL
        .iter()
        .map(|&handle| {
            let (fx, fy) = handle.anchor();
            let center = DisplayPoint::new(rect.left + rect.width * fx, rect.top + rect.height * fy);
            HandleBox {
                handle,
                center,
                rect: DisplayRect::centered(center, config.handle_size_px),
            }
        })
        .collect();

    OverlayBox {
        id: annotation.id,
        rect,
        text: annotation.text.clone(),
        font_size_px: viewport.length_to_display(annotation.font_size),
        selected,
        handles,
    }
}

/// Project the annotations of one page, in store order
pub fn project<'a>(
    annotations: impl IntoIterator<Item = &'a Annotation>,
    viewport: Viewport,
    config: &EditorConfig,
    selected: Option<AnnotationId>,
) -> Vec<OverlayBox> {
    annotations
        .into_iter()
        .map(|a| project_annotation(a, viewport, config, selected == Some(a.id)))
        .collect()
}

/// Pair extracted runs with any replacement recorded for them
pub fn project_runs<'a>(
    runs: &[TextRun],
    edits: impl IntoIterator<Item = &'a ExistingTextEdit>,
) -> Vec<RunOverlay> {
    let edits: Vec<&ExistingTextEdit> = edits.into_iter().collect();
    runs.iter()
        .map(|run| {
            let edit = edits.iter().find(|e| e.run == run.run);
            RunOverlay {
                run: run.run,
                rect: run.rect,
                text: edit.map_or_else(|| run.text.clone(), |e| e.replacement.clone()),
                font_size_px: run.font_size_px,
                font_name: run.font_name.clone(),
                edited: edit.is_some(),
            }
        })
        .collect()
}

/// Resolve what sits under `point`.
///
/// Later boxes are drawn on top, so they are tested first. Any box's handles
/// win over every box body, bodies win over text runs.
pub fn hit_test(boxes: &[OverlayBox], runs: &[RunOverlay], point: DisplayPoint) -> PointerTarget {
    for overlay in boxes.iter().rev() {
        if let Some(handle) = overlay.handles.iter().find(|h| h.rect.contains(point)) {
            return PointerTarget::Handle {
                id: overlay.id,
                handle: handle.handle,
            };
        }
    }

    if let Some(overlay) = boxes.iter().rev().find(|b| b.rect.contains(point)) {
        return PointerTarget::Body { id: overlay.id };
    }

    runs.iter()
        .find(|r| r.rect.contains(point))
        .map(|r| PointerTarget::Run { run: r.run })
        .unwrap_or(PointerTarget::Canvas)
}
