//! Annotation and overlay editing engine for PDF documents
//!
//! Loads a PDF with lopdf, keeps user-added text boxes and replacements of
//! existing text in document space, drives drag/resize/edit gestures from
//! display-space pointer input, and flattens the result into a new PDF.
//!
//! [`Editor`] owns a whole session; the other modules are usable on their own.

pub mod command;
pub mod config;
pub mod coords;
pub mod document;
pub mod editor;
pub mod error;
pub mod flatten;
pub mod fonts;
pub mod history;
pub mod interaction;
pub mod model;
pub mod overlay;
pub mod store;

pub use command::{CommandResponse, EditorCommand};
pub use config::EditorConfig;
pub use coords::{to_display, to_document, DisplayPoint, DisplayRect, DocPoint, DocRect, Viewport};
pub use document::{BlankRasterizer, DocumentInfo, DocumentSession, PageRasterizer, Raster, RenderedPage};
pub use editor::{Editor, EditorStatus};
pub use error::EditorError;
pub use flatten::{flatten, ExportedDocument};
pub use history::{AppliedEntry, HistoryEntry, HistoryKind, HistoryManager};
pub use interaction::{
    EditTarget, GestureToken, InputEvent, InteractionMachine, InteractionState, Key, Modifiers,
    Outcome, PointerTarget,
};
pub use model::{
    Annotation, AnnotationId, AnnotationPatch, DocSize, ExistingTextEdit, ResizeHandle, RunRef,
    TextRun,
};
pub use overlay::{HandleBox, OverlayBox, RunOverlay};
pub use store::AnnotationStore;

/// Parse PDF bytes and return the page count
pub fn get_page_count(bytes: &[u8]) -> Result<u32, EditorError> {
    let doc =
        lopdf::Document::load_mem(bytes).map_err(|e| EditorError::Load(e.to_string()))?;
    Ok(doc.get_pages().len() as u32)
}
