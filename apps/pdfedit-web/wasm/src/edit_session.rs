//! Stateful editing session exposed to JavaScript
//!
//! JavaScript forwards raw pointer and keyboard events in display pixels
//! relative to the page canvas; hit testing, gestures, history and export all
//! happen in Rust. Every call that changes what is on screen returns the
//! outcome so the page script knows whether to re-project the overlay.

use pdfedit_core::{
    BlankRasterizer, DisplayPoint, Editor, EditorConfig, EditorError, InputEvent, Key, Modifiers,
    Outcome, PointerTarget, RenderedPage,
};
use serde::Serialize;
use tracing::{error, warn};
use wasm_bindgen::prelude::*;

use crate::validation;

fn js_error(e: EditorError) -> JsValue {
    if e.is_recoverable() {
        warn!(error = %e, "call ignored");
    } else {
        error!(error = %e, "editor call failed");
    }
    JsValue::from_str(&e.to_string())
}

fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(value)
        .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
}

fn to_bytes(bytes: &[u8]) -> js_sys::Uint8Array {
    let array = js_sys::Uint8Array::new_with_length(bytes.len() as u32);
    array.copy_from(bytes);
    array
}

/// Map a `KeyboardEvent.key` value to the keys the editor reacts to
pub fn parse_key(name: &str) -> Key {
    match name {
        "Enter" => Key::Enter,
        "Escape" | "Esc" => Key::Escape,
        "Delete" | "Del" => Key::Delete,
        "Backspace" => Key::Backspace,
        _ => Key::Other,
    }
}

/// What the page script needs to size and validate a render
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RenderTicket {
    pub page: u32,
    pub scale: f64,
    pub generation: u64,
    pub width: u32,
    pub height: u32,
}

impl From<&RenderedPage> for RenderTicket {
    fn from(rendered: &RenderedPage) -> Self {
        Self {
            page: rendered.page,
            scale: rendered.scale,
            generation: rendered.generation,
            width: rendered.raster.width,
            height: rendered.raster.height,
        }
    }
}

#[wasm_bindgen]
pub struct EditSession {
    editor: Editor,
    last_render: Option<RenderedPage>,
}

impl EditSession {
    fn with_config(config: EditorConfig) -> Result<Self, EditorError> {
        Ok(Self {
            editor: Editor::new(config)?,
            last_render: None,
        })
    }

    fn open(&mut self, name: &str, bytes: &[u8]) -> Result<(), EditorError> {
        validation::quick_validate(bytes).map_err(EditorError::Load)?;
        self.editor.load(name, bytes)?;
        self.last_render = None;
        Ok(())
    }

    fn pointer(
        &mut self,
        phase: PointerPhase,
        pointer_id: u32,
        left: f64,
        top: f64,
    ) -> Result<Outcome, EditorError> {
        let position = DisplayPoint::new(left, top);
        let event = match phase {
            PointerPhase::Down => InputEvent::PointerDown {
                pointer_id,
                target: self.editor.hit_test(position)?,
                position,
            },
            PointerPhase::Move => InputEvent::PointerMove { pointer_id, position },
            PointerPhase::Up => InputEvent::PointerUp { pointer_id, position },
        };
        self.editor.dispatch(event)
    }

    fn target_at(
        &mut self,
        left: f64,
        top: f64,
    ) -> Result<(PointerTarget, DisplayPoint), EditorError> {
        let position = DisplayPoint::new(left, top);
        Ok((self.editor.hit_test(position)?, position))
    }

    fn click_at(&mut self, left: f64, top: f64) -> Result<Outcome, EditorError> {
        let (target, position) = self.target_at(left, top)?;
        self.editor.dispatch(InputEvent::Click { target, position })
    }

    fn double_click_at(&mut self, left: f64, top: f64) -> Result<Outcome, EditorError> {
        let (target, _) = self.target_at(left, top)?;
        self.editor.dispatch(InputEvent::DoubleClick { target })
    }

    fn key_press(&mut self, name: &str, shift: bool) -> Result<Outcome, EditorError> {
        let modifiers = Modifiers {
            shift,
            ..Modifiers::default()
        };
        self.editor.dispatch(InputEvent::Key {
            key: parse_key(name),
            modifiers,
        })
    }

    fn render_current(&mut self) -> Result<&RenderedPage, EditorError> {
        let rendered = self.editor.render(&BlankRasterizer)?;
        Ok(self.last_render.insert(rendered))
    }
}

#[derive(Debug, Clone, Copy)]
enum PointerPhase {
    Down,
    Move,
    Up,
}

#[wasm_bindgen]
impl EditSession {
    /// Create a session. `config_json` may override any subset of the defaults.
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: Option<String>) -> Result<EditSession, JsValue> {
        let config = match config_json {
            Some(json) => EditorConfig::from_json(&json).map_err(js_error)?,
            None => EditorConfig::default(),
        };
        Self::with_config(config).map_err(js_error)
    }

    /// Load a document, discarding the previous one and all its edits
    pub fn load(&mut self, name: &str, bytes: &[u8]) -> Result<JsValue, JsValue> {
        self.open(name, bytes).map_err(js_error)?;
        match self.editor.document() {
            Some(doc) => to_js(&doc.info()),
            None => Err(JsValue::from_str("No document loaded")),
        }
    }

    #[wasm_bindgen(getter, js_name = hasDocument)]
    pub fn has_document(&self) -> bool {
        self.editor.has_document()
    }

    #[wasm_bindgen(getter, js_name = documentName)]
    pub fn document_name(&self) -> Option<String> {
        self.editor.document().map(|d| d.name().to_string())
    }

    #[wasm_bindgen(getter, js_name = pageCount)]
    pub fn page_count(&self) -> u32 {
        self.editor.document().map_or(0, |d| d.page_count())
    }

    #[wasm_bindgen(getter, js_name = currentPage)]
    pub fn current_page(&self) -> u32 {
        self.editor.document().map_or(0, |d| d.current_page())
    }

    #[wasm_bindgen(getter)]
    pub fn scale(&self) -> f64 {
        self.editor.document().map_or(0.0, |d| d.scale())
    }

    /// Original file bytes, for pdf.js
    #[wasm_bindgen(js_name = getDocumentBytes)]
    pub fn get_document_bytes(&self) -> Option<js_sys::Uint8Array> {
        self.editor.document().map(|d| to_bytes(d.original_bytes()))
    }

    // ============ Navigation ============

    #[wasm_bindgen(js_name = setPage)]
    pub fn set_page(&mut self, page: u32) -> Result<u32, JsValue> {
        self.editor.set_page(page).map_err(js_error)
    }

    #[wasm_bindgen(js_name = nextPage)]
    pub fn next_page(&mut self) -> Result<u32, JsValue> {
        self.editor.next_page().map_err(js_error)
    }

    #[wasm_bindgen(js_name = prevPage)]
    pub fn prev_page(&mut self) -> Result<u32, JsValue> {
        self.editor.prev_page().map_err(js_error)
    }

    #[wasm_bindgen(js_name = setScale)]
    pub fn set_scale(&mut self, scale: f64) -> Result<f64, JsValue> {
        self.editor.set_scale(scale).map_err(js_error)
    }

    #[wasm_bindgen(js_name = zoomIn)]
    pub fn zoom_in(&mut self) -> Result<f64, JsValue> {
        self.editor.zoom_in().map_err(js_error)
    }

    #[wasm_bindgen(js_name = zoomOut)]
    pub fn zoom_out(&mut self) -> Result<f64, JsValue> {
        self.editor.zoom_out().map_err(js_error)
    }

    // ============ Rendering ============

    /// Render the current page. Returns a ticket whose generation must be
    /// passed back to `isRenderCurrent` before the result is painted.
    #[wasm_bindgen(js_name = renderPage)]
    pub fn render_page(&mut self) -> Result<JsValue, JsValue> {
        let rendered = self.render_current().map_err(js_error)?;
        let ticket = RenderTicket::from(&*rendered);
        to_js(&ticket)
    }

    /// PNG backdrop of the last render, sized to the page at its scale
    #[wasm_bindgen(js_name = renderedPng)]
    pub fn rendered_png(&self) -> Result<js_sys::Uint8Array, JsValue> {
        let rendered = self
            .last_render
            .as_ref()
            .ok_or_else(|| JsValue::from_str("Nothing rendered yet"))?;
        let png = rendered.raster.to_png().map_err(js_error)?;
        Ok(to_bytes(&png))
    }

    /// False once the page or zoom changed after the last render
    #[wasm_bindgen(js_name = isRenderCurrent)]
    pub fn is_render_current(&self) -> bool {
        self.last_render
            .as_ref()
            .is_some_and(|r| self.editor.is_current(r))
    }

    // ============ Overlay ============

    pub fn overlay(&self) -> Result<JsValue, JsValue> {
        to_js(&self.editor.overlay().map_err(js_error)?)
    }

    #[wasm_bindgen(js_name = runOverlay)]
    pub fn run_overlay(&mut self) -> Result<JsValue, JsValue> {
        to_js(&self.editor.run_overlay().map_err(js_error)?)
    }

    pub fn status(&self) -> Result<JsValue, JsValue> {
        to_js(&self.editor.status())
    }

    // ============ Modes ============

    #[wasm_bindgen(js_name = toggleAddText)]
    pub fn toggle_add_text(&mut self) -> bool {
        self.editor.toggle_add_text()
    }

    #[wasm_bindgen(js_name = setAddFontSize)]
    pub fn set_add_font_size(&mut self, size: f64) -> f64 {
        self.editor.set_add_font_size(size)
    }

    #[wasm_bindgen(js_name = setEditExisting)]
    pub fn set_edit_existing(&mut self, enabled: bool) {
        self.editor.set_edit_existing(enabled)
    }

    // ============ Input ============

    #[wasm_bindgen(js_name = pointerDown)]
    pub fn pointer_down(
        &mut self,
        pointer_id: u32,
        left: f64,
        top: f64,
    ) -> Result<JsValue, JsValue> {
        let outcome = self
            .pointer(PointerPhase::Down, pointer_id, left, top)
            .map_err(js_error)?;
        to_js(&outcome)
    }

    #[wasm_bindgen(js_name = pointerMove)]
    pub fn pointer_move(
        &mut self,
        pointer_id: u32,
        left: f64,
        top: f64,
    ) -> Result<JsValue, JsValue> {
        let outcome = self
            .pointer(PointerPhase::Move, pointer_id, left, top)
            .map_err(js_error)?;
        to_js(&outcome)
    }

    #[wasm_bindgen(js_name = pointerUp)]
    pub fn pointer_up(
        &mut self,
        pointer_id: u32,
        left: f64,
        top: f64,
    ) -> Result<JsValue, JsValue> {
        let outcome = self
            .pointer(PointerPhase::Up, pointer_id, left, top)
            .map_err(js_error)?;
        to_js(&outcome)
    }

    pub fn click(&mut self, left: f64, top: f64) -> Result<JsValue, JsValue> {
        to_js(&self.click_at(left, top).map_err(js_error)?)
    }

    #[wasm_bindgen(js_name = doubleClick)]
    pub fn double_click(&mut self, left: f64, top: f64) -> Result<JsValue, JsValue> {
        to_js(&self.double_click_at(left, top).map_err(js_error)?)
    }

    /// `key` is a `KeyboardEvent.key` value
    pub fn key(&mut self, key: &str, shift: bool) -> Result<JsValue, JsValue> {
        to_js(&self.key_press(key, shift).map_err(js_error)?)
    }

    #[wasm_bindgen(js_name = draftChanged)]
    pub fn draft_changed(&mut self, text: &str) -> Result<JsValue, JsValue> {
        let outcome = self
            .editor
            .dispatch(InputEvent::DraftChanged {
                text: text.to_string(),
            })
            .map_err(js_error)?;
        to_js(&outcome)
    }

    pub fn blur(&mut self) -> Result<JsValue, JsValue> {
        to_js(&self.editor.dispatch(InputEvent::Blur).map_err(js_error)?)
    }

    // ============ Edits and history ============

    #[wasm_bindgen(js_name = deleteSelected)]
    pub fn delete_selected(&mut self) -> Result<JsValue, JsValue> {
        to_js(&self.editor.delete_selected().map_err(js_error)?)
    }

    pub fn undo(&mut self) -> Result<JsValue, JsValue> {
        to_js(&self.editor.undo().map_err(js_error)?)
    }

    pub fn redo(&mut self) -> Result<JsValue, JsValue> {
        to_js(&self.editor.redo().map_err(js_error)?)
    }

    #[wasm_bindgen(js_name = canUndo)]
    pub fn can_undo(&self) -> bool {
        self.editor.can_undo()
    }

    #[wasm_bindgen(js_name = canRedo)]
    pub fn can_redo(&self) -> bool {
        self.editor.can_redo()
    }

    // ============ Export ============

    /// Flatten all edits into a new PDF
    #[wasm_bindgen(js_name = exportPdf)]
    pub fn export_pdf(&mut self) -> Result<js_sys::Uint8Array, JsValue> {
        let exported = self.editor.export().map_err(js_error)?;
        Ok(to_bytes(&exported.bytes))
    }

    #[wasm_bindgen(getter, js_name = exportFilename)]
    pub fn export_filename(&self) -> String {
        self.editor.config().output_filename.clone()
    }

    /// Run a JSON-encoded command and return the JSON response
    #[wasm_bindgen(js_name = executeJson)]
    pub fn execute_json(&mut self, json: &str) -> String {
        let response = self.editor.execute_json(json);
        serde_json::to_string(&response).unwrap_or_else(|e| {
            format!(r#"{{"success":false,"data":null,"error":"{}"}}"#, e)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::{dictionary, Document, Object, Stream};
    use pretty_assertions::assert_eq;

    fn create_test_pdf(pages: usize) -> Vec<u8> {
        let mut doc = Document::with_version("1.7");
        let pages_id = doc.new_object_id();
        let kids: Vec<Object> = (0..pages)
            .map(|_| {
                let content_id = doc.add_object(Stream::new(dictionary! {}, Vec::new()));
                Object::Reference(doc.add_object(dictionary! {
                    "Type" => "Page",
                    "Parent" => pages_id,
                    "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
                    "Contents" => content_id,
                }))
            })
            .collect();
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Count" => pages as i64,
                "Kids" => kids,
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut buffer = Vec::new();
        doc.save_to(&mut buffer).unwrap();
        buffer
    }

    fn session() -> EditSession {
        let mut session = EditSession::with_config(EditorConfig::default()).unwrap();
        session.open("test.pdf", &create_test_pdf(2)).unwrap();
        session.editor.set_scale(1.0).unwrap();
        session
    }

    #[test]
    fn test_key_names() {
        assert_eq!(parse_key("Enter"), Key::Enter);
        assert_eq!(parse_key("Esc"), Key::Escape);
        assert_eq!(parse_key("Backspace"), Key::Backspace);
        assert_eq!(parse_key("a"), Key::Other);
    }

    #[test]
    fn test_open_rejects_non_pdf() {
        let mut session = EditSession::with_config(EditorConfig::default()).unwrap();
        assert!(matches!(
            session.open("notes.txt", b"hello world"),
            Err(EditorError::Load(_))
        ));
        assert!(!session.has_document());
    }

    #[test]
    fn test_pointer_flow_moves_box() {
        let mut session = session();
        session.toggle_add_text();
        let added = match session.click_at(100.0, 400.0).unwrap() {
            Outcome::Added { annotation } => annotation,
            other => panic!("expected Added, got {:?}", other),
        };
        session.toggle_add_text();

        session.pointer(PointerPhase::Down, 1, 150.0, 388.0).unwrap();
        session.pointer(PointerPhase::Move, 1, 170.0, 388.0).unwrap();
        let done = session.pointer(PointerPhase::Up, 1, 170.0, 388.0).unwrap();
        assert!(matches!(done, Outcome::GestureCommitted { .. }));

        let moved = session.editor.annotation(added.id).unwrap();
        assert_eq!(moved.x, added.x + 20.0);
        assert!(session.can_undo());
    }

    #[test]
    fn test_key_press_deletes_selection() {
        let mut session = session();
        session.toggle_add_text();
        session.click_at(100.0, 400.0).unwrap();

        let outcome = session.key_press("Delete", false).unwrap();
        assert!(matches!(outcome, Outcome::Deleted { .. }));
        assert_eq!(session.editor.annotations().len(), 0);
    }

    #[test]
    fn test_render_ticket_goes_stale_on_zoom() {
        let mut session = session();
        let ticket = RenderTicket::from(session.render_current().unwrap());
        assert_eq!((ticket.width, ticket.height), (612, 792));
        assert!(session.is_render_current());

        session.editor.set_scale(2.0).unwrap();
        assert!(!session.is_render_current());
    }

    #[test]
    fn test_execute_json_round_trip() {
        let mut session = session();
        let response = session.execute_json(r#"{"type":"nextPage"}"#);
        let value: serde_json::Value = serde_json::from_str(&response).unwrap();
        assert_eq!(value["success"], true);
        assert_eq!(value["data"]["page"], 2);
        assert_eq!(session.current_page(), 2);
    }
}
