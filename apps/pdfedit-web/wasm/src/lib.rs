//! WASM bindings for the PDF text editor
//!
//! All editing state lives in Rust inside an [`EditSession`]; the page script
//! paints pages with pdf.js, positions overlay boxes from the projections
//! returned here, and forwards DOM events.
//!
//! ## Usage (JavaScript)
//!
//! ```javascript
//! import init, { EditSession } from './pkg/pdfedit_wasm.js';
//!
//! await init();
//!
//! const session = new EditSession();
//! const info = session.load("lease.pdf", bytes);
//! session.toggleAddText();
//! session.click(120, 340);                 // adds a text box
//! session.pointerDown(e.pointerId, x, y);  // drag / resize
//! session.pointerMove(e.pointerId, x, y);
//! session.pointerUp(e.pointerId, x, y);
//! paintOverlay(session.overlay());
//! downloadBlob(session.exportPdf(), session.exportFilename);
//! ```

pub mod edit_session;
pub mod logging;
pub mod validation;

use wasm_bindgen::prelude::*;

pub use edit_session::{EditSession, RenderTicket};
pub use validation::PdfInfo;

#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
    logging::init(tracing_subscriber::filter::LevelFilter::INFO);
}

#[wasm_bindgen]
pub fn get_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// Cheap header check before reading a whole file into a session
#[wasm_bindgen]
pub fn quick_validate(bytes: &[u8]) -> Result<(), JsValue> {
    validation::quick_validate(bytes).map_err(|e| JsValue::from_str(&e))
}

/// File summary for the open dialog, without creating a session
#[wasm_bindgen]
pub fn get_pdf_info(bytes: &[u8]) -> Result<JsValue, JsValue> {
    let info = validation::inspect(bytes).map_err(|e| JsValue::from_str(&e))?;
    serde_wasm_bindgen::to_value(&info)
        .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
}

#[wasm_bindgen]
pub fn get_page_count(bytes: &[u8]) -> Result<u32, JsValue> {
    pdfedit_core::get_page_count(bytes).map_err(|e| JsValue::from_str(&e.to_string()))
}
