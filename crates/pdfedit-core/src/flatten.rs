//! Flatten session edits into the output PDF
//!
//! Works on a clone of the loaded document. Covers and replacement text for
//! existing runs, then every annotation, are drawn into one extra content
//! stream per page. The page's original content is wrapped in `q`/`Q` so any
//! graphics state it leaves behind can't leak into the drawing.

use std::collections::{BTreeMap, BTreeSet};

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream, StringFormat};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::EditorConfig;
use crate::coords::DocRect;
use crate::document::{inherited, resolve_dict};
use crate::error::EditorError;
use crate::fonts::{encode_latin1, StandardFont};
use crate::model::{Annotation, ExistingTextEdit};
use crate::store::AnnotationStore;

/// Baseline-to-baseline distance as a multiple of the font size
pub const LINE_HEIGHT: f64 = 1.2;

/// Extra cover below a run's baseline for descenders, as a share of the font size
const DESCENT: f64 = 0.25;

/// The flattened output, ready to hand to the browser
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportedDocument {
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// Drawing queued for one page
#[derive(Debug, Default)]
struct PagePaint {
    operations: Vec<Operation>,
    fonts: BTreeSet<StandardFont>,
}

/// Write every annotation and existing-text edit in `store` onto a copy of `doc`
pub fn flatten(
    doc: &Document,
    store: &AnnotationStore,
    config: &EditorConfig,
) -> Result<Vec<u8>, EditorError> {
    let mut doc = doc.clone();
    let pages = doc.get_pages();
    let page_count = pages.len() as u32;

    let mut paint: BTreeMap<u32, PagePaint> = BTreeMap::new();

    for edit in store.text_edits() {
        if edit.page() > page_count || edit.page() == 0 {
            warn!(page = edit.page(), page_count, "text edit on a missing page skipped");
            continue;
        }
        paint_text_edit(paint.entry(edit.page()).or_default(), edit, config);
    }

    for annotation in store.annotations() {
        if annotation.page > page_count || annotation.page == 0 {
            warn!(id = %annotation.id, page = annotation.page, page_count, "annotation on a missing page skipped");
            continue;
        }
        paint_annotation(paint.entry(annotation.page).or_default(), annotation);
    }

    let mut font_ids: BTreeMap<StandardFont, ObjectId> = BTreeMap::new();
    for (page, page_paint) in paint {
        if page_paint.operations.is_empty() {
            continue;
        }
        let Some(&page_id) = pages.get(&page) else {
            continue;
        };

        for font in &page_paint.fonts {
            font_ids.entry(*font).or_insert_with(|| {
                doc.add_object(dictionary! {
                    "Type" => "Font",
                    "Subtype" => "Type1",
                    "BaseFont" => font.base_font(),
                    "Encoding" => "WinAnsiEncoding",
                })
            });
        }
        let page_fonts: Vec<(String, ObjectId)> = page_paint
            .fonts
            .iter()
            .filter_map(|f| font_ids.get(f).map(|id| (f.resource_key(), *id)))
            .collect();

        append_to_page(&mut doc, page_id, page_paint.operations, &page_fonts)?;
    }

    let mut output = Vec::new();
    doc.save_to(&mut output)
        .map_err(|e| EditorError::Export(e.to_string()))?;

    info!(
        annotations = store.len(),
        text_edits = store.text_edits().len(),
        bytes = output.len(),
        "document flattened"
    );
    Ok(output)
}

fn real(value: f64) -> Object {
    Object::Real(value as f32)
}

fn paint_text_edit(paint: &mut PagePaint, edit: &ExistingTextEdit, config: &EditorConfig) {
    let rect = edit.document_rect();
    let font_size = edit.document_font_size();
    let descent = font_size * DESCENT;
    let cover = DocRect {
        x: rect.x,
        y: rect.y - descent,
        width: rect.width,
        height: rect.height + descent,
    }
    .padded(config.cover_padding);

    paint.operations.extend([
        Operation::new("q", vec![]),
        Operation::new("rg", vec![real(1.0), real(1.0), real(1.0)]),
        Operation::new(
            "re",
            vec![real(cover.x), real(cover.y), real(cover.width), real(cover.height)],
        ),
        Operation::new("f", vec![]),
        Operation::new("Q", vec![]),
    ]);

    if edit.is_erase_only() {
        return;
    }
    let font = StandardFont::for_optional_name(edit.font_name.as_deref());
    paint.fonts.insert(font);
    show_text(&mut paint.operations, font, font_size, rect.x, rect.y, &edit.replacement);
}

fn paint_annotation(paint: &mut PagePaint, annotation: &Annotation) {
    if annotation.text.trim().is_empty() {
        return;
    }
    let font = StandardFont::HELVETICA;
    paint.fonts.insert(font);

    let step = annotation.font_size * LINE_HEIGHT;
    for (i, line) in annotation.text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let y = annotation.y - step * i as f64;
        show_text(&mut paint.operations, font, annotation.font_size, annotation.x, y, line);
    }
}

fn show_text(ops: &mut Vec<Operation>, font: StandardFont, size: f64, x: f64, y: f64, text: &str) {
    ops.extend([
        Operation::new("BT", vec![]),
        Operation::new("rg", vec![real(0.0), real(0.0), real(0.0)]),
        Operation::new(
            "Tf",
            vec![Object::Name(font.resource_key().into_bytes()), real(size)],
        ),
        Operation::new("Td", vec![real(x), real(y)]),
        Operation::new(
            "Tj",
            vec![Object::String(encode_latin1(text), StringFormat::Literal)],
        ),
        Operation::new("ET", vec![]),
    ]);
}

/// Content stream ids currently drawn by a page
fn content_ids(doc: &Document, page: &Dictionary) -> Vec<Object> {
    match page.get(b"Contents") {
        Ok(Object::Reference(id)) => match doc.get_object(*id) {
            // An indirect array of streams
            Ok(Object::Array(items)) => items.clone(),
            _ => vec![Object::Reference(*id)],
        },
        Ok(Object::Array(items)) => items.clone(),
        _ => Vec::new(),
    }
}

/// Page resources with our fonts merged into a private copy of the Font dictionary
fn merged_resources(doc: &Document, page_id: ObjectId, fonts: &[(String, ObjectId)]) -> Dictionary {
    let mut resources = inherited(doc, page_id, b"Resources")
        .and_then(|r| r.as_dict().ok())
        .cloned()
        .unwrap_or_default();

    let mut font_dict = resources
        .get(b"Font")
        .ok()
        .and_then(|f| resolve_dict(doc, f))
        .cloned()
        .unwrap_or_default();
    for (key, id) in fonts {
        font_dict.set(key.as_bytes().to_vec(), Object::Reference(*id));
    }
    resources.set("Font", Object::Dictionary(font_dict));
    resources
}

fn append_to_page(
    doc: &mut Document,
    page_id: ObjectId,
    operations: Vec<Operation>,
    fonts: &[(String, ObjectId)],
) -> Result<(), EditorError> {
    let page_dict = doc
        .get_object(page_id)
        .and_then(Object::as_dict)
        .map_err(|e| EditorError::Export(format!("page object: {}", e)))?;
    let existing = content_ids(doc, page_dict);
    let resources = merged_resources(doc, page_id, fonts);

    let encoded = Content { operations }
        .encode()
        .map_err(|e| EditorError::Export(format!("content stream: {}", e)))?;

    let mut contents = Vec::with_capacity(existing.len() + 2);
    let mut drawing = Vec::with_capacity(encoded.len() + 3);
    if !existing.is_empty() {
        let save_id = doc.add_object(Stream::new(dictionary! {}, b"q\n".to_vec()));
        contents.push(Object::Reference(save_id));
        contents.extend(existing);
        drawing.extend_from_slice(b"\nQ\n");
    }
    drawing.extend(encoded);
    let drawing_id = doc.add_object(Stream::new(dictionary! {}, drawing));
    contents.push(Object::Reference(drawing_id));

    match doc.get_object_mut(page_id) {
        Ok(Object::Dictionary(page)) => {
            page.set("Contents", Object::Array(contents));
            page.set("Resources", Object::Dictionary(resources));
            Ok(())
        }
        Ok(_) => Err(EditorError::Export("page is not a dictionary".to_string())),
        Err(e) => Err(EditorError::Export(e.to_string())),
    }
}
