//! Exported PDFs are reloaded with lopdf and inspected operator by operator

mod common;

use common::{editor, init_tracing, pdf_from_content};
use lopdf::content::{Content, Operation};
use lopdf::{Document, Object};
use pdfedit_core::{DisplayPoint, EditTarget, InputEvent, Key, Modifiers, Outcome, PointerTarget};
use pretty_assertions::assert_eq;

fn page_operations(bytes: &[u8], page: u32) -> Vec<Operation> {
    let doc = Document::load_mem(bytes).unwrap();
    let page_id = doc.get_pages()[&page];
    let content = doc.get_page_content(page_id).unwrap();
    Content::decode(&content).unwrap().operations
}

fn shown_text(ops: &[Operation]) -> Vec<String> {
    ops.iter()
        .filter(|op| op.operator == "Tj")
        .filter_map(|op| match op.operands.first() {
            Some(Object::String(bytes, _)) => Some(String::from_utf8_lossy(bytes).into_owned()),
            _ => None,
        })
        .collect()
}

fn number(object: &Object) -> f64 {
    match object {
        Object::Integer(i) => *i as f64,
        Object::Real(r) => f64::from(*r),
        other => panic!("not a number: {:?}", other),
    }
}

fn edit_run(editor: &mut pdfedit_core::Editor, replacement: &str) {
    // "Page 1" sits at (72, 700) in 12pt, top 80 on screen at 100%
    edit_run_at(editor, DisplayPoint::new(80.0, 86.0), "Page 1", replacement);
}

fn edit_run_at(
    editor: &mut pdfedit_core::Editor,
    point: DisplayPoint,
    original: &str,
    replacement: &str,
) {
    editor.set_edit_existing(true);
    let target = editor.hit_test(point).unwrap();
    assert!(matches!(target, PointerTarget::Run { .. }));

    let started = editor
        .dispatch(InputEvent::Click {
            target,
            position: point,
        })
        .unwrap();
    assert!(matches!(
        started,
        Outcome::EditStarted { target: EditTarget::Run { .. }, ref text } if text == original
    ));
    editor
        .dispatch(InputEvent::DraftChanged {
            text: replacement.to_string(),
        })
        .unwrap();
    editor
        .dispatch(InputEvent::Key {
            key: Key::Enter,
            modifiers: Modifiers::default(),
        })
        .unwrap();
}

#[test]
fn erase_only_edit_covers_without_drawing() {
    let mut editor = editor(1);
    edit_run(&mut editor, "");
    assert!(!editor.can_undo());

    let exported = editor.export().unwrap();
    assert_eq!(exported.filename, "edited.pdf");

    let ops = page_operations(&exported.bytes, 1);
    assert_eq!(shown_text(&ops), vec!["Page 1"]);

    let cover = ops.iter().find(|op| op.operator == "re").unwrap();
    let x = number(&cover.operands[0]);
    let y = number(&cover.operands[1]);
    assert!((x - 71.0).abs() < 0.01);
    assert!((y - 696.0).abs() < 0.01);
}

#[test]
fn erase_cover_lands_on_scaled_text() {
    init_tracing();
    // Glyphs end up at (72, 700) in 12pt once the 2x page transform applies
    let bytes = pdf_from_content(&[
        b"q 2 0 0 2 0 0 cm BT /F1 6 Tf 36 350 Td (Hello) Tj ET Q".to_vec(),
    ]);
    let mut editor = pdfedit_core::Editor::default();
    editor.load("scaled.pdf", &bytes).unwrap();
    editor.set_scale(1.0).unwrap();

    edit_run_at(&mut editor, DisplayPoint::new(90.0, 86.0), "Hello", "");

    let ops = page_operations(&editor.export().unwrap().bytes, 1);
    let cover = ops.iter().find(|op| op.operator == "re").unwrap();
    let [x, y, w, h] = [0, 1, 2, 3].map(|i| number(&cover.operands[i]));
    assert!((x - 71.0).abs() < 0.01);
    assert!((y - 696.0).abs() < 0.01);
    assert!(x + w >= 72.0 + 30.0);
    assert!(y + h >= 712.0);
}

#[test]
fn replacement_text_drawn_over_cover() {
    let mut editor = editor(1);
    edit_run(&mut editor, "Chapter 1");

    let ops = page_operations(&editor.export().unwrap().bytes, 1);
    assert_eq!(shown_text(&ops), vec!["Page 1", "Chapter 1"]);

    let cover = ops.iter().position(|op| op.operator == "re").unwrap();
    let replacement = ops.iter().rposition(|op| op.operator == "Tj").unwrap();
    assert!(cover < replacement);
}

#[test]
fn annotations_land_on_their_pages_only() {
    let mut editor = editor(2);
    editor.set_page(2).unwrap();
    editor.set_add_text_armed(true);
    let added = match editor
        .dispatch(InputEvent::Click {
            target: PointerTarget::Canvas,
            position: DisplayPoint::new(100.0, 400.0),
        })
        .unwrap()
    {
        Outcome::Added { annotation } => annotation,
        other => panic!("expected Added, got {:?}", other),
    };
    editor.set_text(added.id, "Signed").unwrap();

    let bytes = editor.export().unwrap().bytes;
    assert_eq!(shown_text(&page_operations(&bytes, 1)), vec!["Page 1"]);
    assert_eq!(shown_text(&page_operations(&bytes, 2)), vec!["Page 2", "Signed"]);
}

#[test]
fn export_commits_open_edit() {
    let mut editor = editor(1);
    editor.set_add_text_armed(true);
    let added = match editor
        .dispatch(InputEvent::Click {
            target: PointerTarget::Canvas,
            position: DisplayPoint::new(100.0, 400.0),
        })
        .unwrap()
    {
        Outcome::Added { annotation } => annotation,
        other => panic!("expected Added, got {:?}", other),
    };
    editor
        .dispatch(InputEvent::DoubleClick {
            target: PointerTarget::Body { id: added.id },
        })
        .unwrap();
    editor
        .dispatch(InputEvent::DraftChanged {
            text: "Draft".to_string(),
        })
        .unwrap();

    let bytes = editor.export().unwrap().bytes;
    assert_eq!(shown_text(&page_operations(&bytes, 1)), vec!["Page 1", "Draft"]);
    assert_eq!(editor.annotation(added.id).unwrap().text, "Draft");
}

#[test]
fn unedited_export_keeps_page_count() {
    let mut editor = editor(3);
    let bytes = editor.export().unwrap().bytes;
    assert_eq!(pdfedit_core::get_page_count(&bytes).unwrap(), 3);
}
