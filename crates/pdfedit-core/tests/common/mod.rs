//! Shared fixtures for the integration tests

#![allow(dead_code)]

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use pdfedit_core::{DisplayPoint, Editor, InputEvent, Outcome, PointerTarget};
use tracing_subscriber::EnvFilter;

/// Route engine logs through the test harness; `RUST_LOG=pdfedit_core=debug` to see them
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter(EnvFilter::from_default_env())
        .try_init();
}

/// A letter-size PDF with one line of Helvetica text per page
pub fn letter_pdf(lines: &[&str]) -> Vec<u8> {
    let contents: Vec<Vec<u8>> = lines
        .iter()
        .map(|text| {
            Content {
                operations: vec![
                    Operation::new("BT", vec![]),
                    Operation::new("Tf", vec!["F1".into(), 12.into()]),
                    Operation::new("Td", vec![72.into(), 700.into()]),
                    Operation::new("Tj", vec![Object::string_literal(*text)]),
                    Operation::new("ET", vec![]),
                ],
            }
            .encode()
            .expect("encode content")
        })
        .collect();
    pdf_from_content(&contents)
}

/// A letter-size PDF built from raw content streams, Helvetica bound to `/F1`
pub fn pdf_from_content(pages: &[Vec<u8>]) -> Vec<u8> {
    let mut doc = Document::with_version("1.7");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });

    let mut kids = Vec::new();
    for content in pages {
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.clone()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            "Contents" => content_id,
            "Resources" => dictionary! {
                "Font" => dictionary! { "F1" => font_id },
            },
        });
        kids.push(Object::Reference(page_id));
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).expect("save pdf");
    bytes
}

/// Editor with `pages` pages loaded at 100% zoom
pub fn editor(pages: usize) -> Editor {
    init_tracing();
    let lines: Vec<String> = (1..=pages).map(|p| format!("Page {}", p)).collect();
    let refs: Vec<&str> = lines.iter().map(String::as_str).collect();
    let mut editor = Editor::default();
    editor.load("fixture.pdf", &letter_pdf(&refs)).expect("load fixture");
    editor.set_scale(1.0).expect("set scale");
    editor
}

/// Press, move and release one pointer, resolving the target by hit test
pub fn drag(editor: &mut Editor, from: DisplayPoint, to: DisplayPoint) -> Outcome {
    let target = editor.hit_test(from).expect("hit test");
    assert_ne!(target, PointerTarget::Canvas, "drag must start on a box");
    editor
        .dispatch(InputEvent::PointerDown {
            pointer_id: 1,
            target,
            position: from,
        })
        .expect("pointer down");
    editor
        .dispatch(InputEvent::PointerMove {
            pointer_id: 1,
            position: to,
        })
        .expect("pointer move");
    editor
        .dispatch(InputEvent::PointerUp {
            pointer_id: 1,
            position: to,
        })
        .expect("pointer up")
}
