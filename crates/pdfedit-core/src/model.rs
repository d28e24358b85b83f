//! Editable objects tracked during a session
//!
//! Annotations are free-floating text boxes added by the user. Existing text
//! edits replace a run of text that was already on the page.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::coords::{DisplayRect, DocPoint, DocRect, Viewport};

/// Opaque annotation identifier, unique for the life of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnnotationId(pub u64);

impl fmt::Display for AnnotationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ann_{}", self.0)
    }
}

/// A user-added text box. Coordinates are document space, anchored bottom-left.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    pub id: AnnotationId,
    pub text: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub font_size: f64,
    /// 1-based page index
    pub page: u32,
    /// Created during this session rather than imported
    pub is_new: bool,
}

impl Annotation {
    pub fn position(&self) -> DocPoint {
        DocPoint::new(self.x, self.y)
    }

    pub fn rect(&self) -> DocRect {
        DocRect {
            x: self.x,
            y: self.y,
            width: self.width,
            height: self.height,
        }
    }
}

/// Document-space extent of a box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DocSize {
    pub width: f64,
    pub height: f64,
}

impl DocSize {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Partial update merged into an annotation by the store
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnnotationPatch {
    pub text: Option<String>,
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub font_size: Option<f64>,
}

impl AnnotationPatch {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::default()
        }
    }

    pub fn position(point: DocPoint) -> Self {
        Self {
            x: Some(point.x),
            y: Some(point.y),
            ..Self::default()
        }
    }

    /// Patch that makes an annotation match `rect` and `font_size`
    pub fn geometry(rect: DocRect, font_size: f64) -> Self {
        Self {
            x: Some(rect.x),
            y: Some(rect.y),
            width: Some(rect.width),
            height: Some(rect.height),
            font_size: Some(font_size),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// One of the eight resize handles around a box
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResizeHandle {
    Nw,
    N,
    Ne,
    E,
    Se,
    S,
    Sw,
    W,
}

impl ResizeHandle {
    pub const ALL: [ResizeHandle; 8] = [
        ResizeHandle::Nw,
        ResizeHandle::N,
        ResizeHandle::Ne,
        ResizeHandle::E,
        ResizeHandle::Se,
        ResizeHandle::S,
        ResizeHandle::Sw,
        ResizeHandle::W,
    ];

    pub fn moves_north(self) -> bool {
        matches!(self, ResizeHandle::Nw | ResizeHandle::N | ResizeHandle::Ne)
    }

    pub fn moves_south(self) -> bool {
        matches!(self, ResizeHandle::Sw | ResizeHandle::S | ResizeHandle::Se)
    }

    pub fn moves_east(self) -> bool {
        matches!(self, ResizeHandle::Ne | ResizeHandle::E | ResizeHandle::Se)
    }

    pub fn moves_west(self) -> bool {
        matches!(self, ResizeHandle::Nw | ResizeHandle::W | ResizeHandle::Sw)
    }

    /// Position of the handle as fractions of the box (0 = left/top, 1 = right/bottom)
    pub fn anchor(self) -> (f64, f64) {
        let fx = if self.moves_west() {
            0.0
        } else if self.moves_east() {
            1.0
        } else {
            0.5
        };
        let fy = if self.moves_north() {
            0.0
        } else if self.moves_south() {
            1.0
        } else {
            0.5
        };
        (fx, fy)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ResizeHandle::Nw => "nw",
            ResizeHandle::N => "n",
            ResizeHandle::Ne => "ne",
            ResizeHandle::E => "e",
            ResizeHandle::Se => "se",
            ResizeHandle::S => "s",
            ResizeHandle::Sw => "sw",
            ResizeHandle::W => "w",
        }
    }
}

/// Identity of a run of pre-existing page text: its page and extraction order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunRef {
    pub page: u32,
    pub index: usize,
}

/// A run of text already present on a rendered page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextRun {
    pub run: RunRef,
    pub text: String,
    /// Bounding box at the scale the page was rendered at
    pub rect: DisplayRect,
    /// On-screen font size in display pixels
    pub font_size_px: f64,
    /// Base font name as found in the page resources
    pub font_name: Option<String>,
}

/// Replacement of an existing text run, applied at flatten time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExistingTextEdit {
    pub run: RunRef,
    pub original_text: String,
    pub replacement: String,
    /// Run bounds in display space when the edit was committed
    pub rect: DisplayRect,
    /// Viewport the rectangle was captured in
    pub viewport: Viewport,
    pub font_size_px: f64,
    pub font_name: Option<String>,
}

impl ExistingTextEdit {
    pub fn from_run(run: &TextRun, viewport: Viewport, replacement: impl Into<String>) -> Self {
        Self {
            run: run.run,
            original_text: run.text.clone(),
            replacement: replacement.into(),
            rect: run.rect,
            viewport,
            font_size_px: run.font_size_px,
            font_name: run.font_name.clone(),
        }
    }

    pub fn page(&self) -> u32 {
        self.run.page
    }

    /// Run bounds converted back to document space
    pub fn document_rect(&self) -> DocRect {
        self.viewport.rect_to_document(&self.rect)
    }

    /// Font size in document units for the replacement text
    pub fn document_font_size(&self) -> f64 {
        self.viewport.length_to_document(self.font_size_px)
    }

    /// An empty replacement erases the run without drawing anything
    pub fn is_erase_only(&self) -> bool {
        self.replacement.trim().is_empty()
    }
}
