//! Loaded document, page navigation, zoom and page rendering
//!
//! Rendering produces a raster (through a [`PageRasterizer`]) and the runs of
//! text already on the page, both at the current scale. Every page or zoom
//! change bumps a generation counter so callers can drop stale renders.

use std::collections::BTreeMap;

use lopdf::content::Content;
use lopdf::{Dictionary, Document, Object, ObjectId};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::EditorConfig;
use crate::coords::{DocRect, Viewport};
use crate::error::EditorError;
use crate::fonts::estimate_width;
use crate::model::{DocSize, RunRef, TextRun};

/// US Letter, used when a page has no usable MediaBox
pub const DEFAULT_PAGE_SIZE: DocSize = DocSize {
    width: 612.0,
    height: 792.0,
};

/// Parent chain depth limit when resolving inherited page attributes
const MAX_INHERIT_DEPTH: usize = 32;

/// RGBA8 pixel buffer
#[derive(Debug, Clone, PartialEq)]
pub struct Raster {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl Raster {
    pub fn filled(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let pixels = rgba
            .iter()
            .copied()
            .cycle()
            .take(width as usize * height as usize * 4)
            .collect();
        Self {
            width,
            height,
            pixels,
        }
    }

    pub fn to_png(&self) -> Result<Vec<u8>, EditorError> {
        let mut out = Vec::new();
        {
            let mut encoder = png::Encoder::new(&mut out, self.width, self.height);
            encoder.set_color(png::ColorType::Rgba);
            encoder.set_depth(png::BitDepth::Eight);
            let mut writer = encoder
                .write_header()
                .map_err(|e| EditorError::Render(format!("PNG header: {}", e)))?;
            writer
                .write_image_data(&self.pixels)
                .map_err(|e| EditorError::Render(format!("PNG data: {}", e)))?;
        }
        Ok(out)
    }
}

/// Draws one page of a document at a given scale
pub trait PageRasterizer {
    fn rasterize(
        &self,
        doc: &Document,
        page: u32,
        size: DocSize,
        scale: f64,
    ) -> Result<Raster, EditorError>;
}

/// Paints an empty white page of the right size. Real drawing happens in the
/// browser; this keeps the core self-contained.
#[derive(Debug, Clone, Copy, Default)]
pub struct BlankRasterizer;

impl PageRasterizer for BlankRasterizer {
    fn rasterize(
        &self,
        _doc: &Document,
        _page: u32,
        size: DocSize,
        scale: f64,
    ) -> Result<Raster, EditorError> {
        let width = (size.width * scale).ceil();
        let height = (size.height * scale).ceil();
        if !(width >= 1.0 && height >= 1.0) || width > 16384.0 || height > 16384.0 {
            return Err(EditorError::Render(format!(
                "cannot rasterize a {}x{} page",
                width, height
            )));
        }
        Ok(Raster::filled(width as u32, height as u32, [255, 255, 255, 255]))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderedPage {
    pub page: u32,
    pub scale: f64,
    pub generation: u64,
    pub viewport: Viewport,
    pub raster: Raster,
    pub text_runs: Vec<TextRun>,
}

/// Summary handed to the UI after loading
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentInfo {
    pub name: String,
    pub page_count: u32,
    pub current_page: u32,
    pub scale: f64,
    pub page_width: f64,
    pub page_height: f64,
}

/// A run located in document space before projection
#[derive(Debug, Clone, PartialEq)]
struct RawRun {
    text: String,
    rect: DocRect,
    font_size: f64,
    font_name: Option<String>,
}

pub struct DocumentSession {
    name: String,
    bytes: Vec<u8>,
    doc: Document,
    pages: BTreeMap<u32, ObjectId>,
    current_page: u32,
    scale: f64,
    min_scale: f64,
    max_scale: f64,
    zoom_step: f64,
    generation: u64,
    /// Extracted runs per page, in document space
    run_cache: BTreeMap<u32, Vec<RawRun>>,
}

impl std::fmt::Debug for DocumentSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentSession")
            .field("name", &self.name)
            .field("page_count", &self.page_count())
            .field("current_page", &self.current_page)
            .field("scale", &self.scale)
            .field("generation", &self.generation)
            .finish()
    }
}

impl DocumentSession {
    pub fn load(name: &str, bytes: &[u8], config: &EditorConfig) -> Result<Self, EditorError> {
        if bytes.is_empty() {
            return Err(EditorError::Load("empty file".to_string()));
        }
        let doc = Document::load_mem(bytes).map_err(|e| EditorError::Load(e.to_string()))?;
        let pages = doc.get_pages();
        if pages.is_empty() {
            return Err(EditorError::Load("document has no pages".to_string()));
        }

        info!(name, pages = pages.len(), bytes = bytes.len(), "document loaded");
        Ok(Self {
            name: name.to_string(),
            bytes: bytes.to_vec(),
            doc,
            pages,
            current_page: 1,
            scale: config.clamp_scale(config.default_scale),
            min_scale: config.min_scale,
            max_scale: config.max_scale,
            zoom_step: config.zoom_step,
            generation: 0,
            run_cache: BTreeMap::new(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn document(&self) -> &Document {
        &self.doc
    }

    /// The bytes the session was loaded from
    pub fn original_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn page_count(&self) -> u32 {
        self.pages.len() as u32
    }

    pub fn current_page(&self) -> u32 {
        self.current_page
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn info(&self) -> DocumentInfo {
        let size = self.current_page_size();
        DocumentInfo {
            name: self.name.clone(),
            page_count: self.page_count(),
            current_page: self.current_page,
            scale: self.scale,
            page_width: size.width,
            page_height: size.height,
        }
    }

    /// Page size in document units from the (possibly inherited) MediaBox
    pub fn page_size(&self, page: u32) -> Result<DocSize, EditorError> {
        let page_id = self.page_id(page)?;
        Ok(media_box(&self.doc, page_id).unwrap_or(DEFAULT_PAGE_SIZE))
    }

    pub fn current_page_size(&self) -> DocSize {
        self.page_size(self.current_page)
            .unwrap_or(DEFAULT_PAGE_SIZE)
    }

    /// Viewport of the current page at the current scale
    pub fn viewport(&self) -> Viewport {
        Viewport::for_page(self.current_page_size().height, self.scale)
    }

    pub fn set_page(&mut self, page: u32) -> Result<u32, EditorError> {
        if page == 0 || page > self.page_count() {
            return Err(EditorError::InvalidPage {
                page,
                page_count: self.page_count(),
            });
        }
        if page != self.current_page {
            self.current_page = page;
            self.generation += 1;
            debug!(page, generation = self.generation, "page changed");
        }
        Ok(page)
    }

    /// Move forward one page; stays put on the last page
    pub fn next_page(&mut self) -> u32 {
        let page = (self.current_page + 1).min(self.page_count());
        self.set_page(page).unwrap_or(self.current_page)
    }

    /// Move back one page; stays put on the first page
    pub fn prev_page(&mut self) -> u32 {
        let page = self.current_page.saturating_sub(1).max(1);
        self.set_page(page).unwrap_or(self.current_page)
    }

    pub fn set_scale(&mut self, scale: f64) -> f64 {
        let clamped = if scale.is_finite() {
            scale.clamp(self.min_scale, self.max_scale)
        } else {
            self.scale
        };
        if clamped != self.scale {
            self.scale = clamped;
            self.generation += 1;
            debug!(scale = clamped, generation = self.generation, "scale changed");
        }
        self.scale
    }

    pub fn zoom_in(&mut self) -> f64 {
        self.set_scale(round_scale(self.scale + self.zoom_step))
    }

    pub fn zoom_out(&mut self) -> f64 {
        self.set_scale(round_scale(self.scale - self.zoom_step))
    }

    /// True while `rendered` still matches the current page and scale
    pub fn is_current(&self, rendered: &RenderedPage) -> bool {
        rendered.generation == self.generation
    }

    /// Text runs of the current page projected at the current scale
    pub fn text_runs(&mut self) -> Result<Vec<TextRun>, EditorError> {
        let page = self.current_page;
        let viewport = self.viewport();
        let raw = self.raw_runs(page)?;
        Ok(project_raw_runs(page, raw, viewport))
    }

    pub fn render(&mut self, rasterizer: &dyn PageRasterizer) -> Result<RenderedPage, EditorError> {
        let page = self.current_page;
        let size = self.page_size(page)?;
        let raster = rasterizer.rasterize(&self.doc, page, size, self.scale)?;
        let text_runs = self.text_runs()?;

        debug!(page, scale = self.scale, runs = text_runs.len(), "page rendered");
        Ok(RenderedPage {
            page,
            scale: self.scale,
            generation: self.generation,
            viewport: self.viewport(),
            raster,
            text_runs,
        })
    }

    fn page_id(&self, page: u32) -> Result<ObjectId, EditorError> {
        self.pages
            .get(&page)
            .copied()
            .ok_or(EditorError::InvalidPage {
                page,
                page_count: self.page_count(),
            })
    }

    fn raw_runs(&mut self, page: u32) -> Result<&[RawRun], EditorError> {
        if !self.run_cache.contains_key(&page) {
            let page_id = self.page_id(page)?;
            let runs = extract_runs(&self.doc, page_id)?;
            self.run_cache.insert(page, runs);
        }
        Ok(self
            .run_cache
            .get(&page)
            .map(Vec::as_slice)
            .unwrap_or_default())
    }
}

/// Snap to two decimals so repeated zoom steps don't drift (1.2 + 0.2 = 1.4)
fn round_scale(scale: f64) -> f64 {
    (scale * 100.0).round() / 100.0
}

fn project_raw_runs(page: u32, raw: &[RawRun], viewport: Viewport) -> Vec<TextRun> {
    raw.iter()
        .enumerate()
        .map(|(index, run)| TextRun {
            run: RunRef { page, index },
            text: run.text.clone(),
            rect: viewport.rect_to_display(&run.rect),
            font_size_px: viewport.length_to_display(run.font_size),
            font_name: run.font_name.clone(),
        })
        .collect()
}

pub(crate) fn resolve<'a>(doc: &'a Document, obj: &'a Object) -> Option<&'a Object> {
    match obj {
        Object::Reference(id) => doc.get_object(*id).ok(),
        other => Some(other),
    }
}

pub(crate) fn resolve_dict<'a>(doc: &'a Document, obj: &'a Object) -> Option<&'a Dictionary> {
    resolve(doc, obj)?.as_dict().ok()
}

/// Look up a page attribute, following the Parent chain for inherited keys
pub(crate) fn inherited<'a>(doc: &'a Document, page_id: ObjectId, key: &[u8]) -> Option<&'a Object> {
    let mut dict = doc.get_object(page_id).ok()?.as_dict().ok()?;
    for _ in 0..MAX_INHERIT_DEPTH {
        if let Ok(value) = dict.get(key) {
            return resolve(doc, value);
        }
        dict = resolve_dict(doc, dict.get(b"Parent").ok()?)?;
    }
    None
}

pub(crate) fn number(obj: &Object) -> Option<f64> {
    match obj {
        Object::Integer(i) => Some(*i as f64),
        Object::Real(r) => Some(f64::from(*r)),
        _ => None,
    }
}

fn media_box(doc: &Document, page_id: ObjectId) -> Option<DocSize> {
    let values = inherited(doc, page_id, b"MediaBox")?.as_array().ok()?;
    if values.len() < 4 {
        return None;
    }
    let coords: Vec<f64> = values
        .iter()
        .filter_map(|v| resolve(doc, v).and_then(number))
        .collect();
    if coords.len() < 4 {
        return None;
    }
    let width = (coords[2] - coords[0]).abs();
    let height = (coords[3] - coords[1]).abs();
    (width > 0.0 && height > 0.0).then_some(DocSize { width, height })
}

/// Resource name → BaseFont for the fonts a page can use
fn page_font_names(doc: &Document, page_id: ObjectId) -> BTreeMap<Vec<u8>, String> {
    let mut names = BTreeMap::new();
    let fonts = inherited(doc, page_id, b"Resources")
        .and_then(|r| r.as_dict().ok())
        .and_then(|r| r.get(b"Font").ok())
        .and_then(|f| resolve_dict(doc, f));

    if let Some(fonts) = fonts {
        for (key, value) in fonts.iter() {
            let base = resolve_dict(doc, value)
                .and_then(|font| font.get(b"BaseFont").ok())
                .and_then(|name| name.as_name().ok())
                .map(|name| String::from_utf8_lossy(name).into_owned());
            if let Some(base) = base {
                names.insert(key.clone(), base);
            }
        }
    }
    names
}

/// Affine matrix `[a b c d e f]`, row-vector convention as in the PDF imaging model
type Matrix = [f64; 6];

const IDENTITY: Matrix = [1.0, 0.0, 0.0, 1.0, 0.0, 0.0];

/// `m1` applied first, then `m2`
fn concat(m1: &Matrix, m2: &Matrix) -> Matrix {
    [
        m1[0] * m2[0] + m1[1] * m2[2],
        m1[0] * m2[1] + m1[1] * m2[3],
        m1[2] * m2[0] + m1[3] * m2[2],
        m1[2] * m2[1] + m1[3] * m2[3],
        m1[4] * m2[0] + m1[5] * m2[2] + m2[4],
        m1[4] * m2[1] + m1[5] * m2[3] + m2[5],
    ]
}

fn x_scale(m: &Matrix) -> f64 {
    (m[0] * m[0] + m[1] * m[1]).sqrt()
}

fn y_scale(m: &Matrix) -> f64 {
    (m[2] * m[2] + m[3] * m[3]).sqrt()
}

/// The part of the graphics state that `q`/`Q` save and restore and that
/// run placement depends on
#[derive(Debug, Clone)]
struct GraphicsState {
    ctm: Matrix,
    font_size: f64,
    leading: f64,
    font_name: Option<String>,
}

impl Default for GraphicsState {
    fn default() -> Self {
        Self {
            ctm: IDENTITY,
            font_size: 12.0,
            leading: 0.0,
            font_name: None,
        }
    }
}

/// State while walking a content stream
#[derive(Debug)]
struct TextState {
    gs: GraphicsState,
    saved: Vec<GraphicsState>,
    /// Text matrix
    tm: Matrix,
    /// Text line matrix
    tlm: Matrix,
}

impl Default for TextState {
    fn default() -> Self {
        Self {
            gs: GraphicsState::default(),
            saved: Vec::new(),
            tm: IDENTITY,
            tlm: IDENTITY,
        }
    }
}

impl TextState {
    fn save(&mut self) {
        self.saved.push(self.gs.clone());
    }

    fn restore(&mut self) {
        match self.saved.pop() {
            Some(gs) => self.gs = gs,
            None => debug!("unbalanced Q in content stream"),
        }
    }

    fn begin_text(&mut self) {
        self.tm = IDENTITY;
        self.tlm = IDENTITY;
    }

    fn next_line(&mut self, tx: f64, ty: f64) {
        let m = self.tlm;
        self.tlm[4] = m[4] + tx * m[0] + ty * m[2];
        self.tlm[5] = m[5] + tx * m[1] + ty * m[3];
        self.tm = self.tlm;
    }

    /// Text space to page space
    fn rendering_matrix(&self) -> Matrix {
        concat(&self.tm, &self.gs.ctm)
    }

    /// Move the text matrix past `advance` unscaled text-space units
    fn advance(&mut self, advance: f64) {
        self.tm[4] += advance * self.tm[0];
        self.tm[5] += advance * self.tm[1];
    }
}

fn positive_or(value: f64, fallback: f64) -> f64 {
    if value > 0.0 && value.is_finite() {
        value
    } else {
        fallback
    }
}

fn operand_numbers(operands: &[Object]) -> Vec<f64> {
    operands.iter().filter_map(number).collect()
}

fn extract_runs(doc: &Document, page_id: ObjectId) -> Result<Vec<RawRun>, EditorError> {
    let content = match doc.get_page_content(page_id) {
        Ok(content) => content,
        Err(e) => {
            warn!(?page_id, error = %e, "page has no readable content stream");
            return Ok(Vec::new());
        }
    };
    let content = Content::decode(&content)
        .map_err(|e| EditorError::Render(format!("content stream: {}", e)))?;
    let fonts = page_font_names(doc, page_id);

    let mut runs = Vec::new();
    let mut state = TextState::default();

    for op in &content.operations {
        let nums = operand_numbers(&op.operands);
        match op.operator.as_str() {
            "q" => state.save(),
            "Q" => state.restore(),
            "cm" if nums.len() >= 6 => {
                let m = [nums[0], nums[1], nums[2], nums[3], nums[4], nums[5]];
                state.gs.ctm = concat(&m, &state.gs.ctm);
            }
            "BT" => state.begin_text(),
            "Tf" => {
                if let Some(Object::Name(key)) = op.operands.first() {
                    state.gs.font_name = fonts.get(key).cloned();
                }
                if let Some(size) = nums.first() {
                    state.gs.font_size = *size;
                }
            }
            "TL" => {
                if let Some(leading) = nums.first() {
                    state.gs.leading = *leading;
                }
            }
            "Tm" if nums.len() >= 6 => {
                let matrix = [nums[0], nums[1], nums[2], nums[3], nums[4], nums[5]];
                state.tm = matrix;
                state.tlm = matrix;
            }
            "Td" if nums.len() >= 2 => state.next_line(nums[0], nums[1]),
            "TD" if nums.len() >= 2 => {
                state.gs.leading = -nums[1];
                state.next_line(nums[0], nums[1]);
            }
            "T*" => state.next_line(0.0, -state.gs.leading),
            "Tj" | "TJ" => {
                let text = op.operands.first().map(decode_operand).unwrap_or_default();
                push_run(&mut runs, &mut state, text);
            }
            "'" => {
                state.next_line(0.0, -state.gs.leading);
                let text = op.operands.first().map(decode_operand).unwrap_or_default();
                push_run(&mut runs, &mut state, text);
            }
            "\"" => {
                state.next_line(0.0, -state.gs.leading);
                let text = op.operands.get(2).map(decode_operand).unwrap_or_default();
                push_run(&mut runs, &mut state, text);
            }
            _ => {}
        }
    }

    Ok(runs)
}

/// Record a run at the current text position, in page space
fn push_run(runs: &mut Vec<RawRun>, state: &mut TextState, text: String) {
    let font_size = state.gs.font_size.abs();
    let advance = estimate_width(&text, font_size);

    if !text.trim().is_empty() {
        let trm = state.rendering_matrix();
        let size = positive_or(font_size * y_scale(&trm), 1.0);
        runs.push(RawRun {
            rect: DocRect {
                x: trm[4],
                y: trm[5],
                width: advance * positive_or(x_scale(&trm), 1.0),
                height: size,
            },
            text,
            font_size: size,
            font_name: state.gs.font_name.clone(),
        });
    }
    state.advance(advance);
}

/// Decode a Tj string or TJ array. Large negative kerning becomes a space.
fn decode_operand(operand: &Object) -> String {
    match operand {
        Object::String(bytes, _) => decode_pdf_string(bytes),
        Object::Array(items) => {
            let mut text = String::new();
            for item in items {
                match item {
                    Object::String(bytes, _) => text.push_str(&decode_pdf_string(bytes)),
                    other => {
                        if number(other).is_some_and(|n| n < -100.0) {
                            text.push(' ');
                        }
                    }
                }
            }
            text
        }
        _ => String::new(),
    }
}

fn decode_pdf_string(bytes: &[u8]) -> String {
    if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
        let units: Vec<u16> = bytes[2..]
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        return String::from_utf16_lossy(&units);
    }
    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => bytes.iter().map(|&b| b as char).collect(),
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::{pdf_with_content, pdf_with_text, simple_pdf};
    use super::*;
    use pretty_assertions::assert_eq;

    fn load(bytes: &[u8]) -> DocumentSession {
        DocumentSession::load("test.pdf", bytes, &EditorConfig::default()).unwrap()
    }

    #[test]
    fn test_load_rejects_garbage() {
        let config = EditorConfig::default();
        assert!(matches!(
            DocumentSession::load("x.pdf", b"not a pdf", &config),
            Err(EditorError::Load(_))
        ));
        assert!(matches!(
            DocumentSession::load("x.pdf", b"", &config),
            Err(EditorError::Load(_))
        ));
    }

    #[test]
    fn test_page_count_and_inherited_media_box() {
        let session = load(&simple_pdf(3));
        assert_eq!(session.page_count(), 3);
        assert_eq!(session.current_page(), 1);
        assert_eq!(session.page_size(2).unwrap(), DocSize::new(612.0, 792.0));
        assert!(matches!(
            session.page_size(4),
            Err(EditorError::InvalidPage { page: 4, page_count: 3 })
        ));
    }

    #[test]
    fn test_navigation_is_bounded() {
        let mut session = load(&simple_pdf(2));
        assert_eq!(session.prev_page(), 1);
        assert_eq!(session.next_page(), 2);
        assert_eq!(session.next_page(), 2);
        assert!(session.set_page(0).is_err());
        assert!(session.set_page(3).is_err());
    }

    #[test]
    fn test_zoom_steps_and_clamps() {
        let mut session = load(&simple_pdf(1));
        assert_eq!(session.scale(), 1.2);
        assert_eq!(session.zoom_in(), 1.4);
        assert_eq!(session.zoom_out(), 1.2);

        for _ in 0..20 {
            session.zoom_in();
        }
        assert_eq!(session.scale(), 3.0);
        for _ in 0..20 {
            session.zoom_out();
        }
        assert_eq!(session.scale(), 0.5);
    }

    #[test]
    fn test_generation_marks_stale_renders() {
        let mut session = load(&simple_pdf(2));
        let rendered = session.render(&BlankRasterizer).unwrap();
        assert!(session.is_current(&rendered));

        session.next_page();
        assert!(!session.is_current(&rendered));

        let again = session.render(&BlankRasterizer).unwrap();
        session.set_scale(2.0);
        assert!(!session.is_current(&again));
    }

    #[test]
    fn test_render_raster_matches_scaled_page() {
        let mut session = load(&simple_pdf(1));
        session.set_scale(1.0);
        let rendered = session.render(&BlankRasterizer).unwrap();
        assert_eq!((rendered.raster.width, rendered.raster.height), (612, 792));
        assert_eq!(rendered.raster.pixels.len(), 612 * 792 * 4);

        let png = rendered.raster.to_png().unwrap();
        assert_eq!(&png[1..4], b"PNG");
    }

    #[test]
    fn test_text_runs_are_projected_at_current_scale() {
        let bytes = pdf_with_text(&[vec![
            (72.0, 700.0, 12.0, "Hello"),
            (72.0, 680.0, 10.0, "World"),
        ]]);
        let mut session = load(&bytes);
        session.set_scale(2.0);

        let runs = session.text_runs().unwrap();
        assert_eq!(runs.len(), 2);
        assert_eq!(runs[0].text, "Hello");
        assert_eq!(runs[0].run, RunRef { page: 1, index: 0 });
        assert_eq!(runs[0].font_name.as_deref(), Some("Helvetica"));
        assert_eq!(runs[0].font_size_px, 24.0);
        assert_eq!(runs[0].rect.left, 144.0);
        // Baseline at y=700 → bottom edge at (792 - 700) * 2 from the top
        assert_eq!(runs[0].rect.bottom(), 184.0);
        assert_eq!(runs[0].rect.width, 5.0 * 12.0 * 0.5 * 2.0);
        assert_eq!(runs[1].run.index, 1);
    }

    fn runs_of(content: &[u8]) -> Vec<TextRun> {
        let mut session = load(&pdf_with_content(&[content.to_vec()]));
        session.set_scale(1.0);
        session.text_runs().unwrap()
    }

    #[test]
    fn test_runs_follow_page_transform() {
        let runs = runs_of(b"q 2 0 0 2 0 0 cm BT /F1 6 Tf 36 350 Td (Hello) Tj ET Q");
        assert_eq!(runs.len(), 1);
        let rect = runs[0].rect;
        assert_eq!(rect.left, 72.0);
        assert_eq!(rect.bottom(), 92.0);
        assert_eq!(rect.height, 12.0);
        assert_eq!(rect.width, 30.0);
        assert_eq!(runs[0].font_size_px, 12.0);
    }

    #[test]
    fn test_translated_page_transform() {
        let runs = runs_of(b"1 0 0 1 50 100 cm BT /F1 10 Tf 20 600 Td (Moved) Tj ET");
        assert_eq!(runs[0].rect.left, 70.0);
        assert_eq!(runs[0].rect.bottom(), 792.0 - 700.0);
        assert_eq!(runs[0].font_size_px, 10.0);
    }

    #[test]
    fn test_restore_drops_nested_transform() {
        let runs = runs_of(
            b"q 1 0 0 1 100 0 cm q 3 0 0 3 0 0 cm Q BT /F1 12 Tf 0 700 Td (Inner) Tj ET Q \
              BT /F1 12 Tf 72 500 Td (Outer) Tj ET",
        );
        assert_eq!(runs.len(), 2);
        assert_eq!(runs[0].text, "Inner");
        assert_eq!(runs[0].rect.left, 100.0);
        assert_eq!(runs[0].font_size_px, 12.0);
        assert_eq!(runs[1].text, "Outer");
        assert_eq!(runs[1].rect.left, 72.0);
        assert_eq!(runs[1].rect.bottom(), 292.0);
    }

    #[test]
    fn test_restore_brings_back_font_size() {
        let runs = runs_of(b"BT /F1 10 Tf 72 700 Td q /F1 30 Tf Q (Small) Tj ET");
        assert_eq!(runs[0].font_size_px, 10.0);
    }

    #[test]
    fn test_unbalanced_restore_is_ignored() {
        let runs = runs_of(b"Q Q BT /F1 12 Tf 72 700 Td (Still) Tj ET");
        assert_eq!(runs[0].rect.left, 72.0);
    }

    #[test]
    fn test_decode_pdf_string_variants() {
        assert_eq!(decode_pdf_string(b"plain"), "plain");
        assert_eq!(decode_pdf_string(&[0xFE, 0xFF, 0x00, 0x41, 0x00, 0x42]), "AB");
        assert_eq!(decode_pdf_string(&[0x43, 0x61, 0x66, 0xE9]), "Café");
    }

    #[test]
    fn test_tj_array_kerning_becomes_space() {
        let operand = Object::Array(vec![
            Object::string_literal("Hello"),
            Object::Integer(-250),
            Object::string_literal("World"),
            Object::Integer(-20),
            Object::string_literal("!"),
        ]);
        assert_eq!(decode_operand(&operand), "Hello World!");
    }
}
