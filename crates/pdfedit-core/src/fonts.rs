//! Standard-14 font selection and text encoding for flattened output
//!
//! Embedded fonts on a page are subset and can't be trusted to contain the
//! glyphs of replacement text, so everything written by the flattener uses a
//! base-14 font picked by family and style from the original font name.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum FontFamily {
    Helvetica,
    Times,
    Courier,
}

/// A base-14 font that every viewer can draw without embedding
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct StandardFont {
    pub family: FontFamily,
    pub bold: bool,
    pub italic: bool,
}

impl Default for StandardFont {
    fn default() -> Self {
        Self::HELVETICA
    }
}

impl StandardFont {
    pub const HELVETICA: StandardFont = StandardFont {
        family: FontFamily::Helvetica,
        bold: false,
        italic: false,
    };

    /// Pick the closest standard font for a font name found in a PDF or CSS.
    ///
    /// Subset prefixes (`ABCDEF+`) and foundry suffixes are ignored; unknown
    /// names fall back to Helvetica.
    pub fn for_name(name: &str) -> Self {
        let lower = name.to_lowercase();
        let bold = lower.contains("bold") || lower.contains("black") || lower.contains("heavy");
        let italic = lower.contains("italic") || lower.contains("oblique");
        Self {
            family: family_of(&lower),
            bold,
            italic,
        }
    }

    pub fn for_optional_name(name: Option<&str>) -> Self {
        name.map(Self::for_name).unwrap_or_default()
    }

    /// PostScript name used as `/BaseFont`
    pub fn base_font(&self) -> &'static str {
        match (self.family, self.bold, self.italic) {
            (FontFamily::Helvetica, false, false) => "Helvetica",
            (FontFamily::Helvetica, true, false) => "Helvetica-Bold",
            (FontFamily::Helvetica, false, true) => "Helvetica-Oblique",
            (FontFamily::Helvetica, true, true) => "Helvetica-BoldOblique",
            (FontFamily::Times, false, false) => "Times-Roman",
            (FontFamily::Times, true, false) => "Times-Bold",
            (FontFamily::Times, false, true) => "Times-Italic",
            (FontFamily::Times, true, true) => "Times-BoldItalic",
            (FontFamily::Courier, false, false) => "Courier",
            (FontFamily::Courier, true, false) => "Courier-Bold",
            (FontFamily::Courier, false, true) => "Courier-Oblique",
            (FontFamily::Courier, true, true) => "Courier-BoldOblique",
        }
    }

    /// Name of the font entry in a page's `/Resources /Font` dictionary.
    /// Prefixed so it never collides with the page's own fonts.
    pub fn resource_key(&self) -> String {
        format!("PdfEdit-{}", self.base_font())
    }
}

fn family_of(lower: &str) -> FontFamily {
    match lower {
        "serif" => return FontFamily::Times,
        "monospace" => return FontFamily::Courier,
        "sans-serif" | "cursive" | "fantasy" => return FontFamily::Helvetica,
        _ => {}
    }

    const SERIF: [&str; 4] = ["times", "georgia", "garamond", "roman"];
    const MONO: [&str; 4] = ["courier", "mono", "consolas", "monaco"];

    // "sans" must win over the "roman"/"serif" markers (e.g. "DejaVuSans")
    if lower.contains("sans") || lower.contains("arial") || lower.contains("helvetica") {
        FontFamily::Helvetica
    } else if MONO.iter().any(|m| lower.contains(m)) {
        FontFamily::Courier
    } else if SERIF.iter().any(|s| lower.contains(s)) || lower.contains("serif") {
        FontFamily::Times
    } else {
        FontFamily::Helvetica
    }
}

/// Encode text for a base-14 font string operand.
///
/// Base-14 fonts use a single-byte encoding, so characters outside Latin-1
/// become `?`. Newlines are stripped; callers split lines beforehand.
pub fn encode_latin1(text: &str) -> Vec<u8> {
    text.chars()
        .filter(|c| *c != '\n' && *c != '\r')
        .map(|c| match u32::from(c) {
            code @ 0x20..=0xFF => code as u8,
            0x09 => b' ',
            _ => b'?',
        })
        .collect()
}

/// Rough advance width of `text` at `font_size`, half an em per character.
/// Good enough for hit boxes around extracted runs.
pub fn estimate_width(text: &str, font_size: f64) -> f64 {
    text.chars().count() as f64 * font_size * 0.5
}
