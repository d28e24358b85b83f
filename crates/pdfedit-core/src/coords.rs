//! Coordinate transformation between display space and document space
//!
//! Document space: PDF user units, origin at the page's bottom-left, Y up,
//! independent of zoom. Display space: pixels, origin at the page's top-left,
//! Y down, scaled by the current zoom. `page_bottom` is the display-space Y of
//! the page's bottom edge (page height × scale for an unpadded canvas).

use serde::{Deserialize, Serialize};

/// A point in display space (pixels, top-left origin)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DisplayPoint {
    pub left: f64,
    pub top: f64,
}

impl DisplayPoint {
    pub fn new(left: f64, top: f64) -> Self {
        Self { left, top }
    }
}

/// A point in document space (PDF units, bottom-left origin)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DocPoint {
    pub x: f64,
    pub y: f64,
}

impl DocPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned rectangle in display space, anchored at its top-left corner
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DisplayRect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl DisplayRect {
    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    pub fn contains(&self, point: DisplayPoint) -> bool {
        point.left >= self.left
            && point.left <= self.right()
            && point.top >= self.top
            && point.top <= self.bottom()
    }

    /// Square of side `size` centered on `center`
    pub fn centered(center: DisplayPoint, size: f64) -> Self {
        Self {
            left: center.left - size / 2.0,
            top: center.top - size / 2.0,
            width: size,
            height: size,
        }
    }
}

/// Axis-aligned rectangle in document space, anchored at its bottom-left corner
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DocRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl DocRect {
    /// Grow the rectangle by `padding` on every side
    pub fn padded(&self, padding: f64) -> Self {
        Self {
            x: self.x - padding,
            y: self.y - padding,
            width: self.width + 2.0 * padding,
            height: self.height + 2.0 * padding,
        }
    }
}

/// Convert a document-space point to display space
pub fn to_display(doc_x: f64, doc_y: f64, scale: f64, page_bottom: f64) -> DisplayPoint {
    DisplayPoint {
        left: doc_x * scale,
        top: page_bottom - doc_y * scale,
    }
}

/// Convert a display-space point to document space
pub fn to_document(display_x: f64, display_y: f64, scale: f64, page_bottom: f64) -> DocPoint {
    DocPoint {
        x: display_x / scale,
        y: (page_bottom - display_y) / scale,
    }
}

/// Zoom factor and page anchor shared by both directions of the transform
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub scale: f64,
    pub page_bottom: f64,
}

impl Viewport {
    pub fn new(scale: f64, page_bottom: f64) -> Self {
        Self { scale, page_bottom }
    }

    /// Viewport for a page of `page_height` document units drawn at `scale`
    pub fn for_page(page_height: f64, scale: f64) -> Self {
        Self {
            scale,
            page_bottom: page_height * scale,
        }
    }

    pub fn to_display(&self, point: DocPoint) -> DisplayPoint {
        to_display(point.x, point.y, self.scale, self.page_bottom)
    }

    pub fn to_document(&self, point: DisplayPoint) -> DocPoint {
        to_document(point.left, point.top, self.scale, self.page_bottom)
    }

    /// Project a document rectangle; its bottom-left becomes the display bottom-left
    pub fn rect_to_display(&self, rect: &DocRect) -> DisplayRect {
        let top_left = self.to_display(DocPoint::new(rect.x, rect.y + rect.height));
        let bottom_right = self.to_display(DocPoint::new(rect.x + rect.width, rect.y));
        DisplayRect {
            left: top_left.left,
            top: top_left.top,
            width: bottom_right.left - top_left.left,
            height: bottom_right.top - top_left.top,
        }
    }

    pub fn rect_to_document(&self, rect: &DisplayRect) -> DocRect {
        let bottom_left = self.to_document(DisplayPoint::new(rect.left, rect.bottom()));
        let top_right = self.to_document(DisplayPoint::new(rect.right(), rect.top));
        DocRect {
            x: bottom_left.x,
            y: bottom_left.y,
            width: top_right.x - bottom_left.x,
            height: top_right.y - bottom_left.y,
        }
    }

    /// Document-space offset travelled by a pointer moving from `start` to `current`
    pub fn delta_to_document(&self, start: DisplayPoint, current: DisplayPoint) -> DocPoint {
        let from = self.to_document(start);
        let to = self.to_document(current);
        DocPoint::new(to.x - from.x, to.y - from.y)
    }

    /// Display pixels spanned by `length` document units
    pub fn length_to_display(&self, length: f64) -> f64 {
        length * self.scale
    }

    /// Document units spanned by `pixels` display pixels
    pub fn length_to_document(&self, pixels: f64) -> f64 {
        pixels / self.scale
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_y_axis_flip() {
        // Letter page at 100%: doc y=100 sits 692px from the top
        let point = to_display(0.0, 100.0, 1.0, 792.0);
        assert_eq!(point.top, 692.0);
        assert_eq!(point.left, 0.0);
    }

    #[test]
    fn test_corners() {
        let viewport = Viewport::for_page(792.0, 1.5);

        let top_left = viewport.to_document(DisplayPoint::new(0.0, 0.0));
        assert!((top_left.x - 0.0).abs() < 1e-9);
        assert!((top_left.y - 792.0).abs() < 1e-9);

        let bottom_right = viewport.to_document(DisplayPoint::new(918.0, 1188.0));
        assert!((bottom_right.x - 612.0).abs() < 1e-9);
        assert!((bottom_right.y - 0.0).abs() < 1e-9);
    }

    #[test]
    fn test_rect_projection_keeps_bottom_left_anchor() {
        let viewport = Viewport::for_page(792.0, 2.0);
        let rect = DocRect {
            x: 100.0,
            y: 200.0,
            width: 60.0,
            height: 20.0,
        };

        let display = viewport.rect_to_display(&rect);
        assert_eq!(display.left, 200.0);
        assert_eq!(display.top, 1584.0 - 440.0);
        assert_eq!(display.width, 120.0);
        assert_eq!(display.height, 40.0);

        let back = viewport.rect_to_document(&display);
        assert_eq!(back, rect);
    }

    #[test]
    fn test_delta_inverts_vertical_direction() {
        let viewport = Viewport::for_page(792.0, 1.0);
        let delta =
            viewport.delta_to_document(DisplayPoint::new(10.0, 10.0), DisplayPoint::new(40.0, 0.0));
        assert_eq!(delta, DocPoint::new(30.0, 10.0));
    }

    #[test]
    fn test_delta_divides_by_scale() {
        let viewport = Viewport::for_page(792.0, 2.0);
        let delta =
            viewport.delta_to_document(DisplayPoint::new(0.0, 0.0), DisplayPoint::new(30.0, 50.0));
        assert_eq!(delta, DocPoint::new(15.0, -25.0));
    }

    #[test]
    fn test_display_rect_contains_edges() {
        let rect = DisplayRect {
            left: 10.0,
            top: 10.0,
            width: 5.0,
            height: 5.0,
        };
        assert!(rect.contains(DisplayPoint::new(10.0, 15.0)));
        assert!(!rect.contains(DisplayPoint::new(16.0, 12.0)));
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn scale() -> impl Strategy<Value = f64> {
        0.05f64..10.0
    }

    fn coordinate() -> impl Strategy<Value = f64> {
        -5000.0f64..5000.0
    }

    proptest! {
        /// Document → display → document returns the original point
        #[test]
        fn roundtrip_document_display_document(
            x in coordinate(),
            y in coordinate(),
            scale in scale(),
            page_height in 1.0f64..3000.0,
        ) {
            let page_bottom = page_height * scale;
            let display = to_display(x, y, scale, page_bottom);
            let back = to_document(display.left, display.top, scale, page_bottom);

            let tolerance = 1e-6 * (1.0 + x.abs().max(y.abs()));
            prop_assert!((back.x - x).abs() < tolerance, "X: {} vs {}", back.x, x);
            prop_assert!((back.y - y).abs() < tolerance, "Y: {} vs {}", back.y, y);
        }

        /// Display → document → display returns the original point
        #[test]
        fn roundtrip_display_document_display(
            left in coordinate(),
            top in coordinate(),
            scale in scale(),
            page_bottom in 0.0f64..30000.0,
        ) {
            let viewport = Viewport::new(scale, page_bottom);
            let back = viewport.to_display(viewport.to_document(DisplayPoint::new(left, top)));

            let tolerance = 1e-6 * (1.0 + left.abs().max(top.abs()).max(page_bottom));
            prop_assert!((back.left - left).abs() < tolerance);
            prop_assert!((back.top - top).abs() < tolerance);
        }

        /// Lengths scale linearly with zoom
        #[test]
        fn length_conversion_is_linear(length in 0.0f64..5000.0, scale in scale()) {
            let viewport = Viewport::new(scale, 0.0);
            let back = viewport.length_to_document(viewport.length_to_display(length));
            prop_assert!((back - length).abs() < 1e-6 * (1.0 + length));
        }
    }
}
