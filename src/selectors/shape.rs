//! Drawable shapes for rectangle selections.
//!
//! A rectangle is drawn as a group of two rects sharing the same geometry:
//! an outer one for the border and an inner one for the contrasting stroke.
//! The selection mask is a single even-odd path covering the whole image
//! with the selected rectangle cut out.

use crate::model::{ImageInfo, Rect};

/// Class name of the outer rect in a group.
pub const OUTER_CLASS: &str = "a9s-outer";

/// Class name of the inner rect in a group.
pub const INNER_CLASS: &str = "a9s-inner";

/// Class name of the selection mask path.
pub const MASK_CLASS: &str = "a9s-selection-mask";

/// A single `rect` element.
#[derive(Debug, Clone, PartialEq)]
pub struct RectElement {
    class: &'static str,
    x: f64,
    y: f64,
    width: f64,
    height: f64,
}

impl RectElement {
    fn new(class: &'static str, rect: Rect) -> Self {
        let mut element = Self {
            class,
            x: 0.0,
            y: 0.0,
            width: 0.0,
            height: 0.0,
        };
        element.set_xywh(rect);
        element
    }

    fn set_xywh(&mut self, rect: Rect) {
        self.x = rect.x;
        self.y = rect.y;
        self.width = rect.w;
        self.height = rect.h;
    }

    /// Class name of this element.
    pub fn class(&self) -> &str {
        self.class
    }

    /// Current geometry.
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }

    /// Render as an SVG `rect` element.
    pub fn to_svg(&self) -> String {
        format!(
            r#"<rect class="{}" x="{}" y="{}" width="{}" height="{}"/>"#,
            self.class, self.x, self.y, self.width, self.height
        )
    }
}

/// A rectangle shape: outer and inner rect with identical geometry.
#[derive(Debug, Clone, PartialEq)]
pub struct RectGroup {
    outer: RectElement,
    inner: RectElement,
}

impl RectGroup {
    /// The border rect.
    pub fn outer(&self) -> &RectElement {
        &self.outer
    }

    /// The inner stroke rect.
    pub fn inner(&self) -> &RectElement {
        &self.inner
    }

    /// Render as an SVG `g` element, outer rect first.
    pub fn to_svg(&self) -> String {
        format!("<g>{}{}</g>", self.outer.to_svg(), self.inner.to_svg())
    }
}

/// Draw a rectangle shape from raw geometry.
pub fn draw_rect(rect: Rect) -> RectGroup {
    RectGroup {
        outer: RectElement::new(OUTER_CLASS, rect),
        inner: RectElement::new(INNER_CLASS, rect),
    }
}

/// Get the geometry of a rectangle shape.
pub fn get_rect_size(group: &RectGroup) -> Rect {
    group.outer.rect()
}

/// Apply geometry to both rects of a rectangle shape.
pub fn set_rect_size(group: &mut RectGroup, rect: Rect) {
    group.inner.set_xywh(rect);
    group.outer.set_xywh(rect);
}

/// An even-odd path dimming everything outside the selection.
#[derive(Debug, Clone, PartialEq)]
pub struct RectMask {
    d: String,
}

impl RectMask {
    /// Path data.
    pub fn path(&self) -> &str {
        &self.d
    }

    /// Render as an SVG `path` element.
    pub fn to_svg(&self) -> String {
        format!(
            r#"<path class="{}" fill-rule="evenodd" d="{}"/>"#,
            MASK_CLASS, self.d
        )
    }
}

fn mask_path(image: &ImageInfo, rect: Rect) -> String {
    let (w, h) = (image.natural_width, image.natural_height);
    format!(
        "M0 0 h{w} v{h} h-{w} z M{} {} h{} v{} h-{} z",
        rect.x, rect.y, rect.w, rect.h, rect.w
    )
}

/// Draw the selection mask for the given image and selected rectangle.
pub fn draw_rect_mask(image: &ImageInfo, rect: Rect) -> RectMask {
    RectMask {
        d: mask_path(image, rect),
    }
}

/// Recompute the selection mask from the image's current natural size.
pub fn set_rect_mask_size(mask: &mut RectMask, image: &ImageInfo, rect: Rect) {
    mask.d = mask_path(image, rect);
}
