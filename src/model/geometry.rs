//! Image and rectangle geometry.

use serde::{Deserialize, Serialize};

/// The image being annotated.
///
/// Only natural (intrinsic) dimensions matter for geometry; the on-screen
/// scaled size never enters selector conversion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageInfo {
    /// URL of the image, used as the target source
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub src: Option<String>,
    /// Intrinsic width in pixels
    pub natural_width: u32,
    /// Intrinsic height in pixels
    pub natural_height: u32,
}

impl ImageInfo {
    /// Create image info with the given natural dimensions.
    pub fn new(natural_width: u32, natural_height: u32) -> Self {
        Self {
            src: None,
            natural_width,
            natural_height,
        }
    }

    /// Set the image URL.
    pub fn with_src(mut self, src: impl Into<String>) -> Self {
        self.src = Some(src.into());
        self
    }

    /// Natural width as a float.
    pub fn width(&self) -> f64 {
        f64::from(self.natural_width)
    }

    /// Natural height as a float.
    pub fn height(&self) -> f64 {
        f64::from(self.natural_height)
    }
}

/// An axis-aligned rectangle in image pixel space.
///
/// This is the canonical in-memory geometry. No bounds checks happen on
/// construction; values parsed from malformed selectors may be NaN.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    /// Left edge
    pub x: f64,
    /// Top edge
    pub y: f64,
    /// Width
    pub w: f64,
    /// Height
    pub h: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }

    /// Get the area of the rectangle.
    pub fn area(&self) -> f64 {
        self.w * self.h
    }

    /// Check if a point lies inside the rectangle (edges included).
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.x && x <= self.x + self.w && y >= self.y && y <= self.y + self.h
    }

    /// Check that all components are finite and the size is positive.
    ///
    /// Hosts call this before persisting geometry; the codec itself never does.
    pub fn is_valid(&self) -> bool {
        [self.x, self.y, self.w, self.h].iter().all(|v| v.is_finite())
            && self.w > 0.0
            && self.h > 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_contains_edges() {
        let r = Rect::new(10.0, 10.0, 20.0, 5.0);
        assert!(r.contains(10.0, 10.0));
        assert!(r.contains(30.0, 15.0));
        assert!(!r.contains(30.1, 15.0));
        assert!(!r.contains(9.9, 12.0));
    }

    #[test]
    fn test_rect_validity() {
        assert!(Rect::new(0.0, 0.0, 1.0, 1.0).is_valid());
        assert!(!Rect::new(0.0, 0.0, 0.0, 1.0).is_valid());
        assert!(!Rect::new(f64::NAN, 0.0, 1.0, 1.0).is_valid());
        assert!(!Rect::new(0.0, 0.0, 1.0, f64::INFINITY).is_valid());
    }

    #[test]
    fn test_image_info_from_json() {
        let image: ImageInfo = serde_json::from_str(
            r#"{ "src": "a.jpg", "naturalWidth": 1000, "naturalHeight": 500 }"#,
        )
        .unwrap();
        assert_eq!(image, ImageInfo::new(1000, 500).with_src("a.jpg"));
        assert_eq!(image.width(), 1000.0);
        assert_eq!(image.height(), 500.0);
    }
}
