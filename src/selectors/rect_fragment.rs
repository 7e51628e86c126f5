//! W3C Media Fragment selectors for rectangular regions.
//!
//! Supports (well-formed) `xywh=pixel:` and `xywh=percent:` fragments.
//! Percent values are relative to the image's natural size and are
//! normalized to pixel space at this boundary.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::shape::{RectGroup, draw_rect};
use crate::model::{FRAGMENT_SELECTOR, ImageInfo, Rect, Selector, Target, Targeted};

/// Specification URI written into `conformsTo`.
pub const MEDIA_FRAGS_SPEC: &str = "http://www.w3.org/TR/media-frags/";

/// Prefix a selector's `conformsTo` must start with to be parsed.
const MEDIA_FRAGS_PREFIX: &str = "http://www.w3.org/TR/media-frags";

/// Coordinate unit of a fragment selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FragmentUnit {
    /// Image pixels
    #[default]
    Pixel,
    /// Percent of the image's natural width/height
    Percent,
}

impl FragmentUnit {
    /// Token used in the fragment value.
    pub fn name(&self) -> &'static str {
        match self {
            FragmentUnit::Pixel => "pixel",
            FragmentUnit::Percent => "percent",
        }
    }

    /// Resolve a unit name. Only `percent` (any case) selects percent;
    /// everything else, including no name at all, is pixel.
    pub fn from_name(name: Option<&str>) -> Self {
        match name {
            Some(n) if n.eq_ignore_ascii_case("percent") => FragmentUnit::Percent,
            _ => FragmentUnit::Pixel,
        }
    }
}

impl From<String> for FragmentUnit {
    fn from(name: String) -> Self {
        FragmentUnit::from_name(Some(&name))
    }
}

impl From<FragmentUnit> for String {
    fn from(unit: FragmentUnit) -> Self {
        unit.name().to_string()
    }
}

impl fmt::Display for FragmentUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn parse_number(token: Option<&str>) -> f64 {
    token
        .and_then(|t| t.trim().parse::<f64>().ok())
        .unwrap_or(f64::NAN)
}

/// Parse an `xywh=` value into pixel-space geometry.
fn parse_xywh(value: &str, image: &ImageInfo) -> Rect {
    let (unit, coords) = match value.split_once(':') {
        Some((head, coords)) => (head.split_once('=').map_or(head, |(_, u)| u), coords),
        None => ("pixel", value.split_once('=').map_or(value, |(_, c)| c)),
    };

    let mut tokens = coords.split(',');
    let x = parse_number(tokens.next());
    let y = parse_number(tokens.next());
    let w = parse_number(tokens.next());
    let h = parse_number(tokens.next());

    match FragmentUnit::from_name(Some(unit)) {
        FragmentUnit::Percent => Rect::new(
            x * image.width() / 100.0,
            y * image.height() / 100.0,
            w * image.width() / 100.0,
            h * image.height() / 100.0,
        ),
        FragmentUnit::Pixel => Rect::new(x, y, w, h),
    }
}

/// Parse the media fragment selector of an annotation or selection.
///
/// Returns `None` if the target has no `FragmentSelector` conforming to the
/// Media Fragments spec. Malformed numbers come back as NaN; callers must
/// check [`Rect::is_valid`] before trusting the geometry.
pub fn parse_rect_fragment<T: Targeted + ?Sized>(item: &T, image: &ImageInfo) -> Option<Rect> {
    let selector = item.target().selector(FRAGMENT_SELECTOR)?;
    let conforms = selector
        .conforms_to
        .as_deref()
        .is_some_and(|c| c.starts_with(MEDIA_FRAGS_PREFIX));

    conforms.then(|| parse_xywh(&selector.value, image))
}

/// Serialize pixel-space geometry as a media fragment target.
///
/// Percent output divides by the natural size without guarding against a
/// zero-sized image.
pub fn to_rect_fragment(rect: Rect, image: &ImageInfo, unit: FragmentUnit) -> Target {
    let value = match unit {
        FragmentUnit::Pixel => format!("xywh=pixel:{},{},{},{}", rect.x, rect.y, rect.w, rect.h),
        FragmentUnit::Percent => {
            let px = rect.x / image.width() * 100.0;
            let py = rect.y / image.height() * 100.0;
            let pw = rect.w / image.width() * 100.0;
            let ph = rect.h / image.height() * 100.0;
            format!("xywh=percent:{px},{py},{pw},{ph}")
        }
    };

    Target::new(image.src.clone(), Selector::fragment(MEDIA_FRAGS_SPEC, value))
}

/// Draw the rectangle shape for an annotation or selection.
pub fn draw_rect_for<T: Targeted + ?Sized>(item: &T, image: &ImageInfo) -> Option<RectGroup> {
    parse_rect_fragment(item, image).map(draw_rect)
}

/// Area of the rectangle an annotation selects, NaN if it has none.
pub fn rect_area<T: Targeted + ?Sized>(item: &T, image: &ImageInfo) -> f64 {
    parse_rect_fragment(item, image).map_or(f64::NAN, |r| r.area())
}
