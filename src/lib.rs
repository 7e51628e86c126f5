//! Image annotator core.
//!
//! Selection lifecycle and W3C media fragment selectors for annotating
//! rectangular regions of an image. Rendering and the editor popup are left
//! to the host; this crate decides what is selected, what the editor shows
//! and what the host is told.

mod callbacks;
mod config;
mod controller;
mod error;
mod layer;
mod model;
mod selectors;

pub use callbacks::AnnotatorEvents;
pub use config::AnnotatorConfig;
pub use controller::{EditorAction, EditorProps, EditorState, IdOverride, ImageAnnotator};
pub use error::AnnotatorError;
pub use layer::{
    AnnotationLayer, AnnotationRef, ElementHandle, EventSink, LayerEvent, MemoryLayer,
    SelectedShape,
};
pub use model::{
    ANNOTATION_CONTEXT, Annotation, AnnotationBody, DrawingTool, FRAGMENT_SELECTOR, ImageInfo,
    Rect, SelectedItem, Selection, Selector, Target, Targeted,
};
pub use selectors::{
    FragmentUnit, INNER_CLASS, MASK_CLASS, MEDIA_FRAGS_SPEC, OUTER_CLASS, RectElement, RectGroup,
    RectMask, draw_rect, draw_rect_for, draw_rect_mask, get_rect_size, parse_rect_fragment,
    rect_area, set_rect_mask_size, set_rect_size, to_rect_fragment,
};
