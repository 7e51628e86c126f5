//! Data models for the annotator.

mod annotation;
mod geometry;
mod tool;

pub use annotation::{
    ANNOTATION_CONTEXT, Annotation, AnnotationBody, FRAGMENT_SELECTOR, SelectedItem, Selection,
    Selector, Target, Targeted,
};
pub use geometry::{ImageInfo, Rect};
pub use tool::DrawingTool;
