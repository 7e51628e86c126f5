//! Host callback contract.
//!
//! The annotator reports lifecycle changes to the host application through
//! [`AnnotatorEvents`]. Every argument is an owned copy; the host can keep or
//! mutate it without touching the annotator's state. Notifications are
//! fire-and-forget: the annotator never waits for or reads back an answer.

use crate::controller::IdOverride;
use crate::model::{Annotation, Selection, Target};

/// Callbacks invoked by the annotator. All methods default to no-ops.
pub trait AnnotatorEvents {
    /// The user finished drawing a new, uncommitted selection.
    fn on_selection_created(&mut self, _selection: Selection) {}

    /// The user selected an existing annotation.
    fn on_annotation_selected(&mut self, _annotation: Annotation) {}

    /// The selected shape was moved or resized; the change is not committed.
    fn on_selection_target_changed(&mut self, _target: Target) {}

    /// A new annotation was committed.
    ///
    /// `id_override` lets the host swap the client-generated id for its own
    /// once one is available.
    fn on_annotation_created(&mut self, _annotation: Annotation, _id_override: IdOverride) {}

    /// An existing annotation was changed.
    fn on_annotation_updated(&mut self, _annotation: Annotation, _previous: Annotation) {}

    /// An annotation was deleted.
    fn on_annotation_deleted(&mut self, _annotation: Annotation) {}

    /// The pointer entered an annotation.
    fn on_mouse_enter_annotation(&mut self, _annotation: Annotation) {}

    /// The pointer left an annotation.
    fn on_mouse_leave_annotation(&mut self, _annotation: Annotation) {}
}

/// A host that ignores every notification.
impl AnnotatorEvents for () {}
