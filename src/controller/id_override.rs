use super::ImageAnnotator;
use crate::callbacks::AnnotatorEvents;
use crate::layer::AnnotationLayer;

/// Command for replacing the client-generated id of a newly created annotation.
///
/// Handed to the host with every create notification. The host applies it
/// once it knows the id its backend assigned. If the annotation has been
/// removed or renamed in the meantime, applying is a no-op.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdOverride {
    original_id: String,
}

impl IdOverride {
    pub(crate) fn new(original_id: String) -> Self {
        Self { original_id }
    }

    /// The id the annotation had when it was created.
    pub fn original_id(&self) -> &str {
        &self.original_id
    }

    /// Rename the annotation to `new_id`.
    ///
    /// Returns whether the annotation was still present and got renamed.
    pub fn apply<L: AnnotationLayer, H: AnnotatorEvents>(
        &self,
        annotator: &mut ImageAnnotator<L, H>,
        new_id: &str,
    ) -> bool {
        annotator.override_annotation_id(&self.original_id, new_id)
    }
}
