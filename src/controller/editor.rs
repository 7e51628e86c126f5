//! Editor popup contract.
//!
//! The editor UI itself lives in the host. The annotator tells it whether
//! to show ([`EditorState`]) and receives its decisions as
//! [`EditorAction`] messages.

use crate::layer::ElementHandle;
use crate::model::{Annotation, SelectedItem};

/// What the editor should display.
#[derive(Debug, Clone, PartialEq)]
pub enum EditorState {
    /// No editor on screen
    Closed,
    /// Editor open on the selected annotation
    Open(EditorProps),
}

impl EditorState {
    /// Check if the editor is open.
    pub fn is_open(&self) -> bool {
        matches!(self, EditorState::Open(_))
    }

    /// Props of the open editor.
    pub fn props(&self) -> Option<&EditorProps> {
        match self {
            EditorState::Open(props) => Some(props),
            EditorState::Closed => None,
        }
    }
}

/// Inputs for an open editor.
#[derive(Debug, Clone, PartialEq)]
pub struct EditorProps {
    /// The annotation or draft being edited
    pub annotation: SelectedItem,
    /// Shape the editor anchors to
    pub selected_element: Option<ElementHandle>,
    /// Whether edits are disabled
    pub read_only: bool,
}

/// Decisions taken in the editor.
#[derive(Debug, Clone, PartialEq)]
pub enum EditorAction {
    /// Save a new annotation (usually a promoted draft)
    Create(Annotation),
    /// Save changes to an existing annotation
    Update {
        /// The edited annotation
        annotation: Annotation,
        /// The annotation as it was before editing
        previous: Annotation,
    },
    /// Delete the annotation
    Delete(Annotation),
    /// Close without saving
    Cancel,
}

impl EditorAction {
    /// Save action for an edited item: drafts are created, annotations updated.
    pub fn save(edited: SelectedItem, original: &SelectedItem) -> Self {
        match original {
            SelectedItem::Annotation(previous) => EditorAction::Update {
                annotation: edited.into_annotation(),
                previous: previous.clone(),
            },
            SelectedItem::Selection(_) => EditorAction::Create(edited.into_annotation()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Selection, Target};

    #[test]
    fn test_save_draft_creates() {
        let draft = SelectedItem::from(Selection::new(Target::default()));
        match EditorAction::save(draft.clone(), &draft) {
            EditorAction::Create(a) => assert!(a.id.starts_with('#')),
            other => panic!("Expected Create, got {other:?}"),
        }
    }

    #[test]
    fn test_save_annotation_updates() {
        let original = SelectedItem::from(Annotation::new("a", Target::default()));
        let edited = SelectedItem::from(Annotation::new("a", Target::default()).with_read_only(true));

        match EditorAction::save(edited, &original) {
            EditorAction::Update {
                annotation,
                previous,
            } => {
                assert!(annotation.read_only);
                assert_eq!(Some(&previous), original.as_annotation());
            }
            other => panic!("Expected Update, got {other:?}"),
        }
    }
}
