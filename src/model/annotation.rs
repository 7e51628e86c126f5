//! W3C Web Annotation data model.
//!
//! This module provides the types the annotator passes across every boundary:
//! - `Annotation`: a committed annotation with a stable id
//! - `Selection`: an uncommitted, in-progress draft
//! - `SelectedItem`: either of the two, as held by the selection state
//! - `Target` and `Selector`: the region of the image an annotation points at
//!
//! All types are plain values. Handing one to the host or to the renderer
//! always means handing over a clone.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AnnotatorError;

/// JSON-LD context for W3C Web Annotations.
pub const ANNOTATION_CONTEXT: &str = "http://www.w3.org/ns/anno.jsonld";

/// Selector type used for rectangular regions.
pub const FRAGMENT_SELECTOR: &str = "FragmentSelector";

// ============================================================================
// Selectors and Targets
// ============================================================================

/// A selector describing a region of the target resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Selector {
    /// Selector type, e.g. `FragmentSelector`
    #[serde(rename = "type")]
    pub kind: String,
    /// Specification the value conforms to
    #[serde(
        rename = "conformsTo",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub conforms_to: Option<String>,
    /// Encoded selector value
    pub value: String,
}

impl Selector {
    /// Create a `FragmentSelector` conforming to the given specification.
    pub fn fragment(conforms_to: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            kind: FRAGMENT_SELECTOR.to_string(),
            conforms_to: Some(conforms_to.into()),
            value: value.into(),
        }
    }
}

/// The target of an annotation: a source image and the selected region.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Target {
    /// URL of the annotated image
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// Selectors for the region; a single selector on the wire is accepted
    #[serde(default, with = "one_or_many")]
    pub selector: Vec<Selector>,
}

impl Target {
    /// Create a target with a single selector.
    pub fn new(source: Option<String>, selector: Selector) -> Self {
        Self {
            source,
            selector: vec![selector],
        }
    }

    /// Get the first selector of the given type.
    pub fn selector(&self, kind: &str) -> Option<&Selector> {
        self.selector.iter().find(|s| s.kind == kind)
    }
}

/// Serde adapter for fields that are a single object or an array on the wire.
mod one_or_many {
    use super::Selector;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(Selector),
        Many(Vec<Selector>),
    }

    pub(super) fn serialize<S: Serializer>(
        selectors: &[Selector],
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match selectors {
            [single] => single.serialize(serializer),
            many => many.serialize(serializer),
        }
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Vec<Selector>, D::Error> {
        Ok(match OneOrMany::deserialize(deserializer)? {
            OneOrMany::One(selector) => vec![selector],
            OneOrMany::Many(selectors) => selectors,
        })
    }
}

/// Anything that points at a region of an image.
pub trait Targeted {
    /// The target this value refers to.
    fn target(&self) -> &Target;
}

// ============================================================================
// Bodies
// ============================================================================

/// An annotation body (comment, tag, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotationBody {
    /// Body type, usually `TextualBody`
    #[serde(rename = "type")]
    pub kind: String,
    /// Body content
    pub value: String,
    /// Motivation for this body, e.g. `commenting` or `tagging`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purpose: Option<String>,
}

impl AnnotationBody {
    /// Create a `TextualBody` with the given purpose.
    pub fn textual(value: impl Into<String>, purpose: impl Into<String>) -> Self {
        Self {
            kind: "TextualBody".to_string(),
            value: value.into(),
            purpose: Some(purpose.into()),
        }
    }
}

// ============================================================================
// Annotation and Selection
// ============================================================================

/// Type tag for committed annotations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
enum AnnotationType {
    #[default]
    Annotation,
}

/// Type tag for in-progress selections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
enum SelectionType {
    #[default]
    Selection,
}

fn default_context() -> String {
    ANNOTATION_CONTEXT.to_string()
}

/// A committed annotation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Annotation {
    #[serde(rename = "@context", default = "default_context")]
    context: String,
    #[serde(rename = "type")]
    kind: AnnotationType,
    /// Identity. May be client-generated until the host assigns one.
    pub id: String,
    /// Bodies attached to this annotation
    #[serde(default)]
    pub body: Vec<AnnotationBody>,
    /// The annotated region
    pub target: Target,
    /// Whether the editor must open this annotation read-only
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub read_only: bool,
}

impl Annotation {
    /// Create an annotation with the given id and target.
    pub fn new(id: impl Into<String>, target: Target) -> Self {
        Self {
            context: default_context(),
            kind: AnnotationType::Annotation,
            id: id.into(),
            body: Vec::new(),
            target,
            read_only: false,
        }
    }

    /// Append a body.
    pub fn with_body(mut self, body: AnnotationBody) -> Self {
        self.body.push(body);
        self
    }

    /// Set the read-only flag.
    pub fn with_read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }

    /// Replace the target, keeping everything else.
    pub fn with_target(mut self, target: Target) -> Self {
        self.target = target;
        self
    }

    /// Parse an annotation from W3C JSON.
    pub fn from_json(json: &str) -> Result<Self, AnnotatorError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize this annotation as W3C JSON.
    pub fn to_json(&self) -> Result<String, AnnotatorError> {
        Ok(serde_json::to_string(self)?)
    }
}

impl Targeted for Annotation {
    fn target(&self) -> &Target {
        &self.target
    }
}

/// An uncommitted draft drawn by the user. Never persisted as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Selection {
    #[serde(rename = "@context", default = "default_context")]
    context: String,
    #[serde(rename = "type")]
    kind: SelectionType,
    /// Bodies added while the draft is open
    #[serde(default)]
    pub body: Vec<AnnotationBody>,
    /// The drawn region
    pub target: Target,
}

impl Selection {
    /// Create a selection over the given target.
    pub fn new(target: Target) -> Self {
        Self {
            context: default_context(),
            kind: SelectionType::Selection,
            body: Vec::new(),
            target,
        }
    }

    /// Append a body.
    pub fn with_body(mut self, body: AnnotationBody) -> Self {
        self.body.push(body);
        self
    }

    /// Promote this draft to an annotation with a client-generated id.
    ///
    /// The id has the form `#<uuid>` and may later be replaced through an
    /// [`IdOverride`](crate::IdOverride).
    pub fn to_annotation(self) -> Annotation {
        let id = format!("#{}", Uuid::new_v4());
        Annotation {
            body: self.body,
            ..Annotation::new(id, self.target)
        }
    }
}

impl Targeted for Selection {
    fn target(&self) -> &Target {
        &self.target
    }
}

/// The value held as "currently selected": a committed annotation or a draft.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SelectedItem {
    /// An existing annotation
    Annotation(Annotation),
    /// A draft that has not been committed
    Selection(Selection),
}

impl SelectedItem {
    /// Check if this is an uncommitted draft.
    pub fn is_selection(&self) -> bool {
        matches!(self, SelectedItem::Selection(_))
    }

    /// Id of the annotation, if committed.
    pub fn id(&self) -> Option<&str> {
        match self {
            SelectedItem::Annotation(a) => Some(&a.id),
            SelectedItem::Selection(_) => None,
        }
    }

    /// Drafts are always editable.
    pub fn read_only(&self) -> bool {
        match self {
            SelectedItem::Annotation(a) => a.read_only,
            SelectedItem::Selection(_) => false,
        }
    }

    /// Borrow the committed annotation, if this is one.
    pub fn as_annotation(&self) -> Option<&Annotation> {
        match self {
            SelectedItem::Annotation(a) => Some(a),
            SelectedItem::Selection(_) => None,
        }
    }

    /// Convert to an annotation, promoting a draft if necessary.
    pub fn into_annotation(self) -> Annotation {
        match self {
            SelectedItem::Annotation(a) => a,
            SelectedItem::Selection(s) => s.to_annotation(),
        }
    }
}

impl Targeted for SelectedItem {
    fn target(&self) -> &Target {
        match self {
            SelectedItem::Annotation(a) => &a.target,
            SelectedItem::Selection(s) => &s.target,
        }
    }
}

impl From<Annotation> for SelectedItem {
    fn from(annotation: Annotation) -> Self {
        SelectedItem::Annotation(annotation)
    }
}

impl From<Selection> for SelectedItem {
    fn from(selection: Selection) -> Self {
        SelectedItem::Selection(selection)
    }
}
