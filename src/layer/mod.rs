//! Renderer contract.
//!
//! The annotation layer draws shapes and turns pointer input into events.
//! The controller never draws anything itself: it calls into a layer through
//! [`AnnotationLayer`] and reacts to the [`LayerEvent`]s the layer pushes into
//! the [`EventSink`] it was subscribed with.

mod memory;

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use image::RgbaImage;

use crate::model::{Annotation, DrawingTool, SelectedItem, Selection, Target};

pub use memory::MemoryLayer;

/// Opaque handle to a drawn shape, owned by the renderer.
///
/// The controller only stores and forwards handles; it never creates one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ElementHandle(u64);

impl ElementHandle {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn id(&self) -> u64 {
        self.0
    }
}

/// Events a renderer emits in response to user gestures.
#[derive(Debug, Clone, PartialEq)]
pub enum LayerEvent {
    /// The user finished drawing a new shape
    CreateSelection(Selection),
    /// A shape was selected, or the selection was cleared (`annotation: None`)
    Select {
        /// The selected annotation or draft
        annotation: Option<SelectedItem>,
        /// Handle of the selected shape
        element: Option<ElementHandle>,
        /// Whether the host should not be told about this selection
        skip_event: bool,
    },
    /// The selected shape was moved or resized
    UpdateTarget {
        /// Handle of the edited shape
        element: ElementHandle,
        /// The new, uncommitted target
        target: Target,
    },
    /// The pointer entered an annotation
    MouseEnterAnnotation(Annotation),
    /// The pointer left an annotation
    MouseLeaveAnnotation(Annotation),
}

/// Queue a renderer pushes events into.
///
/// Cloning yields another handle to the same queue.
#[derive(Debug, Clone, Default)]
pub struct EventSink {
    queue: Rc<RefCell<VecDeque<LayerEvent>>>,
}

impl EventSink {
    /// Queue an event for the subscriber.
    pub fn emit(&self, event: LayerEvent) {
        self.queue.borrow_mut().push_back(event);
    }

    /// Take the oldest pending event.
    pub fn pop(&self) -> Option<LayerEvent> {
        self.queue.borrow_mut().pop_front()
    }

    /// Number of pending events.
    pub fn len(&self) -> usize {
        self.queue.borrow().len()
    }

    /// Check if no events are pending.
    pub fn is_empty(&self) -> bool {
        self.queue.borrow().is_empty()
    }

    /// Drop all pending events.
    pub fn clear(&self) {
        self.queue.borrow_mut().clear();
    }
}

/// Reference to an annotation, by id or by value.
#[derive(Debug, Clone, PartialEq)]
pub enum AnnotationRef {
    /// Look up by id
    Id(String),
    /// Look up by the annotation's id
    Annotation(Annotation),
}

impl AnnotationRef {
    /// The id this reference resolves by.
    pub fn id(&self) -> &str {
        match self {
            AnnotationRef::Id(id) => id,
            AnnotationRef::Annotation(a) => &a.id,
        }
    }
}

impl From<&str> for AnnotationRef {
    fn from(id: &str) -> Self {
        AnnotationRef::Id(id.to_string())
    }
}

impl From<String> for AnnotationRef {
    fn from(id: String) -> Self {
        AnnotationRef::Id(id)
    }
}

impl From<Annotation> for AnnotationRef {
    fn from(annotation: Annotation) -> Self {
        AnnotationRef::Annotation(annotation)
    }
}

impl From<&Annotation> for AnnotationRef {
    fn from(annotation: &Annotation) -> Self {
        AnnotationRef::Annotation(annotation.clone())
    }
}

/// The currently selected shape as reported by the renderer.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectedShape {
    /// The selected annotation or draft
    pub annotation: SelectedItem,
    /// Handle of the selected shape
    pub element: ElementHandle,
}

/// Operations the controller needs from a renderer.
///
/// All calls are synchronous. Events caused by a call are pushed into the
/// subscribed [`EventSink`] and processed by the controller once the call
/// returns.
pub trait AnnotationLayer {
    /// Start pushing events into `sink`.
    fn subscribe(&mut self, sink: EventSink);

    /// Stop pushing events.
    fn unsubscribe(&mut self);

    /// Release all renderer resources.
    fn destroy(&mut self);

    /// Insert an annotation, replacing `previous` if given.
    fn add_or_update_annotation(&mut self, annotation: Annotation, previous: Option<Annotation>);

    /// Remove an annotation.
    fn remove_annotation(&mut self, annotation: Annotation);

    /// All annotations currently drawn.
    fn annotations(&self) -> Vec<Annotation>;

    /// Check if an annotation with the given id is drawn.
    fn contains(&self, id: &str) -> bool {
        self.annotations().iter().any(|a| a.id == id)
    }

    /// The selected shape, if any.
    fn selected(&self) -> Option<SelectedShape>;

    /// Pixels of the source image under the selected shape.
    fn selected_image_snippet(&self) -> Option<RgbaImage>;

    /// Select an annotation without notifying the host.
    ///
    /// Returns the selected annotation, or `None` if it could not be found.
    fn select_annotation(&mut self, target: &AnnotationRef) -> Option<Annotation>;

    /// Clear the selection.
    fn deselect(&mut self);

    /// Replace all annotations.
    fn init(&mut self, annotations: Vec<Annotation>);

    /// Switch the tool used for drawing new shapes.
    fn set_drawing_tool(&mut self, tool: DrawingTool);

    /// Show or hide all shapes.
    fn set_visible(&mut self, visible: bool);

    /// Rename an annotation.
    fn override_id(&mut self, old_id: &str, new_id: &str);
}
