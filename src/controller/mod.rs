//! Selection controller.
//!
//! [`ImageAnnotator`] is the single source of truth for what is currently
//! being edited. It turns renderer events into host callbacks, host API calls
//! into renderer commands, and decides whether the editor is open.
//!
//! At most one annotation is selected at a time. Selecting another one
//! replaces the whole selection state, including any uncommitted geometry.

mod editor;
mod id_override;


use image::RgbaImage;

pub use editor::{EditorAction, EditorProps, EditorState};
pub use id_override::IdOverride;

use crate::callbacks::AnnotatorEvents;
use crate::config::AnnotatorConfig;
use crate::layer::{AnnotationLayer, AnnotationRef, ElementHandle, EventSink, LayerEvent};
use crate::model::{Annotation, DrawingTool, SelectedItem, Target};

/// Transient state of the open selection.
#[derive(Debug, Clone, Default)]
struct SelectionState {
    /// Annotation or draft being edited
    selected_annotation: Option<SelectedItem>,
    /// Shape of the selection, owned by the renderer
    selected_element: Option<ElementHandle>,
    /// Geometry edit not yet committed to the annotation
    modified_target: Option<Target>,
}

/// Mediates between a renderer, an editor popup and the host application.
pub struct ImageAnnotator<L: AnnotationLayer, H: AnnotatorEvents> {
    layer: Option<L>,
    host: H,
    config: AnnotatorConfig,
    events: EventSink,
    state: SelectionState,
}

impl<L: AnnotationLayer, H: AnnotatorEvents> ImageAnnotator<L, H> {
    /// Take ownership of a renderer and subscribe to its events.
    pub fn attach(mut layer: L, host: H, config: AnnotatorConfig) -> Self {
        let events = EventSink::default();
        layer.subscribe(events.clone());
        log::debug!("Annotator attached (headless: {}, read-only: {})", config.headless, config.read_only);

        Self {
            layer: Some(layer),
            host,
            config,
            events,
            state: SelectionState::default(),
        }
    }

    /// Unsubscribe from the renderer and destroy it.
    ///
    /// Called automatically on drop. Every call after this is a no-op.
    pub fn detach(&mut self) {
        let Some(mut layer) = self.layer.take() else {
            return;
        };
        layer.unsubscribe();
        layer.destroy();
        self.events.clear();
        self.state = SelectionState::default();
        log::debug!("Annotator detached");
    }

    /// Check if a renderer is attached.
    pub fn is_attached(&self) -> bool {
        self.layer.is_some()
    }

    pub fn config(&self) -> &AnnotatorConfig {
        &self.config
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    /// The attached renderer.
    pub fn layer(&self) -> Option<&L> {
        self.layer.as_ref()
    }

    /// The attached renderer, for feeding it input.
    ///
    /// Call [`process_events`](Self::process_events) afterwards so the
    /// events the input caused are handled.
    pub fn layer_mut(&mut self) -> Option<&mut L> {
        self.layer.as_mut()
    }

    /// Run a renderer command, then handle whatever events it emitted.
    fn with_layer<R>(&mut self, f: impl FnOnce(&mut L) -> R) -> Option<R> {
        let Some(layer) = self.layer.as_mut() else {
            log::warn!("Annotator used after detach, ignoring call");
            return None;
        };
        let result = f(layer);
        self.process_events();
        Some(result)
    }

    fn clear_state(&mut self) {
        self.state = SelectionState::default();
    }

    // ========================================================================
    // Renderer events
    // ========================================================================

    /// Handle all pending renderer events, oldest first.
    pub fn process_events(&mut self) {
        while let Some(event) = self.events.pop() {
            self.handle_event(event);
        }
    }

    /// Handle a single renderer event to completion.
    pub fn handle_event(&mut self, event: LayerEvent) {
        match event {
            LayerEvent::CreateSelection(selection) => {
                self.host.on_selection_created(selection);
            }
            LayerEvent::Select {
                annotation: Some(item),
                element,
                skip_event,
            } => {
                let notify = match &item {
                    SelectedItem::Annotation(a) if !skip_event => Some(a.clone()),
                    _ => None,
                };
                log::debug!("Selected {}", item.id().unwrap_or("new selection"));

                self.state = SelectionState {
                    selected_annotation: Some(item),
                    selected_element: element,
                    modified_target: None,
                };
                if let Some(annotation) = notify {
                    self.host.on_annotation_selected(annotation);
                }
            }
            LayerEvent::Select { annotation: None, .. } => {
                log::debug!("Deselected");
                self.clear_state();
            }
            LayerEvent::UpdateTarget { element, target } => {
                self.state.selected_element = Some(element);
                self.state.modified_target = Some(target.clone());
                self.host.on_selection_target_changed(target);
            }
            LayerEvent::MouseEnterAnnotation(annotation) => {
                self.host.on_mouse_enter_annotation(annotation);
            }
            LayerEvent::MouseLeaveAnnotation(annotation) => {
                self.host.on_mouse_leave_annotation(annotation);
            }
        }
    }

    // ========================================================================
    // Editor
    // ========================================================================

    /// Whether the editor is open, and on what.
    ///
    /// Headless mode keeps the editor closed regardless of the selection.
    pub fn editor_state(&self) -> EditorState {
        match &self.state.selected_annotation {
            Some(item) if !self.config.headless => EditorState::Open(EditorProps {
                annotation: item.clone(),
                selected_element: self.state.selected_element,
                read_only: self.config.read_only || item.read_only(),
            }),
            _ => EditorState::Closed,
        }
    }

    /// Apply a decision taken in the editor.
    pub fn handle_editor_action(&mut self, action: EditorAction) {
        match action {
            EditorAction::Create(annotation) => self.create_or_update(annotation, None),
            EditorAction::Update {
                annotation,
                previous,
            } => self.create_or_update(annotation, Some(previous)),
            EditorAction::Delete(annotation) => self.delete(annotation),
            EditorAction::Cancel => self.cancel(),
        }
    }

    /// Commit an annotation: notify the host first, then persist in the renderer.
    fn create_or_update(&mut self, annotation: Annotation, previous: Option<Annotation>) {
        let committed = match self.state.modified_target.take() {
            Some(target) => annotation.with_target(target),
            None => annotation,
        };

        match &previous {
            Some(previous) => {
                log::debug!("Updating annotation {}", committed.id);
                self.host
                    .on_annotation_updated(committed.clone(), previous.clone());
            }
            None => {
                log::debug!("Creating annotation {}", committed.id);
                let id_override = IdOverride::new(committed.id.clone());
                self.host.on_annotation_created(committed.clone(), id_override);
            }
        }

        self.clear_state();
        self.with_layer(|layer| {
            layer.deselect();
            layer.add_or_update_annotation(committed, previous);
        });
    }

    /// Delete an annotation: remove from the renderer first, then notify the host.
    fn delete(&mut self, annotation: Annotation) {
        log::debug!("Deleting annotation {}", annotation.id);
        self.clear_state();
        let copy = annotation.clone();
        self.with_layer(|layer| layer.remove_annotation(copy));
        self.host.on_annotation_deleted(annotation);
    }

    /// Discard the selection without telling the host.
    fn cancel(&mut self) {
        log::debug!("Edit cancelled");
        self.clear_state();
        self.with_layer(|layer| layer.deselect());
    }

    /// Rename an annotation in the renderer.
    ///
    /// Does nothing and returns `false` if `original_id` is no longer drawn.
    /// An open editor is closed before the rename.
    pub(crate) fn override_annotation_id(&mut self, original_id: &str, new_id: &str) -> bool {
        let present = self
            .layer
            .as_ref()
            .is_some_and(|layer| layer.contains(original_id));
        if !present {
            log::debug!("Ignoring id override for {original_id}: annotation no longer present");
            return false;
        }

        if self.state.selected_annotation.is_some() {
            self.clear_state();
        }
        log::debug!("Overriding annotation id {original_id} -> {new_id}");
        self.with_layer(|layer| layer.override_id(original_id, new_id));
        true
    }

    // ========================================================================
    // Host API
    // ========================================================================

    /// Add or replace an annotation in the renderer.
    pub fn add_annotation(&mut self, annotation: &Annotation) {
        let copy = annotation.clone();
        self.with_layer(|layer| layer.add_or_update_annotation(copy, None));
    }

    /// Copies of all annotations in the renderer.
    pub fn annotations(&self) -> Vec<Annotation> {
        self.layer
            .as_ref()
            .map(|layer| layer.annotations())
            .unwrap_or_default()
    }

    /// Copy of the selected annotation or draft.
    pub fn selected(&self) -> Option<SelectedItem> {
        self.layer
            .as_ref()?
            .selected()
            .map(|selected| selected.annotation)
    }

    /// Pixels of the source image under the selection.
    pub fn selected_image_snippet(&self) -> Option<RgbaImage> {
        self.layer.as_ref()?.selected_image_snippet()
    }

    /// Select an annotation by id or value.
    ///
    /// Returns a copy of the selected annotation. If the renderer cannot find
    /// it, the selection is cleared and `None` returned.
    pub fn select_annotation(&mut self, target: impl Into<AnnotationRef>) -> Option<Annotation> {
        let target = target.into();
        let found = self
            .with_layer(|layer| layer.select_annotation(&target))
            .flatten();

        if found.is_none() {
            log::debug!("Annotation {} not found, clearing selection", target.id());
            self.clear_state();
        }
        found
    }

    /// Remove an annotation from the renderer.
    pub fn remove_annotation(&mut self, annotation: &Annotation) {
        let is_selected = self
            .state
            .selected_annotation
            .as_ref()
            .and_then(SelectedItem::id)
            == Some(annotation.id.as_str());
        if is_selected {
            self.clear_state();
        }

        let copy = annotation.clone();
        self.with_layer(|layer| layer.remove_annotation(copy));
    }

    /// Replace all annotations in the renderer.
    pub fn set_annotations(&mut self, annotations: &[Annotation]) {
        // The renderer drops its selection on init.
        self.clear_state();
        let copies = annotations.to_vec();
        self.with_layer(|layer| layer.init(copies));
    }

    /// Switch the drawing tool.
    pub fn set_drawing_tool(&mut self, tool: DrawingTool) {
        self.with_layer(|layer| layer.set_drawing_tool(tool));
    }

    /// Show or hide the annotations.
    pub fn set_visible(&mut self, visible: bool) {
        self.with_layer(|layer| layer.set_visible(visible));
    }

    /// Replace the selected annotation.
    ///
    /// Drafts are promoted first. Without `apply_immediately` the change is
    /// only staged and the editor stays open, and is ignored when nothing is
    /// selected; with it the annotation is committed, as an update of the
    /// current selection if there is one.
    pub fn update_selected(&mut self, annotation: impl Into<SelectedItem>, apply_immediately: bool) {
        let annotation = annotation.into().into_annotation();

        if apply_immediately {
            let previous = self
                .state
                .selected_annotation
                .as_ref()
                .and_then(SelectedItem::as_annotation)
                .cloned();
            self.create_or_update(annotation, previous);
        } else if self.state.selected_annotation.is_some() {
            self.state.selected_annotation = Some(annotation.into());
        } else {
            log::debug!("Nothing selected, ignoring staged update of {}", annotation.id);
        }
    }
}

impl<L: AnnotationLayer, H: AnnotatorEvents> Drop for ImageAnnotator<L, H> {
    fn drop(&mut self) {
        self.detach();
    }
}
