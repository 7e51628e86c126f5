//! In-memory annotation layer.
//!
//! Keeps annotations with their rectangle shapes, tracks the selected shape
//! and its mask, and turns gestures (draw, resize, click, hover) into
//! [`LayerEvent`]s. Nothing is rendered to screen; hosts that draw elsewhere
//! can read the shapes back through [`MemoryLayer::shapes`].

use image::RgbaImage;
use image::imageops;

use super::{AnnotationLayer, AnnotationRef, ElementHandle, EventSink, LayerEvent, SelectedShape};
use crate::model::{Annotation, DrawingTool, ImageInfo, Rect, SelectedItem, Selection};
use crate::selectors::{
    FragmentUnit, RectGroup, RectMask, draw_rect, draw_rect_for, draw_rect_mask, get_rect_size,
    rect_area, set_rect_mask_size, set_rect_size, to_rect_fragment,
};

/// A committed annotation and its shape.
#[derive(Debug, Clone)]
struct DrawnShape {
    annotation: Annotation,
    element: ElementHandle,
    group: RectGroup,
}

/// The selected shape, its dimming mask and what it represents.
#[derive(Debug, Clone)]
struct ActiveShape {
    item: SelectedItem,
    element: ElementHandle,
    group: RectGroup,
    mask: RectMask,
}

/// Reference renderer holding everything in memory.
#[derive(Debug)]
pub struct MemoryLayer {
    image: ImageInfo,
    pixels: Option<RgbaImage>,
    unit: FragmentUnit,
    shapes: Vec<DrawnShape>,
    selected: Option<ActiveShape>,
    hovered: Option<ElementHandle>,
    tool: DrawingTool,
    visible: bool,
    sink: Option<EventSink>,
    next_element: u64,
}

impl MemoryLayer {
    /// Create a layer over an image of the given natural size.
    ///
    /// `unit` is used whenever drawn or resized geometry is written back
    /// into a selector.
    pub fn new(image: ImageInfo, unit: FragmentUnit) -> Self {
        Self {
            image,
            pixels: None,
            unit,
            shapes: Vec::new(),
            selected: None,
            hovered: None,
            tool: DrawingTool::default(),
            visible: true,
            sink: None,
            next_element: 0,
        }
    }

    /// Create a layer over decoded pixels, enabling image snippets.
    pub fn with_pixels(pixels: RgbaImage, src: Option<String>, unit: FragmentUnit) -> Self {
        let image = ImageInfo {
            src,
            natural_width: pixels.width(),
            natural_height: pixels.height(),
        };
        Self {
            pixels: Some(pixels),
            ..Self::new(image, unit)
        }
    }

    /// The annotated image.
    pub fn image(&self) -> &ImageInfo {
        &self.image
    }

    /// The active drawing tool.
    pub fn drawing_tool(&self) -> DrawingTool {
        self.tool
    }

    /// Whether shapes are shown and gestures accepted.
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Whether a subscriber receives events.
    pub fn is_subscribed(&self) -> bool {
        self.sink.is_some()
    }

    /// Drawn shapes of committed annotations, in insertion order.
    pub fn shapes(&self) -> impl Iterator<Item = (&Annotation, &RectGroup)> {
        self.shapes.iter().map(|s| (&s.annotation, &s.group))
    }

    /// Mask of the selected shape.
    pub fn selection_mask(&self) -> Option<&RectMask> {
        self.selected.as_ref().map(|s| &s.mask)
    }

    /// Geometry of the selected shape, including uncommitted resizes.
    pub fn selected_rect(&self) -> Option<Rect> {
        self.selected.as_ref().map(|s| get_rect_size(&s.group))
    }

    fn emit(&self, event: LayerEvent) {
        match &self.sink {
            Some(sink) => sink.emit(event),
            None => log::trace!("No subscriber, dropping {:?}", event),
        }
    }

    fn next_handle(&mut self) -> ElementHandle {
        self.next_element += 1;
        ElementHandle::new(self.next_element)
    }

    fn activate(&mut self, item: SelectedItem, element: ElementHandle, group: RectGroup) {
        let mask = draw_rect_mask(&self.image, get_rect_size(&group));
        self.selected = Some(ActiveShape {
            item,
            element,
            group,
            mask,
        });
    }

    /// Topmost committed shape under a point. Smaller shapes sit on top.
    fn shape_at(&self, x: f64, y: f64) -> Option<&DrawnShape> {
        self.shapes
            .iter()
            .filter(|s| get_rect_size(&s.group).contains(x, y))
            .min_by(|a, b| {
                rect_area(&a.annotation, &self.image).total_cmp(&rect_area(&b.annotation, &self.image))
            })
    }

    // ========================================================================
    // Gestures
    // ========================================================================

    /// The user drew a new rectangle.
    ///
    /// Emits `CreateSelection` followed by `Select` for the new draft.
    /// Returns the handle of the new shape, or `None` if the layer is hidden
    /// or the rectangle tool is not active.
    pub fn draw_selection(&mut self, rect: Rect) -> Option<ElementHandle> {
        if !self.visible || self.tool != DrawingTool::Rect {
            log::debug!("Ignoring draw gesture (visible: {}, tool: {})", self.visible, self.tool.name());
            return None;
        }

        self.selected = None;
        let selection = Selection::new(to_rect_fragment(rect, &self.image, self.unit));
        let element = self.next_handle();
        self.activate(selection.clone().into(), element, draw_rect(rect));

        self.emit(LayerEvent::CreateSelection(selection.clone()));
        self.emit(LayerEvent::Select {
            annotation: Some(selection.into()),
            element: Some(element),
            skip_event: false,
        });
        Some(element)
    }

    /// The user moved or resized the selected shape.
    ///
    /// Emits `UpdateTarget` with the new geometry. Read-only annotations
    /// cannot be resized.
    pub fn resize_selected(&mut self, rect: Rect) -> bool {
        let Some(active) = self.selected.as_mut() else {
            return false;
        };
        if active.item.read_only() {
            return false;
        }

        set_rect_size(&mut active.group, rect);
        set_rect_mask_size(&mut active.mask, &self.image, rect);

        let event = LayerEvent::UpdateTarget {
            element: active.element,
            target: to_rect_fragment(get_rect_size(&active.group), &self.image, self.unit),
        };
        self.emit(event);
        true
    }

    /// The user clicked at a point in image coordinates.
    ///
    /// Selects the topmost annotation under the point, or clears the
    /// selection when clicking on empty space. Returns whether an annotation
    /// was hit.
    pub fn click_at(&mut self, x: f64, y: f64) -> bool {
        if !self.visible {
            return false;
        }

        match self.shape_at(x, y).cloned() {
            Some(shape) => {
                let item = SelectedItem::from(shape.annotation);
                self.activate(item.clone(), shape.element, shape.group);
                self.emit(LayerEvent::Select {
                    annotation: Some(item),
                    element: Some(shape.element),
                    skip_event: false,
                });
                true
            }
            None => {
                if self.selected.take().is_some() {
                    self.emit(LayerEvent::Select {
                        annotation: None,
                        element: None,
                        skip_event: false,
                    });
                }
                false
            }
        }
    }

    fn hovered_id(&self) -> Option<&str> {
        let hovered = self.hovered?;
        self.shapes
            .iter()
            .find(|s| s.element == hovered)
            .map(|s| s.annotation.id.as_str())
    }

    /// The pointer moved to a point in image coordinates.
    pub fn hover_at(&mut self, x: f64, y: f64) {
        if !self.visible {
            return;
        }
        let under = self
            .shape_at(x, y)
            .map(|s| (s.element, s.annotation.clone()));
        let under_element = under.as_ref().map(|(e, _)| *e);
        if under_element == self.hovered {
            return;
        }

        let left = self
            .hovered
            .and_then(|e| self.shapes.iter().find(|s| s.element == e))
            .map(|s| s.annotation.clone());
        if let Some(annotation) = left {
            self.emit(LayerEvent::MouseLeaveAnnotation(annotation));
        }
        if let Some((_, annotation)) = under {
            self.emit(LayerEvent::MouseEnterAnnotation(annotation));
        }
        self.hovered = under_element;
    }
}

impl AnnotationLayer for MemoryLayer {
    fn subscribe(&mut self, sink: EventSink) {
        self.sink = Some(sink);
    }

    fn unsubscribe(&mut self) {
        self.sink = None;
    }

    fn destroy(&mut self) {
        self.sink = None;
        self.shapes.clear();
        self.selected = None;
        self.hovered = None;
        log::debug!("Memory layer destroyed");
    }

    fn add_or_update_annotation(&mut self, annotation: Annotation, previous: Option<Annotation>) {
        let was_hovered = self.hovered_id().is_some_and(|id| {
            id == annotation.id || previous.as_ref().is_some_and(|p| p.id == id)
        });
        if let Some(previous) = &previous {
            self.shapes.retain(|s| s.annotation.id != previous.id);
        }
        self.shapes.retain(|s| s.annotation.id != annotation.id);
        if was_hovered {
            self.hovered = None;
        }

        let Some(group) = draw_rect_for(&annotation, &self.image) else {
            log::warn!("Annotation {} has no media fragment selector, not drawn", annotation.id);
            return;
        };
        let element = self.next_handle();
        if was_hovered {
            self.hovered = Some(element);
        }
        self.shapes.push(DrawnShape {
            annotation,
            element,
            group,
        });
    }

    fn remove_annotation(&mut self, annotation: Annotation) {
        let selected_id = self.selected.as_ref().and_then(|s| s.item.id());
        if selected_id == Some(annotation.id.as_str()) {
            self.selected = None;
        }
        if self.hovered_id() == Some(annotation.id.as_str()) {
            self.hovered = None;
        }
        self.shapes.retain(|s| s.annotation.id != annotation.id);
    }

    fn annotations(&self) -> Vec<Annotation> {
        self.shapes.iter().map(|s| s.annotation.clone()).collect()
    }

    fn contains(&self, id: &str) -> bool {
        self.shapes.iter().any(|s| s.annotation.id == id)
    }

    fn selected(&self) -> Option<SelectedShape> {
        self.selected.as_ref().map(|s| SelectedShape {
            annotation: s.item.clone(),
            element: s.element,
        })
    }

    fn selected_image_snippet(&self) -> Option<RgbaImage> {
        let pixels = self.pixels.as_ref()?;
        let rect = self.selected_rect().filter(Rect::is_valid)?;

        // Saturating casts: negative offsets clamp to the image edge
        let (x, y) = (rect.x.round() as u32, rect.y.round() as u32);
        let (w, h) = (rect.w.round() as u32, rect.h.round() as u32);
        let snippet = imageops::crop_imm(pixels, x, y, w, h).to_image();

        (snippet.width() > 0 && snippet.height() > 0).then_some(snippet)
    }

    fn select_annotation(&mut self, target: &AnnotationRef) -> Option<Annotation> {
        self.selected = None;

        let shape = self
            .shapes
            .iter()
            .find(|s| s.annotation.id == target.id())
            .cloned()?;

        self.activate(shape.annotation.clone().into(), shape.element, shape.group);
        self.emit(LayerEvent::Select {
            annotation: Some(shape.annotation.clone().into()),
            element: Some(shape.element),
            skip_event: true,
        });
        Some(shape.annotation)
    }

    fn deselect(&mut self) {
        self.selected = None;
    }

    fn init(&mut self, annotations: Vec<Annotation>) {
        self.shapes.clear();
        self.selected = None;
        self.hovered = None;
        for annotation in annotations {
            self.add_or_update_annotation(annotation, None);
        }
    }

    fn set_drawing_tool(&mut self, tool: DrawingTool) {
        log::debug!("Drawing tool: {}", tool.name());
        self.tool = tool;
    }

    fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    fn override_id(&mut self, old_id: &str, new_id: &str) {
        if let Some(shape) = self.shapes.iter_mut().find(|s| s.annotation.id == old_id) {
            shape.annotation.id = new_id.to_string();
        }
        if let Some(SelectedItem::Annotation(a)) = self.selected.as_mut().map(|s| &mut s.item) {
            if a.id == old_id {
                a.id = new_id.to_string();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{FRAGMENT_SELECTOR, Selector, Target};
    use crate::selectors::MEDIA_FRAGS_SPEC;
    use image::Rgba;

    fn pixel_annotation(id: &str, x: f64, y: f64, w: f64, h: f64) -> Annotation {
        Annotation::new(
            id,
            to_rect_fragment(Rect::new(x, y, w, h), &ImageInfo::new(1000, 500), FragmentUnit::Pixel),
        )
    }

    fn subscribed_layer() -> (MemoryLayer, EventSink) {
        let mut layer = MemoryLayer::new(ImageInfo::new(1000, 500), FragmentUnit::Pixel);
        let sink = EventSink::default();
        layer.subscribe(sink.clone());
        (layer, sink)
    }

    fn drain(sink: &EventSink) -> Vec<LayerEvent> {
        std::iter::from_fn(|| sink.pop()).collect()
    }

    #[test]
    fn test_draw_emits_create_then_select() {
        let (mut layer, sink) = subscribed_layer();

        let element = layer.draw_selection(Rect::new(1.0, 2.0, 3.0, 4.0)).unwrap();

        let events = drain(&sink);
        assert_eq!(events.len(), 2);
        let LayerEvent::CreateSelection(selection) = &events[0] else {
            panic!("Expected CreateSelection, got {:?}", events[0]);
        };
        assert_eq!(
            selection.target.selector(FRAGMENT_SELECTOR).unwrap().value,
            "xywh=pixel:1,2,3,4"
        );
        match &events[1] {
            LayerEvent::Select {
                annotation: Some(item),
                element: Some(e),
                skip_event: false,
            } => {
                assert!(item.is_selection());
                assert_eq!(*e, element);
            }
            other => panic!("Expected Select, got {other:?}"),
        }
        assert_eq!(
            layer.selection_mask().unwrap().path(),
            "M0 0 h1000 v500 h-1000 z M1 2 h3 v4 h-3 z"
        );
    }

    #[test]
    fn test_draw_ignored_when_hidden_or_wrong_tool() {
        let (mut layer, sink) = subscribed_layer();

        layer.set_visible(false);
        assert!(layer.draw_selection(Rect::new(1.0, 1.0, 1.0, 1.0)).is_none());

        layer.set_visible(true);
        layer.set_drawing_tool(DrawingTool::Polygon);
        assert!(layer.draw_selection(Rect::new(1.0, 1.0, 1.0, 1.0)).is_none());

        assert!(sink.is_empty());
    }

    #[test]
    fn test_resize_uses_configured_unit() {
        let mut layer = MemoryLayer::new(ImageInfo::new(1000, 500), FragmentUnit::Percent);
        let sink = EventSink::default();
        layer.subscribe(sink.clone());
        layer.draw_selection(Rect::new(0.0, 0.0, 10.0, 10.0));
        sink.clear();

        assert!(layer.resize_selected(Rect::new(100.0, 100.0, 300.0, 200.0)));

        match sink.pop() {
            Some(LayerEvent::UpdateTarget { target, .. }) => {
                assert_eq!(target.selector[0].value, "xywh=percent:10,20,30,40");
            }
            other => panic!("Expected UpdateTarget, got {other:?}"),
        }
        assert_eq!(layer.selected_rect(), Some(Rect::new(100.0, 100.0, 300.0, 200.0)));
    }

    #[test]
    fn test_resize_without_selection() {
        let (mut layer, sink) = subscribed_layer();
        assert!(!layer.resize_selected(Rect::new(1.0, 1.0, 1.0, 1.0)));
        assert!(sink.is_empty());
    }

    #[test]
    fn test_resize_refused_for_read_only() {
        let (mut layer, _sink) = subscribed_layer();
        layer.add_or_update_annotation(
            pixel_annotation("a", 0.0, 0.0, 10.0, 10.0).with_read_only(true),
            None,
        );
        layer.select_annotation(&"a".into());
        assert!(!layer.resize_selected(Rect::new(1.0, 1.0, 1.0, 1.0)));
    }

    #[test]
    fn test_click_prefers_smallest_shape() {
        let (mut layer, sink) = subscribed_layer();
        layer.init(vec![
            pixel_annotation("big", 0.0, 0.0, 500.0, 500.0),
            pixel_annotation("small", 10.0, 10.0, 20.0, 20.0),
        ]);

        assert!(layer.click_at(15.0, 15.0));
        match sink.pop() {
            Some(LayerEvent::Select {
                annotation: Some(item),
                skip_event: false,
                ..
            }) => assert_eq!(item.id(), Some("small")),
            other => panic!("Expected Select, got {other:?}"),
        }

        assert!(layer.click_at(100.0, 100.0));
        assert_eq!(layer.selected().unwrap().annotation.id(), Some("big"));
    }

    #[test]
    fn test_click_empty_space_deselects() {
        let (mut layer, sink) = subscribed_layer();
        layer.init(vec![pixel_annotation("a", 0.0, 0.0, 10.0, 10.0)]);
        layer.click_at(5.0, 5.0);
        sink.clear();

        assert!(!layer.click_at(900.0, 400.0));
        assert_eq!(
            sink.pop(),
            Some(LayerEvent::Select {
                annotation: None,
                element: None,
                skip_event: false
            })
        );
        assert!(layer.selected().is_none());

        // Nothing selected, nothing to report
        assert!(!layer.click_at(900.0, 400.0));
        assert!(sink.is_empty());
    }

    #[test]
    fn test_hover_enter_and_leave() {
        let (mut layer, sink) = subscribed_layer();
        layer.init(vec![
            pixel_annotation("a", 0.0, 0.0, 10.0, 10.0),
            pixel_annotation("b", 20.0, 0.0, 10.0, 10.0),
        ]);

        layer.hover_at(5.0, 5.0);
        layer.hover_at(6.0, 6.0);
        layer.hover_at(25.0, 5.0);
        layer.hover_at(500.0, 300.0);

        assert_eq!(hover_log(&sink), ["enter a", "leave a", "enter b", "leave b"]);
    }

    fn hover_log(sink: &EventSink) -> Vec<String> {
        drain(sink)
            .into_iter()
            .map(|e| match e {
                LayerEvent::MouseEnterAnnotation(a) => format!("enter {}", a.id),
                LayerEvent::MouseLeaveAnnotation(a) => format!("leave {}", a.id),
                other => panic!("Unexpected {other:?}"),
            })
            .collect()
    }

    #[test]
    fn test_hover_ignored_while_hidden() {
        let (mut layer, sink) = subscribed_layer();
        layer.init(vec![pixel_annotation("a", 0.0, 0.0, 10.0, 10.0)]);
        layer.set_visible(false);

        layer.hover_at(5.0, 5.0);
        layer.hover_at(500.0, 300.0);

        assert!(drain(&sink).is_empty());
    }

    #[test]
    fn test_hover_survives_update_of_hovered_shape() {
        let (mut layer, sink) = subscribed_layer();
        let a = pixel_annotation("a", 0.0, 0.0, 10.0, 10.0);
        layer.init(vec![a.clone()]);
        layer.hover_at(5.0, 5.0);

        let updated = pixel_annotation("a", 0.0, 0.0, 20.0, 20.0);
        layer.add_or_update_annotation(updated, Some(a));
        layer.hover_at(6.0, 6.0);
        layer.hover_at(500.0, 300.0);

        assert_eq!(hover_log(&sink), ["enter a", "leave a"]);
    }

    #[test]
    fn test_hover_reset_when_hovered_shape_removed() {
        let (mut layer, sink) = subscribed_layer();
        let a = pixel_annotation("a", 0.0, 0.0, 10.0, 10.0);
        layer.init(vec![a.clone()]);
        layer.hover_at(5.0, 5.0);

        layer.remove_annotation(a.clone());
        layer.hover_at(500.0, 300.0);
        layer.add_or_update_annotation(a, None);
        layer.hover_at(5.0, 5.0);

        assert_eq!(hover_log(&sink), ["enter a", "enter a"]);
    }

    #[test]
    fn test_add_refuses_unparseable_selector() {
        let (mut layer, _sink) = subscribed_layer();
        let svg = Annotation::new(
            "poly",
            Target::new(
                None,
                Selector {
                    kind: "SvgSelector".to_string(),
                    conforms_to: None,
                    value: "<svg/>".to_string(),
                },
            ),
        );

        layer.add_or_update_annotation(svg, None);

        assert!(layer.annotations().is_empty());
    }

    #[test]
    fn test_update_replaces_previous() {
        let (mut layer, _sink) = subscribed_layer();
        let original = pixel_annotation("a", 0.0, 0.0, 10.0, 10.0);
        layer.add_or_update_annotation(original.clone(), None);

        let moved = pixel_annotation("a", 5.0, 5.0, 10.0, 10.0);
        layer.add_or_update_annotation(moved.clone(), Some(original));

        assert_eq!(layer.annotations(), vec![moved]);
        let (_, group) = layer.shapes().next().unwrap();
        assert_eq!(get_rect_size(group), Rect::new(5.0, 5.0, 10.0, 10.0));
    }

    #[test]
    fn test_select_annotation_by_id() {
        let (mut layer, sink) = subscribed_layer();
        layer.init(vec![pixel_annotation("a", 0.0, 0.0, 10.0, 10.0)]);

        assert!(layer.select_annotation(&"missing".into()).is_none());
        assert!(sink.is_empty());

        let found = layer.select_annotation(&"a".into()).unwrap();
        assert_eq!(found.id, "a");
        assert!(matches!(
            sink.pop(),
            Some(LayerEvent::Select {
                skip_event: true,
                ..
            })
        ));
    }

    #[test]
    fn test_override_id_renames_shape_and_selection() {
        let (mut layer, _sink) = subscribed_layer();
        layer.init(vec![pixel_annotation("#tmp", 0.0, 0.0, 10.0, 10.0)]);
        layer.select_annotation(&"#tmp".into());

        layer.override_id("#tmp", "server-1");

        assert!(layer.contains("server-1"));
        assert!(!layer.contains("#tmp"));
        assert_eq!(layer.selected().unwrap().annotation.id(), Some("server-1"));
    }

    #[test]
    fn test_remove_selected_clears_selection() {
        let (mut layer, _sink) = subscribed_layer();
        let a = pixel_annotation("a", 0.0, 0.0, 10.0, 10.0);
        layer.init(vec![a.clone()]);
        layer.select_annotation(&"a".into());

        layer.remove_annotation(a);

        assert!(layer.selected().is_none());
        assert!(layer.annotations().is_empty());
    }

    #[test]
    fn test_selected_image_snippet() {
        let mut pixels = RgbaImage::new(100, 50);
        pixels.put_pixel(10, 20, Rgba([255, 0, 0, 255]));
        let mut layer = MemoryLayer::with_pixels(pixels, Some("img.png".to_string()), FragmentUnit::Pixel);
        assert_eq!(layer.image().natural_width, 100);
        assert!(layer.selected_image_snippet().is_none());

        layer.draw_selection(Rect::new(10.0, 20.0, 30.0, 40.0));

        let snippet = layer.selected_image_snippet().unwrap();
        // Clipped at the bottom edge of the image
        assert_eq!(snippet.dimensions(), (30, 30));
        assert_eq!(snippet.get_pixel(0, 0), &Rgba([255, 0, 0, 255]));
    }

    #[test]
    fn test_snippet_requires_pixels() {
        let (mut layer, _sink) = subscribed_layer();
        layer.draw_selection(Rect::new(1.0, 1.0, 5.0, 5.0));
        assert!(layer.selected_image_snippet().is_none());
    }

    #[test]
    fn test_destroy_releases_everything() {
        let (mut layer, sink) = subscribed_layer();
        layer.init(vec![pixel_annotation("a", 0.0, 0.0, 10.0, 10.0)]);
        layer.click_at(1.0, 1.0);
        sink.clear();

        layer.destroy();

        assert!(!layer.is_subscribed());
        assert!(layer.annotations().is_empty());
        assert!(layer.selected().is_none());
        layer.click_at(1.0, 1.0);
        assert!(sink.is_empty());
    }

    #[test]
    fn test_percent_annotations_hit_test_in_pixels() {
        let (mut layer, _sink) = subscribed_layer();
        let a = Annotation::new(
            "p",
            Target::new(None, Selector::fragment(MEDIA_FRAGS_SPEC, "xywh=percent:10,20,30,40")),
        );
        layer.add_or_update_annotation(a, None);

        assert!(layer.click_at(150.0, 150.0));
        assert!(!layer.click_at(50.0, 50.0));
    }
}
