use super::attrs::normalize_image_attrs;
use super::element::ImageElement;
use super::resize::ResizeController;
use super::{document, ViewError};
use crate::config::EnvConfig;
use crate::host::{EditorHost, PositionLookup};
use crate::models::{ImageAttributes, NodeData};
use std::rc::Rc;
use wasm_bindgen::JsCast;
use web_sys::HtmlElement;

const SELECTED_CLASS: &str = "ProseMirror-selectednode";

/// Node view for `image` nodes.
///
/// Read-only hosts get a static image; editable hosts additionally get corner
/// resize handles whose final width is committed back through the host.
pub struct ImageNodeView {
    element: ImageElement,
    attrs: ImageAttributes,
    resize: Option<ResizeController>,
}

impl ImageNodeView {
    pub fn new(
        node: &NodeData,
        host: Rc<dyn EditorHost>,
        get_pos: PositionLookup,
    ) -> Result<Self, ViewError> {
        Self::with_config(node, host, get_pos, &EnvConfig::default())
    }

    pub fn with_config(
        node: &NodeData,
        host: Rc<dyn EditorHost>,
        get_pos: PositionLookup,
        config: &EnvConfig,
    ) -> Result<Self, ViewError> {
        let document = document()?;
        let attrs = normalize_image_attrs(&node.attrs);
        let element = ImageElement::build(&document, &attrs, config)?;

        let resize = if host.is_editable() {
            Some(ResizeController::attach(
                &document,
                &element.container,
                &element.img,
                host,
                get_pos,
            )?)
        } else {
            None
        };

        Ok(Self {
            element,
            attrs,
            resize,
        })
    }

    /// Mount point handed to the host.
    pub fn dom(&self) -> &HtmlElement {
        &self.element.container
    }

    pub fn attrs(&self) -> &ImageAttributes {
        &self.attrs
    }

    pub fn is_editable(&self) -> bool {
        self.resize.is_some()
    }

    pub fn is_resizing(&self) -> bool {
        self.resize.as_ref().is_some_and(ResizeController::is_resizing)
    }

    pub fn has_error(&self) -> bool {
        self.element.has_error()
    }

    /// Patches the view for an updated node. Returns `false`, without touching
    /// the DOM, when the node is not an image so the host re-renders instead.
    pub fn update(&mut self, node: &NodeData) -> bool {
        if !node.is_image() {
            return false;
        }

        let next = normalize_image_attrs(&node.attrs);
        self.element.patch(&self.attrs, &next);
        self.attrs = next;
        true
    }

    /// Releases gesture listeners and handles. Safe to call more than once.
    pub fn destroy(&mut self) {
        if let Some(resize) = self.resize.take() {
            resize.detach_drag();
        }
    }

    /// Every DOM change inside the view is made by the view itself.
    pub fn ignore_mutation(&self) -> bool {
        true
    }

    /// Whether the host should leave `event` alone (events on resize handles).
    pub fn stop_event(&self, event: &web_sys::Event) -> bool {
        let Some(resize) = self.resize.as_ref() else {
            return false;
        };
        event
            .target()
            .and_then(|t| t.dyn_into::<web_sys::Node>().ok())
            .is_some_and(|node| resize.is_handle_target(&node))
    }

    pub fn select_node(&self) {
        let _ = self.element.container.class_list().add_1(SELECTED_CLASS);
        let _ = self.element.container.set_attribute("data-selected", "true");
    }

    pub fn deselect_node(&self) {
        let _ = self.element.container.class_list().remove_1(SELECTED_CLASS);
        let _ = self.element.container.remove_attribute("data-selected");
    }

    /// Whether document-level gesture listeners are currently attached.
    pub fn has_drag_listeners(&self) -> bool {
        self.resize
            .as_ref()
            .is_some_and(ResizeController::has_drag_listeners)
    }
}

impl Drop for ImageNodeView {
    fn drop(&mut self) {
        self.destroy();
    }
}

// WASM-only tests (run with `cargo test --target wasm32-unknown-unknown` + wasm-bindgen-test-runner)
#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use crate::editor::resize::{HANDLE_ATTR, MIN_WIDTH};
    use crate::host::testing::RecordingHost;
    use serde_json::json;
    use std::cell::Cell;
    use wasm_bindgen_test::*;
    use web_sys::{
        Event, EventInit, EventTarget, MouseEvent, MouseEventInit, Touch, TouchEvent,
        TouchEventInit, TouchInit,
    };

    wasm_bindgen_test_configure!(run_in_browser);

    fn pos(p: Option<u32>) -> PositionLookup {
        Rc::new(move || p)
    }

    fn mount(view: &ImageNodeView) {
        let body = document().and_then(|d| d.body().ok_or_else(ViewError::no_document));
        body.expect("test page has a body")
            .append_child(view.dom())
            .expect("mount view");
    }

    fn handle(view: &ImageNodeView, corner: &str) -> HtmlElement {
        view.dom()
            .query_selector(&format!("[{HANDLE_ATTR}=\"{corner}\"]"))
            .expect("valid selector")
            .expect("handle present")
            .unchecked_into()
    }

    fn mouse(kind: &str, x: i32, y: i32) -> MouseEvent {
        let init = MouseEventInit::new();
        init.set_bubbles(true);
        init.set_cancelable(true);
        init.set_client_x(x);
        init.set_client_y(y);
        init.set_button(0);
        MouseEvent::new_with_mouse_event_init_dict(kind, &init).expect("mouse event")
    }

    /// A bubbling, cancelable touch event whose active touches sit at `points`.
    fn touch(kind: &str, target: &EventTarget, points: &[(f64, f64)]) -> TouchEvent {
        let touches = js_sys::Array::new();
        for (i, (x, y)) in points.iter().enumerate() {
            let init = TouchInit::new(i as i32, target);
            init.set_client_x(*x);
            init.set_client_y(*y);
            touches.push(&Touch::new(&init).expect("touch"));
        }
        let init = TouchEventInit::new();
        init.set_bubbles(true);
        init.set_cancelable(true);
        init.set_touches(&touches);
        init.set_changed_touches(&touches);
        TouchEvent::new_with_event_init_dict(kind, &init).expect("touch event")
    }

    async fn next_animation_frame() {
        let promise = js_sys::Promise::new(&mut |resolve, _reject| {
            web_sys::window()
                .expect("window")
                .request_animation_frame(&resolve)
                .expect("raf");
        });
        wasm_bindgen_futures::JsFuture::from(promise)
            .await
            .expect("frame");
    }

    fn plain(kind: &str) -> Event {
        let init = EventInit::new();
        init.set_bubbles(false);
        Event::new_with_event_init_dict(kind, &init).expect("event")
    }

    fn img(view: &ImageNodeView) -> &web_sys::HtmlImageElement {
        &view.element.img
    }

    fn placeholder_shown(view: &ImageNodeView) -> bool {
        view.element
            .placeholder
            .style()
            .get_property_value("display")
            .unwrap_or_default()
            != "none"
    }

    fn sized_view(host: Rc<RecordingHost>, p: Option<u32>) -> ImageNodeView {
        let view = ImageNodeView::new(
            &NodeData::image(json!({ "src": "a.png", "width": null, "align": "center" })),
            host,
            pos(p),
        )
        .expect("view builds");
        let style = img(&view).style();
        style.set_property("display", "block").expect("style");
        style.set_property("width", "100px").expect("style");
        style.set_property("height", "50px").expect("style");
        mount(&view);
        view
    }

    #[wasm_bindgen_test]
    fn test_editable_view_renders_handles() {
        let view = ImageNodeView::new(
            &NodeData::image(json!({ "src": "a.png" })),
            RecordingHost::editable(),
            pos(Some(0)),
        )
        .expect("view builds");
        let handles = view
            .dom()
            .query_selector_all(&format!("[{HANDLE_ATTR}]"))
            .expect("valid selector");
        assert_eq!(handles.length(), 4);
        assert!(view.is_editable());
    }

    #[wasm_bindgen_test]
    fn test_read_only_view_renders_no_handles() {
        let view = ImageNodeView::new(
            &NodeData::image(json!({ "src": "a.png" })),
            RecordingHost::read_only(),
            pos(Some(0)),
        )
        .expect("view builds");
        let handles = view
            .dom()
            .query_selector_all(&format!("[{HANDLE_ATTR}]"))
            .expect("valid selector");
        assert_eq!(handles.length(), 0);
        assert!(!view.is_editable());
    }

    #[wasm_bindgen_test]
    fn test_initial_dom_reflects_attributes() {
        let view = ImageNodeView::new(
            &NodeData::image(json!({ "src": "a.png", "alt": "chart", "align": "left", "width": 320 })),
            RecordingHost::read_only(),
            pos(None),
        )
        .expect("view builds");
        assert_eq!(view.dom().get_attribute("data-align").as_deref(), Some("left"));
        assert!(img(&view).src().ends_with("a.png"));
        assert_eq!(img(&view).alt(), "chart");
        assert_eq!(
            img(&view).style().get_property_value("width").ok().as_deref(),
            Some("320px")
        );
        assert!(!placeholder_shown(&view));
        assert!(!view.has_error());
    }

    #[wasm_bindgen_test]
    fn test_update_with_other_node_type_is_rejected_untouched() {
        let mut view = ImageNodeView::new(
            &NodeData::image(json!({ "src": "a.png", "align": "left", "width": 120 })),
            RecordingHost::editable(),
            pos(Some(1)),
        )
        .expect("view builds");
        let before = view.dom().outer_html();

        let accepted = view.update(&NodeData::new(
            "paragraph",
            json!({ "src": "b.png", "align": "right", "width": 10 }),
        ));

        assert!(!accepted);
        assert_eq!(view.dom().outer_html(), before);
        assert_eq!(view.attrs().src, "a.png");
    }

    #[wasm_bindgen_test]
    fn test_update_patches_dom_in_place() {
        let mut view = ImageNodeView::new(
            &NodeData::image(json!({ "src": "a.png", "align": "left", "width": 120 })),
            RecordingHost::editable(),
            pos(Some(1)),
        )
        .expect("view builds");
        let dom_before: web_sys::Node = view.dom().clone().into();

        let accepted = view.update(&NodeData::image(
            json!({ "src": "b.png", "align": "right", "width": null }),
        ));

        assert!(accepted);
        assert!(view.dom().is_same_node(Some(&dom_before)));
        assert!(img(&view).src().ends_with("b.png"));
        assert_eq!(view.dom().get_attribute("data-align").as_deref(), Some("right"));
        assert_eq!(
            img(&view).style().get_property_value("width").ok().as_deref(),
            Some("")
        );
    }

    #[wasm_bindgen_test]
    fn test_error_then_load_toggles_placeholder() {
        let mut view = ImageNodeView::new(
            &NodeData::image(json!({ "src": "a.png" })),
            RecordingHost::read_only(),
            pos(None),
        )
        .expect("view builds");

        img(&view).dispatch_event(&plain("error")).expect("dispatch");
        assert!(placeholder_shown(&view));
        assert_eq!(view.dom().get_attribute("data-error").as_deref(), Some("true"));

        // A new src resets the error state right away.
        assert!(view.update(&NodeData::image(json!({ "src": "b.png" }))));
        assert!(!placeholder_shown(&view));
        assert!(view.dom().get_attribute("data-error").is_none());

        img(&view).dispatch_event(&plain("error")).expect("dispatch");
        assert!(view.has_error());
        img(&view).dispatch_event(&plain("load")).expect("dispatch");
        assert!(!placeholder_shown(&view));
        assert!(view.dom().get_attribute("data-error").is_none());
    }

    #[wasm_bindgen_test]
    fn test_drag_bottom_right_commits_width() {
        let host = RecordingHost::editable();
        let view = sized_view(host.clone(), Some(3));
        let doc = document().expect("document");

        handle(&view, "bottom-right")
            .dispatch_event(&mouse("mousedown", 200, 200))
            .expect("dispatch");
        assert_eq!(view.dom().get_attribute("data-resizing").as_deref(), Some("true"));
        assert!(view.is_resizing());
        assert!(view.has_drag_listeners());

        doc.dispatch_event(&mouse("mousemove", 240, 200)).expect("dispatch");
        assert_eq!(
            img(&view).style().get_property_value("width").ok().as_deref(),
            Some("140px")
        );
        assert!(host.attribute_updates().is_empty(), "no commit mid-gesture");

        doc.dispatch_event(&mouse("mouseup", 240, 200)).expect("dispatch");

        assert_eq!(
            host.attribute_updates(),
            vec![("image".to_string(), json!({ "width": 140 }))]
        );
        assert!(view.dom().get_attribute("data-resizing").is_none());
        assert!(!view.has_drag_listeners());
    }

    #[wasm_bindgen_test]
    fn test_drag_never_goes_below_floor() {
        let host = RecordingHost::editable();
        let view = sized_view(host.clone(), Some(0));
        let doc = document().expect("document");

        handle(&view, "bottom-right")
            .dispatch_event(&mouse("mousedown", 500, 500))
            .expect("dispatch");
        doc.dispatch_event(&mouse("mousemove", 0, 500)).expect("dispatch");
        assert_eq!(
            img(&view).style().get_property_value("width").ok().as_deref(),
            Some(format!("{}px", MIN_WIDTH as u32).as_str())
        );
        doc.dispatch_event(&mouse("mouseup", 0, 500)).expect("dispatch");

        assert_eq!(
            host.attribute_updates(),
            vec![("image".to_string(), json!({ "width": 50 }))]
        );
    }

    #[wasm_bindgen_test]
    fn test_unresolved_position_skips_commit() {
        let host = RecordingHost::editable();
        let view = sized_view(host.clone(), None);
        let doc = document().expect("document");

        handle(&view, "top-left")
            .dispatch_event(&mouse("mousedown", 100, 100))
            .expect("dispatch");
        doc.dispatch_event(&mouse("mousemove", 80, 100)).expect("dispatch");
        doc.dispatch_event(&mouse("mouseup", 80, 100)).expect("dispatch");

        assert!(host.runs.borrow().is_empty());
        assert!(view.dom().get_attribute("data-resizing").is_none());
    }

    #[wasm_bindgen_test]
    fn test_release_outside_window_still_ends_gesture() {
        // A mouseup delivered to the document with no element under the
        // pointer (coordinates outside the viewport) must end the drag.
        let host = RecordingHost::editable();
        let view = sized_view(host.clone(), Some(2));
        let doc = document().expect("document");

        handle(&view, "bottom-right")
            .dispatch_event(&mouse("mousedown", 10, 10))
            .expect("dispatch");
        doc.dispatch_event(&mouse("mousemove", 30, 10)).expect("dispatch");
        doc.dispatch_event(&mouse("mouseup", -5000, -5000)).expect("dispatch");

        assert!(!view.has_drag_listeners());
        assert!(view.dom().get_attribute("data-resizing").is_none());
        assert_eq!(host.attribute_updates().len(), 1);

        // Later moves are no longer tracked.
        doc.dispatch_event(&mouse("mousemove", 400, 10)).expect("dispatch");
        assert_eq!(
            img(&view).style().get_property_value("width").ok().as_deref(),
            Some("120px")
        );
    }

    #[wasm_bindgen_test]
    fn test_destroy_mid_gesture_detaches_listeners() {
        let host = RecordingHost::editable();
        let mut view = sized_view(host.clone(), Some(0));
        let doc = document().expect("document");

        handle(&view, "bottom-right")
            .dispatch_event(&mouse("mousedown", 0, 0))
            .expect("dispatch");
        assert!(view.has_drag_listeners());

        view.destroy();
        assert!(!view.has_drag_listeners());

        doc.dispatch_event(&mouse("mouseup", 10, 0)).expect("dispatch");
        assert!(host.runs.borrow().is_empty());
    }

    #[wasm_bindgen_test]
    fn test_destroy_is_idempotent_when_read_only() {
        let mut view = ImageNodeView::new(
            &NodeData::image(json!({ "src": "a.png" })),
            RecordingHost::read_only(),
            pos(None),
        )
        .expect("view builds");
        view.destroy();
        view.destroy();
        assert!(!view.is_resizing());
    }

    #[wasm_bindgen_test]
    fn test_stop_event_only_for_handles() {
        let lookups = Rc::new(Cell::new(0));
        let counter = lookups.clone();
        let mut view = ImageNodeView::new(
            &NodeData::image(json!({ "src": "a.png" })),
            RecordingHost::editable(),
            Rc::new(move || {
                counter.set(counter.get() + 1);
                Some(0)
            }),
        )
        .expect("view builds");
        mount(&view);

        let on_handle = mouse("mousedown", 0, 0);
        handle(&view, "top-right")
            .dispatch_event(&on_handle)
            .expect("dispatch");
        assert!(view.stop_event(&on_handle));

        let on_img = mouse("mousedown", 0, 0);
        img(&view).dispatch_event(&on_img).expect("dispatch");
        assert!(!view.stop_event(&on_img));
        assert_eq!(lookups.get(), 0, "position is only looked up at commit");

        view.destroy();
        assert!(!view.stop_event(&on_handle));
    }

    #[wasm_bindgen_test]
    fn test_touch_drag_commits_width_on_touchend() {
        let host = RecordingHost::editable();
        let view = sized_view(host.clone(), Some(5));
        let doc = document().expect("document");
        let corner = handle(&view, "bottom-right");

        let start = touch("touchstart", &corner, &[(200.0, 200.0)]);
        corner.dispatch_event(&start).expect("dispatch");
        assert!(start.default_prevented());
        assert!(view.is_resizing());
        assert!(view.has_drag_listeners());

        let mv = touch("touchmove", &doc, &[(240.0, 200.0)]);
        doc.dispatch_event(&mv).expect("dispatch");
        assert!(mv.default_prevented(), "touch moves must not scroll the page");
        assert_eq!(
            img(&view).style().get_property_value("width").ok().as_deref(),
            Some("140px")
        );
        assert!(host.attribute_updates().is_empty());

        doc.dispatch_event(&touch("touchend", &doc, &[])).expect("dispatch");

        assert_eq!(
            host.attribute_updates(),
            vec![("image".to_string(), json!({ "width": 140 }))]
        );
        assert!(!view.has_drag_listeners());
        assert!(view.dom().get_attribute("data-resizing").is_none());
    }

    #[wasm_bindgen_test]
    fn test_touchcancel_ends_gesture_and_commits() {
        let host = RecordingHost::editable();
        let view = sized_view(host.clone(), Some(1));
        let doc = document().expect("document");
        let corner = handle(&view, "bottom-left");

        corner
            .dispatch_event(&touch("touchstart", &corner, &[(300.0, 300.0)]))
            .expect("dispatch");
        doc.dispatch_event(&touch("touchmove", &doc, &[(270.0, 300.0)]))
            .expect("dispatch");
        doc.dispatch_event(&touch("touchcancel", &doc, &[]))
            .expect("dispatch");

        assert_eq!(
            host.attribute_updates(),
            vec![("image".to_string(), json!({ "width": 130 }))]
        );
        assert!(!view.has_drag_listeners());

        // Later touches are no longer tracked.
        doc.dispatch_event(&touch("touchmove", &doc, &[(100.0, 300.0)]))
            .expect("dispatch");
        assert_eq!(
            img(&view).style().get_property_value("width").ok().as_deref(),
            Some("130px")
        );
    }

    #[wasm_bindgen_test]
    fn test_tap_on_image_prevents_default_when_idle() {
        let host = RecordingHost::editable();
        let view = sized_view(host.clone(), Some(0));

        let tap = touch("touchend", img(&view), &[]);
        img(&view).dispatch_event(&tap).expect("dispatch");

        assert!(tap.default_prevented());
        assert!(host.runs.borrow().is_empty());
    }

    #[wasm_bindgen_test]
    fn test_tap_guard_leaves_resize_release_alone() {
        let host = RecordingHost::editable();
        let view = sized_view(host.clone(), Some(0));
        let corner = handle(&view, "top-right");

        corner
            .dispatch_event(&touch("touchstart", &corner, &[(100.0, 100.0)]))
            .expect("dispatch");
        assert!(view.is_resizing());

        // Lifting the finger over the image ends the drag normally.
        let release = touch("touchend", img(&view), &[]);
        img(&view).dispatch_event(&release).expect("dispatch");

        assert!(!release.default_prevented());
        assert_eq!(host.attribute_updates().len(), 1);
    }

    #[wasm_bindgen_test]
    fn test_tap_guard_absent_when_read_only() {
        let view = ImageNodeView::new(
            &NodeData::image(json!({ "src": "a.png" })),
            RecordingHost::read_only(),
            pos(None),
        )
        .expect("view builds");

        let tap = touch("touchend", img(&view), &[]);
        img(&view).dispatch_event(&tap).expect("dispatch");
        assert!(!tap.default_prevented());
    }

    #[wasm_bindgen_test]
    async fn test_resizing_flag_clears_on_next_frame() {
        let host = RecordingHost::editable();
        let view = sized_view(host.clone(), Some(0));
        let doc = document().expect("document");

        handle(&view, "bottom-right")
            .dispatch_event(&mouse("mousedown", 10, 10))
            .expect("dispatch");
        doc.dispatch_event(&mouse("mousemove", 20, 10)).expect("dispatch");
        doc.dispatch_event(&mouse("mouseup", 20, 10)).expect("dispatch");

        assert!(view.is_resizing(), "flag outlives the release event");
        assert!(view.dom().get_attribute("data-resizing").is_none());

        next_animation_frame().await;
        assert!(!view.is_resizing());
    }

    #[wasm_bindgen_test]
    async fn test_new_gesture_before_frame_keeps_flag() {
        let host = RecordingHost::editable();
        let view = sized_view(host.clone(), Some(0));
        let doc = document().expect("document");
        let corner = handle(&view, "bottom-right");

        corner.dispatch_event(&mouse("mousedown", 10, 10)).expect("dispatch");
        doc.dispatch_event(&mouse("mouseup", 10, 10)).expect("dispatch");
        corner.dispatch_event(&mouse("mousedown", 10, 10)).expect("dispatch");

        next_animation_frame().await;
        assert!(view.is_resizing());
        assert!(view.has_drag_listeners());

        doc.dispatch_event(&mouse("mouseup", 10, 10)).expect("dispatch");
        assert_eq!(host.attribute_updates().len(), 2);
    }

    #[wasm_bindgen_test]
    fn test_select_and_deselect_node() {
        let view = ImageNodeView::new(
            &NodeData::image(json!({ "src": "a.png" })),
            RecordingHost::read_only(),
            pos(None),
        )
        .expect("view builds");
        view.select_node();
        assert!(view.dom().class_list().contains(SELECTED_CLASS));
        view.deselect_node();
        assert!(!view.dom().class_list().contains(SELECTED_CLASS));
        assert!(view.ignore_mutation());
    }
}
