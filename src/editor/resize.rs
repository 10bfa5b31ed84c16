use super::ViewError;
use crate::host::{EditorHost, PositionLookup};
use crate::models::{WidthPatch, IMAGE_NODE_TYPE};
use crate::util::{parse_px, px};
use gloo::events::{EventListener, EventListenerOptions};
use gloo::render::{request_animation_frame, AnimationFrame};
use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};
use strum::{AsRefStr, EnumString};
use wasm_bindgen::JsCast;
use web_sys::{Document, Event, HtmlElement, HtmlImageElement, MouseEvent, TouchEvent};

/// Smallest width a resize gesture can produce, in CSS pixels.
pub const MIN_WIDTH: f64 = 50.0;

pub(crate) const HANDLE_CLASS: &str = "image-resize-handle";
pub(crate) const HANDLE_ATTR: &str = "data-resize-handle";

#[derive(Clone, Copy, Debug, PartialEq, Eq, AsRefStr, EnumString)]
#[strum(serialize_all = "kebab-case")]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl Corner {
    pub const ALL: [Corner; 4] = [
        Corner::TopLeft,
        Corner::TopRight,
        Corner::BottomLeft,
        Corner::BottomRight,
    ];

    /// Unit direction a drag must move in to grow the image from this corner.
    pub fn direction(self) -> (f64, f64) {
        match self {
            Corner::TopLeft => (-1.0, -1.0),
            Corner::TopRight => (1.0, -1.0),
            Corner::BottomLeft => (-1.0, 1.0),
            Corner::BottomRight => (1.0, 1.0),
        }
    }
}

pub fn clamp_width(width: f64) -> f64 {
    width.max(MIN_WIDTH)
}

/// State of one resize gesture, from press to release.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ResizeSession {
    pub corner: Corner,
    pub start_x: f64,
    pub start_y: f64,
    pub start_width: f64,
    /// width / height at gesture start.
    pub aspect_ratio: f64,
    /// Width most recently applied to the element.
    pub last_width: f64,
}

impl ResizeSession {
    pub fn begin(corner: Corner, x: f64, y: f64, width: f64, height: f64) -> Self {
        let aspect_ratio = if width > 0.0 && height > 0.0 {
            width / height
        } else {
            1.0
        };
        Self {
            corner,
            start_x: x,
            start_y: y,
            start_width: width,
            aspect_ratio,
            last_width: width,
        }
    }

    /// The horizontal delta, or the vertical one scaled to width, whichever
    /// moved further.
    pub fn effective_delta(&self, x: f64, y: f64) -> f64 {
        let (x_dir, y_dir) = self.corner.direction();
        let diff_x = (x - self.start_x) * x_dir;
        let diff_y = (y - self.start_y) * y_dir * self.aspect_ratio;
        if diff_x.abs() >= diff_y.abs() {
            diff_x
        } else {
            diff_y
        }
    }

    pub fn width_at(&self, x: f64, y: f64) -> f64 {
        clamp_width(self.start_width + self.effective_delta(x, y))
    }

    /// Advances the gesture to pointer position `(x, y)` and returns the new width.
    pub fn move_to(&mut self, x: f64, y: f64) -> f64 {
        self.last_width = self.width_at(x, y);
        self.last_width
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Pointer {
    Mouse,
    Touch,
}

fn first_touch(ev: &TouchEvent) -> Option<(f64, f64)> {
    ev.touches()
        .get(0)
        .map(|t| (f64::from(t.client_x()), f64::from(t.client_y())))
}

fn rendered_size(img: &HtmlImageElement) -> (f64, f64) {
    let w = f64::from(img.offset_width());
    if w > 0.0 {
        return (w, f64::from(img.offset_height()));
    }

    // Not laid out (detached or hidden): fall back to the inline width and
    // the intrinsic aspect ratio.
    let (nw, nh) = (
        f64::from(img.natural_width()),
        f64::from(img.natural_height()),
    );
    let w = img
        .style()
        .get_property_value("width")
        .ok()
        .and_then(|s| parse_px(&s))
        .filter(|w| *w > 0.0)
        .or((nw > 0.0).then_some(nw))
        .unwrap_or(MIN_WIDTH);
    let h = if nw > 0.0 && nh > 0.0 { w * nh / nw } else { 0.0 };
    (w, h)
}

/// Unregisters a bubble-phase listener but keeps its closure alive, so this
/// is safe from inside that closure.
fn unregister(listener: &EventListener) {
    let _ = listener.target().remove_event_listener_with_callback(
        listener.event_type(),
        listener.callback().as_ref().unchecked_ref(),
    );
}

struct Inner {
    document: Document,
    container: HtmlElement,
    img: HtmlImageElement,
    host: Rc<dyn EditorHost>,
    get_pos: PositionLookup,
    session: RefCell<Option<ResizeSession>>,
    /// Set at gesture start, cleared one frame after it ends.
    resizing: Cell<bool>,
    /// Document-level listeners of the active gesture.
    drag: RefCell<Vec<EventListener>>,
    /// Pending frame that releases the last gesture's listeners.
    release_frame: RefCell<Option<AnimationFrame>>,
}

impl Inner {
    fn begin(self: &Rc<Self>, corner: Corner, x: f64, y: f64, pointer: Pointer) {
        if self.session.borrow().is_some() {
            return;
        }

        let (w, h) = rendered_size(&self.img);
        *self.session.borrow_mut() = Some(ResizeSession::begin(corner, x, y, w, h));
        self.resizing.set(true);
        let _ = self.container.set_attribute("data-resizing", "true");
        *self.drag.borrow_mut() = self.drag_listeners(pointer);
        tracing::debug!(corner = corner.as_ref(), width = w, "resize started");
    }

    fn drag_listeners(self: &Rc<Self>, pointer: Pointer) -> Vec<EventListener> {
        let target = &self.document;
        let weak = Rc::downgrade(self);
        let on_end = move |weak: Weak<Inner>| {
            move |_ev: &Event| {
                if let Some(inner) = weak.upgrade() {
                    inner.end();
                }
            }
        };

        match pointer {
            Pointer::Mouse => {
                let w = weak.clone();
                vec![
                    EventListener::new(target, "mousemove", move |ev: &Event| {
                        let (Some(inner), Some(ev)) = (w.upgrade(), ev.dyn_ref::<MouseEvent>())
                        else {
                            return;
                        };
                        inner.move_to(f64::from(ev.client_x()), f64::from(ev.client_y()));
                    }),
                    EventListener::new(target, "mouseup", on_end(weak)),
                ]
            }
            Pointer::Touch => {
                let w = weak.clone();
                vec![
                    EventListener::new_with_options(
                        target,
                        "touchmove",
                        EventListenerOptions::enable_prevent_default(),
                        move |ev: &Event| {
                            let (Some(inner), Some(touch)) =
                                (w.upgrade(), ev.dyn_ref::<TouchEvent>())
                            else {
                                return;
                            };
                            ev.prevent_default();
                            if let Some((x, y)) = first_touch(touch) {
                                inner.move_to(x, y);
                            }
                        },
                    ),
                    EventListener::new(target, "touchend", on_end(weak.clone())),
                    EventListener::new(target, "touchcancel", on_end(weak)),
                ]
            }
        }
    }

    fn move_to(&self, x: f64, y: f64) {
        let width = match self.session.borrow_mut().as_mut() {
            Some(session) => session.move_to(x, y),
            None => return,
        };
        let _ = self
            .img
            .style()
            .set_property("width", &px(width.round() as u32));
    }

    fn end(self: &Rc<Self>) {
        let Some(session) = self.session.borrow_mut().take() else {
            return;
        };

        // Detach now; the closures themselves are released a frame later since
        // this may be running inside one of them.
        let stale = std::mem::take(&mut *self.drag.borrow_mut());
        stale.iter().for_each(unregister);
        let _ = self.container.remove_attribute("data-resizing");

        let rendered = self.img.offset_width();
        let width = if rendered > 0 {
            rendered as u32
        } else {
            session.last_width.round() as u32
        }
        .max(MIN_WIDTH as u32);

        match (self.get_pos)() {
            Some(pos) => {
                let applied = self
                    .host
                    .chain()
                    .focus()
                    .set_node_selection(pos)
                    .update_attributes(IMAGE_NODE_TYPE, &WidthPatch { width })
                    .run();
                tracing::debug!(width, pos, applied, "resize committed");
            }
            None => {
                tracing::debug!(width, "node position unresolved; width not committed");
            }
        }

        let weak = Rc::downgrade(self);
        let frame = request_animation_frame(move |_| {
            drop(stale);
            if let Some(inner) = weak.upgrade() {
                if inner.session.borrow().is_none() {
                    inner.resizing.set(false);
                }
            }
        });
        *self.release_frame.borrow_mut() = Some(frame);
    }

    fn cancel(&self) {
        let listeners = std::mem::take(&mut *self.drag.borrow_mut());
        drop(listeners);
        if self.session.borrow_mut().take().is_some() {
            let _ = self.container.remove_attribute("data-resizing");
        }
        self.resizing.set(false);
    }
}

/// Corner handles plus the gesture tracking behind them.
///
/// Only attached when the host editor is editable.
pub(crate) struct ResizeController {
    inner: Rc<Inner>,
    handles: Vec<HtmlElement>,
    _handle_listeners: Vec<EventListener>,
    _tap_guard: EventListener,
}

impl ResizeController {
    pub(crate) fn attach(
        document: &Document,
        container: &HtmlElement,
        img: &HtmlImageElement,
        host: Rc<dyn EditorHost>,
        get_pos: PositionLookup,
    ) -> Result<Self, ViewError> {
        let inner = Rc::new(Inner {
            document: document.clone(),
            container: container.clone(),
            img: img.clone(),
            host,
            get_pos,
            session: RefCell::new(None),
            resizing: Cell::new(false),
            drag: RefCell::new(Vec::new()),
            release_frame: RefCell::new(None),
        });

        let mut handles = Vec::with_capacity(Corner::ALL.len());
        let mut handle_listeners = Vec::with_capacity(Corner::ALL.len() * 2);

        for corner in Corner::ALL {
            let handle: HtmlElement = document
                .create_element("div")
                .map_err(|e| ViewError::dom("resize handle", e))?
                .unchecked_into();
            handle.set_class_name(HANDLE_CLASS);
            let _ = handle.set_attribute(HANDLE_ATTR, corner.as_ref());
            container
                .append_child(&handle)
                .map_err(|e| ViewError::dom("resize handle", e))?;

            let weak = Rc::downgrade(&inner);
            handle_listeners.push(EventListener::new_with_options(
                &handle,
                "mousedown",
                EventListenerOptions::enable_prevent_default(),
                move |ev: &Event| {
                    let (Some(inner), Some(mouse)) = (weak.upgrade(), ev.dyn_ref::<MouseEvent>())
                    else {
                        return;
                    };
                    if mouse.button() != 0 {
                        return;
                    }
                    ev.prevent_default();
                    ev.stop_propagation();
                    inner.begin(
                        corner,
                        f64::from(mouse.client_x()),
                        f64::from(mouse.client_y()),
                        Pointer::Mouse,
                    );
                },
            ));

            let weak = Rc::downgrade(&inner);
            handle_listeners.push(EventListener::new_with_options(
                &handle,
                "touchstart",
                EventListenerOptions::enable_prevent_default(),
                move |ev: &Event| {
                    let (Some(inner), Some(touch)) = (weak.upgrade(), ev.dyn_ref::<TouchEvent>())
                    else {
                        return;
                    };
                    let Some((x, y)) = first_touch(touch) else {
                        return;
                    };
                    ev.prevent_default();
                    ev.stop_propagation();
                    inner.begin(corner, x, y, Pointer::Touch);
                },
            ));

            handles.push(handle);
        }

        // A tap (not a drag) on the image must not open the mobile
        // context/zoom UI.
        let weak = Rc::downgrade(&inner);
        let _tap_guard = EventListener::new_with_options(
            img,
            "touchend",
            EventListenerOptions::enable_prevent_default(),
            move |ev: &Event| {
                if let Some(inner) = weak.upgrade() {
                    if !inner.resizing.get() {
                        ev.prevent_default();
                    }
                }
            },
        );

        Ok(Self {
            inner,
            handles,
            _handle_listeners: handle_listeners,
            _tap_guard,
        })
    }

    pub(crate) fn is_resizing(&self) -> bool {
        self.inner.resizing.get()
    }

    pub(crate) fn has_drag_listeners(&self) -> bool {
        !self.inner.drag.borrow().is_empty()
    }

    /// Drops any in-flight gesture without committing it.
    pub(crate) fn detach_drag(&self) {
        self.inner.cancel();
    }

    pub(crate) fn is_handle_target(&self, target: &web_sys::Node) -> bool {
        self.handles.iter().any(|h| h.contains(Some(target)))
    }
}

impl Drop for ResizeController {
    fn drop(&mut self) {
        self.inner.cancel();
        for h in &self.handles {
            h.remove();
        }
    }
}
