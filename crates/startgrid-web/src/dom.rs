#![forbid(unsafe_code)]

//! Browser host over `web-sys`.
//!
//! DOM contract:
//! - every group container carries `data-dnd-group-id` and may contain one
//!   `.grid` element holding the group's site cards;
//! - every site card carries `data-dnd-site-id`;
//! - a group's drag handle lives inside a `.group-item` card, which is what
//!   detaches visually during a group drag.
//!
//! [`install`] builds a shared session whose window listeners hold only weak
//! references back to it, and [`Draggable`] binds one element.

use core::fmt;
use core::time::Duration;
use std::cell::RefCell;
use std::rc::{Rc, Weak};

use startgrid_core::{DragKind, Point, Rect, Viewport};
use startgrid_layout::{GridMeasurement, GroupMeasurement, LayoutProvider};
use tracing::{debug, trace};
use wasm_bindgen::closure::{Closure, WasmClosure};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{
    AddEventListenerOptions, Document, Element, Event, HtmlElement, MouseEvent, PointerEvent,
    Window,
};

use crate::affordance::{Affordance, GRABBING_CURSOR_CLASS, INTERACTIVE_SELECTOR};
use crate::config::{DragConfig, DragConfigError};
use crate::ghost::{GhostSpec, GhostTransform};
use crate::host::{CaptureError, DragHost, EditMode, FrameToken};
use crate::pointer::{PointerButton, PointerKind, PointerSample, pointer_id_from_dom};
use crate::session::{ArmRequest, DragSession};
use crate::style::{parse_css_length, resolve_gaps};

const LOG_TARGET: &str = "startgrid_web::dom";

/// Attribute naming a group container.
pub const GROUP_ID_ATTR: &str = "data-dnd-group-id";
/// Attribute naming a site card.
pub const SITE_ID_ATTR: &str = "data-dnd-site-id";
const GROUP_SELECTOR: &str = "[data-dnd-group-id]";
const SITE_SELECTOR: &str = "[data-dnd-site-id]";
const GRID_SELECTOR: &str = ".grid";
const GROUP_CARD_SELECTOR: &str = ".group-item";

/// A session shared between the page and its own event listeners.
pub type SharedSession = Rc<RefCell<DragSession<DomHost>>>;

/// Failure to set up the browser host.
#[derive(Debug)]
pub enum DomHostError {
    NoWindow,
    NoDocument,
    Config(DragConfigError),
}

impl fmt::Display for DomHostError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoWindow => write!(f, "no global window"),
            Self::NoDocument => write!(f, "window has no document"),
            Self::Config(e) => write!(f, "invalid drag config: {e}"),
        }
    }
}

impl std::error::Error for DomHostError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Config(e) => Some(e),
            Self::NoWindow | Self::NoDocument => None,
        }
    }
}

impl From<DragConfigError> for DomHostError {
    fn from(e: DragConfigError) -> Self {
        Self::Config(e)
    }
}

/// Create a browser-backed session. `edit_mode` is shared with the page.
pub fn install(
    config: DragConfig,
    edit_mode: EditMode,
) -> Result<SharedSession, DomHostError> {
    let host = DomHost::new(edit_mode)?;
    let session = Rc::new(RefCell::new(DragSession::new(host, config)?));
    let listeners = WindowListeners::new(&Rc::downgrade(&session));
    session.borrow_mut().host_mut().listeners = Some(listeners);
    Ok(session)
}

// ---------------------------------------------------------------------------
// Host
// ---------------------------------------------------------------------------

/// [`DragHost`] over the live document.
pub struct DomHost {
    window: Window,
    document: Document,
    edit_mode: EditMode,
    ghost: Option<HtmlElement>,
    listeners: Option<WindowListeners>,
    tracking: bool,
}

struct WindowListeners {
    pointer_move: Closure<dyn FnMut(PointerEvent)>,
    pointer_up: Closure<dyn FnMut(PointerEvent)>,
    pointer_cancel: Closure<dyn FnMut(PointerEvent)>,
    resize: Closure<dyn FnMut(Event)>,
    frame: Closure<dyn FnMut(f64)>,
}

impl WindowListeners {
    fn new(session: &Weak<RefCell<DragSession<DomHost>>>) -> Self {
        let weak = session.clone();
        let pointer_move = Closure::new(move |event: PointerEvent| {
            let (id, position) = (pointer_id(&event), client_point(&event));
            with_session(&weak, |s| {
                s.pointer_move(id, position);
            });
        });
        let weak = session.clone();
        let pointer_up = Closure::new(move |event: PointerEvent| {
            let id = pointer_id(&event);
            with_session(&weak, |s| {
                s.pointer_up(id);
            });
        });
        let weak = session.clone();
        let pointer_cancel = Closure::new(move |event: PointerEvent| {
            let id = pointer_id(&event);
            with_session(&weak, |s| {
                s.pointer_cancel(id);
            });
        });
        let weak = session.clone();
        let resize = Closure::new(move |_: Event| {
            with_session(&weak, |s| {
                s.resize();
            });
        });
        let weak = session.clone();
        let frame = Closure::new(move |timestamp: f64| {
            with_session(&weak, |s| {
                s.on_frame(millis(timestamp));
            });
        });
        Self {
            pointer_move,
            pointer_up,
            pointer_cancel,
            resize,
            frame,
        }
    }

    fn attach(&self, window: &Window) -> Result<(), JsValue> {
        let passive = AddEventListenerOptions::new();
        passive.set_passive(true);
        window.add_event_listener_with_callback_and_add_event_listener_options(
            "pointermove",
            callback(&self.pointer_move),
            &passive,
        )?;
        window.add_event_listener_with_callback(
            "pointerup",
            callback(&self.pointer_up),
        )?;
        window.add_event_listener_with_callback(
            "pointercancel",
            callback(&self.pointer_cancel),
        )?;
        window.add_event_listener_with_callback("resize", callback(&self.resize))
    }

    fn detach(&self, window: &Window) -> Result<(), JsValue> {
        window.remove_event_listener_with_callback(
            "pointermove",
            callback(&self.pointer_move),
        )?;
        window.remove_event_listener_with_callback(
            "pointerup",
            callback(&self.pointer_up),
        )?;
        window.remove_event_listener_with_callback(
            "pointercancel",
            callback(&self.pointer_cancel),
        )?;
        window.remove_event_listener_with_callback("resize", callback(&self.resize))
    }
}

impl DomHost {
    fn new(edit_mode: EditMode) -> Result<Self, DomHostError> {
        let window = web_sys::window().ok_or(DomHostError::NoWindow)?;
        let document = window.document().ok_or(DomHostError::NoDocument)?;
        Ok(Self {
            window,
            document,
            edit_mode,
            ghost: None,
            listeners: None,
            tracking: false,
        })
    }

    fn measure_group(&self, element: &Element) -> Option<GroupMeasurement> {
        let id = element.get_attribute(GROUP_ID_ATTR)?;
        let grid = element
            .query_selector(GRID_SELECTOR)
            .ok()
            .flatten()
            .map(|grid| self.measure_grid(&grid));
        Some(GroupMeasurement {
            id,
            rect: client_rect(element),
            grid,
        })
    }

    fn measure_grid(&self, grid: &Element) -> GridMeasurement {
        let computed = self.window.get_computed_style(grid).ok().flatten();
        let property = |name: &str| {
            computed
                .as_ref()
                .and_then(|style| style.get_property_value(name).ok())
                .unwrap_or_default()
        };
        let length = |name: &str| parse_css_length(&property(name)).unwrap_or(0.0);
        let (column_gap, row_gap) = resolve_gaps(
            &property("gap"),
            &property("column-gap"),
            &property("row-gap"),
        );
        GridMeasurement {
            rect: client_rect(grid),
            padding_left: length("padding-left"),
            padding_right: length("padding-right"),
            padding_top: length("padding-top"),
            column_gap,
            row_gap,
            site_count: grid
                .query_selector_all(SITE_SELECTOR)
                .map_or(0, |list| list.length() as usize),
        }
    }
}

impl LayoutProvider for DomHost {
    fn viewport(&self) -> Viewport {
        let dimension = |value: Result<JsValue, JsValue>| {
            value.ok().and_then(|v| v.as_f64()).unwrap_or(0.0)
        };
        Viewport::new(
            dimension(self.window.inner_width()),
            dimension(self.window.inner_height()),
            self.window.scroll_x().unwrap_or(0.0),
            self.window.scroll_y().unwrap_or(0.0),
        )
    }

    fn measure_groups(&self) -> Vec<GroupMeasurement> {
        let Ok(list) = self.document.query_selector_all(GROUP_SELECTOR) else {
            return Vec::new();
        };
        (0..list.length())
            .filter_map(|i| list.item(i))
            .filter_map(|node| node.dyn_into::<Element>().ok())
            .filter_map(|element| self.measure_group(&element))
            .collect()
    }
}

impl DragHost for DomHost {
    type Node = HtmlElement;

    fn now(&self) -> Duration {
        self.window
            .performance()
            .map_or(Duration::ZERO, |performance| millis(performance.now()))
    }

    fn is_edit_mode(&self) -> bool {
        self.edit_mode.get()
    }

    fn scroll_by(&mut self, dy: f64) {
        self.window.scroll_by_with_x_and_y(0.0, dy);
    }

    fn set_pointer_capture(
        &mut self,
        node: &HtmlElement,
        pointer_id: u32,
    ) -> Result<(), CaptureError> {
        let id = i32::try_from(pointer_id).map_err(|_| CaptureError::InvalidPointer(pointer_id))?;
        node.set_pointer_capture(id)
            .map_err(|e| CaptureError::Rejected(js_message(&e)))
    }

    fn release_pointer_capture(
        &mut self,
        node: &HtmlElement,
        pointer_id: u32,
    ) -> Result<(), CaptureError> {
        let id = i32::try_from(pointer_id).map_err(|_| CaptureError::InvalidPointer(pointer_id))?;
        node.release_pointer_capture(id)
            .map_err(|e| CaptureError::Rejected(js_message(&e)))
    }

    fn set_grabbing_cursor(&mut self, active: bool) {
        let Some(body) = self.document.body() else {
            return;
        };
        let classes = body.class_list();
        let result = if active {
            classes.add_1(GRABBING_CURSOR_CLASS)
        } else {
            classes.remove_1(GRABBING_CURSOR_CLASS)
        };
        if let Err(e) = result {
            debug!(target: LOG_TARGET, error = %js_message(&e), "cursor class update failed");
        }
    }

    fn track_pointer(&mut self, active: bool) {
        if self.tracking == active {
            return;
        }
        let Some(listeners) = &self.listeners else {
            return;
        };
        let result = if active {
            listeners.attach(&self.window)
        } else {
            listeners.detach(&self.window)
        };
        match result {
            Ok(()) => self.tracking = active,
            Err(e) => {
                debug!(
                    target: LOG_TARGET,
                    active,
                    error = %js_message(&e),
                    "listener update failed"
                );
            }
        }
    }

    fn create_ghost(&mut self, source: &HtmlElement, spec: &GhostSpec) {
        self.remove_ghost();
        let ghost = match source
            .clone_node_with_deep(true)
            .map(|node| node.dyn_into::<HtmlElement>())
        {
            Ok(Ok(ghost)) => ghost,
            _ => {
                debug!(target: LOG_TARGET, "ghost clone failed");
                return;
            }
        };
        let style = ghost.style();
        for (property, value) in spec.style_properties() {
            let _ = style.set_property(property, &value);
        }
        let classes = ghost.class_list();
        for class in spec.stripped_classes {
            let _ = classes.remove_1(class);
        }
        if let Some(body) = self.document.body()
            && body.append_child(&ghost).is_ok()
        {
            self.ghost = Some(ghost);
        }
    }

    fn paint_ghost(&mut self, transform: GhostTransform) {
        if let Some(ghost) = &self.ghost {
            let _ = ghost.style().set_property("transform", &transform.to_css());
        }
    }

    fn remove_ghost(&mut self) {
        if let Some(ghost) = self.ghost.take() {
            ghost.remove();
        }
    }

    fn request_frame(&mut self) -> FrameToken {
        let Some(listeners) = &self.listeners else {
            return FrameToken(0);
        };
        match self
            .window
            .request_animation_frame(callback(&listeners.frame))
        {
            Ok(handle) => FrameToken(u64::try_from(handle).unwrap_or_default()),
            Err(e) => {
                debug!(target: LOG_TARGET, error = %js_message(&e), "frame request failed");
                FrameToken(0)
            }
        }
    }

    fn cancel_frame(&mut self, token: FrameToken) {
        if let Ok(handle) = i32::try_from(token.0)
            && handle != 0
        {
            let _ = self.window.cancel_animation_frame(handle);
        }
    }
}

// ---------------------------------------------------------------------------
// Per-element binding
// ---------------------------------------------------------------------------

/// What a bound element drags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DraggableOptions {
    pub kind: DragKind,
    pub id: String,
    /// Group of a site card; `None` for group handles.
    pub group_id: Option<String>,
}

/// Listeners and affordance for one draggable element. Unbinds on drop.
pub struct Draggable {
    element: HtmlElement,
    kind: DragKind,
    on_pointer_down: Closure<dyn FnMut(PointerEvent)>,
    on_click: Closure<dyn FnMut(MouseEvent)>,
    on_context_menu: Closure<dyn FnMut(Event)>,
    attached: bool,
}

impl Draggable {
    /// Bind `element` to `session` and apply the current edit mode.
    ///
    /// Safe to call from drop callbacks and observers: the session is not
    /// borrowed here.
    pub fn bind(
        session: &SharedSession,
        edit_mode: &EditMode,
        element: HtmlElement,
        options: DraggableOptions,
    ) -> Self {
        let kind = options.kind;

        let weak = Rc::downgrade(session);
        let source = element.clone();
        let on_pointer_down = Closure::new(move |event: PointerEvent| {
            let visual = visual_target(&source, options.kind);
            let request = ArmRequest {
                kind: options.kind,
                dragged_id: options.id.clone(),
                source_group_id: options.group_id.clone(),
                pointer: pointer_sample(&event),
                on_interactive_control: is_interactive_target(&event),
                visual_rect: client_rect(&visual),
                visual,
                card_size: client_rect(&source).size(),
            };
            with_session(&weak, |s| {
                s.pointer_down(request);
            });
        });

        let weak = Rc::downgrade(session);
        let on_click = Closure::new(move |event: MouseEvent| {
            if session_flag(&weak, DragSession::should_suppress_click) {
                event.prevent_default();
                event.stop_propagation();
                event.stop_immediate_propagation();
            }
        });

        let weak = Rc::downgrade(session);
        let on_context_menu = Closure::new(move |event: Event| {
            if session_flag(&weak, DragSession::should_suppress_context_menu) {
                event.prevent_default();
                event.stop_propagation();
            }
        });

        let mut draggable = Self {
            element,
            kind,
            on_pointer_down,
            on_click,
            on_context_menu,
            attached: false,
        };
        draggable.set_edit_mode(edit_mode.get());
        draggable
    }

    /// Attach listeners and affordance in edit mode; strip both otherwise.
    pub fn set_edit_mode(&mut self, edit_mode: bool) {
        let style = self.element.style();
        match Affordance::for_kind(self.kind, edit_mode) {
            Some(affordance) => {
                let _ = style.set_property("cursor", affordance.cursor);
                if affordance.disable_user_select {
                    let _ = style.set_property("user-select", "none");
                }
                self.attach();
            }
            None => {
                for property in ["cursor", "touch-action", "user-select"] {
                    let _ = style.remove_property(property);
                }
                self.detach();
            }
        }
    }

    fn attach(&mut self) {
        if self.attached {
            return;
        }
        let target = &self.element;
        let result = target
            .add_event_listener_with_callback(
                "pointerdown",
                callback(&self.on_pointer_down),
            )
            .and_then(|()| {
                target.add_event_listener_with_callback_and_bool(
                    "click",
                    callback(&self.on_click),
                    true,
                )
            })
            .and_then(|()| {
                target.add_event_listener_with_callback(
                    "contextmenu",
                    callback(&self.on_context_menu),
                )
            });
        match result {
            Ok(()) => self.attached = true,
            Err(e) => debug!(target: LOG_TARGET, error = %js_message(&e), "draggable bind failed"),
        }
    }

    fn detach(&mut self) {
        let target = &self.element;
        let _ = target.remove_event_listener_with_callback(
            "pointerdown",
            callback(&self.on_pointer_down),
        );
        let _ = target.remove_event_listener_with_callback_and_bool(
            "click",
            callback(&self.on_click),
            true,
        );
        let _ = target.remove_event_listener_with_callback(
            "contextmenu",
            callback(&self.on_context_menu),
        );
        self.attached = false;
    }
}

impl Drop for Draggable {
    fn drop(&mut self) {
        self.detach();
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn with_session(
    session: &Weak<RefCell<DragSession<DomHost>>>,
    f: impl FnOnce(&mut DragSession<DomHost>),
) {
    let Some(shared) = session.upgrade() else {
        return;
    };
    let Ok(mut session) = shared.try_borrow_mut() else {
        trace!(target: LOG_TARGET, "re-entrant event dropped");
        return;
    };
    f(&mut session);
}

fn session_flag(
    session: &Weak<RefCell<DragSession<DomHost>>>,
    flag: fn(&DragSession<DomHost>) -> bool,
) -> bool {
    session
        .upgrade()
        .and_then(|shared| shared.try_borrow().ok().map(|session| flag(&session)))
        .unwrap_or(false)
}

/// Element that detaches visually: the `.group-item` card for group handles.
fn visual_target(source: &HtmlElement, kind: DragKind) -> HtmlElement {
    if kind == DragKind::Group
        && let Ok(Some(card)) = source.closest(GROUP_CARD_SELECTOR)
        && let Ok(card) = card.dyn_into::<HtmlElement>()
    {
        return card;
    }
    source.clone()
}

fn is_interactive_target(event: &PointerEvent) -> bool {
    event
        .target()
        .and_then(|target| target.dyn_into::<Element>().ok())
        .is_some_and(|element| matches!(element.closest(INTERACTIVE_SELECTOR), Ok(Some(_))))
}

fn pointer_sample(event: &PointerEvent) -> PointerSample {
    PointerSample {
        pointer_id: pointer_id(event),
        position: client_point(event),
        button: PointerButton::from_dom(event.button()),
        kind: PointerKind::from_dom(&event.pointer_type()),
        is_primary: event.is_primary(),
    }
}

fn pointer_id(event: &PointerEvent) -> u32 {
    pointer_id_from_dom(event.pointer_id())
}

fn client_point(event: &MouseEvent) -> Point {
    Point::new(f64::from(event.client_x()), f64::from(event.client_y()))
}

fn client_rect(element: &Element) -> Rect {
    let rect = element.get_bounding_client_rect();
    Rect::new(rect.left(), rect.top(), rect.right(), rect.bottom())
}

fn callback<T: ?Sized + WasmClosure>(closure: &Closure<T>) -> &js_sys::Function {
    closure.as_ref().unchecked_ref()
}

fn millis(ms: f64) -> Duration {
    Duration::try_from_secs_f64(ms / 1000.0).unwrap_or_default()
}

fn js_message(value: &JsValue) -> String {
    value.as_string().unwrap_or_else(|| format!("{value:?}"))
}
