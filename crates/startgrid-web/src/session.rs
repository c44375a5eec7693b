#![forbid(unsafe_code)]

//! Drag session state machine.
//!
//! One [`DragSession`] drives at most one drag at a time:
//!
//! ```text
//! Idle --pointer_down--> Armed --move past threshold--> Dragging
//!   ^                      |                               |
//!   +------ up/cancel -----+------- up/cancel/resize ------+
//! ```
//!
//! Every input returns a [`DragDispatch`] with a structured log entry, the
//! same way for accepted and ignored signals, so hosts and tests can assert
//! on exactly what happened.
//!
//! # Invariants
//!
//! 1. At most one session is active; a second press while one is active is
//!    ignored.
//! 2. Geometry is captured exactly once per drag, at the threshold crossing.
//! 3. At most one ghost exists and at most one frame request is pending.
//! 4. Teardown is synchronous and idempotent; the drop callback fires at most
//!    once per drag, and only if a hover target was ever resolved.
//! 5. Hover observers are notified only when the hover actually changes.

use core::fmt;
use core::time::Duration;

use startgrid_core::{DragKind, DropPayload, HoverTarget, Point, Rect, Size};
use startgrid_layout::{CollisionConfig, GeometrySnapshot, SnapshotRequest, resolve};
use tracing::{debug, trace};

use crate::affordance::ClickGuard;
use crate::config::{DragConfig, DragConfigError};
use crate::ghost::{GhostSpec, GhostTransform, place_ghost};
use crate::host::{DragHost, FrameToken};
use crate::pointer::{PointerButton, PointerKind, PointerSample};

const LOG_TARGET: &str = "startgrid_web::session";

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// Coarse session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragPhase {
    Idle,
    Armed,
    Dragging,
}

/// A press on a draggable, with everything the session needs to arm.
#[derive(Debug, Clone)]
pub struct ArmRequest<N> {
    pub kind: DragKind,
    pub dragged_id: String,
    /// Group the dragged site lives in; `None` for group drags.
    pub source_group_id: Option<String>,
    pub pointer: PointerSample,
    /// The press landed on (or inside) an interactive control.
    pub on_interactive_control: bool,
    /// Element that detaches visually and gets cloned into the ghost.
    pub visual: N,
    /// Border box of `visual`, viewport space.
    pub visual_rect: Rect,
    /// Size of the dragged node itself; used for groups without a grid.
    pub card_size: Size,
}

/// Lifecycle phase recorded for one dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragLifecyclePhase {
    PointerDown,
    PointerMove,
    PointerUp,
    PointerCancel,
    Resize,
    Frame,
    Stop,
}

/// Why an incoming signal was ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragIgnoredReason {
    EditModeOff,
    ButtonNotAllowed,
    NotPrimaryPointer,
    TouchPointer,
    InteractiveTarget,
    ActiveSessionInProgress,
    NoActiveSession,
    PointerMismatch,
    NotDragging,
}

impl fmt::Display for DragIgnoredReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::EditModeOff => "edit mode is off",
            Self::ButtonNotAllowed => "button not allowed",
            Self::NotPrimaryPointer => "not the primary pointer",
            Self::TouchPointer => "touch pointers do not drag",
            Self::InteractiveTarget => "press on an interactive control",
            Self::ActiveSessionInProgress => "a drag session is already active",
            Self::NoActiveSession => "no active session",
            Self::PointerMismatch => "pointer does not own the session",
            Self::NotDragging => "session is not dragging",
        };
        f.write_str(text)
    }
}

/// Outcome category for one dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragLogOutcome {
    Armed,
    Tracked,
    DragStarted,
    FrameRendered { hover_changed: bool },
    /// A drag ended normally; `delivered` is whether a payload was produced.
    Dropped { delivered: bool },
    /// An armed press ended without ever dragging.
    Released,
    Stopped,
    Ignored(DragIgnoredReason),
}

/// Structured log record for one dispatch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragLogEntry {
    pub phase: DragLifecyclePhase,
    /// Assigned to accepted signals only.
    pub sequence: Option<u64>,
    pub pointer_id: Option<u32>,
    pub kind: Option<DragKind>,
    pub position: Option<Point>,
    pub outcome: DragLogOutcome,
}

/// Result of one dispatch.
#[derive(Debug, Clone, PartialEq)]
pub struct DragDispatch {
    /// New hover target, when this dispatch changed it.
    pub hover: Option<HoverTarget>,
    /// Payload handed to the drop callback, when this dispatch dropped.
    pub payload: Option<DropPayload>,
    pub log: DragLogEntry,
}

impl DragDispatch {
    fn ignored(
        phase: DragLifecyclePhase,
        reason: DragIgnoredReason,
        pointer_id: Option<u32>,
        position: Option<Point>,
    ) -> Self {
        trace!(target: LOG_TARGET, ?phase, ?pointer_id, %reason, "signal ignored");
        Self {
            hover: None,
            payload: None,
            log: DragLogEntry {
                phase,
                sequence: None,
                pointer_id,
                kind: None,
                position,
                outcome: DragLogOutcome::Ignored(reason),
            },
        }
    }

    /// Whether the signal was ignored.
    #[must_use]
    pub const fn is_ignored(&self) -> bool {
        matches!(self.log.outcome, DragLogOutcome::Ignored(_))
    }
}

/// Change notification for reactive observers.
#[derive(Debug, Clone, PartialEq)]
pub enum DragNotification {
    Started {
        kind: DragKind,
        dragged_id: String,
        source_group_id: Option<String>,
        /// Height of the dragged visual, for sizing placeholders.
        source_height: f64,
    },
    HoverChanged(HoverTarget),
    Ended {
        dropped: bool,
    },
}

/// Read-only view of the reactive session state.
#[derive(Debug, Clone, PartialEq)]
pub struct DragStateSnapshot {
    pub phase: DragPhase,
    pub kind: Option<DragKind>,
    pub dragged_id: Option<String>,
    pub source_group_id: Option<String>,
    pub hover_group_id: Option<String>,
    pub hover_index: Option<usize>,
    pub source_height: f64,
}

impl DragStateSnapshot {
    const IDLE: Self = Self {
        phase: DragPhase::Idle,
        kind: None,
        dragged_id: None,
        source_group_id: None,
        hover_group_id: None,
        hover_index: None,
        source_height: 0.0,
    };

    #[must_use]
    pub const fn is_dragging(&self) -> bool {
        matches!(self.phase, DragPhase::Dragging)
    }
}

type DropCallback = Box<dyn FnMut(DropPayload)>;
type Observer = Box<dyn FnMut(&DragNotification)>;

// ---------------------------------------------------------------------------
// Internal state
// ---------------------------------------------------------------------------

struct ActiveDrag<N> {
    kind: DragKind,
    dragged_id: String,
    source_group_id: Option<String>,
    pointer_id: u32,
    visual: N,
    visual_rect: Rect,
    card_size: Size,
    start: Point,
    /// Latest pointer position, viewport space.
    input: Point,
    /// Pointer offset inside the ghost.
    anchor: Point,
    hover_group_id: Option<String>,
    hover_index: Option<usize>,
    dragging: Option<Dragging>,
}

struct Dragging {
    geometry: GeometrySnapshot,
    last_frame: Duration,
    /// Ghost center (document space) at the last collision pass.
    last_collision: Option<Point>,
    pending_frame: Option<FrameToken>,
    captured: bool,
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// Pointer-driven drag-and-reorder session over a [`DragHost`].
///
/// The host forwards pointer signals and frame callbacks; the session decides
/// everything else. Dropping the session tears down any drag in flight
/// without delivering a payload.
pub struct DragSession<H: DragHost> {
    host: H,
    config: DragConfig,
    on_drop: Option<DropCallback>,
    observers: Vec<Observer>,
    active: Option<ActiveDrag<H::Node>>,
    click_guard: ClickGuard,
    next_sequence: u64,
}

impl<H: DragHost> fmt::Debug for DragSession<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DragSession")
            .field("config", &self.config)
            .field("phase", &self.phase())
            .field("click_guard", &self.click_guard)
            .field("observers", &self.observers.len())
            .field("next_sequence", &self.next_sequence)
            .finish_non_exhaustive()
    }
}

impl<H: DragHost> DragSession<H> {
    /// Start a session over `host`. Rejects configs that fail validation.
    pub fn new(host: H, config: DragConfig) -> Result<Self, DragConfigError> {
        let errors = config.validate();
        if !errors.is_empty() {
            return Err(DragConfigError::Validation(errors));
        }
        Ok(Self {
            host,
            config,
            on_drop: None,
            observers: Vec::new(),
            active: None,
            click_guard: ClickGuard::default(),
            next_sequence: 1,
        })
    }

    /// Register the callback that receives the reorder payload on drop.
    pub fn set_on_drop(&mut self, on_drop: impl FnMut(DropPayload) + 'static) {
        self.on_drop = Some(Box::new(on_drop));
    }

    /// Register an observer for start/hover/end notifications.
    pub fn subscribe(&mut self, observer: impl FnMut(&DragNotification) + 'static) {
        self.observers.push(Box::new(observer));
    }

    #[must_use]
    pub const fn config(&self) -> &DragConfig {
        &self.config
    }

    #[must_use]
    pub const fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    #[must_use]
    pub fn phase(&self) -> DragPhase {
        match &self.active {
            None => DragPhase::Idle,
            Some(drag) if drag.dragging.is_some() => DragPhase::Dragging,
            Some(_) => DragPhase::Armed,
        }
    }

    #[must_use]
    pub fn is_dragging(&self) -> bool {
        self.phase() == DragPhase::Dragging
    }

    /// Pointer that owns the active session, if any.
    #[must_use]
    pub fn active_pointer_id(&self) -> Option<u32> {
        self.active.as_ref().map(|drag| drag.pointer_id)
    }

    /// Geometry captured for the drag in flight.
    #[must_use]
    pub fn geometry(&self) -> Option<&GeometrySnapshot> {
        self.active
            .as_ref()
            .and_then(|drag| drag.dragging.as_ref())
            .map(|dragging| &dragging.geometry)
    }

    /// Reactive state as observers see it. Idle until the threshold is
    /// crossed.
    #[must_use]
    pub fn snapshot(&self) -> DragStateSnapshot {
        match &self.active {
            Some(drag) if drag.dragging.is_some() => DragStateSnapshot {
                phase: DragPhase::Dragging,
                kind: Some(drag.kind),
                dragged_id: Some(drag.dragged_id.clone()),
                source_group_id: drag.source_group_id.clone(),
                hover_group_id: drag.hover_group_id.clone(),
                hover_index: drag.hover_index,
                source_height: drag.visual_rect.height(),
            },
            Some(_) => DragStateSnapshot {
                phase: DragPhase::Armed,
                ..DragStateSnapshot::IDLE
            },
            None => DragStateSnapshot::IDLE,
        }
    }

    /// Whether a click reaching a draggable right now must be cancelled.
    #[must_use]
    pub fn should_suppress_click(&self) -> bool {
        self.click_guard.suppresses(self.host.now())
    }

    /// Context menus on draggables are swallowed while editing.
    #[must_use]
    pub fn should_suppress_context_menu(&self) -> bool {
        self.host.is_edit_mode()
    }

    // -- pointer lifecycle --------------------------------------------------

    /// Handle a press on a draggable.
    pub fn pointer_down(&mut self, request: ArmRequest<H::Node>) -> DragDispatch {
        let phase = DragLifecyclePhase::PointerDown;
        let pointer_id = request.pointer.pointer_id;
        let position = request.pointer.position;

        if self.active.is_some() {
            return DragDispatch::ignored(
                phase,
                DragIgnoredReason::ActiveSessionInProgress,
                Some(pointer_id),
                Some(position),
            );
        }
        if let Some(reason) = self.arm_rejection(&request) {
            return DragDispatch::ignored(phase, reason, Some(pointer_id), Some(position));
        }

        let kind = request.kind;
        debug!(
            target: LOG_TARGET,
            pointer_id,
            %kind,
            dragged_id = %request.dragged_id,
            "drag armed"
        );
        self.click_guard = ClickGuard::Lowered;
        self.active = Some(ActiveDrag {
            kind,
            anchor: position - request.visual_rect.origin(),
            dragged_id: request.dragged_id,
            source_group_id: request.source_group_id,
            pointer_id,
            visual: request.visual,
            visual_rect: request.visual_rect,
            card_size: request.card_size,
            start: position,
            input: position,
            hover_group_id: None,
            hover_index: None,
            dragging: None,
        });
        self.host.track_pointer(true);
        self.accepted(phase, Some(pointer_id), Some(kind), Some(position), DragLogOutcome::Armed)
    }

    /// Handle pointer motion. Promotes Armed to Dragging once travel exceeds
    /// the threshold; otherwise only records the position for the next frame.
    pub fn pointer_move(&mut self, pointer_id: u32, position: Point) -> DragDispatch {
        let phase = DragLifecyclePhase::PointerMove;
        let threshold_sq = self.config.drag_threshold_squared();
        let Some(drag) = self.active.as_mut() else {
            return DragDispatch::ignored(
                phase,
                DragIgnoredReason::NoActiveSession,
                Some(pointer_id),
                Some(position),
            );
        };
        if drag.pointer_id != pointer_id {
            return DragDispatch::ignored(
                phase,
                DragIgnoredReason::PointerMismatch,
                Some(pointer_id),
                Some(position),
            );
        }

        drag.input = position;
        let kind = drag.kind;
        if drag.dragging.is_some() || position.distance_squared(drag.start) <= threshold_sq {
            return self.accepted(
                phase,
                Some(pointer_id),
                Some(kind),
                Some(position),
                DragLogOutcome::Tracked,
            );
        }

        let hover = self.start_drag();
        let mut dispatch = self.accepted(
            phase,
            Some(pointer_id),
            Some(kind),
            Some(position),
            DragLogOutcome::DragStarted,
        );
        dispatch.hover = hover;
        dispatch
    }

    /// Handle a release. Ends the drag, delivering the drop if one was
    /// resolved.
    pub fn pointer_up(&mut self, pointer_id: u32) -> DragDispatch {
        self.finish(DragLifecyclePhase::PointerUp, Some(pointer_id))
    }

    /// Handle a cancelled pointer. Treated exactly like a release.
    pub fn pointer_cancel(&mut self, pointer_id: u32) -> DragDispatch {
        self.finish(DragLifecyclePhase::PointerCancel, Some(pointer_id))
    }

    /// Handle a window resize. A live drag commits at its current hover
    /// target, since the captured geometry is no longer valid; an armed press
    /// is left alone.
    pub fn resize(&mut self) -> DragDispatch {
        let phase = DragLifecyclePhase::Resize;
        if !self.is_dragging() {
            let reason = if self.active.is_some() {
                DragIgnoredReason::NotDragging
            } else {
                DragIgnoredReason::NoActiveSession
            };
            return DragDispatch::ignored(phase, reason, None, None);
        }
        self.finish(phase, None)
    }

    /// Run one animation frame at host time `now`.
    pub fn on_frame(&mut self, now: Duration) -> DragDispatch {
        let phase = DragLifecyclePhase::Frame;
        if !self.is_dragging() {
            return DragDispatch::ignored(
                phase,
                DragIgnoredReason::NotDragging,
                self.active_pointer_id(),
                None,
            );
        }
        let hover = self.render_frame(now);
        let (pointer_id, kind, position) = self
            .active
            .as_ref()
            .map(|drag| (Some(drag.pointer_id), Some(drag.kind), Some(drag.input)))
            .unwrap_or_default();
        let mut dispatch = self.accepted(
            phase,
            pointer_id,
            kind,
            position,
            DragLogOutcome::FrameRendered {
                hover_changed: hover.is_some(),
            },
        );
        dispatch.hover = hover;
        dispatch
    }

    /// Tear down any session in flight without delivering a drop.
    pub fn stop(&mut self) -> DragDispatch {
        let phase = DragLifecyclePhase::Stop;
        let Some((pointer_id, kind)) = self.active.as_ref().map(|d| (d.pointer_id, d.kind)) else {
            return DragDispatch::ignored(phase, DragIgnoredReason::NoActiveSession, None, None);
        };
        self.teardown(false);
        self.accepted(phase, Some(pointer_id), Some(kind), None, DragLogOutcome::Stopped)
    }

    // -- internals ------------------------------------------------------------

    fn arm_rejection(&self, request: &ArmRequest<H::Node>) -> Option<DragIgnoredReason> {
        let pointer = &request.pointer;
        if !self.host.is_edit_mode() {
            Some(DragIgnoredReason::EditModeOff)
        } else if !pointer.is_primary {
            Some(DragIgnoredReason::NotPrimaryPointer)
        } else if pointer.button != PointerButton::Primary {
            Some(DragIgnoredReason::ButtonNotAllowed)
        } else if pointer.kind == PointerKind::Touch {
            Some(DragIgnoredReason::TouchPointer)
        } else if request.on_interactive_control {
            Some(DragIgnoredReason::InteractiveTarget)
        } else {
            None
        }
    }

    /// Armed -> Dragging. Captures geometry, builds the ghost and runs the
    /// first frame synchronously so hover is known before any later frame.
    fn start_drag(&mut self) -> Option<HoverTarget> {
        let now = self.host.now();
        let drag = self.active.as_mut()?;

        self.click_guard = ClickGuard::Raised;
        self.host.set_grabbing_cursor(true);

        let captured = match self.host.set_pointer_capture(&drag.visual, drag.pointer_id) {
            Ok(()) => true,
            Err(error) => {
                debug!(
                    target: LOG_TARGET,
                    pointer_id = drag.pointer_id,
                    %error,
                    "pointer capture unavailable, dragging uncaptured"
                );
                false
            }
        };

        let geometry = GeometrySnapshot::from_provider(
            &self.host,
            &SnapshotRequest {
                kind: drag.kind,
                source_group_id: drag.source_group_id.as_deref(),
                card_size: drag.card_size,
            },
        );
        let spec = GhostSpec::new(
            drag.kind,
            drag.visual_rect,
            self.config.ghost_z_index,
            self.config.ghost_opacity,
        );
        self.host.create_ghost(&drag.visual, &spec);

        debug!(
            target: LOG_TARGET,
            pointer_id = drag.pointer_id,
            kind = %drag.kind,
            dragged_id = %drag.dragged_id,
            group_count = geometry.len(),
            "drag started"
        );

        drag.dragging = Some(Dragging {
            geometry,
            last_frame: now,
            last_collision: None,
            pending_frame: None,
            captured,
        });

        let started = DragNotification::Started {
            kind: drag.kind,
            dragged_id: drag.dragged_id.clone(),
            source_group_id: drag.source_group_id.clone(),
            source_height: drag.visual_rect.height(),
        };
        notify(&mut self.observers, &started);

        self.render_frame(now)
    }

    /// One frame: autoscroll, ghost paint, and (when the ghost moved or the
    /// page scrolled) a collision pass. Schedules the next frame.
    fn render_frame(&mut self, now: Duration) -> Option<HoverTarget> {
        let Self {
            host,
            config,
            active,
            observers,
            ..
        } = self;
        let drag = active.as_mut()?;
        let state = drag.dragging.as_mut()?;

        let dt = now
            .saturating_sub(state.last_frame)
            .as_secs_f64()
            .min(config.max_frame_dt_secs);
        state.last_frame = now;
        state.pending_frame = None;

        let pointer = drag.input;
        let scroll_delta = config
            .autoscroll()
            .delta(pointer.y, host.viewport().height, dt);
        if scroll_delta != 0.0 {
            host.scroll_by(scroll_delta);
        }
        let viewport = host.viewport();

        let ghost_size = drag.visual_rect.size();
        let placement = place_ghost(pointer, drag.anchor, ghost_size, viewport.size());
        drag.anchor = placement.anchor;
        host.paint_ghost(GhostTransform {
            left: placement.origin.x,
            top: placement.origin.y,
            scale: config.ghost_scale,
        });

        let center = viewport.point_to_document(placement.center(ghost_size));
        let moved = state
            .last_collision
            .is_none_or(|last| last.manhattan_distance(center) > config.collision_epsilon);

        let mut changed = None;
        if moved || scroll_delta != 0.0 {
            state.last_collision = Some(center);
            changed = update_hover(
                drag.kind,
                &drag.dragged_id,
                &state.geometry,
                &mut drag.hover_group_id,
                &mut drag.hover_index,
                center,
                &config.collision(),
            );
        }

        state.pending_frame = Some(host.request_frame());

        if let Some(target) = &changed {
            trace!(
                target: LOG_TARGET,
                group_id = ?target.group_id,
                index = target.index,
                "hover changed"
            );
            notify(observers, &DragNotification::HoverChanged(target.clone()));
        }
        changed
    }

    fn finish(&mut self, phase: DragLifecyclePhase, pointer_id: Option<u32>) -> DragDispatch {
        let Some(drag) = self.active.as_ref() else {
            return DragDispatch::ignored(
                phase,
                DragIgnoredReason::NoActiveSession,
                pointer_id,
                None,
            );
        };
        if let Some(id) = pointer_id
            && id != drag.pointer_id
        {
            return DragDispatch::ignored(phase, DragIgnoredReason::PointerMismatch, Some(id), None);
        }

        let owner = drag.pointer_id;
        let kind = drag.kind;
        let position = drag.input;
        let was_dragging = drag.dragging.is_some();

        let payload = self.teardown(true);
        let outcome = if was_dragging {
            DragLogOutcome::Dropped {
                delivered: payload.is_some(),
            }
        } else {
            DragLogOutcome::Released
        };
        let mut dispatch = self.accepted(phase, Some(owner), Some(kind), Some(position), outcome);
        dispatch.payload = payload;
        dispatch
    }

    /// Return to Idle. Safe to call in any state; host resources are released
    /// in a fixed order and any pending frame is cancelled.
    fn teardown(&mut self, deliver: bool) -> Option<DropPayload> {
        let drag = self.active.take()?;
        let ActiveDrag {
            kind,
            dragged_id,
            pointer_id,
            visual,
            hover_group_id,
            hover_index,
            dragging,
            ..
        } = drag;

        let mut payload = None;
        if let Some(state) = dragging {
            if let Some(token) = state.pending_frame {
                self.host.cancel_frame(token);
            }

            if deliver {
                match hover_index {
                    Some(target_index) => {
                        let drop = DropPayload {
                            kind,
                            src_id: dragged_id,
                            target_group_id: hover_group_id,
                            target_index,
                        };
                        debug!(
                            target: LOG_TARGET,
                            pointer_id,
                            kind = %drop.kind,
                            src_id = %drop.src_id,
                            target_group_id = ?drop.target_group_id,
                            target_index,
                            "drop"
                        );
                        if let Some(on_drop) = self.on_drop.as_mut() {
                            on_drop(drop.clone());
                        }
                        payload = Some(drop);
                    }
                    None => debug!(target: LOG_TARGET, pointer_id, "drag ended without a target"),
                }
            }

            self.host.remove_ghost();
            self.host.set_grabbing_cursor(false);
            if state.captured
                && let Err(error) = self.host.release_pointer_capture(&visual, pointer_id)
            {
                debug!(target: LOG_TARGET, pointer_id, %error, "pointer capture release failed");
            }

            let now = self.host.now();
            self.click_guard
                .linger(now, self.config.click_suppression());
            notify(
                &mut self.observers,
                &DragNotification::Ended {
                    dropped: payload.is_some(),
                },
            );
        }

        self.host.track_pointer(false);
        trace!(target: LOG_TARGET, pointer_id, "session torn down");
        payload
    }

    fn accepted(
        &mut self,
        phase: DragLifecyclePhase,
        pointer_id: Option<u32>,
        kind: Option<DragKind>,
        position: Option<Point>,
        outcome: DragLogOutcome,
    ) -> DragDispatch {
        let sequence = self.next_sequence;
        self.next_sequence = self.next_sequence.saturating_add(1);
        DragDispatch {
            hover: None,
            payload: None,
            log: DragLogEntry {
                phase,
                sequence: Some(sequence),
                pointer_id,
                kind,
                position,
                outcome,
            },
        }
    }
}

impl<H: DragHost> Drop for DragSession<H> {
    fn drop(&mut self) {
        self.teardown(false);
    }
}

/// Resolve against the frozen geometry and write back the hover fields.
/// Returns the new target only when something changed.
fn update_hover(
    kind: DragKind,
    dragged_id: &str,
    geometry: &GeometrySnapshot,
    hover_group_id: &mut Option<String>,
    hover_index: &mut Option<usize>,
    center: Point,
    collision: &CollisionConfig,
) -> Option<HoverTarget> {
    let target = resolve(
        kind,
        geometry,
        dragged_id,
        hover_group_id.as_deref(),
        center,
        collision,
    )?;
    let mut changed = false;
    if *hover_group_id != target.group_id {
        hover_group_id.clone_from(&target.group_id);
        changed = true;
    }
    if *hover_index != Some(target.index) {
        *hover_index = Some(target.index);
        changed = true;
    }
    changed.then_some(target)
}

fn notify(observers: &mut [Observer], notification: &DragNotification) {
    for observer in observers.iter_mut() {
        observer(notification);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::CaptureError;
    use startgrid_core::Viewport;
    use startgrid_layout::{GridMeasurement, GroupMeasurement, LayoutProvider};

    #[derive(Default)]
    struct StubHost {
        now: Duration,
        edit_mode: bool,
        scroll_y: f64,
        groups: Vec<GroupMeasurement>,
        frames: u64,
        cancelled: Vec<FrameToken>,
        ghosts: usize,
        tracking: bool,
        capture_fails: bool,
    }

    impl LayoutProvider for StubHost {
        fn viewport(&self) -> Viewport {
            Viewport::new(1000.0, 800.0, 0.0, self.scroll_y)
        }

        fn measure_groups(&self) -> Vec<GroupMeasurement> {
            self.groups.clone()
        }
    }

    impl DragHost for StubHost {
        type Node = &'static str;

        fn now(&self) -> Duration {
            self.now
        }
        fn is_edit_mode(&self) -> bool {
            self.edit_mode
        }
        fn scroll_by(&mut self, dy: f64) {
            self.scroll_y += dy;
        }
        fn set_pointer_capture(&mut self, _: &&'static str, id: u32) -> Result<(), CaptureError> {
            if self.capture_fails {
                Err(CaptureError::InvalidPointer(id))
            } else {
                Ok(())
            }
        }
        fn release_pointer_capture(
            &mut self,
            _: &&'static str,
            _: u32,
        ) -> Result<(), CaptureError> {
            Ok(())
        }
        fn set_grabbing_cursor(&mut self, _: bool) {}
        fn track_pointer(&mut self, active: bool) {
            self.tracking = active;
        }
        fn create_ghost(&mut self, _: &&'static str, _: &GhostSpec) {
            self.ghosts += 1;
        }
        fn paint_ghost(&mut self, _: GhostTransform) {}
        fn remove_ghost(&mut self) {
            self.ghosts = self.ghosts.saturating_sub(1);
        }
        fn request_frame(&mut self) -> FrameToken {
            self.frames += 1;
            FrameToken(self.frames)
        }
        fn cancel_frame(&mut self, token: FrameToken) {
            self.cancelled.push(token);
        }
    }

    fn host() -> StubHost {
        StubHost {
            edit_mode: true,
            groups: vec![GroupMeasurement {
                id: "g1".into(),
                rect: Rect::new(0.0, 200.0, 600.0, 500.0),
                grid: Some(GridMeasurement {
                    rect: Rect::new(0.0, 240.0, 600.0, 500.0),
                    padding_left: 0.0,
                    padding_right: 0.0,
                    padding_top: 0.0,
                    column_gap: 0.0,
                    row_gap: 0.0,
                    site_count: 2,
                }),
            }],
            ..StubHost::default()
        }
    }

    fn site_press(pointer_id: u32) -> ArmRequest<&'static str> {
        ArmRequest {
            kind: DragKind::Site,
            dragged_id: "s1".into(),
            source_group_id: Some("g1".into()),
            pointer: PointerSample::mouse(pointer_id, Point::new(50.0, 260.0)),
            on_interactive_control: false,
            visual: "s1",
            visual_rect: Rect::new(0.0, 240.0, 100.0, 300.0),
            card_size: Size::new(100.0, 60.0),
        }
    }

    fn session() -> DragSession<StubHost> {
        DragSession::new(host(), DragConfig::default()).expect("default config is valid")
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = DragConfig {
            drag_threshold: -1.0,
            ..DragConfig::default()
        };
        let err = DragSession::new(host(), config).expect_err("negative threshold");
        assert!(matches!(err, DragConfigError::Validation(_)));
    }

    #[test]
    fn press_arms_without_visible_state() {
        let mut session = session();
        let dispatch = session.pointer_down(site_press(1));
        assert_eq!(dispatch.log.outcome, DragLogOutcome::Armed);
        assert_eq!(dispatch.log.sequence, Some(1));
        assert_eq!(session.phase(), DragPhase::Armed);
        assert!(!session.snapshot().is_dragging());
        assert!(session.host().tracking);
        assert_eq!(session.host().ghosts, 0);
    }

    #[test]
    fn movement_within_threshold_stays_armed() {
        let mut session = session();
        session.pointer_down(site_press(1));
        let dispatch = session.pointer_move(1, Point::new(53.0, 264.0));
        assert_eq!(dispatch.log.outcome, DragLogOutcome::Tracked);
        assert_eq!(session.phase(), DragPhase::Armed);
    }

    #[test]
    fn crossing_threshold_runs_first_frame_synchronously() {
        let mut session = session();
        session.pointer_down(site_press(1));
        let dispatch = session.pointer_move(1, Point::new(60.0, 262.0));
        assert_eq!(dispatch.log.outcome, DragLogOutcome::DragStarted);
        assert!(dispatch.hover.is_some());
        let snapshot = session.snapshot();
        assert_eq!(snapshot.hover_group_id.as_deref(), Some("g1"));
        assert_eq!(snapshot.source_height, 60.0);
        assert_eq!(session.host().ghosts, 1);
        assert_eq!(session.host().frames, 1);
        assert_eq!(session.geometry().map(GeometrySnapshot::len), Some(1));
    }

    #[test]
    fn capture_failure_is_not_fatal() {
        let mut host = host();
        host.capture_fails = true;
        let mut session = DragSession::new(host, DragConfig::default()).expect("valid");
        session.pointer_down(site_press(1));
        session.pointer_move(1, Point::new(80.0, 262.0));
        assert!(session.is_dragging());
    }

    #[test]
    fn release_before_threshold_is_silent() {
        let mut session = session();
        session.pointer_down(site_press(1));
        let dispatch = session.pointer_up(1);
        assert_eq!(dispatch.log.outcome, DragLogOutcome::Released);
        assert_eq!(dispatch.payload, None);
        assert!(!session.should_suppress_click());
        assert!(!session.host().tracking);
    }

    #[test]
    fn stop_discards_drop_and_cancels_frame() {
        let mut session = session();
        let drops = std::rc::Rc::new(std::cell::Cell::new(0));
        let seen = drops.clone();
        session.set_on_drop(move |_| seen.set(seen.get() + 1));
        session.pointer_down(site_press(1));
        session.pointer_move(1, Point::new(80.0, 262.0));
        let dispatch = session.stop();
        assert_eq!(dispatch.log.outcome, DragLogOutcome::Stopped);
        assert_eq!(drops.get(), 0);
        assert_eq!(session.host().cancelled, vec![FrameToken(1)]);
        assert_eq!(session.host().ghosts, 0);
        assert_eq!(
            session.stop().log.outcome,
            DragLogOutcome::Ignored(DragIgnoredReason::NoActiveSession)
        );
    }

    #[test]
    fn frames_outside_a_drag_are_ignored() {
        let mut session = session();
        let dispatch = session.on_frame(Duration::from_millis(16));
        assert!(dispatch.is_ignored());
        session.pointer_down(site_press(1));
        assert_eq!(
            session.on_frame(Duration::from_millis(32)).log.outcome,
            DragLogOutcome::Ignored(DragIgnoredReason::NotDragging)
        );
    }

    #[test]
    fn context_menu_follows_edit_mode() {
        let mut session = session();
        assert!(session.should_suppress_context_menu());
        session.host_mut().edit_mode = false;
        assert!(!session.should_suppress_context_menu());
    }

    #[test]
    fn ignored_reason_display() {
        assert_eq!(
            DragIgnoredReason::PointerMismatch.to_string(),
            "pointer does not own the session"
        );
    }
}
