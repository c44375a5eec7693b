#![forbid(unsafe_code)]

//! `startgrid-web` is the pointer-driven drag engine for the startpage editor.
//!
//! Design goals:
//! - **Host-driven I/O**: the embedding environment forwards pointer events,
//!   resizes and animation frames; the session never reaches for globals.
//! - **Deterministic time**: frame timestamps and the clock come from the
//!   host, so every drag can be replayed in tests.
//! - **One drag at a time**: a [`DragSession`] owns all per-drag state and
//!   tears it down synchronously.
//!
//! On `wasm32` the [`dom`] module provides a [`DragHost`] over the live
//! document. Everywhere else the session runs against any host that
//! implements the trait.

pub mod affordance;
pub mod config;
#[cfg(target_arch = "wasm32")]
pub mod dom;
pub mod ghost;
pub mod host;
pub mod pointer;
pub mod session;
pub mod style;

pub use affordance::{Affordance, ClickGuard, GRABBING_CURSOR_CLASS, INTERACTIVE_SELECTOR};
pub use config::{DEFAULT_DRAG_THRESHOLD, DragConfig, DragConfigError};
pub use ghost::{GhostPlacement, GhostSpec, GhostTransform, place_ghost};
pub use host::{CaptureError, DeterministicClock, DragHost, EditMode, FrameToken};
pub use pointer::{PointerButton, PointerKind, PointerSample, pointer_id_from_dom};
pub use session::{
    ArmRequest, DragDispatch, DragIgnoredReason, DragLifecyclePhase, DragLogEntry,
    DragLogOutcome, DragNotification, DragPhase, DragSession, DragStateSnapshot,
};

pub use startgrid_core::{DragKind, DropPayload, HoverTarget, Point, Rect, Size, Viewport};
pub use startgrid_layout::{GeometrySnapshot, GridMeasurement, GroupMeasurement, LayoutProvider};
