#![forbid(unsafe_code)]

//! Host capabilities the drag session is built on.
//!
//! The session never touches a DOM, a timer, or a window directly. Everything
//! it needs from the embedding environment goes through [`DragHost`], which
//! the browser build implements with `web-sys` and tests implement with a
//! recording fake.

use core::fmt;
use core::time::Duration;
use std::cell::Cell;
use std::rc::Rc;

use startgrid_layout::LayoutProvider;

use crate::ghost::{GhostSpec, GhostTransform};

/// Handle of a requested animation frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameToken(pub u64);

/// Pointer capture could not be set or released.
///
/// The session treats this as non-fatal and keeps dragging uncaptured.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureError {
    /// The host cannot capture pointers at all.
    Unsupported,
    /// The pointer is no longer active (e.g. already released).
    InvalidPointer(u32),
    /// The host refused for another reason.
    Rejected(String),
}

impl fmt::Display for CaptureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unsupported => write!(f, "pointer capture unsupported"),
            Self::InvalidPointer(id) => write!(f, "pointer {id} is not active"),
            Self::Rejected(msg) => write!(f, "pointer capture rejected: {msg}"),
        }
    }
}

impl std::error::Error for CaptureError {}

/// Everything a [`DragSession`](crate::DragSession) needs from its host.
///
/// `Node` is the host's handle to the element that visually detaches during a
/// drag: the group card for group drags, the site card for site drags.
pub trait DragHost: LayoutProvider {
    type Node;

    /// Monotonic clock, on the same time base as frame timestamps.
    fn now(&self) -> Duration;

    /// Whether the UI is in edit mode. Drags only arm while this is true.
    fn is_edit_mode(&self) -> bool;

    /// Scroll the document vertically by `dy` pixels.
    fn scroll_by(&mut self, dy: f64);

    fn set_pointer_capture(&mut self, node: &Self::Node, pointer_id: u32)
    -> Result<(), CaptureError>;

    fn release_pointer_capture(
        &mut self,
        node: &Self::Node,
        pointer_id: u32,
    ) -> Result<(), CaptureError>;

    /// Toggle the global "grabbing" cursor.
    fn set_grabbing_cursor(&mut self, active: bool);

    /// Attach (`true`) or detach (`false`) the window-level move/up/cancel/resize
    /// listeners that feed the session.
    fn track_pointer(&mut self, active: bool);

    /// Clone `source` into a floating ghost styled per `spec`.
    fn create_ghost(&mut self, source: &Self::Node, spec: &GhostSpec);

    fn paint_ghost(&mut self, transform: GhostTransform);

    /// Remove the ghost from the document. Must tolerate a missing ghost.
    fn remove_ghost(&mut self);

    /// Ask for one call to [`DragSession::on_frame`](crate::DragSession::on_frame).
    fn request_frame(&mut self) -> FrameToken;

    fn cancel_frame(&mut self, token: FrameToken);
}

/// Edit-mode flag shared between the page and its host.
///
/// Clones observe one flag. Reading it never touches the session, so it stays
/// readable from drop callbacks and observers that run mid-dispatch.
#[derive(Debug, Default, Clone)]
pub struct EditMode(Rc<Cell<bool>>);

impl EditMode {
    #[must_use]
    pub fn new(enabled: bool) -> Self {
        Self(Rc::new(Cell::new(enabled)))
    }

    #[must_use]
    pub fn get(&self) -> bool {
        self.0.get()
    }

    pub fn set(&self, enabled: bool) {
        self.0.set(enabled);
    }
}

/// Deterministic monotonic clock controlled by the host.
#[derive(Debug, Default, Clone)]
pub struct DeterministicClock {
    now: Duration,
}

impl DeterministicClock {
    /// Create a clock starting at `0`.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            now: Duration::ZERO,
        }
    }

    /// Current monotonic time.
    #[must_use]
    pub const fn now(&self) -> Duration {
        self.now
    }

    /// Set current monotonic time.
    pub fn set(&mut self, now: Duration) {
        self.now = now;
    }

    /// Advance monotonic time by `dt`.
    pub fn advance(&mut self, dt: Duration) {
        self.now = self.now.saturating_add(dt);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_advances_and_saturates() {
        let mut clock = DeterministicClock::new();
        clock.advance(Duration::from_millis(16));
        assert_eq!(clock.now(), Duration::from_millis(16));
        clock.set(Duration::MAX);
        clock.advance(Duration::from_secs(1));
        assert_eq!(clock.now(), Duration::MAX);
    }

    #[test]
    fn edit_mode_clones_share_one_flag() {
        let page = EditMode::new(false);
        let host = page.clone();
        assert!(!host.get());
        page.set(true);
        assert!(host.get());
        assert!(!EditMode::default().get());
    }

    #[test]
    fn capture_error_messages() {
        assert_eq!(
            CaptureError::InvalidPointer(7).to_string(),
            "pointer 7 is not active"
        );
        assert_eq!(
            CaptureError::Rejected("detached".into()).to_string(),
            "pointer capture rejected: detached"
        );
    }
}
