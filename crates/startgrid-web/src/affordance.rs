#![forbid(unsafe_code)]

//! Edit-mode affordances and post-drag click suppression.

use core::time::Duration;

use startgrid_core::DragKind;

/// Selector for descendants that must never start a drag.
pub const INTERACTIVE_SELECTOR: &str = "button, input, textarea, select, [data-no-drag]";

/// Class put on the document body while a drag is in flight.
pub const GRABBING_CURSOR_CLASS: &str = "cursor-grabbing";

/// Styling a draggable carries while edit mode is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Affordance {
    /// CSS cursor keyword.
    pub cursor: &'static str,
    /// Disable text selection so a press-and-move does not select text.
    pub disable_user_select: bool,
}

impl Affordance {
    /// Affordance for a draggable of `kind`; `None` outside edit mode, which
    /// means the host strips cursor and listeners entirely.
    #[must_use]
    pub const fn for_kind(kind: DragKind, edit_mode: bool) -> Option<Self> {
        if !edit_mode {
            return None;
        }
        let cursor = match kind {
            DragKind::Group => "grab",
            DragKind::Site => "move",
        };
        Some(Self {
            cursor,
            disable_user_select: true,
        })
    }
}

/// Sticky "has dragged" flag that swallows the click the browser fires right
/// after a drag release on the same element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClickGuard {
    /// No drag happened since the last press.
    #[default]
    Lowered,
    /// A drag is in flight.
    Raised,
    /// The drag ended; clicks stay suppressed until the deadline.
    Lingering { until: Duration },
}

impl ClickGuard {
    /// Whether a click arriving at `now` must be cancelled.
    #[must_use]
    pub fn suppresses(&self, now: Duration) -> bool {
        match *self {
            Self::Lowered => false,
            Self::Raised => true,
            Self::Lingering { until } => now < until,
        }
    }

    /// Start the post-drag grace window. No-op unless a drag was raised.
    pub fn linger(&mut self, now: Duration, window: Duration) {
        if matches!(self, Self::Raised) {
            *self = Self::Lingering {
                until: now.saturating_add(window),
            };
        }
    }
}
