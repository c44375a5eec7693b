#![forbid(unsafe_code)]

//! Pointer input as the session sees it.

use startgrid_core::Point;
use tracing::trace;

const LOG_TARGET: &str = "startgrid_web::pointer";

/// Map a DOM `pointerId`. Browsers never hand out negative ids; one that
/// shows up anyway is logged and folded to `0`.
#[must_use]
pub fn pointer_id_from_dom(raw: i32) -> u32 {
    u32::try_from(raw).unwrap_or_else(|_| {
        trace!(target: LOG_TARGET, pointer_id = raw, "negative pointer id mapped to 0");
        0
    })
}

/// Pointer button, as reported by `PointerEvent.button`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Auxiliary,
    Secondary,
    Other(i16),
}

impl PointerButton {
    /// Map a DOM `button` code.
    #[must_use]
    pub const fn from_dom(button: i16) -> Self {
        match button {
            0 => Self::Primary,
            1 => Self::Auxiliary,
            2 => Self::Secondary,
            other => Self::Other(other),
        }
    }
}

/// Input device class, as reported by `PointerEvent.pointerType`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerKind {
    Mouse,
    Pen,
    Touch,
    Unknown,
}

impl PointerKind {
    /// Map a DOM `pointerType` string.
    #[must_use]
    pub fn from_dom(pointer_type: &str) -> Self {
        match pointer_type {
            "mouse" => Self::Mouse,
            "pen" => Self::Pen,
            "touch" => Self::Touch,
            _ => Self::Unknown,
        }
    }
}

/// One pointer-down sample in viewport coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerSample {
    pub pointer_id: u32,
    pub position: Point,
    pub button: PointerButton,
    pub kind: PointerKind,
    pub is_primary: bool,
}

impl PointerSample {
    /// A primary-button press from the primary mouse pointer.
    #[must_use]
    pub const fn mouse(pointer_id: u32, position: Point) -> Self {
        Self {
            pointer_id,
            position,
            button: PointerButton::Primary,
            kind: PointerKind::Mouse,
            is_primary: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dom_codes_map() {
        assert_eq!(PointerButton::from_dom(0), PointerButton::Primary);
        assert_eq!(PointerButton::from_dom(2), PointerButton::Secondary);
        assert_eq!(PointerButton::from_dom(4), PointerButton::Other(4));
        assert_eq!(PointerKind::from_dom("touch"), PointerKind::Touch);
        assert_eq!(PointerKind::from_dom(""), PointerKind::Unknown);
    }

    #[test]
    fn dom_pointer_ids_map() {
        assert_eq!(pointer_id_from_dom(7), 7);
        assert_eq!(pointer_id_from_dom(i32::MAX), 2_147_483_647);
        assert_eq!(pointer_id_from_dom(-1), 0);
    }
}
