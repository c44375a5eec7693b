#![forbid(unsafe_code)]

//! Ghost geometry and styling.
//!
//! The ghost is a detached clone of the dragged card that follows the pointer.
//! This module decides where it goes ([`place_ghost`]) and what the host has
//! to apply to it ([`GhostSpec`], [`GhostTransform`]); the host owns the
//! actual element.

use startgrid_core::{DragKind, Point, Rect, Size};

/// Drop shadow applied to the floating clone.
pub const GHOST_BOX_SHADOW: &str = "0 20px 40px -5px rgb(0 0 0 / 0.3)";

/// Classes the clone inherits from the source that must not float with it.
pub const GHOST_STRIPPED_CLASSES: [&str; 3] = ["animate-fade", "cursor-grab", "cursor-move"];

/// Per-frame ghost paint: a translate plus a constant scale.
///
/// Only `transform` is ever rewritten, so painting never triggers layout.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GhostTransform {
    pub left: f64,
    pub top: f64,
    pub scale: f64,
}

impl GhostTransform {
    /// CSS `transform` value.
    #[must_use]
    pub fn to_css(&self) -> String {
        if self.scale == 1.0 {
            format!("translate3d({}px, {}px, 0)", self.left, self.top)
        } else {
            format!(
                "translate3d({}px, {}px, 0) scale({})",
                self.left, self.top, self.scale
            )
        }
    }
}

/// Everything the host needs to build the ghost element.
#[derive(Debug, Clone, PartialEq)]
pub struct GhostSpec {
    pub kind: DragKind,
    /// Explicit size, copied from the source's measured rectangle.
    pub size: Size,
    /// Transform before the first frame: the source's own position.
    pub initial: GhostTransform,
    pub z_index: i32,
    pub opacity: f64,
    pub box_shadow: &'static str,
    pub stripped_classes: &'static [&'static str],
}

impl GhostSpec {
    /// Spec for a ghost that starts exactly over `source` (viewport space).
    #[must_use]
    pub fn new(kind: DragKind, source: Rect, z_index: i32, opacity: f64) -> Self {
        Self {
            kind,
            size: source.size(),
            initial: GhostTransform {
                left: source.left,
                top: source.top,
                scale: 1.0,
            },
            z_index,
            opacity,
            box_shadow: GHOST_BOX_SHADOW,
            stripped_classes: &GHOST_STRIPPED_CLASSES,
        }
    }

    /// Inline style declarations, in application order.
    #[must_use]
    pub fn style_properties(&self) -> Vec<(&'static str, String)> {
        vec![
            ("position", "fixed".to_owned()),
            ("top", "0px".to_owned()),
            ("left", "0px".to_owned()),
            ("width", format!("{}px", self.size.width)),
            ("height", format!("{}px", self.size.height)),
            ("z-index", self.z_index.to_string()),
            ("pointer-events", "none".to_owned()),
            ("transform", self.initial.to_css()),
            ("box-shadow", self.box_shadow.to_owned()),
            ("transition", "none".to_owned()),
            ("opacity", self.opacity.to_string()),
            ("will-change", "transform".to_owned()),
        ]
    }
}

/// Result of clamping the ghost into the viewport.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GhostPlacement {
    /// Clamped top-left corner, viewport space.
    pub origin: Point,
    /// Anchor to use from now on; differs from the input anchor on any axis
    /// where clamping kicked in.
    pub anchor: Point,
}

impl GhostPlacement {
    /// Logical center of a ghost of `size` at this placement, viewport space.
    #[must_use]
    pub fn center(&self, size: Size) -> Point {
        Point::new(
            self.origin.x + size.width / 2.0,
            self.origin.y + size.height / 2.0,
        )
    }
}

/// Position the ghost under `pointer`, keeping it fully inside `viewport`.
///
/// When an axis is clamped the anchor is re-derived from the clamped
/// position, so the ghost tracks the pointer 1:1 from where it stopped
/// instead of snapping back once the pointer returns.
#[must_use]
pub fn place_ghost(pointer: Point, anchor: Point, ghost: Size, viewport: Size) -> GhostPlacement {
    let raw = pointer - anchor;
    let left = clamp_axis(raw.x, viewport.width - ghost.width);
    let top = clamp_axis(raw.y, viewport.height - ghost.height);

    let mut next_anchor = anchor;
    if left != raw.x {
        next_anchor.x = pointer.x - left;
    }
    if top != raw.y {
        next_anchor.y = pointer.y - top;
    }

    GhostPlacement {
        origin: Point::new(left, top),
        anchor: next_anchor,
    }
}

fn clamp_axis(value: f64, max: f64) -> f64 {
    value.min(max).max(0.0)
}
