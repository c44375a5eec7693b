#![forbid(unsafe_code)]

//! Drag geometry: snapshots, collision resolution, and autoscroll.
//!
//! Everything in this crate is pure. Live layout enters only through the
//! [`LayoutProvider`] trait at snapshot time; after that the per-frame work is
//! arithmetic over a frozen [`GeometrySnapshot`], which keeps the resolver
//! testable with synthetic geometry.

pub mod autoscroll;
pub mod collision;
pub mod snapshot;

pub use autoscroll::{AutoscrollConfig, DEFAULT_SCROLL_SPEED_PER_SEC, DEFAULT_SCROLL_ZONE};
pub use collision::{
    CollisionConfig, DEFAULT_EMPTY_GROUP_MIN_HEIGHT, DEFAULT_HOVER_EXPANSION, active_group,
    grid_index, resolve, resolve_group_drop, resolve_site_drop,
};
pub use snapshot::{
    GeometrySnapshot, GridMeasurement, GridMetrics, GroupMeasurement, GroupMeta, LayoutProvider,
    SnapshotRequest,
};
pub use startgrid_core::{DragKind, HoverTarget, Point, Rect, Size, Viewport};
