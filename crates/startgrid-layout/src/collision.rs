#![forbid(unsafe_code)]

//! Collision resolution: map the ghost's logical center to a drop target.
//!
//! Two strategies, selected by [`DragKind`]:
//!
//! - **Group drags** reorder a flat vertical list. The dragged group is
//!   removed from consideration and the first remaining group whose vertical
//!   center lies strictly below the ghost center becomes the insertion point.
//! - **Site drags** move a card across 2-D grids. The active group is the one
//!   whose (adjusted) rectangle contains the point, otherwise the nearest group
//!   by center distance; the insertion index is then derived from the grid
//!   cell under the point.
//!
//! The two strategies intentionally resolve ties differently. Groups are a
//! 1-D list where an exact center hit falls through to the next candidate;
//! sites need the rect-then-nearest fallback so empty or degenerate groups
//! remain reachable.
//!
//! # Invariants
//!
//! 1. A resolved `index` is always within `[0, item_count]` of its group
//!    (or `[0, remaining_groups]` for group drags).
//! 2. Group drags never produce a `group_id`.
//! 3. Site drags resolve to *some* group whenever the snapshot is non-empty.

use serde::{Deserialize, Serialize};
use startgrid_core::{DragKind, HoverTarget, Point};

use crate::snapshot::{GeometrySnapshot, GroupMeta};

/// Default downward extension of the currently hovered group's rectangle.
pub const DEFAULT_HOVER_EXPANSION: f64 = 100.0;

/// Default minimum effective height of an empty group's drop area.
pub const DEFAULT_EMPTY_GROUP_MIN_HEIGHT: f64 = 100.0;

/// Tunables for the site-drag strategy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CollisionConfig {
    /// Hysteresis: how far below its bottom edge the hovered group keeps
    /// claiming the pointer.
    pub hover_expansion: f64,
    /// Empty groups are treated as at least this tall.
    pub empty_group_min_height: f64,
}

impl Default for CollisionConfig {
    fn default() -> Self {
        Self {
            hover_expansion: DEFAULT_HOVER_EXPANSION,
            empty_group_min_height: DEFAULT_EMPTY_GROUP_MIN_HEIGHT,
        }
    }
}

/// Resolve the hover target for a drag of `kind`.
///
/// `current_group` is the group currently hovered (site drags only); it
/// receives the hysteresis extension. Returns `None` only for site drags
/// against an empty snapshot.
#[must_use]
pub fn resolve(
    kind: DragKind,
    snapshot: &GeometrySnapshot,
    dragged_id: &str,
    current_group: Option<&str>,
    center: Point,
    config: &CollisionConfig,
) -> Option<HoverTarget> {
    match kind {
        DragKind::Group => Some(resolve_group_drop(snapshot, dragged_id, center.y)),
        DragKind::Site => resolve_site_drop(snapshot, current_group, center, config),
    }
}

/// Group strategy: insert-before the first group whose center is below `y`.
#[must_use]
pub fn resolve_group_drop(snapshot: &GeometrySnapshot, dragged_id: &str, y: f64) -> HoverTarget {
    let mut remaining = 0;
    for group in snapshot.groups().iter().filter(|g| g.id != dragged_id) {
        if y < group.rect.center().y {
            return HoverTarget::in_group_list(remaining);
        }
        remaining += 1;
    }
    HoverTarget::in_group_list(remaining)
}

/// Site strategy: pick the active group, then the grid cell under `point`.
#[must_use]
pub fn resolve_site_drop(
    snapshot: &GeometrySnapshot,
    current_group: Option<&str>,
    point: Point,
    config: &CollisionConfig,
) -> Option<HoverTarget> {
    let active = active_group(snapshot, current_group, point, config)?;
    Some(HoverTarget::in_group(
        active.id.clone(),
        grid_index(active, point),
    ))
}

/// Find the group under `point`, falling back to the nearest group center.
#[must_use]
pub fn active_group<'a>(
    snapshot: &'a GeometrySnapshot,
    current_group: Option<&str>,
    point: Point,
    config: &CollisionConfig,
) -> Option<&'a GroupMeta> {
    let mut nearest: Option<(&GroupMeta, f64)> = None;

    for group in snapshot.groups() {
        let mut area = group.rect;
        if current_group == Some(group.id.as_str()) {
            area = area.with_bottom(area.bottom + config.hover_expansion);
        }
        if group.is_empty() {
            area = area.with_bottom(area.bottom.max(area.top + config.empty_group_min_height));
        }

        if area.contains(point) {
            return Some(group);
        }

        let distance = point.distance_squared(area.center());
        if nearest.is_none_or(|(_, best)| distance < best) {
            nearest = Some((group, distance));
        }
    }

    nearest.map(|(group, _)| group)
}

/// Insertion index of `point` within `group`'s grid.
///
/// Columns are clamped into range, rows only from below; the final index is
/// clamped to `item_count`, which is the append position.
#[must_use]
pub fn grid_index(group: &GroupMeta, point: Point) -> usize {
    if group.is_empty() {
        return 0;
    }

    let grid = &group.grid;
    let rel_x = point.x - (group.rect.left + grid.offset_x);
    let rel_y = point.y - (group.rect.top + grid.offset_y);

    let max_col = grid.cols.saturating_sub(1);
    let col = cell_coordinate(rel_x, grid.cell_width).min(max_col);
    let row = cell_coordinate(rel_y, grid.cell_height);

    row.saturating_mul(grid.cols)
        .saturating_add(col)
        .min(group.item_count)
}

/// Floor `offset / cell` into a non-negative cell coordinate.
fn cell_coordinate(offset: f64, cell: f64) -> usize {
    if cell <= 0.0 {
        return 0;
    }
    let raw = (offset / cell).floor();
    if raw.is_nan() || raw <= 0.0 {
        0
    } else {
        // Saturating float-to-int cast.
        raw as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::GridMetrics;
    use pretty_assertions::assert_eq;
    use startgrid_core::Rect;

    fn meta(id: &str, rect: Rect, cols: usize, item_count: usize) -> GroupMeta {
        GroupMeta {
            id: id.into(),
            rect,
            grid: GridMetrics {
                cols,
                cell_width: 100.0,
                cell_height: 50.0,
                offset_x: 10.0,
                offset_y: 20.0,
            },
            item_count,
        }
    }

    /// Three stacked groups, 200px tall, 20px apart.
    fn stacked() -> GeometrySnapshot {
        GeometrySnapshot::from_groups(vec![
            meta("a", Rect::new(0.0, 0.0, 400.0, 200.0), 3, 3),
            meta("b", Rect::new(0.0, 220.0, 400.0, 420.0), 3, 3),
            meta("c", Rect::new(0.0, 440.0, 400.0, 640.0), 3, 3),
        ])
    }

    // -- group strategy ----------------------------------------------------

    #[test]
    fn group_drop_above_first_center_is_index_zero() {
        let target = resolve_group_drop(&stacked(), "c", 50.0);
        assert_eq!(target, HoverTarget::in_group_list(0));
    }

    #[test]
    fn group_drop_between_centers_inserts_before_next() {
        // a center 100, b center 320; dragging c
        assert_eq!(resolve_group_drop(&stacked(), "c", 150.0).index, 1);
    }

    #[test]
    fn group_drop_below_all_centers_appends() {
        let target = resolve_group_drop(&stacked(), "a", 10_000.0);
        assert_eq!(target, HoverTarget::in_group_list(2));
    }

    #[test]
    fn group_drop_exact_center_falls_through() {
        // y == a's center: strict less-than skips a.
        assert_eq!(resolve_group_drop(&stacked(), "c", 100.0).index, 1);
    }

    #[test]
    fn group_drop_skips_dragged_group() {
        // Dragging b: a(100) and c(540) remain. 300 sits after a, before c.
        assert_eq!(resolve_group_drop(&stacked(), "b", 300.0).index, 1);
    }

    #[test]
    fn group_drop_never_names_a_group() {
        let target = resolve(
            DragKind::Group,
            &stacked(),
            "a",
            Some("b"),
            Point::new(10.0, 10.0),
            &CollisionConfig::default(),
        )
        .expect("group drags always resolve");
        assert_eq!(target.group_id, None);
    }

    #[test]
    fn group_drop_with_no_other_groups_is_index_zero() {
        let snapshot =
            GeometrySnapshot::from_groups(vec![meta("a", Rect::new(0.0, 0.0, 1.0, 1.0), 1, 0)]);
        assert_eq!(resolve_group_drop(&snapshot, "a", 0.0).index, 0);
    }

    // -- site strategy -----------------------------------------------------

    #[test]
    fn first_cell_resolves_to_index_zero() {
        let group = meta("a", Rect::new(0.0, 0.0, 400.0, 200.0), 3, 6);
        // content origin (10, 20); center of cell (0, 0)
        assert_eq!(grid_index(&group, Point::new(10.0 + 50.0, 20.0 + 25.0)), 0);
    }

    #[test]
    fn column_is_clamped_and_row_counts() {
        let group = meta("a", Rect::new(0.0, 0.0, 400.0, 200.0), 3, 9);
        let point = Point::new(10.0 + 3.5 * 100.0, 20.0 + 1.5 * 50.0);
        assert_eq!(grid_index(&group, point), 5);
    }

    #[test]
    fn index_is_clamped_to_item_count() {
        let group = meta("a", Rect::new(0.0, 0.0, 400.0, 200.0), 3, 4);
        let point = Point::new(10.0 + 3.5 * 100.0, 20.0 + 1.5 * 50.0);
        assert_eq!(grid_index(&group, point), 4);
    }

    #[test]
    fn far_below_grid_appends() {
        let group = meta("a", Rect::new(0.0, 0.0, 400.0, 200.0), 3, 7);
        assert_eq!(grid_index(&group, Point::new(15.0, 1.0e12)), 7);
    }

    #[test]
    fn left_and_above_content_clamp_to_zero() {
        let group = meta("a", Rect::new(0.0, 0.0, 400.0, 200.0), 3, 7);
        assert_eq!(grid_index(&group, Point::new(-50.0, -50.0)), 0);
    }

    #[test]
    fn empty_group_always_index_zero() {
        let group = meta("e", Rect::new(0.0, 0.0, 400.0, 30.0), 3, 0);
        assert_eq!(grid_index(&group, Point::new(390.0, 25.0)), 0);
    }

    #[test]
    fn containing_group_wins() {
        let target = resolve_site_drop(
            &stacked(),
            None,
            Point::new(60.0, 250.0),
            &CollisionConfig::default(),
        );
        assert_eq!(target, Some(HoverTarget::in_group("b", 0)));
    }

    #[test]
    fn gap_between_groups_uses_nearest_center() {
        // y = 215 is in the gap between a (0..200) and b (220..420).
        // a center (200, 100) is 115 away vertically; b center (200, 320) 105.
        let target = resolve_site_drop(
            &stacked(),
            None,
            Point::new(200.0, 215.0),
            &CollisionConfig::default(),
        )
        .expect("non-empty snapshot resolves");
        assert_eq!(target.group_id.as_deref(), Some("b"));
    }

    #[test]
    fn hovered_group_keeps_pointer_within_expansion() {
        let config = CollisionConfig::default();
        let point = Point::new(200.0, 215.0);
        let target = resolve_site_drop(&stacked(), Some("a"), point, &config)
            .expect("non-empty snapshot resolves");
        assert_eq!(target.group_id.as_deref(), Some("a"));
    }

    #[test]
    fn empty_group_is_at_least_min_height_tall() {
        let snapshot = GeometrySnapshot::from_groups(vec![
            meta("empty", Rect::new(0.0, 0.0, 400.0, 20.0), 3, 0),
            meta("full", Rect::new(0.0, 200.0, 400.0, 400.0), 3, 3),
        ]);
        let target = resolve_site_drop(
            &snapshot,
            None,
            Point::new(100.0, 90.0),
            &CollisionConfig::default(),
        );
        assert_eq!(target, Some(HoverTarget::in_group("empty", 0)));
    }

    #[test]
    fn empty_snapshot_resolves_nothing() {
        let target = resolve(
            DragKind::Site,
            &GeometrySnapshot::default(),
            "s",
            None,
            Point::ORIGIN,
            &CollisionConfig::default(),
        );
        assert_eq!(target, None);
    }

    #[test]
    fn nearest_fallback_uses_adjusted_empty_rect() {
        // The empty group's 100px virtual height moves its center to y=50,
        // closer to the point than the other group's center.
        let snapshot = GeometrySnapshot::from_groups(vec![
            meta("empty", Rect::new(0.0, 0.0, 100.0, 0.0), 1, 0),
            meta("full", Rect::new(0.0, 150.0, 100.0, 250.0), 1, 2),
        ]);
        let target = active_group(
            &snapshot,
            None,
            Point::new(300.0, 90.0),
            &CollisionConfig::default(),
        )
        .expect("resolves");
        assert_eq!(target.id, "empty");
    }
}
