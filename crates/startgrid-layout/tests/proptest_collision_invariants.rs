//! Property-based invariant tests for collision resolution and autoscroll.
//!
//! 1. Site hover indices never exceed the hovered group's item count
//! 2. A non-empty snapshot always resolves a site hover group
//! 3. Group hover indices stay within `[0, remaining]` and never name a group
//! 4. Group hover index is monotone in the ghost's vertical position
//! 5. Autoscroll speed never exceeds the configured peak and is zero mid-screen

use proptest::prelude::*;
use startgrid_layout::{
    AutoscrollConfig, CollisionConfig, GeometrySnapshot, GridMetrics, GroupMeta, Point, Rect,
    resolve_group_drop, resolve_site_drop,
};

// ── Strategies ──────────────────────────────────────────────────────────

fn group_strategy(index: usize) -> impl Strategy<Value = GroupMeta> {
    (
        0.0f64..300.0,
        10.0f64..400.0,
        1usize..6,
        20.0f64..200.0,
        20.0f64..200.0,
        0usize..12,
    )
        .prop_map(move |(left, height, cols, cell_w, cell_h, items)| {
            let top = index as f64 * 500.0;
            GroupMeta {
                id: format!("g{index}"),
                rect: Rect::new(left, top, left + 600.0, top + height),
                grid: GridMetrics {
                    cols,
                    cell_width: cell_w,
                    cell_height: cell_h,
                    offset_x: 8.0,
                    offset_y: 32.0,
                },
                item_count: items,
            }
        })
}

fn snapshot_strategy() -> impl Strategy<Value = GeometrySnapshot> {
    (1usize..6)
        .prop_flat_map(|n| (0..n).map(group_strategy).collect::<Vec<_>>())
        .prop_map(GeometrySnapshot::from_groups)
}

fn point_strategy() -> impl Strategy<Value = Point> {
    (-1000.0f64..4000.0, -1000.0f64..4000.0).prop_map(|(x, y)| Point::new(x, y))
}

// ═══════════════════════════════════════════════════════════════════════
// Site strategy
// ═══════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn site_index_within_item_count(
        snapshot in snapshot_strategy(),
        point in point_strategy(),
        hovered in proptest::option::of(0usize..6),
    ) {
        let current = hovered.map(|i| format!("g{i}"));
        let target = resolve_site_drop(
            &snapshot,
            current.as_deref(),
            point,
            &CollisionConfig::default(),
        );
        let target = target.expect("non-empty snapshot always resolves");
        let group_id = target.group_id.expect("site drags name a group");
        let group = snapshot.get(&group_id).expect("resolved group exists");
        prop_assert!(target.index <= group.item_count);
        if group.item_count == 0 {
            prop_assert_eq!(target.index, 0);
        }
    }

    #[test]
    fn point_inside_plain_rect_picks_that_group(
        snapshot in snapshot_strategy(),
        pick in 0usize..6,
        fx in 0.0f64..=1.0,
        fy in 0.0f64..=1.0,
    ) {
        let group = &snapshot.groups()[pick % snapshot.len()];
        let rect = group.rect;
        let point = Point::new(
            rect.left + fx * rect.width(),
            rect.top + fy * rect.height(),
        );
        let target = resolve_site_drop(&snapshot, None, point, &CollisionConfig::default())
            .expect("resolves");
        // Groups are 500px apart and at most 400px tall, so rectangles never
        // overlap even with the empty-group extension.
        prop_assert_eq!(target.group_id.as_deref(), Some(group.id.as_str()));
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Group strategy
// ═══════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn group_index_within_remaining(
        snapshot in snapshot_strategy(),
        dragged in 0usize..6,
        y in -1000.0f64..4000.0,
    ) {
        let dragged_id = format!("g{dragged}");
        let remaining = snapshot.groups().iter().filter(|g| g.id != dragged_id).count();
        let target = resolve_group_drop(&snapshot, &dragged_id, y);
        prop_assert!(target.index <= remaining);
        prop_assert!(target.group_id.is_none());
    }

    #[test]
    fn group_index_is_monotone_in_y(
        snapshot in snapshot_strategy(),
        dragged in 0usize..6,
        y1 in -1000.0f64..4000.0,
        y2 in -1000.0f64..4000.0,
    ) {
        let dragged_id = format!("g{dragged}");
        let (low, high) = if y1 <= y2 { (y1, y2) } else { (y2, y1) };
        let a = resolve_group_drop(&snapshot, &dragged_id, low);
        let b = resolve_group_drop(&snapshot, &dragged_id, high);
        prop_assert!(a.index <= b.index);
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Autoscroll
// ═══════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn autoscroll_bounded_by_peak(
        y in -2000.0f64..4000.0,
        height in 300.0f64..2000.0,
    ) {
        let config = AutoscrollConfig::default();
        let v = config.velocity(y, height);
        prop_assert!(v.abs() <= config.max_speed_per_sec);
        if y >= config.zone && y <= height - config.zone {
            prop_assert_eq!(v, 0.0);
        }
        if y < config.zone {
            prop_assert!(v < 0.0);
        }
    }
}
