#![forbid(unsafe_code)]

//! Geometry snapshot capture.
//!
//! A [`GeometrySnapshot`] is taken exactly once per drag, at the moment the
//! session crosses the drag threshold. It freezes every group's rectangle and
//! grid metrics in document space so the per-frame collision pass never has to
//! touch live layout again.
//!
//! The host does the measuring (see [`LayoutProvider`]); this module only does
//! the arithmetic, so it can be exercised with synthetic measurements.

use serde::{Deserialize, Serialize};
use startgrid_core::{DragKind, Rect, Size, Viewport};

// ---------------------------------------------------------------------------
// Raw measurements
// ---------------------------------------------------------------------------

/// Measured grid sub-element of a group, in viewport coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridMeasurement {
    /// Border box of the grid element.
    pub rect: Rect,
    pub padding_left: f64,
    pub padding_right: f64,
    pub padding_top: f64,
    pub column_gap: f64,
    pub row_gap: f64,
    /// Number of site cards currently rendered in the grid.
    pub site_count: usize,
}

/// Measured group container, in viewport coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupMeasurement {
    pub id: String,
    pub rect: Rect,
    /// `None` when the container has no grid element.
    pub grid: Option<GridMeasurement>,
}

/// Live-layout queries the drag engine needs from its host.
pub trait LayoutProvider {
    /// Current viewport size and scroll offsets.
    fn viewport(&self) -> Viewport;

    /// Measure every group container present in the document, in document
    /// order.
    fn measure_groups(&self) -> Vec<GroupMeasurement>;
}

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

/// Grid parameters of one group.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridMetrics {
    /// Column count, always at least 1.
    pub cols: usize,
    /// Card width plus column gap.
    pub cell_width: f64,
    /// Card height plus row gap.
    pub cell_height: f64,
    /// Content origin relative to the group rectangle's left edge.
    pub offset_x: f64,
    /// Content origin relative to the group rectangle's top edge.
    pub offset_y: f64,
}

impl GridMetrics {
    /// Single-column fallback that uses the dragged card's own size as cell.
    #[must_use]
    pub const fn single_column(card: Size) -> Self {
        Self {
            cols: 1,
            cell_width: card.width,
            cell_height: card.height,
            offset_x: 0.0,
            offset_y: 0.0,
        }
    }
}

/// Frozen geometry of one group container.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupMeta {
    pub id: String,
    /// Rectangle in document coordinates.
    pub rect: Rect,
    pub grid: GridMetrics,
    /// Site cards in the group, excluding the dragged site when this is its
    /// source group.
    pub item_count: usize,
}

impl GroupMeta {
    /// Whether the group has no droppable neighbours.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.item_count == 0
    }
}

/// What the session knows about the drag when it asks for a snapshot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SnapshotRequest<'a> {
    pub kind: DragKind,
    /// Source group of a dragged site.
    pub source_group_id: Option<&'a str>,
    /// Measured size of the dragged node.
    pub card_size: Size,
}

/// Immutable per-drag geometry, in document order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GeometrySnapshot {
    groups: Vec<GroupMeta>,
}

impl GeometrySnapshot {
    /// Build a snapshot directly from group metadata.
    #[must_use]
    pub fn from_groups(groups: Vec<GroupMeta>) -> Self {
        Self { groups }
    }

    /// Convert raw viewport-space measurements into a snapshot.
    #[must_use]
    pub fn capture(
        measurements: impl IntoIterator<Item = GroupMeasurement>,
        viewport: &Viewport,
        request: &SnapshotRequest<'_>,
    ) -> Self {
        let groups = measurements
            .into_iter()
            .map(|measurement| group_meta(measurement, viewport, request))
            .collect();
        Self { groups }
    }

    /// Measure through a [`LayoutProvider`] and capture.
    #[must_use]
    pub fn from_provider<P: LayoutProvider + ?Sized>(
        provider: &P,
        request: &SnapshotRequest<'_>,
    ) -> Self {
        let viewport = provider.viewport();
        Self::capture(provider.measure_groups(), &viewport, request)
    }

    #[must_use]
    pub fn groups(&self) -> &[GroupMeta] {
        &self.groups
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Look up a group by id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&GroupMeta> {
        self.groups.iter().find(|group| group.id == id)
    }
}

fn group_meta(
    measurement: GroupMeasurement,
    viewport: &Viewport,
    request: &SnapshotRequest<'_>,
) -> GroupMeta {
    let GroupMeasurement { id, rect, grid } = measurement;
    let (grid, item_count) = match grid {
        Some(grid) => {
            let mut item_count = grid.site_count;
            if request.kind == DragKind::Site && request.source_group_id == Some(id.as_str()) {
                item_count = item_count.saturating_sub(1);
            }
            (grid_metrics(&rect, &grid, request.card_size), item_count)
        }
        None => (GridMetrics::single_column(request.card_size), 0),
    };
    GroupMeta {
        id,
        rect: viewport.rect_to_document(rect),
        grid,
        item_count,
    }
}

fn grid_metrics(group_rect: &Rect, grid: &GridMeasurement, card: Size) -> GridMetrics {
    let offset_x = (grid.rect.left - group_rect.left) + grid.padding_left;
    let offset_y = (grid.rect.top - group_rect.top) + grid.padding_top;
    let content_width = grid.rect.width() - grid.padding_left - grid.padding_right;

    let cell_width = card.width + grid.column_gap;
    let cell_height = card.height + grid.row_gap;

    // The last column carries no trailing gap; the extra pixel absorbs
    // sub-pixel rounding in the measured widths.
    let cols = if cell_width > 0.0 {
        let fitted = ((content_width + grid.column_gap + 1.0) / cell_width).floor();
        if fitted >= 1.0 { fitted as usize } else { 1 }
    } else {
        1
    };

    GridMetrics {
        cols,
        cell_width,
        cell_height,
        offset_x,
        offset_y,
    }
}
