#![forbid(unsafe_code)]

//! Geometric primitives in CSS pixel space.
//!
//! Two coordinate spaces meet during a drag:
//! - **viewport** coordinates, which is what pointer events and
//!   `getBoundingClientRect()` report, and
//! - **document** coordinates, which are viewport coordinates plus the current
//!   scroll offset.
//!
//! Snapshot rectangles live in document space so they stay valid while the
//! page scrolls underneath an active drag.

use core::ops::{Add, Sub};

use serde::{Deserialize, Serialize};

/// A point in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    /// The origin `(0, 0)`.
    pub const ORIGIN: Self = Self::new(0.0, 0.0);

    /// Create a new point.
    #[inline]
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Squared euclidean distance to `other`.
    #[inline]
    #[must_use]
    pub fn distance_squared(self, other: Self) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }

    /// Manhattan distance to `other`.
    #[inline]
    #[must_use]
    pub fn manhattan_distance(self, other: Self) -> f64 {
        (self.x - other.x).abs() + (self.y - other.y).abs()
    }
}

impl Add for Point {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// A width/height pair in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    /// Create a new size.
    #[inline]
    #[must_use]
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// An axis-aligned rectangle described by its four edges.
///
/// Edges are stored directly (rather than origin + size) because every
/// collision test in the drag engine compares against edges.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

impl Rect {
    /// Create a rectangle from its edges.
    #[inline]
    #[must_use]
    pub const fn new(left: f64, top: f64, right: f64, bottom: f64) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Create a rectangle from a top-left corner and a size.
    #[inline]
    #[must_use]
    pub fn from_origin_size(x: f64, y: f64, size: Size) -> Self {
        Self::new(x, y, x + size.width, y + size.height)
    }

    #[inline]
    #[must_use]
    pub fn width(&self) -> f64 {
        self.right - self.left
    }

    #[inline]
    #[must_use]
    pub fn height(&self) -> f64 {
        self.bottom - self.top
    }

    #[inline]
    #[must_use]
    pub fn size(&self) -> Size {
        Size::new(self.width(), self.height())
    }

    /// Top-left corner.
    #[inline]
    #[must_use]
    pub const fn origin(&self) -> Point {
        Point::new(self.left, self.top)
    }

    #[inline]
    #[must_use]
    pub fn center(&self) -> Point {
        Point::new(
            (self.left + self.right) / 2.0,
            (self.top + self.bottom) / 2.0,
        )
    }

    /// Whether `point` lies inside the rectangle. All four edges are inclusive.
    #[inline]
    #[must_use]
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.left
            && point.x <= self.right
            && point.y >= self.top
            && point.y <= self.bottom
    }

    /// Translate by `(dx, dy)`.
    #[inline]
    #[must_use]
    pub fn translate(&self, dx: f64, dy: f64) -> Self {
        Self::new(
            self.left + dx,
            self.top + dy,
            self.right + dx,
            self.bottom + dy,
        )
    }

    /// Same rectangle with a different bottom edge.
    #[inline]
    #[must_use]
    pub const fn with_bottom(&self, bottom: f64) -> Self {
        Self::new(self.left, self.top, self.right, bottom)
    }
}

/// Viewport dimensions and scroll offsets at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
    pub scroll_x: f64,
    pub scroll_y: f64,
}

impl Viewport {
    /// Create a viewport.
    #[must_use]
    pub const fn new(width: f64, height: f64, scroll_x: f64, scroll_y: f64) -> Self {
        Self {
            width,
            height,
            scroll_x,
            scroll_y,
        }
    }

    /// Viewport size without the scroll offsets.
    #[must_use]
    pub const fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Convert a viewport-space point to document space.
    #[must_use]
    pub fn point_to_document(&self, point: Point) -> Point {
        Point::new(point.x + self.scroll_x, point.y + self.scroll_y)
    }

    /// Convert a viewport-space rectangle to document space.
    #[must_use]
    pub fn rect_to_document(&self, rect: Rect) -> Rect {
        rect.translate(self.scroll_x, self.scroll_y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contains_is_edge_inclusive() {
        let rect = Rect::new(10.0, 20.0, 30.0, 40.0);
        assert!(rect.contains(Point::new(10.0, 20.0)));
        assert!(rect.contains(Point::new(30.0, 40.0)));
        assert!(!rect.contains(Point::new(30.1, 40.0)));
        assert!(!rect.contains(Point::new(9.9, 25.0)));
    }

    #[test]
    fn center_and_size() {
        let rect = Rect::from_origin_size(0.0, 100.0, Size::new(50.0, 20.0));
        assert_eq!(rect.center(), Point::new(25.0, 110.0));
        assert_eq!(rect.size(), Size::new(50.0, 20.0));
        assert_eq!(rect.origin(), Point::new(0.0, 100.0));
    }

    #[test]
    fn distances() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(3.0, -4.0);
        assert_eq!(a.distance_squared(b), 25.0);
        assert_eq!(a.manhattan_distance(b), 7.0);
        assert_eq!(b - a, b);
        assert_eq!(a + b, b);
    }

    #[test]
    fn viewport_converts_to_document_space() {
        let viewport = Viewport::new(800.0, 600.0, 5.0, 250.0);
        assert_eq!(
            viewport.point_to_document(Point::new(10.0, 10.0)),
            Point::new(15.0, 260.0)
        );
        assert_eq!(
            viewport.rect_to_document(Rect::new(0.0, 0.0, 100.0, 50.0)),
            Rect::new(5.0, 250.0, 105.0, 300.0)
        );
    }
}
