#![forbid(unsafe_code)]

//! Edge autoscroll while dragging.
//!
//! Velocity is zero outside the edge zones and grows with the square of how
//! deep the pointer sits inside a zone, so scrolling starts gently and only
//! reaches full speed at the very edge.

use serde::{Deserialize, Serialize};

/// Default height of each edge zone, in px.
pub const DEFAULT_SCROLL_ZONE: f64 = 100.0;

/// Default peak scroll speed at the very edge, in px/s.
pub const DEFAULT_SCROLL_SPEED_PER_SEC: f64 = 3000.0;

/// Autoscroll tunables.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AutoscrollConfig {
    /// Height of the top and bottom trigger zones.
    pub zone: f64,
    /// Peak speed magnitude.
    pub max_speed_per_sec: f64,
}

impl Default for AutoscrollConfig {
    fn default() -> Self {
        Self {
            zone: DEFAULT_SCROLL_ZONE,
            max_speed_per_sec: DEFAULT_SCROLL_SPEED_PER_SEC,
        }
    }
}

impl AutoscrollConfig {
    /// Signed vertical velocity in px/s for a pointer at viewport `pointer_y`.
    ///
    /// Negative scrolls up. Intensity saturates at the edge, so a captured
    /// pointer dragged outside the window does not exceed the peak speed.
    #[must_use]
    pub fn velocity(&self, pointer_y: f64, viewport_height: f64) -> f64 {
        if self.zone <= 0.0 {
            return 0.0;
        }
        if pointer_y < self.zone {
            let intensity = ((self.zone - pointer_y) / self.zone).min(1.0);
            -self.max_speed_per_sec * intensity * intensity
        } else if pointer_y > viewport_height - self.zone {
            let intensity = ((pointer_y - (viewport_height - self.zone)) / self.zone).min(1.0);
            self.max_speed_per_sec * intensity * intensity
        } else {
            0.0
        }
    }

    /// Scroll distance for one frame of `dt_secs`.
    #[must_use]
    pub fn delta(&self, pointer_y: f64, viewport_height: f64, dt_secs: f64) -> f64 {
        self.velocity(pointer_y, viewport_height) * dt_secs
    }
}
