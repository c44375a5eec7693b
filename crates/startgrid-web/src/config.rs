#![forbid(unsafe_code)]

//! Drag engine configuration.
//!
//! Every tunable of the session lives in one [`DragConfig`]. Defaults match
//! the constants the startpage has always shipped with. With the `config`
//! feature the struct can be loaded from TOML or JSON, and missing keys keep
//! their defaults:
//!
//! ```toml
//! drag_threshold = 8.0
//! scroll_zone = 120.0
//! ```
//!
//! ```rust,ignore
//! let config = DragConfig::from_toml_str(text)?;
//! ```

use core::time::Duration;

#[cfg(feature = "config")]
use std::path::Path;

#[cfg(feature = "config")]
use serde::{Deserialize, Serialize};

use startgrid_layout::{
    AutoscrollConfig, CollisionConfig, DEFAULT_EMPTY_GROUP_MIN_HEIGHT, DEFAULT_HOVER_EXPANSION,
    DEFAULT_SCROLL_SPEED_PER_SEC, DEFAULT_SCROLL_ZONE,
};

/// Default pointer travel (px) before an armed press becomes a drag.
pub const DEFAULT_DRAG_THRESHOLD: f64 = 5.0;

/// Tunables for one [`DragSession`](crate::DragSession).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct DragConfig {
    /// Pointer travel (px) required to promote Armed to Dragging.
    pub drag_threshold: f64,
    /// Height (px) of each autoscroll edge zone.
    pub scroll_zone: f64,
    /// Peak autoscroll speed (px/s) at the viewport edge.
    pub scroll_speed_per_sec: f64,
    /// Downward hysteresis (px) granted to the hovered group.
    pub hover_expansion: f64,
    /// Minimum drop-area height (px) of an empty group.
    pub empty_group_min_height: f64,
    /// Upper bound (s) on one frame's elapsed time.
    pub max_frame_dt_secs: f64,
    /// Ghost-center travel (px, manhattan) that triggers a collision pass.
    pub collision_epsilon: f64,
    /// Scale applied to the ghost while it floats.
    pub ghost_scale: f64,
    pub ghost_opacity: f64,
    pub ghost_z_index: i32,
    /// How long (ms) clicks stay suppressed after a drag ends.
    pub click_suppression_ms: u64,
}

impl Default for DragConfig {
    fn default() -> Self {
        Self {
            drag_threshold: DEFAULT_DRAG_THRESHOLD,
            scroll_zone: DEFAULT_SCROLL_ZONE,
            scroll_speed_per_sec: DEFAULT_SCROLL_SPEED_PER_SEC,
            hover_expansion: DEFAULT_HOVER_EXPANSION,
            empty_group_min_height: DEFAULT_EMPTY_GROUP_MIN_HEIGHT,
            max_frame_dt_secs: 0.1,
            collision_epsilon: 1.0,
            ghost_scale: 1.05,
            ghost_opacity: 0.9,
            ghost_z_index: 10_000,
            click_suppression_ms: 50,
        }
    }
}

impl DragConfig {
    /// Load from a TOML string.
    #[cfg(feature = "config")]
    pub fn from_toml_str(s: &str) -> Result<Self, DragConfigError> {
        toml::from_str(s).map_err(DragConfigError::Toml)
    }

    /// Load from a TOML file on disk.
    #[cfg(feature = "config")]
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, DragConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(DragConfigError::Io)?;
        Self::from_toml_str(&content)
    }

    /// Load from a JSON string.
    #[cfg(feature = "config")]
    pub fn from_json_str(s: &str) -> Result<Self, DragConfigError> {
        serde_json::from_str(s).map_err(DragConfigError::Json)
    }

    /// Load from a JSON file on disk.
    #[cfg(feature = "config")]
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, DragConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(DragConfigError::Io)?;
        Self::from_json_str(&content)
    }

    /// Check every parameter. An empty list means the config is usable.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if !(self.drag_threshold.is_finite() && self.drag_threshold > 0.0) {
            errors.push(format!(
                "drag_threshold must be > 0, got {}",
                self.drag_threshold
            ));
        }
        if !(self.scroll_zone.is_finite() && self.scroll_zone >= 0.0) {
            errors.push(format!("scroll_zone must be >= 0, got {}", self.scroll_zone));
        }
        if !(self.scroll_speed_per_sec.is_finite() && self.scroll_speed_per_sec >= 0.0) {
            errors.push(format!(
                "scroll_speed_per_sec must be >= 0, got {}",
                self.scroll_speed_per_sec
            ));
        }
        if !(self.hover_expansion.is_finite() && self.hover_expansion >= 0.0) {
            errors.push(format!(
                "hover_expansion must be >= 0, got {}",
                self.hover_expansion
            ));
        }
        if !(self.empty_group_min_height.is_finite() && self.empty_group_min_height >= 0.0) {
            errors.push(format!(
                "empty_group_min_height must be >= 0, got {}",
                self.empty_group_min_height
            ));
        }
        if !(self.max_frame_dt_secs.is_finite() && self.max_frame_dt_secs > 0.0) {
            errors.push(format!(
                "max_frame_dt_secs must be > 0, got {}",
                self.max_frame_dt_secs
            ));
        }
        if !(self.collision_epsilon.is_finite() && self.collision_epsilon >= 0.0) {
            errors.push(format!(
                "collision_epsilon must be >= 0, got {}",
                self.collision_epsilon
            ));
        }
        if !(self.ghost_scale.is_finite() && self.ghost_scale > 0.0) {
            errors.push(format!("ghost_scale must be > 0, got {}", self.ghost_scale));
        }
        if !(0.0..=1.0).contains(&self.ghost_opacity) {
            errors.push(format!(
                "ghost_opacity must be in [0, 1], got {}",
                self.ghost_opacity
            ));
        }

        errors
    }

    /// Autoscroll parameters for the layout solver.
    #[must_use]
    pub fn autoscroll(&self) -> AutoscrollConfig {
        AutoscrollConfig {
            zone: self.scroll_zone,
            max_speed_per_sec: self.scroll_speed_per_sec,
        }
    }

    /// Collision parameters for the layout solver.
    #[must_use]
    pub fn collision(&self) -> CollisionConfig {
        CollisionConfig {
            hover_expansion: self.hover_expansion,
            empty_group_min_height: self.empty_group_min_height,
        }
    }

    /// Squared drag threshold, compared against squared pointer travel.
    #[must_use]
    pub fn drag_threshold_squared(&self) -> f64 {
        self.drag_threshold * self.drag_threshold
    }

    #[must_use]
    pub const fn click_suppression(&self) -> Duration {
        Duration::from_millis(self.click_suppression_ms)
    }
}

/// Errors that can occur when loading or accepting a drag configuration.
#[derive(Debug)]
pub enum DragConfigError {
    /// I/O error reading a file.
    Io(std::io::Error),
    /// TOML parse error.
    #[cfg(feature = "config")]
    Toml(toml::de::Error),
    /// JSON parse error.
    #[cfg(feature = "config")]
    Json(serde_json::Error),
    /// Validation errors.
    Validation(Vec<String>),
}

impl std::fmt::Display for DragConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            #[cfg(feature = "config")]
            Self::Toml(e) => write!(f, "TOML parse error: {e}"),
            #[cfg(feature = "config")]
            Self::Json(e) => write!(f, "JSON parse error: {e}"),
            Self::Validation(errors) => {
                write!(f, "validation errors: {}", errors.join("; "))
            }
        }
    }
}

impl std::error::Error for DragConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            #[cfg(feature = "config")]
            Self::Toml(e) => Some(e),
            #[cfg(feature = "config")]
            Self::Json(e) => Some(e),
            Self::Validation(_) => None,
        }
    }
}
