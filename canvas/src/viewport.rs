//! Pan/zoom transform applied to the canvas root.
//!
//! The transform is `translate(translate_x, translate_y) scale(scale)` with
//! its origin at the top-left of the canvas root. It never touches the
//! document: converting between screen and world space is the only way the
//! rest of the engine sees it.

#[cfg(test)]
#[path = "viewport_test.rs"]
mod viewport_test;

use serde::{Deserialize, Serialize};

use crate::consts::{ZOOM_MAX, ZOOM_MIN, ZOOM_STEP};

/// A point in either screen or world space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to `other`.
    #[must_use]
    pub fn distance(self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// The same point measured from `origin` instead of the space's origin.
    #[must_use]
    pub fn relative_to(self, origin: Point) -> Point {
        Point::new(self.x - origin.x, self.y - origin.y)
    }
}

/// Viewport transform.
///
/// `translate_x` / `translate_y` are in CSS pixels.
/// `scale` is clamped to `[ZOOM_MIN, ZOOM_MAX]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Viewport {
    pub scale: f64,
    pub translate_x: f64,
    pub translate_y: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self { scale: 1.0, translate_x: 0.0, translate_y: 0.0 }
    }
}

impl Viewport {
    /// Convert a screen-space point (CSS pixels) to world coordinates.
    #[must_use]
    pub fn screen_to_world(&self, screen: Point) -> Point {
        Point {
            x: (screen.x - self.translate_x) / self.scale,
            y: (screen.y - self.translate_y) / self.scale,
        }
    }

    /// Convert a world-space point to screen coordinates (CSS pixels).
    #[must_use]
    pub fn world_to_screen(&self, world: Point) -> Point {
        Point {
            x: world.x * self.scale + self.translate_x,
            y: world.y * self.scale + self.translate_y,
        }
    }

    /// Convert a screen-space distance (pixels) to world-space distance.
    #[must_use]
    pub fn screen_dist_to_world(&self, screen_dist: f64) -> f64 {
        screen_dist / self.scale
    }

    /// Shift the transform by a screen-space delta.
    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        self.translate_x += dx;
        self.translate_y += dy;
    }

    /// Set the scale, clamped to the allowed range. Returns whether it changed.
    pub fn set_scale(&mut self, scale: f64) -> bool {
        if !scale.is_finite() {
            return false;
        }
        // Round to hundredths so repeated ±0.1 steps do not drift.
        let next = ((scale * 100.0).round() / 100.0).clamp(ZOOM_MIN, ZOOM_MAX);
        let changed = (next - self.scale).abs() > f64::EPSILON;
        self.scale = next;
        changed
    }

    /// Apply one wheel notch: scrolling down (`dy > 0`) zooms out, up zooms in.
    /// A zero delta is ignored. Returns whether the scale changed.
    pub fn zoom_notch(&mut self, wheel_dy: f64) -> bool {
        if !wheel_dy.is_finite() || wheel_dy.abs() < f64::EPSILON {
            return false;
        }
        let step = if wheel_dy > 0.0 { -ZOOM_STEP } else { ZOOM_STEP };
        self.set_scale(self.scale + step)
    }

    /// CSS `transform` value for the canvas root.
    #[must_use]
    pub fn css_transform(&self) -> String {
        format!("translate({}px, {}px) scale({})", self.translate_x, self.translate_y, self.scale)
    }
}
