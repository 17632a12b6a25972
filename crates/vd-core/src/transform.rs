//! Viewport pan/zoom transform.
//!
//! Maps document space to screen space as `screen = doc * k + (x, y)`.
//! Composition follows the usual zoom-behavior conventions: `translate`
//! moves in document units (scaled by `k`), `scale` multiplies `k`.

use crate::geometry::Point;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub x: f64,
    pub y: f64,
    pub k: f64,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    pub const IDENTITY: Transform = Transform {
        x: 0.0,
        y: 0.0,
        k: 1.0,
    };

    pub const fn new(x: f64, y: f64, k: f64) -> Self {
        Self { x, y, k }
    }

    /// Screen → document.
    pub fn invert_pos(&self, raw: Point) -> Point {
        Point::new((raw.x - self.x) / self.k, (raw.y - self.y) / self.k)
    }

    /// Document → screen.
    pub fn apply(&self, pos: Point) -> Point {
        Point::new(pos.x * self.k + self.x, pos.y * self.k + self.y)
    }

    pub fn translate(&self, dx: f64, dy: f64) -> Transform {
        Transform::new(self.x + self.k * dx, self.y + self.k * dy, self.k)
    }

    pub fn scale(&self, s: f64) -> Transform {
        Transform::new(self.x, self.y, self.k * s)
    }

    /// Zoom by `multiplier` around the screen point `cursor`.
    ///
    /// The next scale is clamped to `[min_scale, max_scale]`, and the offset
    /// is recomputed from the *effective* factor so the document point under
    /// `cursor` stays under it.
    pub fn zoom_at(&self, cursor: Point, multiplier: f64, min_scale: f64, max_scale: f64) -> Transform {
        let next_k = (self.k * multiplier).clamp(min_scale, max_scale);
        let factor = next_k / self.k;
        Transform::new(
            factor * (self.x - cursor.x) + cursor.x,
            factor * (self.y - cursor.y) + cursor.y,
            next_k,
        )
    }

    /// Component-wise linear interpolation, `t` in `[0, 1]`.
    pub fn lerp(&self, to: &Transform, t: f64) -> Transform {
        Transform::new(
            self.x + (to.x - self.x) * t,
            self.y + (to.y - self.y) * t,
            self.k + (to.k - self.k) * t,
        )
    }
}
