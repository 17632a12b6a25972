//! Time-based transform interpolation for animated zoom.
//!
//! A `Transition` starts on the first frame it is sampled at and yields
//! eased intermediate transforms until `duration_ms` has passed, ending
//! exactly on the target.

use vd_core::Transform;

/// Cubic ease-in-out on `[0, 1]`.
pub fn ease_cubic_in_out(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        let u = -2.0 * t + 2.0;
        1.0 - u * u * u / 2.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    from: Transform,
    to: Transform,
    duration_ms: f64,
    started_at: Option<f64>,
    done: bool,
}

impl Transition {
    pub fn new(from: Transform, to: Transform, duration_ms: f64) -> Self {
        Self {
            from,
            to,
            duration_ms,
            started_at: None,
            done: false,
        }
    }

    pub fn target(&self) -> Transform {
        self.to
    }

    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Transform at `now_ms`, or `None` once the final frame was handed out.
    pub fn sample(&mut self, now_ms: f64) -> Option<Transform> {
        if self.done {
            return None;
        }
        let start = *self.started_at.get_or_insert(now_ms);
        let t = if self.duration_ms > 0.0 {
            (now_ms - start) / self.duration_ms
        } else {
            1.0
        };
        if t >= 1.0 {
            self.done = true;
            return Some(self.to);
        }
        Some(self.from.lerp(&self.to, ease_cubic_in_out(t)))
    }
}
