//! Hit testing: screen point → handle lookup.
//!
//! Handles are drawn at a fixed screen size, so tests run in screen space
//! against handle centres mapped through the current transform.

use crate::resizer::Resizer;
use vd_core::{Point, Rect, Transform};

/// Pick radius for resize handles and vertices, in screen pixels.
pub const HANDLE_RADIUS: f64 = 6.0;

/// The resize handle of `bbox` under `raw`, corners first.
pub fn hit_resizer(bbox: &Rect, transform: &Transform, raw: Point, radius: f64) -> Option<Resizer> {
    [
        Resizer::NW,
        Resizer::NE,
        Resizer::SW,
        Resizer::SE,
        Resizer::N,
        Resizer::S,
        Resizer::W,
        Resizer::E,
    ]
    .into_iter()
    .find(|r| transform.apply(r.handle_center(bbox)).distance(raw) <= radius)
}

/// Index of the first vertex under `raw`.
pub fn hit_vertex(points: &[Point], transform: &Transform, raw: Point, radius: f64) -> Option<usize> {
    points
        .iter()
        .position(|p| transform.apply(*p).distance(raw) <= radius)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_corner_through_zoom() {
        let bbox = Rect::new(0.0, 0.0, 10.0, 10.0);
        let t = Transform::new(5.0, 5.0, 2.0);
        assert_eq!(hit_resizer(&bbox, &t, Point::new(25.0, 25.0), 6.0), Some(Resizer::SE));
        assert_eq!(hit_resizer(&bbox, &t, Point::new(15.0, 3.0), 6.0), Some(Resizer::N));
        assert_eq!(hit_resizer(&bbox, &t, Point::new(15.0, 15.0), 6.0), None);
    }

    #[test]
    fn finds_vertex() {
        let pts = [Point::new(0.0, 0.0), Point::new(10.0, 0.0)];
        assert_eq!(hit_vertex(&pts, &Transform::IDENTITY, Point::new(9.0, 1.0), 3.0), Some(1));
        assert_eq!(hit_vertex(&pts, &Transform::IDENTITY, Point::new(5.0, 0.0), 3.0), None);
    }
}
