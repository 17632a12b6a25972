//! Resize handles.
//!
//! The eight handles around a selection's bounding box, named by the CSS
//! cursor they show. Hosts hand them over as strings; parsing is the only
//! place an unknown tag can appear, and it fails there.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use vd_core::{Axes, Point, Rect};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid resizer: {0}")]
pub struct InvalidResizer(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Resizer {
    N,
    S,
    E,
    W,
    NE,
    NW,
    SE,
    SW,
}

impl Resizer {
    pub const ALL: [Resizer; 8] = [
        Resizer::NW,
        Resizer::N,
        Resizer::NE,
        Resizer::W,
        Resizer::E,
        Resizer::SW,
        Resizer::S,
        Resizer::SE,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Resizer::N => "n-resize",
            Resizer::S => "s-resize",
            Resizer::E => "e-resize",
            Resizer::W => "w-resize",
            Resizer::NE => "ne-resize",
            Resizer::NW => "nw-resize",
            Resizer::SE => "se-resize",
            Resizer::SW => "sw-resize",
        }
    }

    pub fn opposite(self) -> Resizer {
        match self {
            Resizer::N => Resizer::S,
            Resizer::S => Resizer::N,
            Resizer::E => Resizer::W,
            Resizer::W => Resizer::E,
            Resizer::NE => Resizer::SW,
            Resizer::SW => Resizer::NE,
            Resizer::NW => Resizer::SE,
            Resizer::SE => Resizer::NW,
        }
    }

    pub fn axes(self) -> Axes {
        match self {
            Resizer::N | Resizer::S => Axes::VERTICAL,
            Resizer::E | Resizer::W => Axes::HORIZONTAL,
            _ => Axes::BOTH,
        }
    }

    /// Handle position used for scale math.
    ///
    /// Edge handles only constrain one axis, so the other coordinate is
    /// reported as 0; the resize never reads it because that axis is
    /// inactive.
    pub fn position(self, rect: &Rect) -> Point {
        let (left, top, right, bottom) = (rect.x, rect.y, rect.right(), rect.bottom());
        match self {
            Resizer::NW => Point::new(left, top),
            Resizer::N => Point::new(0.0, top),
            Resizer::NE => Point::new(right, top),
            Resizer::W => Point::new(left, 0.0),
            Resizer::E => Point::new(right, 0.0),
            Resizer::SW => Point::new(left, bottom),
            Resizer::S => Point::new(0.0, bottom),
            Resizer::SE => Point::new(right, bottom),
        }
    }

    /// Where the handle is drawn: corners, or the midpoint of an edge.
    pub fn handle_center(self, rect: &Rect) -> Point {
        let cx = rect.x + rect.width / 2.0;
        let cy = rect.y + rect.height / 2.0;
        let p = self.position(rect);
        match self {
            Resizer::N | Resizer::S => Point::new(cx, p.y),
            Resizer::E | Resizer::W => Point::new(p.x, cy),
            _ => p,
        }
    }
}

impl fmt::Display for Resizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Resizer {
    type Err = InvalidResizer;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Resizer::ALL
            .into_iter()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| InvalidResizer(s.to_string()))
    }
}

impl TryFrom<String> for Resizer {
    type Error = InvalidResizer;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Resizer> for String {
    fn from(r: Resizer) -> String {
        r.as_str().to_string()
    }
}
