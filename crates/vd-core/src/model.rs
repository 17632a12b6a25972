//! Document items: polygons and polylines.
//!
//! An item is an ordered point list plus style and a `locked` flag. Items
//! are immutable values: every edit builds a replacement item with the same
//! id, which is what lets actions keep both sides of an edit around.

use crate::geometry::{Point, Rect, distance_point_segment, polygon_contains};
use crate::id::ItemId;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use smallvec::SmallVec;

/// Inline storage fits lines and quads without allocating.
pub type Points = SmallVec<[Point; 4]>;

// ─── Colors ──────────────────────────────────────────────────────────────

/// RGBA color, 8 bits per channel. Serialized as a `#RRGGBB[AA]` string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

fn hex_val(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

impl Color {
    pub const BLACK: Color = Color::rgb(0x00, 0x00, 0x00);
    pub const GRAY: Color = Color::rgb(0x88, 0x88, 0x88);
    pub const HIGHLIGHT: Color = Color::rgb(0x14, 0xe0, 0x1c);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 0xff }
    }

    /// Parse `#RGB`, `#RRGGBB` or `#RRGGBBAA` (leading `#` optional).
    pub fn from_hex(hex: &str) -> Option<Self> {
        let bytes = hex.strip_prefix('#').unwrap_or(hex).as_bytes();
        let pair = |i: usize| Some(hex_val(bytes[i])? << 4 | hex_val(bytes[i + 1])?);
        match bytes.len() {
            3 => {
                let short = |i: usize| hex_val(bytes[i]).map(|v| v * 17);
                Some(Self::rgb(short(0)?, short(1)?, short(2)?))
            }
            6 => Some(Self::rgb(pair(0)?, pair(2)?, pair(4)?)),
            8 => Some(Self {
                r: pair(0)?,
                g: pair(2)?,
                b: pair(4)?,
                a: pair(6)?,
            }),
            _ => None,
        }
    }

    pub fn to_hex(&self) -> String {
        if self.a == 0xff {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Color::from_hex(&s).ok_or_else(|| serde::de::Error::custom(format!("invalid color {s:?}")))
    }
}

// ─── Style ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Style {
    pub stroke: Color,
    pub stroke_width: f64,
    pub opacity: f64,
    /// `None` for open shapes.
    pub fill: Option<Color>,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            stroke: Color::BLACK,
            stroke_width: 3.0,
            opacity: 1.0,
            fill: Some(Color::GRAY),
        }
    }
}

impl Style {
    pub fn line() -> Self {
        Self {
            fill: None,
            ..Self::default()
        }
    }
}

// ─── Items ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    /// Closed shape: the last point connects back to the first.
    Polygon,
    /// Open shape. A two-point polyline is a line.
    Polyline,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub kind: ItemKind,
    #[serde(default)]
    pub locked: bool,
    pub points: Points,
    #[serde(default)]
    pub style: Style,
}

impl Item {
    pub fn polygon(id: ItemId, points: impl IntoIterator<Item = Point>) -> Self {
        Self {
            id,
            kind: ItemKind::Polygon,
            locked: false,
            points: points.into_iter().collect(),
            style: Style::default(),
        }
    }

    pub fn polyline(id: ItemId, points: impl IntoIterator<Item = Point>) -> Self {
        Self {
            id,
            kind: ItemKind::Polyline,
            locked: false,
            points: points.into_iter().collect(),
            style: Style::line(),
        }
    }

    /// A two-point polyline from `start` to `end`.
    pub fn line_from_points(id: ItemId, start: Point, end: Point) -> Self {
        Self::polyline(id, [start, end])
    }

    pub fn with_id(mut self, id: ItemId) -> Self {
        self.id = id;
        self
    }

    pub fn with_locked(mut self, locked: bool) -> Self {
        self.locked = locked;
        self
    }

    pub fn bbox(&self) -> Option<Rect> {
        Rect::from_points(&self.points)
    }

    /// Edges in drawing order. Polygons wrap from the last vertex back to
    /// the first; polylines do not.
    pub fn segments(&self) -> Vec<(Point, Point)> {
        let mut segs: Vec<(Point, Point)> = self.points.windows(2).map(|w| (w[0], w[1])).collect();
        if self.kind == ItemKind::Polygon
            && let (Some(&first), Some(&last)) = (self.points.first(), self.points.last())
            && self.points.len() > 1
        {
            segs.push((last, first));
        }
        segs
    }

    /// Hit test in document space.
    ///
    /// Polygons hit on their interior or within half a stroke of an edge;
    /// polylines only near an edge.
    pub fn contains_point(&self, p: Point) -> bool {
        let tolerance = (self.style.stroke_width / 2.0).max(1.0);
        if self.kind == ItemKind::Polygon && polygon_contains(&self.points, p) {
            return true;
        }
        if self.points.len() == 1 {
            return self.points[0].distance(p) <= tolerance;
        }
        self.segments()
            .iter()
            .any(|&(a, b)| distance_point_segment(p, a, b) <= tolerance)
    }

    /// A copy with every point passed through `f`.
    pub fn map_points(&self, f: impl Fn(Point) -> Point) -> Item {
        Item {
            points: self.points.iter().map(|&p| f(p)).collect(),
            ..self.clone()
        }
    }

    pub fn translated(&self, dx: f64, dy: f64) -> Item {
        self.map_points(|p| Point::new(p.x + dx, p.y + dy))
    }

    /// A copy with `point` spliced in at `index` (clamped to the end).
    pub fn with_vertex_inserted(&self, index: usize, point: Point) -> Item {
        let mut next = self.clone();
        next.points.insert(index.min(next.points.len()), point);
        next
    }

    pub fn with_vertex_removed(&self, index: usize) -> Item {
        let mut next = self.clone();
        if index < next.points.len() {
            next.points.remove(index);
        }
        next
    }
}
