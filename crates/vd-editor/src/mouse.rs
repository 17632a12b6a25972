//! Pointer source.
//!
//! The editor feeds two families of streams from host pointer events:
//!
//! * raw streams carry screen coordinates and always fire;
//! * `down` / `moves` / `up` carry document coordinates (the raw point
//!   mapped through the inverse of the current transform) and are
//!   suppressed while a pan owns the pointer.
//!
//! Hover state (`resizer`, `vertex_index`) and `is_busy` are remembered
//! streams so gates read them without waiting for a first event.

use crate::resizer::Resizer;
use crate::stream::{SourceError, Stream};
use vd_core::Point;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WheelEvent {
    /// Cursor, screen space.
    pub pos: Point,
    pub delta_y: f64,
}

#[derive(Clone)]
pub struct MouseSource {
    pub down: Stream<Point>,
    pub moves: Stream<Point>,
    pub up: Stream<Point>,
    pub raw_down: Stream<Point>,
    pub raw_move: Stream<Point>,
    pub raw_up: Stream<Point>,
    /// The pointer left the canvas mid-gesture.
    pub cancel: Stream<()>,
    pub dblclick: Stream<Point>,
    pub wheel: Stream<WheelEvent>,
    /// Resize handle under the pointer.
    pub resizer: Stream<Option<Resizer>>,
    /// Vertex of the selected item under the pointer.
    pub vertex_index: Stream<Option<usize>>,
    /// A pan owns the pointer, or the pointer is over an interactive handle.
    pub is_busy: Stream<bool>,
}

impl Default for MouseSource {
    fn default() -> Self {
        Self::new()
    }
}

impl MouseSource {
    pub fn new() -> Self {
        Self {
            down: Stream::new(),
            moves: Stream::new(),
            up: Stream::new(),
            raw_down: Stream::new(),
            raw_move: Stream::new(),
            raw_up: Stream::new(),
            cancel: Stream::new(),
            dblclick: Stream::new(),
            wheel: Stream::new(),
            resizer: Stream::with_value(None),
            vertex_index: Stream::with_value(None),
            is_busy: Stream::with_value(false),
        }
    }

    /// Terminate every pointer stream.
    pub fn fail(&self, error: SourceError) {
        for stream in [
            &self.down,
            &self.moves,
            &self.up,
            &self.raw_down,
            &self.raw_move,
            &self.raw_up,
            &self.dblclick,
        ] {
            stream.fail(error.clone());
        }
        self.cancel.fail(error.clone());
        self.wheel.fail(error.clone());
        self.resizer.fail(error.clone());
        self.vertex_index.fail(error.clone());
        self.is_busy.fail(error);
    }
}
