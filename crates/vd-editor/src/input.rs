//! Input abstraction layer.
//!
//! Normalizes host events (pointer, wheel, keyboard, menu, animation
//! frames) into a unified `InputEvent` enum. Pointer coordinates are raw
//! screen coordinates; the editor maps them into document space.

use crate::resizer::Resizer;
use serde::{Deserialize, Serialize};
use vd_core::Point;

/// Keyboard modifier state at the time of the event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        shift: false,
        ctrl: false,
        alt: false,
        meta: false,
    };

    /// Ctrl on most platforms, ⌘ on macOS.
    pub fn cmd(&self) -> bool {
        self.ctrl || self.meta
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyKind {
    Down,
    Up,
    Press,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyEvent {
    pub kind: KeyKind,
    /// `KeyboardEvent.key` (e.g. `"z"`, `"Delete"`, `"ArrowUp"`).
    pub key: String,
    #[serde(default)]
    pub modifiers: Modifiers,
}

impl KeyEvent {
    pub fn new(kind: KeyKind, key: impl Into<String>, modifiers: Modifiers) -> Self {
        Self {
            kind,
            key: key.into(),
            modifiers,
        }
    }

    pub fn down(key: impl Into<String>) -> Self {
        Self::new(KeyKind::Down, key, Modifiers::NONE)
    }
}

/// Everything the editor reacts to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum InputEvent {
    PointerDown {
        x: f64,
        y: f64,
    },
    PointerMove {
        x: f64,
        y: f64,
    },
    PointerUp {
        x: f64,
        y: f64,
    },
    /// The pointer left the canvas or the host cancelled the gesture.
    PointerCancel,
    DoubleClick {
        x: f64,
        y: f64,
    },
    Wheel {
        x: f64,
        y: f64,
        delta_y: f64,
    },
    /// Hit-test result for the pointer: which resize handle or vertex of
    /// the selection it is over, if any.
    Hover {
        #[serde(default)]
        resizer: Option<Resizer>,
        #[serde(default)]
        vertex_index: Option<usize>,
    },
    Key(KeyEvent),
    Menu {
        intent: String,
    },
    /// Animation clock tick.
    Frame {
        time_ms: f64,
    },
}

impl InputEvent {
    pub fn pointer_down(x: f64, y: f64) -> Self {
        Self::PointerDown { x, y }
    }

    pub fn pointer_move(x: f64, y: f64) -> Self {
        Self::PointerMove { x, y }
    }

    pub fn pointer_up(x: f64, y: f64) -> Self {
        Self::PointerUp { x, y }
    }

    pub fn menu(intent: impl Into<String>) -> Self {
        Self::Menu {
            intent: intent.into(),
        }
    }

    /// Raw screen position if this is a positioned pointer event.
    pub fn position(&self) -> Option<Point> {
        match self {
            Self::PointerDown { x, y }
            | Self::PointerMove { x, y }
            | Self::PointerUp { x, y }
            | Self::DoubleClick { x, y }
            | Self::Wheel { x, y, .. } => Some(Point::new(*x, *y)),
            _ => None,
        }
    }
}
