//! Editor mode.
//!
//! Exactly one mode is current at a time. Interactions propose the next
//! mode; the editor commits proposals after each input event, so every
//! interaction reacting to that event still sees the mode from before it.

use crate::stream::Stream;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mode {
    #[default]
    #[serde(rename = "idle")]
    Idle,
    /// Armed by the `line` intent; the next pointer-down starts a line.
    #[serde(rename = "line.ready")]
    LineReady,
    #[serde(rename = "line.drawing")]
    LineDrawing,
    #[serde(rename = "resizing")]
    Resizing,
    #[serde(rename = "moving")]
    Moving,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown mode: {0}")]
pub struct InvalidMode(pub String);

impl Mode {
    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Idle => "idle",
            Mode::LineReady => "line.ready",
            Mode::LineDrawing => "line.drawing",
            Mode::Resizing => "resizing",
            Mode::Moving => "moving",
        }
    }

    /// A pointer gesture owns the editor in this mode.
    pub fn is_gesture(self) -> bool {
        matches!(self, Mode::LineDrawing | Mode::Resizing | Mode::Moving)
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = InvalidMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        [
            Mode::Idle,
            Mode::LineReady,
            Mode::LineDrawing,
            Mode::Resizing,
            Mode::Moving,
        ]
        .into_iter()
        .find(|m| m.as_str() == s)
        .ok_or_else(|| InvalidMode(s.to_string()))
    }
}

/// Holds the current mode and publishes it on a remembered stream.
pub struct ModeMachine {
    current: Mode,
    stream: Stream<Mode>,
}

impl Default for ModeMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl ModeMachine {
    pub fn new() -> Self {
        Self {
            current: Mode::Idle,
            stream: Stream::with_value(Mode::Idle),
        }
    }

    pub fn current(&self) -> Mode {
        self.current
    }

    pub fn stream(&self) -> &Stream<Mode> {
        &self.stream
    }

    /// Commit a batch of proposals. The last one wins. Returns whether the
    /// mode changed.
    pub fn commit(&mut self, proposals: impl IntoIterator<Item = Mode>) -> bool {
        let Some(next) = proposals.into_iter().last() else {
            return false;
        };
        if next == self.current {
            return false;
        }
        log::debug!("mode: {} -> {}", self.current, next);
        self.current = next;
        self.stream.emit(next);
        true
    }
}
