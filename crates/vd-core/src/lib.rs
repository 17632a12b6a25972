//! VD (Vector Draft) core: the document model and its undo/redo log.

pub mod action;
pub mod config;
pub mod geometry;
pub mod history;
pub mod id;
pub mod model;
pub mod selection;
pub mod state;
pub mod transform;

pub use action::{Action, Axes, ResizeInfo};
pub use config::{AppConfig, ConfigError};
pub use geometry::{Point, Rect};
pub use history::AppHistory;
pub use id::ItemId;
pub use model::{Color, Item, ItemKind, Points, Style};
pub use selection::Selection;
pub use state::State;
pub use transform::Transform;
