//! VD editor engine.
//!
//! Host events go in through [`Editor::dispatch`]; interaction modules
//! react to them over push [`stream::Stream`]s and propose document edits,
//! mode changes and viewport changes, which the editor commits once per
//! event. Renderers read [`Editor::snapshot`].

pub mod editor;
pub mod files;
pub mod hit;
pub mod input;
pub mod interaction;
pub mod keyboard;
pub mod menubar;
pub mod mode;
pub mod mouse;
pub mod replay;
pub mod resizer;
pub mod stream;
pub mod transition;

pub use editor::{Editor, EditorError, Snapshot, Update};
pub use input::{InputEvent, KeyEvent, KeyKind, Modifiers};
pub use mode::Mode;
pub use resizer::{InvalidResizer, Resizer};
pub use stream::{SourceError, Stream, Subscription};
