//! Interaction modules.
//!
//! Each module is a function from `Sources` to an `Interaction`: a set of
//! output streams plus the subscriptions that keep the module alive.
//! Modules never call each other; they only read the shared sources and
//! propose changes on their sinks. The editor commits those proposals
//! after each input event, so guards always see the committed values from
//! before the event.
//!
//! ## Modes per module
//!
//! | Module | Ready | Active |
//! |--------|-------|--------|
//! | `draw_line` | `line.ready` | `line.drawing` |
//! | `resize_items` | `idle` + handle hovered | `resizing` |
//! | `select_items` | `idle` + unlocked item hit | `moving` |
//! | `zoom` | `idle` + not busy (pan) | pan gesture |
//! | `edit_commands` | `idle` (most commands) | none |

pub mod draw_line;
pub mod edit_commands;
pub mod resize_items;
pub mod select_items;
pub mod vertex_insert;
pub mod zoom;

use crate::keyboard::KeyboardSource;
use crate::menubar::MenuBarSource;
use crate::mode::Mode;
use crate::mouse::MouseSource;
use crate::stream::{Stream, Subscription};
use std::cell::RefCell;
use std::rc::{Rc, Weak};
use vd_core::{Action, AppConfig, Item, Selection, State, Transform};

/// Everything a module may read.
#[derive(Clone)]
pub struct Sources {
    pub mouse: MouseSource,
    pub keyboard: KeyboardSource,
    pub menubar: MenuBarSource,
    pub mode: Stream<Mode>,
    pub state: Stream<State>,
    pub selection: Stream<Selection>,
    pub transform: Stream<Transform>,
    pub config: Stream<AppConfig>,
    /// Where a click on the highlighted edge would splice a vertex.
    pub vertex_insert_index: Stream<Option<usize>>,
    /// Animation clock, milliseconds.
    pub frame: Stream<f64>,
}

impl Sources {
    pub fn new(config: AppConfig, mode: Stream<Mode>) -> Self {
        Self {
            mouse: MouseSource::new(),
            keyboard: KeyboardSource::new(),
            menubar: MenuBarSource::new(),
            mode,
            state: Stream::with_value(State::new()),
            selection: Stream::with_value(Selection::empty()),
            transform: Stream::with_value(Transform::IDENTITY),
            config: Stream::with_value(config),
            vertex_insert_index: Stream::with_value(None),
            frame: Stream::new(),
        }
    }
}

/// How a proposed action enters the history.
#[derive(Debug, Clone, PartialEq)]
pub enum ActionOp {
    /// A new undo step.
    Apply(Action),
    /// Replaces the previous step of the same gesture.
    Amend(Action),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryCommand {
    Undo,
    Redo,
    Clear,
}

/// A module's proposals. Unused sinks simply never fire.
#[derive(Clone, Default)]
pub struct Sinks {
    pub action: Stream<ActionOp>,
    pub next_mode: Stream<Mode>,
    pub next_transform: Stream<Transform>,
    pub drawing_item: Stream<Option<Item>>,
    pub change_selection: Stream<Selection>,
    pub history: Stream<HistoryCommand>,
    /// True while the module owns the raw pointer.
    pub busy: Stream<bool>,
}

pub struct Interaction {
    pub name: &'static str,
    pub sinks: Sinks,
    _subscriptions: Vec<Subscription>,
}

impl Interaction {
    pub fn new(name: &'static str, sinks: Sinks, subscriptions: Vec<Subscription>) -> Self {
        Self {
            name,
            sinks,
            _subscriptions: subscriptions,
        }
    }
}

pub type InteractionFn = fn(&Sources) -> Interaction;

/// The modules every editor runs, in subscription order.
pub const INTERACTIONS: &[InteractionFn] = &[
    draw_line::draw_line,
    resize_items::resize_items,
    select_items::select_items,
    zoom::zoom,
    edit_commands::edit_commands,
];

/// Subscriptions that live exactly as long as one gesture.
///
/// `begin` replaces whatever gesture was running; `end` drops it. Listeners
/// inside the gesture must hold a `WeakGestureScope` if they end it
/// themselves.
#[derive(Clone, Default)]
pub struct GestureScope {
    subscriptions: Rc<RefCell<Option<Vec<Subscription>>>>,
}

pub struct WeakGestureScope {
    subscriptions: Weak<RefCell<Option<Vec<Subscription>>>>,
}

impl GestureScope {
    pub fn begin(&self, subscriptions: Vec<Subscription>) {
        let previous = self.subscriptions.borrow_mut().replace(subscriptions);
        drop(previous);
    }

    /// Returns whether a gesture was running.
    pub fn end(&self) -> bool {
        let previous = self.subscriptions.borrow_mut().take();
        previous.is_some()
    }

    pub fn is_active(&self) -> bool {
        self.subscriptions.borrow().is_some()
    }

    pub fn downgrade(&self) -> WeakGestureScope {
        WeakGestureScope {
            subscriptions: Rc::downgrade(&self.subscriptions),
        }
    }
}

impl WeakGestureScope {
    pub fn end(&self) -> bool {
        match self.subscriptions.upgrade() {
            Some(subscriptions) => GestureScope { subscriptions }.end(),
            None => false,
        }
    }
}

/// Emits `Apply` for the first action of a gesture and `Amend` after.
pub(crate) struct Coalescer {
    started: std::cell::Cell<bool>,
}

impl Coalescer {
    pub(crate) fn new() -> Self {
        Self {
            started: std::cell::Cell::new(false),
        }
    }

    pub(crate) fn wrap(&self, action: Action) -> ActionOp {
        if self.started.replace(true) {
            ActionOp::Amend(action)
        } else {
            ActionOp::Apply(action)
        }
    }
}
