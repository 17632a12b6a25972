//! The editor: owns the document and drives the interaction modules.
//!
//! Each `dispatch` is one tick:
//!
//! 1. the input event is pushed into the sources;
//! 2. modules react and put proposals on their sinks, which the editor
//!    only queues;
//! 3. once the event has fully propagated, the queue is committed in a
//!    fixed order (actions into the history, undo/redo, selection,
//!    transform, overlays, then mode) and the new values are published
//!    back on the source streams.
//!
//! Publishing can make modules propose again (the vertex-insert indicator
//! follows the state, for instance), so step 3 repeats until nothing is
//! left. Because mode, state and transform only change in step 3, every
//! module reacting to an event sees the values from before it.

use crate::hit::{self, HANDLE_RADIUS};
use crate::input::InputEvent;
use crate::interaction::vertex_insert::{Segment, VertexInsertIndicator, vertex_insert_indicator};
use crate::interaction::{ActionOp, HistoryCommand, INTERACTIONS, Interaction, Sinks, Sources};
use crate::mode::{Mode, ModeMachine};
use crate::mouse::WheelEvent;
use crate::resizer::Resizer;
use crate::stream::{SourceError, Stream, Subscription};
use serde::{Deserialize, Serialize};
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use thiserror::Error;
use vd_core::{AppConfig, AppHistory, ConfigError, Item, Point, Rect, Selection, State, Transform};

const MAX_COMMIT_ROUNDS: usize = 16;

#[derive(Debug, Error)]
pub enum EditorError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("editor stopped: {0}")]
    SourceFailed(SourceError),
}

/// What changed during a tick, so hosts know what to redraw.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Update {
    pub state_changed: bool,
    pub selection_changed: bool,
    pub view_changed: bool,
    pub mode_changed: bool,
    /// Preview item or highlighted edge changed.
    pub overlay_changed: bool,
    /// A key binding consumed the event.
    pub prevent_default: bool,
}

impl Update {
    pub fn needs_render(&self) -> bool {
        self.state_changed
            || self.selection_changed
            || self.view_changed
            || self.mode_changed
            || self.overlay_changed
    }
}

/// Everything a renderer needs for one frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub mode: Mode,
    pub items: Vec<Item>,
    pub selection: Selection,
    pub selection_bbox: Option<Rect>,
    pub drawing_item: Option<Item>,
    pub highlighted_segment: Option<Segment>,
    pub transform: Transform,
    pub can_undo: bool,
    pub can_redo: bool,
}

#[derive(Default)]
struct Pending {
    actions: Vec<ActionOp>,
    history: Vec<HistoryCommand>,
    modes: Vec<Mode>,
    transform: Option<Transform>,
    selection: Option<Selection>,
    drawing_item: Option<Option<Item>>,
    highlighted_segment: Option<Option<Segment>>,
    insert_index: Option<Option<usize>>,
}

impl Pending {
    fn is_empty(&self) -> bool {
        self.actions.is_empty()
            && self.history.is_empty()
            && self.modes.is_empty()
            && self.transform.is_none()
            && self.selection.is_none()
            && self.drawing_item.is_none()
            && self.highlighted_segment.is_none()
            && self.insert_index.is_none()
    }
}

fn queue<T: Clone + 'static>(
    stream: &Stream<T>,
    pending: &Rc<RefCell<Pending>>,
    put: fn(&mut Pending, &T),
) -> Subscription {
    let pending = pending.clone();
    stream.subscribe(move |value| put(&mut pending.borrow_mut(), value))
}

fn wire(sinks: &Sinks, pending: &Rc<RefCell<Pending>>, pointer_owned: &Rc<Cell<bool>>) -> Vec<Subscription> {
    let owned = pointer_owned.clone();
    vec![
        queue(&sinks.action, pending, |p, op| p.actions.push(op.clone())),
        queue(&sinks.history, pending, |p, c| p.history.push(*c)),
        queue(&sinks.next_mode, pending, |p, m| p.modes.push(*m)),
        queue(&sinks.next_transform, pending, |p, t| p.transform = Some(*t)),
        queue(&sinks.change_selection, pending, |p, s| {
            p.selection = Some(s.clone())
        }),
        queue(&sinks.drawing_item, pending, |p, d| {
            p.drawing_item = Some(d.clone())
        }),
        // Pointer ownership takes effect immediately: the rest of the
        // current event must already be routed around the owner.
        sinks.busy.subscribe(move |busy| owned.set(*busy)),
    ]
}

pub struct Editor {
    sources: Sources,
    config: AppConfig,
    history: AppHistory,
    mode: ModeMachine,
    selection: Selection,
    transform: Transform,
    drawing_item: Option<Item>,
    highlighted_segment: Option<Segment>,
    vertex_insert_index: Option<usize>,
    hover_resizer: Option<Resizer>,
    hover_vertex: Option<usize>,
    busy: bool,
    pointer_owned: Rc<Cell<bool>>,
    pending: Rc<RefCell<Pending>>,
    failure: Option<SourceError>,
    interactions: Vec<Interaction>,
    _indicator: VertexInsertIndicator,
    _subscriptions: Vec<Subscription>,
}

impl std::fmt::Debug for Editor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Editor").finish_non_exhaustive()
    }
}

impl Default for Editor {
    fn default() -> Self {
        Self::build(AppConfig::default())
    }
}

impl Editor {
    pub fn new(config: AppConfig) -> Result<Self, EditorError> {
        config.validate()?;
        Ok(Self::build(config))
    }

    pub fn with_state(config: AppConfig, state: State) -> Result<Self, EditorError> {
        let mut editor = Self::new(config)?;
        editor.load_state(state);
        Ok(editor)
    }

    fn build(config: AppConfig) -> Self {
        let mode = ModeMachine::new();
        let sources = Sources::new(config.clone(), mode.stream().clone());
        let pending = Rc::new(RefCell::new(Pending::default()));
        let pointer_owned = Rc::new(Cell::new(false));

        let interactions: Vec<Interaction> = INTERACTIONS.iter().map(|build| build(&sources)).collect();
        let indicator = vertex_insert_indicator(&sources);

        let mut subscriptions = Vec::new();
        for interaction in &interactions {
            subscriptions.extend(wire(&interaction.sinks, &pending, &pointer_owned));
        }
        subscriptions.push(queue(&indicator.highlighted_segment, &pending, |p, s| {
            p.highlighted_segment = Some(*s)
        }));
        subscriptions.push(queue(&indicator.next_vertex_insert_index, &pending, |p, i| {
            p.insert_index = Some(*i)
        }));
        log::debug!(
            "editor: started with {} interactions",
            interactions.len()
        );

        Self {
            history: AppHistory::default().with_max_depth(config.history_depth),
            sources,
            config,
            mode,
            selection: Selection::empty(),
            transform: Transform::IDENTITY,
            drawing_item: None,
            highlighted_segment: None,
            vertex_insert_index: None,
            hover_resizer: None,
            hover_vertex: None,
            busy: false,
            pointer_owned,
            pending,
            failure: None,
            interactions,
            _indicator: indicator,
            _subscriptions: subscriptions,
        }
    }

    // ─── Accessors ───────────────────────────────────────────────────────

    pub fn sources(&self) -> &Sources {
        &self.sources
    }

    pub fn interaction_names(&self) -> Vec<&'static str> {
        self.interactions.iter().map(|i| i.name).collect()
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn mode(&self) -> Mode {
        self.mode.current()
    }

    pub fn state(&self) -> &State {
        &self.history.state
    }

    pub fn history(&self) -> &AppHistory {
        &self.history
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn transform(&self) -> Transform {
        self.transform
    }

    pub fn drawing_item(&self) -> Option<&Item> {
        self.drawing_item.as_ref()
    }

    pub fn highlighted_segment(&self) -> Option<Segment> {
        self.highlighted_segment
    }

    pub fn vertex_insert_index(&self) -> Option<usize> {
        self.vertex_insert_index
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn failure(&self) -> Option<&SourceError> {
        self.failure.as_ref()
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            mode: self.mode.current(),
            items: self.history.state.items().cloned().collect(),
            selection: self.selection.clone(),
            selection_bbox: self.selection.get_bbox(&self.history.state),
            drawing_item: self.drawing_item.clone(),
            highlighted_segment: self.highlighted_segment,
            transform: self.transform,
            can_undo: self.history.can_undo(),
            can_redo: self.history.can_redo(),
        }
    }

    /// Hit-test the screen point against the selection's handles and
    /// vertices. Hosts dispatch the result before the pointer event.
    pub fn hover_at(&self, x: f64, y: f64) -> InputEvent {
        let raw = Point::new(x, y);
        let state = &self.history.state;
        let resizer = self
            .selection
            .get_bbox(state)
            .and_then(|bbox| hit::hit_resizer(&bbox, &self.transform, raw, HANDLE_RADIUS));
        let vertex_index = self
            .selection
            .sitem(state)
            .filter(|item| !item.locked)
            .and_then(|item| hit::hit_vertex(&item.points, &self.transform, raw, HANDLE_RADIUS));
        InputEvent::Hover {
            resizer,
            vertex_index,
        }
    }

    // ─── Input ───────────────────────────────────────────────────────────

    pub fn dispatch(&mut self, event: InputEvent) -> Result<Update, EditorError> {
        if let Some(error) = &self.failure {
            return Err(EditorError::SourceFailed(error.clone()));
        }
        let mut update = Update::default();
        let mouse = self.sources.mouse.clone();
        match event {
            InputEvent::PointerDown { x, y } => {
                let raw = Point::new(x, y);
                mouse.raw_down.emit(raw);
                if !self.pointer_owned.get() {
                    mouse.down.emit(self.transform.invert_pos(raw));
                }
            }
            InputEvent::PointerMove { x, y } => {
                let raw = Point::new(x, y);
                mouse.raw_move.emit(raw);
                if !self.pointer_owned.get() {
                    mouse.moves.emit(self.transform.invert_pos(raw));
                }
            }
            InputEvent::PointerUp { x, y } => {
                let raw = Point::new(x, y);
                let owned = self.pointer_owned.get();
                mouse.raw_up.emit(raw);
                if !owned {
                    mouse.up.emit(self.transform.invert_pos(raw));
                }
            }
            InputEvent::PointerCancel => mouse.cancel.emit(()),
            InputEvent::DoubleClick { x, y } => mouse.dblclick.emit(Point::new(x, y)),
            InputEvent::Wheel { x, y, delta_y } => mouse.wheel.emit(WheelEvent {
                pos: Point::new(x, y),
                delta_y,
            }),
            InputEvent::Hover {
                resizer,
                vertex_index,
            } => self.set_hover(resizer, vertex_index),
            InputEvent::Key(key) => update.prevent_default = self.sources.keyboard.dispatch(&key),
            InputEvent::Menu { intent } => {
                self.sources.menubar.invoke(&intent);
            }
            InputEvent::Frame { time_ms } => self.sources.frame.emit(time_ms),
        }
        self.commit(&mut update);
        Ok(update)
    }

    /// Terminate one input source (`mouse`, `keyboard`, `menubar` or
    /// `frame`). The editor refuses further input afterwards.
    pub fn fail_source(&mut self, error: SourceError) {
        log::warn!("editor: {error}");
        match error.source_name.as_str() {
            "mouse" => self.sources.mouse.fail(error.clone()),
            "keyboard" => self.sources.keyboard.fail(error.clone()),
            "menubar" => self.sources.menubar.fail(error.clone()),
            "frame" => self.sources.frame.fail(error.clone()),
            other => log::debug!("editor: unknown source {other:?}"),
        }
        self.failure = Some(error);
    }

    // ─── Direct commands ─────────────────────────────────────────────────

    pub fn undo(&mut self) -> Update {
        self.run(|p| p.history.push(HistoryCommand::Undo))
    }

    pub fn redo(&mut self) -> Update {
        self.run(|p| p.history.push(HistoryCommand::Redo))
    }

    pub fn clear_history(&mut self) -> Update {
        self.run(|p| p.history.push(HistoryCommand::Clear))
    }

    pub fn set_selection(&mut self, selection: Selection) -> Update {
        self.run(|p| p.selection = Some(selection))
    }

    /// Replace the document. The undo log starts over.
    pub fn load_state(&mut self, state: State) -> Update {
        log::debug!("editor: loading {} items", state.len());
        self.history = AppHistory::new(state).with_max_depth(self.config.history_depth);
        self.selection = self.selection.pruned(&self.history.state);
        self.sources.state.emit(self.history.state.clone());
        self.sources.selection.emit(self.selection.clone());
        let mut update = Update {
            state_changed: true,
            selection_changed: true,
            ..Update::default()
        };
        self.commit(&mut update);
        update
    }

    pub fn set_config(&mut self, config: AppConfig) -> Result<(), EditorError> {
        config.validate()?;
        self.history = self.history.clone().with_max_depth(config.history_depth);
        self.config = config.clone();
        self.sources.config.emit(config);
        let mut update = Update::default();
        self.commit(&mut update);
        Ok(())
    }

    fn run(&mut self, enqueue: impl FnOnce(&mut Pending)) -> Update {
        enqueue(&mut self.pending.borrow_mut());
        let mut update = Update::default();
        self.commit(&mut update);
        update
    }

    // ─── Commit ──────────────────────────────────────────────────────────

    fn set_hover(&mut self, resizer: Option<Resizer>, vertex_index: Option<usize>) {
        if resizer != self.hover_resizer {
            self.hover_resizer = resizer;
            self.sources.mouse.resizer.emit(resizer);
        }
        if vertex_index != self.hover_vertex {
            self.hover_vertex = vertex_index;
            self.sources.mouse.vertex_index.emit(vertex_index);
        }
        self.refresh_busy();
    }

    fn refresh_busy(&mut self) {
        let busy = self.pointer_owned.get()
            || self.hover_resizer.is_some()
            || self.hover_vertex.is_some()
            || self.vertex_insert_index.is_some();
        if busy != self.busy {
            self.busy = busy;
            self.sources.mouse.is_busy.emit(busy);
        }
    }

    fn commit(&mut self, update: &mut Update) {
        for _ in 0..MAX_COMMIT_ROUNDS {
            let pending = std::mem::take(&mut *self.pending.borrow_mut());
            if pending.is_empty() {
                self.refresh_busy();
                return;
            }
            self.apply(pending, update);
        }
        log::warn!("editor: proposals still pending after {MAX_COMMIT_ROUNDS} commit rounds");
        self.refresh_busy();
    }

    fn apply(&mut self, pending: Pending, update: &mut Update) {
        let Pending {
            actions,
            history,
            modes,
            transform,
            selection,
            drawing_item,
            highlighted_segment,
            insert_index,
        } = pending;

        let mut document_changed = !actions.is_empty();
        for op in actions {
            self.history = match op {
                ActionOp::Apply(action) => self.history.apply(Some(action)),
                ActionOp::Amend(action) => self.history.pop().apply(Some(action)),
            };
        }
        for command in history {
            let effective = match command {
                HistoryCommand::Undo => self.history.can_undo(),
                HistoryCommand::Redo => self.history.can_redo(),
                HistoryCommand::Clear => self.history.can_undo() || self.history.can_redo(),
            };
            if !effective {
                log::trace!("editor: nothing to {command:?}");
                continue;
            }
            document_changed = true;
            self.history = match command {
                HistoryCommand::Undo => self.history.undo(self.history.get_last_action()),
                HistoryCommand::Redo => self.history.redo(self.history.get_next_action()),
                HistoryCommand::Clear => self.history.clear_history(),
            };
        }

        let mut next_selection = selection.unwrap_or_else(|| self.selection.clone());
        if document_changed {
            next_selection = next_selection.pruned(&self.history.state);
        }
        let selection_changed = next_selection != self.selection;
        self.selection = next_selection;

        let transform_changed = transform.is_some_and(|t| t != self.transform);
        if let Some(t) = transform {
            self.transform = t;
        }

        if let Some(item) = drawing_item
            && item != self.drawing_item
        {
            self.drawing_item = item;
            update.overlay_changed = true;
        }
        if let Some(segment) = highlighted_segment
            && segment != self.highlighted_segment
        {
            self.highlighted_segment = segment;
            update.overlay_changed = true;
        }
        let insert_changed = insert_index.is_some_and(|i| i != self.vertex_insert_index);
        if let Some(index) = insert_index {
            self.vertex_insert_index = index;
        }

        if document_changed {
            update.state_changed = true;
            self.sources.state.emit(self.history.state.clone());
        }
        if selection_changed {
            update.selection_changed = true;
            self.sources.selection.emit(self.selection.clone());
        }
        if transform_changed {
            update.view_changed = true;
            log::trace!("editor: transform {:?}", self.transform);
            self.sources.transform.emit(self.transform);
        }
        if insert_changed {
            self.sources.vertex_insert_index.emit(self.vertex_insert_index);
        }
        if self.mode.commit(modes) {
            update.mode_changed = true;
        }
    }
}
