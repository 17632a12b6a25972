//! Vertex-insert indicator.
//!
//! While exactly one unlocked item is selected and the pointer is not over
//! one of its vertices, the first edge within `sense_range` screen pixels
//! of the cursor is highlighted. Clicking it (see `edit_commands`) splices
//! a vertex at `edge index + 1`.

use super::Sources;
use crate::stream::{Stream, Subscription};
use std::cell::RefCell;
use std::rc::Rc;
use vd_core::geometry::distance_point_segment;
use vd_core::{AppConfig, Item, Point, Selection, State, Transform};

pub type Segment = (Point, Point);

/// Index of the first edge of `item` within `range` of `pos`.
pub fn find_insert_edge(item: &Item, pos: Point, range: f64) -> Option<usize> {
    item.segments()
        .iter()
        .position(|&(a, b)| distance_point_segment(pos, a, b) <= range)
}

#[derive(Default)]
struct Inputs {
    cursor: Option<Point>,
    state: State,
    selection: Selection,
    transform: Transform,
    config: AppConfig,
    vertex_index: Option<usize>,
}

impl Inputs {
    fn highlighted(&self) -> Option<(usize, Segment)> {
        let pos = self.cursor?;
        if self.vertex_index.is_some() {
            return None;
        }
        let item = self.selection.sitem(&self.state)?;
        if item.locked {
            return None;
        }
        let range = self.config.sense_range / self.transform.k;
        let index = find_insert_edge(item, pos, range)?;
        item.segments().get(index).map(|seg| (index, *seg))
    }
}

pub struct VertexInsertIndicator {
    /// Render hint: the edge a click would split.
    pub highlighted_segment: Stream<Option<Segment>>,
    pub next_vertex_insert_index: Stream<Option<usize>>,
    _subscriptions: Vec<Subscription>,
}

pub fn vertex_insert_indicator(sources: &Sources) -> VertexInsertIndicator {
    let highlighted_segment = Stream::new();
    let next_vertex_insert_index = Stream::new();
    let inputs = Rc::new(RefCell::new(Inputs::default()));

    let recompute = {
        let (inputs, segment_out, index_out) = (
            inputs.clone(),
            highlighted_segment.clone(),
            next_vertex_insert_index.clone(),
        );
        Rc::new(move || {
            let found = inputs.borrow().highlighted();
            segment_out.emit(found.map(|(_, seg)| seg));
            index_out.emit(found.map(|(index, _)| index + 1));
        })
    };

    fn track<T: Clone + 'static>(
        stream: &Stream<T>,
        inputs: &Rc<RefCell<Inputs>>,
        recompute: &Rc<dyn Fn()>,
        store: fn(&mut Inputs, &T),
    ) -> Subscription {
        let (inputs, recompute) = (inputs.clone(), recompute.clone());
        stream.subscribe(move |value| {
            store(&mut inputs.borrow_mut(), value);
            recompute();
        })
    }

    let recompute: Rc<dyn Fn()> = recompute;
    let subscriptions = vec![
        track(&sources.mouse.moves, &inputs, &recompute, |i, p| i.cursor = Some(*p)),
        track(&sources.state, &inputs, &recompute, |i, s| i.state = s.clone()),
        track(&sources.selection, &inputs, &recompute, |i, s| {
            i.selection = s.clone()
        }),
        track(&sources.transform, &inputs, &recompute, |i, t| i.transform = *t),
        track(&sources.config, &inputs, &recompute, |i, c| i.config = c.clone()),
        track(&sources.mouse.vertex_index, &inputs, &recompute, |i, v| {
            i.vertex_index = *v
        }),
    ];

    VertexInsertIndicator {
        highlighted_segment,
        next_vertex_insert_index,
        _subscriptions: subscriptions,
    }
}
