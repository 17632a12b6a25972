//! Resizing the selection by its handles.
//!
//! A pointer-down on a handle in `idle` snapshots the selection: its
//! editable items, the grabbed handle position and the opposite handle as
//! anchor. The first move after that proposes `resizing`; every move seen
//! while `resizing` emits a resize computed from the snapshot, so the
//! result never depends on how many moves were delivered. All steps of one
//! gesture fold into one undo entry.

use super::{Coalescer, GestureScope, Interaction, Sinks, Sources};
use crate::mode::Mode;
use std::cell::Cell;
use std::rc::Rc;
use vd_core::{Action, ResizeInfo};

pub fn resize_items(sources: &Sources) -> Interaction {
    let sinks = Sinks::default();
    let mouse = &sources.mouse;
    let state = sources.state.latest();
    let selection = sources.selection.latest();
    let resizer = mouse.resizer.latest();
    let scope = GestureScope::default();
    let mut subs = Vec::new();

    let starts = mouse
        .down
        .gate(&sources.mode, |m| *m == Mode::Idle)
        .gate(&mouse.resizer, Option::is_some);
    let resizing_moves = mouse.moves.gate(&sources.mode, |m| *m == Mode::Resizing);

    subs.push(starts.subscribe({
        let (sinks, scope, moves) = (sinks.clone(), scope.clone(), mouse.moves.clone());
        move |_| {
            let Some(handle) = resizer.get().flatten() else {
                return;
            };
            let (Some(state), Some(selection)) = (state.get(), selection.get()) else {
                return;
            };
            let Some(bbox) = selection.get_bbox(&state) else {
                log::debug!("resize_items: {handle} grabbed without a resizable selection");
                return;
            };
            let start_pos = handle.position(&bbox);
            let base = ResizeInfo {
                start_pos,
                moving_pos: start_pos,
                anchor: handle.opposite().position(&bbox),
                axes: handle.axes(),
                start_items: selection
                    .editable_items(&state)
                    .into_iter()
                    .cloned()
                    .collect(),
            };
            log::debug!("resize_items: start {handle} anchored at {:?}", base.anchor);

            let entered = Rc::new(Cell::new(false));
            let enter = moves.subscribe({
                let next_mode = sinks.next_mode.clone();
                move |_| {
                    if !entered.replace(true) {
                        next_mode.emit(Mode::Resizing);
                    }
                }
            });

            let coalescer = Coalescer::new();
            let step = resizing_moves.subscribe({
                let action = sinks.action.clone();
                move |&pos| {
                    let info = ResizeInfo {
                        moving_pos: pos,
                        ..base.clone()
                    };
                    action.emit(coalescer.wrap(Action::resize(info)));
                }
            });
            scope.begin(vec![enter, step]);
        }
    }));

    subs.push(
        mouse
            .up
            .gate(&sources.mode, |m| *m == Mode::Resizing)
            .subscribe({
                let next_mode = sinks.next_mode.clone();
                move |_| next_mode.emit(Mode::Idle)
            }),
    );
    subs.push(
        mouse
            .cancel
            .gate(&sources.mode, |m| *m == Mode::Resizing)
            .subscribe({
                let next_mode = sinks.next_mode.clone();
                move |_| next_mode.emit(Mode::Idle)
            }),
    );
    // Cancel can arrive before the first move, while still `idle`.
    subs.push(mouse.up.subscribe({
        let scope = scope.clone();
        move |_| {
            scope.end();
        }
    }));
    subs.push(mouse.cancel.subscribe(move |_| {
        scope.end();
    }));

    Interaction::new("resize_items", sinks, subs)
}
