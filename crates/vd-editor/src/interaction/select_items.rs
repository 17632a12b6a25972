//! Click-to-select and drag-to-move.
//!
//! A pointer-down in `idle` on an unlocked item selects it (keeping the
//! current selection if the item is already part of it). Dragging moves
//! every editable selected item; like resizing, the first move only enters
//! `moving` and the whole drag is one undo step.
//!
//! Clicks on handles or on a highlighted insert edge belong to other
//! modules and are ignored here.

use super::{Coalescer, GestureScope, Interaction, Sinks, Sources};
use crate::mode::Mode;
use std::cell::Cell;
use std::rc::Rc;
use vd_core::{Action, Item, Selection};

pub fn select_items(sources: &Sources) -> Interaction {
    let sinks = Sinks::default();
    let mouse = &sources.mouse;
    let state = sources.state.latest();
    let selection = sources.selection.latest();
    let scope = GestureScope::default();
    let mut subs = Vec::new();

    let presses = mouse
        .down
        .gate(&sources.mode, |m| *m == Mode::Idle)
        .gate(&mouse.resizer, Option::is_none)
        .gate(&sources.vertex_insert_index, Option::is_none);
    let moving_moves = mouse.moves.gate(&sources.mode, |m| *m == Mode::Moving);

    subs.push(presses.subscribe({
        let (sinks, scope, moves) = (sinks.clone(), scope.clone(), mouse.moves.clone());
        move |&start| {
            let (Some(state), Some(current)) = (state.get(), selection.get()) else {
                return;
            };
            let Some(hit) = state.items_at(start).into_iter().find(|item| !item.locked) else {
                return;
            };
            let next = if current.contains(hit.id) {
                current
            } else {
                Selection::select_item(hit.id)
            };
            let start_items: Vec<Item> = next
                .editable_items(&state)
                .into_iter()
                .cloned()
                .collect();
            sinks.change_selection.emit(next);

            let entered = Rc::new(Cell::new(false));
            let enter = moves.subscribe({
                let next_mode = sinks.next_mode.clone();
                move |_| {
                    if !entered.replace(true) {
                        next_mode.emit(Mode::Moving);
                    }
                }
            });
            let coalescer = Coalescer::new();
            let drag = moving_moves.subscribe({
                let action = sinks.action.clone();
                move |&pos| {
                    let (dx, dy) = (pos.x - start.x, pos.y - start.y);
                    log::trace!("select_items: drag by ({dx}, {dy})");
                    action.emit(coalescer.wrap(Action::move_items(start_items.clone(), dx, dy)));
                }
            });
            scope.begin(vec![enter, drag]);
        }
    }));

    subs.push(
        mouse
            .up
            .gate(&sources.mode, |m| *m == Mode::Moving)
            .subscribe({
                let next_mode = sinks.next_mode.clone();
                move |_| next_mode.emit(Mode::Idle)
            }),
    );
    subs.push(
        mouse
            .cancel
            .gate(&sources.mode, |m| *m == Mode::Moving)
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

    Interaction::new("select_items", sinks, subs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interaction::ActionOp;
    use crate::interaction::testing::{recorder, sources};
    use pretty_assertions::assert_eq;
    use vd_core::{ItemId, Point, State};

    fn state() -> State {
        State::from_items([
            Item::line_from_points(ItemId(1), Point::new(0.0, 0.0), Point::new(10.0, 0.0)),
            Item::line_from_points(ItemId(2), Point::new(0.0, 20.0), Point::new(10.0, 20.0))
                .with_locked(true),
        ])
    }

    #[test]
    fn click_selects_unlocked_item() {
        let src = sources();
        src.state.emit(state());
        let module = select_items(&src);
        let p = recorder(&module.sinks);
        src.mouse.down.emit(Point::new(5.0, 0.0));
        src.mouse.down.emit(Point::new(5.0, 20.0));
        assert_eq!(*p.selections.borrow(), vec![Selection::select_item(ItemId(1))]);
    }

    #[test]
    fn drag_moves_as_one_step() {
        let src = sources();
        src.state.emit(state());
        let module = select_items(&src);
        let p = recorder(&module.sinks);

        src.mouse.down.emit(Point::new(5.0, 0.0));
        src.mouse.moves.emit(Point::new(6.0, 1.0));
        assert_eq!(*p.modes.borrow(), vec![Mode::Moving]);
        src.mode.emit(Mode::Moving);
        src.mouse.moves.emit(Point::new(8.0, 3.0));
        src.mouse.moves.emit(Point::new(9.0, 4.0));
        src.mouse.up.emit(Point::new(9.0, 4.0));

        let actions = p.actions.borrow();
        assert!(matches!(actions[0], ActionOp::Apply(_)));
        match &actions[1] {
            ActionOp::Amend(action) => {
                let moved = action.next(&state());
                assert_eq!(
                    moved.item(ItemId(1)).map(|i| i.points[0]),
                    Some(Point::new(4.0, 4.0))
                );
            }
            other => panic!("expected amend, got {other:?}"),
        }
        assert_eq!(p.modes.borrow().last(), Some(&Mode::Idle));
    }

    #[test]
    fn cancel_before_first_move_ends_drag() {
        let src = sources();
        src.state.emit(state());
        let module = select_items(&src);
        let p = recorder(&module.sinks);

        src.mouse.down.emit(Point::new(5.0, 0.0));
        src.mouse.cancel.emit(());
        src.mouse.moves.emit(Point::new(50.0, 50.0));
        src.mode.emit(Mode::Moving);
        src.mouse.moves.emit(Point::new(60.0, 60.0));
        assert!(p.modes.borrow().is_empty());
        assert!(p.actions.borrow().is_empty());
    }
}
