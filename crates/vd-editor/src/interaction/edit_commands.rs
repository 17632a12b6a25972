//! Keyboard and menu commands that edit without a pointer gesture.
//!
//! | Input | Effect |
//! |-------|--------|
//! | `mod+z`, menu `undo` | undo |
//! | `mod+shift+z`, `mod+y`, menu `redo` | redo |
//! | menu `clear-history` | forget the undo log |
//! | `del`, `backspace` | remove selected unlocked items |
//! | arrows (`shift` ×10) | nudge selected unlocked items |
//! | `esc` | leave `line.ready`, or clear the selection |
//! | menu `toggle-lock` | lock / unlock the selection |
//! | click on a highlighted edge | insert a vertex there |
//!
//! History commands are ignored mid-gesture; everything else requires
//! `idle` unless noted.

use super::{ActionOp, HistoryCommand, Interaction, Sinks, Sources};
use crate::input::KeyEvent;
use crate::mode::Mode;
use crate::stream::Stream;
use vd_core::{Action, Item, Selection};

const NUDGE: f64 = 1.0;
const NUDGE_LARGE: f64 = 10.0;

fn nudge_delta(event: &KeyEvent) -> Option<(f64, f64)> {
    let step = if event.modifiers.shift { NUDGE_LARGE } else { NUDGE };
    match event.key.as_str() {
        "ArrowUp" | "Up" | "up" => Some((0.0, -step)),
        "ArrowDown" | "Down" | "down" => Some((0.0, step)),
        "ArrowLeft" | "Left" | "left" => Some((-step, 0.0)),
        "ArrowRight" | "Right" | "right" => Some((step, 0.0)),
        _ => None,
    }
}

pub fn edit_commands(sources: &Sources) -> Interaction {
    let sinks = Sinks::default();
    let (keyboard, menubar) = (&sources.keyboard, &sources.menubar);
    let state = sources.state.latest();
    let selection = sources.selection.latest();
    let mode = sources.mode.latest();
    let idle = |stream: Stream<()>| stream.gate(&sources.mode, |m| *m == Mode::Idle);
    let mut subs = Vec::new();

    for (command, keys, intent) in [
        (HistoryCommand::Undo, &["mod+z"][..], "undo"),
        (HistoryCommand::Redo, &["mod+shift+z", "mod+y"][..], "redo"),
        (HistoryCommand::Clear, &[][..], "clear-history"),
    ] {
        let mut triggers = vec![menubar.intent(intent)];
        if !keys.is_empty() {
            triggers.push(keyboard.shortcut(keys).map_to(()));
        }
        let merged = Stream::merge(&triggers.iter().collect::<Vec<_>>())
            .gate(&sources.mode, |m| !m.is_gesture());
        subs.push(merged.subscribe({
            let history = sinks.history.clone();
            move |_| history.emit(command)
        }));
    }

    subs.push(idle(keyboard.shortcut(&["del", "backspace"]).map_to(())).subscribe({
        let (sinks, state, selection) = (sinks.clone(), state.clone(), selection.clone());
        move |_| {
            let (Some(state), Some(current)) = (state.get(), selection.get()) else {
                return;
            };
            let doomed: Vec<Item> = current
                .editable_items(&state)
                .into_iter()
                .cloned()
                .collect();
            if doomed.is_empty() {
                return;
            }
            let kept = Selection::from_ids(current.ids().filter(|id| doomed.iter().all(|d| d.id != *id)));
            sinks.action.emit(ActionOp::Apply(Action::remove_items(doomed)));
            sinks.change_selection.emit(kept);
        }
    }));

    let arrows = keyboard
        .shortcut(&[
            "up", "down", "left", "right", "shift+up", "shift+down", "shift+left", "shift+right",
        ])
        .gate(&sources.mode, |m| *m == Mode::Idle);
    subs.push(arrows.subscribe({
        let (action, state, selection) = (sinks.action.clone(), state.clone(), selection.clone());
        move |event| {
            let Some((dx, dy)) = nudge_delta(event) else {
                return;
            };
            let (Some(state), Some(current)) = (state.get(), selection.get()) else {
                return;
            };
            let items: Vec<Item> = current
                .editable_items(&state)
                .into_iter()
                .cloned()
                .collect();
            if !items.is_empty() {
                action.emit(ActionOp::Apply(Action::move_items(items, dx, dy)));
            }
        }
    }));

    subs.push(keyboard.shortcut(&["esc"]).subscribe({
        let sinks = sinks.clone();
        move |_| match mode.get() {
            Some(Mode::LineReady) => sinks.next_mode.emit(Mode::Idle),
            Some(Mode::Idle) => sinks.change_selection.emit(Selection::empty()),
            _ => {}
        }
    }));

    subs.push(idle(menubar.intent("toggle-lock")).subscribe({
        let (action, state, selection) = (sinks.action.clone(), state.clone(), selection.clone());
        move |_| {
            let (Some(state), Some(current)) = (state.get(), selection.get()) else {
                return;
            };
            let items: Vec<Item> = current.items(&state).into_iter().cloned().collect();
            if items.is_empty() {
                return;
            }
            let locked = !items.iter().all(|item| item.locked);
            action.emit(ActionOp::Apply(Action::set_locked(items, locked)));
        }
    }));

    let insert_clicks = sources
        .mouse
        .down
        .gate(&sources.mode, |m| *m == Mode::Idle)
        .gate(&sources.mouse.resizer, Option::is_none)
        .gate(&sources.vertex_insert_index, Option::is_some);
    let insert_index = sources.vertex_insert_index.latest();
    subs.push(insert_clicks.subscribe({
        let action = sinks.action.clone();
        move |&pos| {
            let (Some(state), Some(current), Some(Some(index))) =
                (state.get(), selection.get(), insert_index.get())
            else {
                return;
            };
            let Some(item) = current.sitem(&state).filter(|item| !item.locked) else {
                return;
            };
            log::debug!("edit_commands: insert vertex into {} at {index}", item.id);
            action.emit(ActionOp::Apply(Action::insert_vertex(item.id, index, pos)));
        }
    }));

    Interaction::new("edit_commands", sinks, subs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{KeyKind, Modifiers};
    use crate::interaction::testing::{recorder, sources};
    use pretty_assertions::assert_eq;
    use vd_core::{ItemId, Point, State};

    fn doc() -> State {
        State::from_items([
            Item::line_from_points(ItemId(1), Point::new(0.0, 0.0), Point::new(10.0, 0.0)),
            Item::line_from_points(ItemId(2), Point::new(0.0, 5.0), Point::new(10.0, 5.0))
                .with_locked(true),
        ])
    }

    fn ctrl(key: &str, shift: bool) -> KeyEvent {
        KeyEvent::new(
            KeyKind::Down,
            key,
            Modifiers {
                ctrl: true,
                shift,
                ..Modifiers::NONE
            },
        )
    }

    #[test]
    fn history_shortcuts_and_intents() {
        let src = sources();
        let module = edit_commands(&src);
        let p = recorder(&module.sinks);
        src.keyboard.dispatch(&ctrl("z", false));
        src.keyboard.dispatch(&ctrl("z", true));
        src.keyboard.dispatch(&ctrl("y", false));
        src.menubar.invoke("clear-history");
        src.mode.emit(Mode::Resizing);
        src.menubar.invoke("undo");
        assert_eq!(
            *p.history.borrow(),
            vec![
                HistoryCommand::Undo,
                HistoryCommand::Redo,
                HistoryCommand::Redo,
                HistoryCommand::Clear
            ]
        );
    }

    #[test]
    fn delete_skips_locked_items() {
        let src = sources();
        src.state.emit(doc());
        src.selection.emit(Selection::from_ids([ItemId(1), ItemId(2)]));
        let module = edit_commands(&src);
        let p = recorder(&module.sinks);
        src.keyboard.dispatch(&KeyEvent::down("Delete"));
        match p.actions.borrow().as_slice() {
            [ActionOp::Apply(Action::RemoveItems { items })] => {
                assert_eq!(items.iter().map(|i| i.id).collect::<Vec<_>>(), vec![ItemId(1)]);
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(*p.selections.borrow(), vec![Selection::select_item(ItemId(2))]);
    }

    #[test]
    fn arrows_nudge_and_shift_nudges_more() {
        let src = sources();
        src.state.emit(doc());
        src.selection.emit(Selection::select_item(ItemId(1)));
        let module = edit_commands(&src);
        let p = recorder(&module.sinks);
        src.keyboard.dispatch(&KeyEvent::down("ArrowRight"));
        src.keyboard.dispatch(&KeyEvent::new(
            KeyKind::Down,
            "ArrowUp",
            Modifiers {
                shift: true,
                ..Modifiers::NONE
            },
        ));
        let moved: Vec<Point> = p
            .actions
            .borrow()
            .iter()
            .filter_map(|op| match op {
                ActionOp::Apply(a) => a.next(&doc()).item(ItemId(1)).map(|i| i.points[0]),
                ActionOp::Amend(_) => None,
            })
            .collect();
        assert_eq!(moved, vec![Point::new(1.0, 0.0), Point::new(0.0, -10.0)]);
    }

    #[test]
    fn escape_cancels_ready_then_clears_selection() {
        let src = sources();
        let module = edit_commands(&src);
        let p = recorder(&module.sinks);
        src.mode.emit(Mode::LineReady);
        src.keyboard.dispatch(&KeyEvent::down("Escape"));
        src.mode.emit(Mode::Idle);
        src.keyboard.dispatch(&KeyEvent::down("Escape"));
        assert_eq!(*p.modes.borrow(), vec![Mode::Idle]);
        assert_eq!(*p.selections.borrow(), vec![Selection::empty()]);
    }

    #[test]
    fn toggle_lock_locks_until_all_locked() {
        let src = sources();
        src.state.emit(doc());
        src.selection.emit(Selection::from_ids([ItemId(1), ItemId(2)]));
        let module = edit_commands(&src);
        let p = recorder(&module.sinks);
        src.menubar.invoke("toggle-lock");
        match p.actions.borrow().as_slice() {
            [ActionOp::Apply(Action::SetLocked { locked, start_items })] => {
                assert!(*locked);
                assert_eq!(start_items.len(), 2);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn click_on_highlighted_edge_inserts_vertex() {
        let src = sources();
        src.state.emit(doc());
        src.selection.emit(Selection::select_item(ItemId(1)));
        let module = edit_commands(&src);
        let p = recorder(&module.sinks);

        src.mouse.down.emit(Point::new(5.0, 1.0));
        assert!(p.actions.borrow().is_empty());

        src.vertex_insert_index.emit(Some(1));
        src.mouse.down.emit(Point::new(5.0, 1.0));
        assert_eq!(
            *p.actions.borrow(),
            vec![ActionOp::Apply(Action::insert_vertex(
                ItemId(1),
                1,
                Point::new(5.0, 1.0)
            ))]
        );
    }
}
