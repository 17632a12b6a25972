//! Line drawing.
//!
//! `line` (menu) or `l` arms the tool (`line.ready`). A pointer-down while
//! armed starts the line and switches to `line.drawing`; moves stretch the
//! preview; pointer-up commits it as a new item and selects it.

use super::{ActionOp, GestureScope, Interaction, Sinks, Sources};
use crate::mode::Mode;
use crate::stream::Stream;
use std::cell::Cell;
use std::rc::Rc;
use vd_core::{Action, Item, ItemId, Point, Selection, State};

#[derive(Debug, Clone, Copy)]
struct Draft {
    id: ItemId,
    start: Point,
    end: Point,
}

impl Draft {
    fn item(&self) -> Item {
        Item::line_from_points(self.id, self.start, self.end)
    }
}

pub fn draw_line(sources: &Sources) -> Interaction {
    let sinks = Sinks::default();
    let mouse = &sources.mouse;
    let state = sources.state.latest();
    let draft: Rc<Cell<Option<Draft>>> = Rc::default();
    let scope = GestureScope::default();
    let mut subs = Vec::new();

    let arm = Stream::merge(&[
        &sources.menubar.intent("line"),
        &sources.keyboard.shortcut(&["l"]).map_to(()),
    ])
    .gate(&sources.mode, |m| !m.is_gesture());
    subs.push(arm.subscribe({
        let next_mode = sinks.next_mode.clone();
        move |_| next_mode.emit(Mode::LineReady)
    }));

    let drawing_moves = mouse.moves.gate(&sources.mode, |m| *m == Mode::LineDrawing);
    subs.push(
        mouse
            .down
            .gate(&sources.mode, |m| *m == Mode::LineReady)
            .subscribe({
                let (sinks, draft, scope) = (sinks.clone(), draft.clone(), scope.clone());
                move |&start| {
                    let id = state
                        .with(State::next_item_id)
                        .unwrap_or(ItemId::FIRST);
                    let first = Draft {
                        id,
                        start,
                        end: start,
                    };
                    draft.set(Some(first));
                    sinks.drawing_item.emit(Some(first.item()));
                    sinks.next_mode.emit(Mode::LineDrawing);

                    let track = drawing_moves.subscribe({
                        let (draft, drawing_item) = (draft.clone(), sinks.drawing_item.clone());
                        move |&pos| {
                            let Some(current) = draft.get() else {
                                return;
                            };
                            let next = Draft { end: pos, ..current };
                            draft.set(Some(next));
                            log::trace!("draw_line: preview to {pos:?}");
                            drawing_item.emit(Some(next.item()));
                        }
                    });
                    scope.begin(vec![track]);
                }
            }),
    );

    subs.push(
        mouse
            .up
            .gate(&sources.mode, |m| *m == Mode::LineDrawing)
            .subscribe({
                let (sinks, draft, scope) = (sinks.clone(), draft.clone(), scope.clone());
                move |_| {
                    scope.end();
                    let Some(done) = draft.take() else {
                        return;
                    };
                    let item = done.item();
                    let id = item.id;
                    sinks.drawing_item.emit(None);
                    sinks.action.emit(ActionOp::Apply(Action::add_item(item)));
                    sinks.next_mode.emit(Mode::Idle);
                    sinks.change_selection.emit(Selection::select_item(id));
                }
            }),
    );

    subs.push(
        mouse
            .cancel
            .gate(&sources.mode, |m| *m == Mode::LineDrawing)
            .subscribe({
                let (sinks, draft) = (sinks.clone(), draft.clone());
                move |_| {
                    if scope.end() {
                        log::debug!("draw_line: cancelled");
                    }
                    draft.set(None);
                    sinks.drawing_item.emit(None);
                    sinks.next_mode.emit(Mode::Idle);
                }
            }),
    );

    Interaction::new("draw_line", sinks, subs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interaction::testing::{recorder, sources};
    use crate::input::KeyEvent;
    use pretty_assertions::assert_eq;

    #[test]
    fn shortcut_and_menu_arm_the_tool() {
        let src = sources();
        let module = draw_line(&src);
        let p = recorder(&module.sinks);
        src.keyboard.dispatch(&KeyEvent::down("l"));
        src.menubar.invoke("line");
        assert_eq!(*p.modes.borrow(), vec![Mode::LineReady, Mode::LineReady]);
    }

    #[test]
    fn down_is_ignored_unless_ready() {
        let src = sources();
        let module = draw_line(&src);
        let p = recorder(&module.sinks);
        src.mouse.down.emit(Point::ORIGIN);
        assert!(p.modes.borrow().is_empty());
        assert!(p.drawing.borrow().is_empty());
    }

    #[test]
    fn full_gesture_commits_a_line() {
        let src = sources();
        let module = draw_line(&src);
        let p = recorder(&module.sinks);

        src.mode.emit(Mode::LineReady);
        src.mouse.down.emit(Point::new(0.0, 0.0));
        assert_eq!(*p.modes.borrow(), vec![Mode::LineDrawing]);

        src.mode.emit(Mode::LineDrawing);
        src.mouse.moves.emit(Point::new(10.0, 0.0));
        let preview = p.drawing.borrow().last().cloned().flatten();
        assert_eq!(
            preview.map(|i| i.points.to_vec()),
            Some(vec![Point::new(0.0, 0.0), Point::new(10.0, 0.0)])
        );

        src.mouse.up.emit(Point::new(10.0, 0.0));
        assert_eq!(p.modes.borrow().last(), Some(&Mode::Idle));
        assert_eq!(p.selections.borrow().last(), Some(&Selection::select_item(ItemId(1))));
        match p.actions.borrow().as_slice() {
            [ActionOp::Apply(Action::AddItem { item })] => {
                assert_eq!(item.points.len(), 2);
                assert_eq!(item.id, ItemId(1));
            }
            other => panic!("unexpected actions {other:?}"),
        }
        // the gesture released its move listener
        assert_eq!(p.drawing.borrow().last(), Some(&None));
        let previews = p.drawing.borrow().len();
        src.mouse.moves.emit(Point::new(50.0, 50.0));
        assert_eq!(p.drawing.borrow().len(), previews);
    }
}
