//! Integration tests: undo/redo through the editor (vd-editor + vd-core).
//!
//! Every gesture and command must land in the history as exactly one
//! reversible step, and undo/redo must bring back both the items and a
//! selection that only names items that still exist.

use pretty_assertions::assert_eq;
use vd_core::{AppConfig, Item, ItemId, Point, Selection, State};
use vd_editor::{Editor, InputEvent, KeyEvent, KeyKind, Modifiers, Resizer};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn editor() -> Editor {
    init_logger();
    let state = State::from_json(include_str!("fixtures/square.json")).unwrap();
    Editor::with_state(AppConfig::default(), state).unwrap()
}

fn send(editor: &mut Editor, events: impl IntoIterator<Item = InputEvent>) {
    for event in events {
        editor.dispatch(event).unwrap();
    }
}

fn draw_line(editor: &mut Editor, from: (f64, f64), to: (f64, f64)) {
    send(
        editor,
        [
            InputEvent::menu("line"),
            InputEvent::pointer_down(from.0, from.1),
            InputEvent::pointer_move(to.0, to.1),
            InputEvent::pointer_up(to.0, to.1),
        ],
    );
}

fn ctrl(key: &str, shift: bool) -> InputEvent {
    InputEvent::Key(KeyEvent::new(
        KeyKind::Down,
        key,
        Modifiers {
            ctrl: true,
            shift,
            ..Modifiers::NONE
        },
    ))
}

fn points(editor: &Editor, id: ItemId) -> Vec<Point> {
    editor
        .state()
        .item(id)
        .map(|item| item.points.to_vec())
        .unwrap_or_default()
}

// ─── Basic undo/redo ────────────────────────────────────────────────────

#[test]
fn undo_then_redo_restores_drawn_line() {
    let mut editor = editor();
    draw_line(&mut editor, (300.0, 300.0), (400.0, 300.0));
    let drawn = editor.state().clone();
    assert_eq!(drawn.len(), 3);

    let update = editor.undo();
    assert!(update.state_changed);
    assert_eq!(editor.state().len(), 2);
    assert!(editor.selection().is_empty());

    editor.redo();
    assert_eq!(*editor.state(), drawn);
}

#[test]
fn undo_at_start_is_a_no_op() {
    let mut editor = editor();
    let before = editor.state().clone();
    let update = editor.undo();
    assert!(!update.state_changed);
    assert_eq!(*editor.state(), before);
    let update = editor.redo();
    assert!(!update.state_changed);
}

#[test]
fn keyboard_and_menu_drive_history() {
    let mut editor = editor();
    draw_line(&mut editor, (300.0, 300.0), (400.0, 300.0));
    draw_line(&mut editor, (300.0, 400.0), (400.0, 400.0));
    assert_eq!(editor.state().len(), 4);

    send(&mut editor, [ctrl("z", false), ctrl("z", false)]);
    assert_eq!(editor.state().len(), 2);
    send(&mut editor, [ctrl("z", true)]);
    assert_eq!(editor.state().len(), 3);
    send(&mut editor, [ctrl("y", false)]);
    assert_eq!(editor.state().len(), 4);
    send(&mut editor, [InputEvent::menu("undo")]);
    assert_eq!(editor.state().len(), 3);
    send(&mut editor, [InputEvent::menu("redo")]);
    assert_eq!(editor.state().len(), 4);
}

#[test]
fn new_action_discards_redo_branch() {
    let mut editor = editor();
    draw_line(&mut editor, (300.0, 300.0), (400.0, 300.0));
    editor.undo();
    assert!(editor.history().can_redo());
    draw_line(&mut editor, (300.0, 500.0), (400.0, 500.0));
    assert!(!editor.history().can_redo());
    assert_eq!(editor.history().list().len(), 1);
}

#[test]
fn clear_history_keeps_document() {
    let mut editor = editor();
    draw_line(&mut editor, (300.0, 300.0), (400.0, 300.0));
    send(&mut editor, [InputEvent::menu("clear-history")]);
    assert_eq!(editor.state().len(), 3);
    assert!(!editor.history().can_undo());
    assert!(!editor.undo().state_changed);
}

// ─── Gestures are single steps ──────────────────────────────────────────

#[test]
fn resize_gesture_is_one_undo_step() {
    let mut editor = editor();
    editor.set_selection(Selection::select_item(ItemId(1)));
    send(
        &mut editor,
        [
            InputEvent::Hover {
                resizer: Some(Resizer::SE),
                vertex_index: None,
            },
            InputEvent::pointer_down(10.0, 10.0),
            InputEvent::pointer_move(12.0, 12.0),
            InputEvent::pointer_move(15.0, 15.0),
            InputEvent::pointer_move(20.0, 20.0),
            InputEvent::pointer_up(20.0, 20.0),
        ],
    );
    assert_eq!(editor.history().list().len(), 1);
    assert_eq!(points(&editor, ItemId(1))[2], Point::new(20.0, 20.0));

    editor.undo();
    assert_eq!(points(&editor, ItemId(1))[2], Point::new(10.0, 10.0));
    assert!(!editor.history().can_undo());
}

#[test]
fn drag_move_is_one_undo_step() {
    let mut editor = editor();
    send(
        &mut editor,
        [
            InputEvent::pointer_down(5.0, 5.0),
            InputEvent::pointer_move(6.0, 5.0),
            InputEvent::pointer_move(8.0, 7.0),
            InputEvent::pointer_move(9.0, 8.0),
            InputEvent::pointer_up(9.0, 8.0),
        ],
    );
    assert_eq!(editor.selection(), &Selection::select_item(ItemId(1)));
    assert_eq!(points(&editor, ItemId(1))[0], Point::new(4.0, 3.0));
    assert_eq!(editor.history().list().len(), 1);

    editor.undo();
    assert_eq!(points(&editor, ItemId(1))[0], Point::ORIGIN);
}

#[test]
fn delete_then_undo_restores_item() {
    let mut editor = editor();
    editor.set_selection(Selection::from_ids([ItemId(1), ItemId(2)]));
    send(&mut editor, [InputEvent::Key(KeyEvent::down("Delete"))]);
    // the locked item survives and stays selected
    assert!(editor.state().item(ItemId(1)).is_none());
    assert_eq!(editor.selection(), &Selection::select_item(ItemId(2)));

    editor.undo();
    let restored: Option<&Item> = editor.state().item(ItemId(1));
    assert_eq!(restored.map(|i| i.points.len()), Some(4));
}

#[test]
fn history_depth_limits_undo() {
    init_logger();
    let config = AppConfig {
        history_depth: Some(2),
        ..AppConfig::default()
    };
    let mut editor = Editor::new(config).unwrap();
    for y in [0.0, 100.0, 200.0] {
        draw_line(&mut editor, (0.0, y), (50.0, y));
    }
    editor.undo();
    editor.undo();
    assert!(!editor.history().can_undo());
    assert_eq!(editor.state().len(), 1);
}
