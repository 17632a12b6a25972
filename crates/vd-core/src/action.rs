//! Reversible document edits.
//!
//! Every `Action` closes over the data needed to go both ways: `next`
//! applies the edit, `prev` undoes it, and `prev(next(s)) == s` holds for
//! every state the action was built against. Geometry-changing actions
//! store whole start and end items rather than deltas, so the inverse is
//! exact instead of subject to float drift.

use crate::geometry::Point;
use crate::id::ItemId;
use crate::model::Item;
use crate::state::State;

/// Which axes a resize gesture is allowed to change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Axes {
    pub h: bool,
    pub v: bool,
}

impl Axes {
    pub const BOTH: Axes = Axes { h: true, v: true };
    pub const HORIZONTAL: Axes = Axes { h: true, v: false };
    pub const VERTICAL: Axes = Axes { h: false, v: true };
}

/// Everything a resize step is computed from.
///
/// `start_pos` is where the grabbed handle sat when the gesture began,
/// `anchor` is the fixed point opposite it, and `moving_pos` is the live
/// cursor. Points scale about `anchor` by the ratio between the cursor's
/// and the handle's offset from it, per active axis.
#[derive(Debug, Clone, PartialEq)]
pub struct ResizeInfo {
    pub start_pos: Point,
    pub moving_pos: Point,
    pub anchor: Point,
    pub axes: Axes,
    pub start_items: Vec<Item>,
}

impl ResizeInfo {
    pub fn scale_factors(&self) -> (f64, f64) {
        let factor = |active: bool, start: f64, moving: f64, anchor: f64| {
            let span = start - anchor;
            if active && span != 0.0 {
                (moving - anchor) / span
            } else {
                1.0
            }
        };
        (
            factor(self.axes.h, self.start_pos.x, self.moving_pos.x, self.anchor.x),
            factor(self.axes.v, self.start_pos.y, self.moving_pos.y, self.anchor.y),
        )
    }

    fn resized_items(&self) -> Vec<Item> {
        let (sx, sy) = self.scale_factors();
        let anchor = self.anchor;
        self.start_items
            .iter()
            .map(|item| {
                item.map_points(|p| {
                    Point::new(
                        anchor.x + (p.x - anchor.x) * sx,
                        anchor.y + (p.y - anchor.y) * sy,
                    )
                })
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    AddItem {
        item: Item,
    },
    RemoveItems {
        items: Vec<Item>,
    },
    MoveItems {
        start_items: Vec<Item>,
        end_items: Vec<Item>,
    },
    ResizeItems {
        info: ResizeInfo,
        end_items: Vec<Item>,
    },
    InsertVertex {
        item_id: ItemId,
        index: usize,
        point: Point,
    },
    SetLocked {
        start_items: Vec<Item>,
        locked: bool,
    },
}

impl Action {
    pub fn add_item(item: Item) -> Self {
        Action::AddItem { item }
    }

    pub fn remove_items(items: Vec<Item>) -> Self {
        Action::RemoveItems { items }
    }

    pub fn move_items(items: Vec<Item>, dx: f64, dy: f64) -> Self {
        let end_items = items.iter().map(|item| item.translated(dx, dy)).collect();
        Action::MoveItems {
            start_items: items,
            end_items,
        }
    }

    pub fn resize(info: ResizeInfo) -> Self {
        let end_items = info.resized_items();
        Action::ResizeItems { info, end_items }
    }

    pub fn insert_vertex(item_id: ItemId, index: usize, point: Point) -> Self {
        Action::InsertVertex {
            item_id,
            index,
            point,
        }
    }

    pub fn set_locked(items: Vec<Item>, locked: bool) -> Self {
        Action::SetLocked {
            start_items: items,
            locked,
        }
    }

    /// Apply forward.
    pub fn next(&self, state: &State) -> State {
        match self {
            Action::AddItem { item } => state.with_item(item.clone()),
            Action::RemoveItems { items } => state.without_items(items.iter().map(|i| i.id)),
            Action::MoveItems { end_items, .. } | Action::ResizeItems { end_items, .. } => {
                state.with_items(end_items.iter().cloned())
            }
            Action::InsertVertex {
                item_id,
                index,
                point,
            } => state.update_item(*item_id, |item| item.with_vertex_inserted(*index, *point)),
            Action::SetLocked {
                start_items,
                locked,
            } => state.with_items(
                start_items
                    .iter()
                    .map(|item| item.clone().with_locked(*locked)),
            ),
        }
    }

    /// Apply the inverse.
    pub fn prev(&self, state: &State) -> State {
        match self {
            Action::AddItem { item } => state.without_items([item.id]),
            Action::RemoveItems { items } => state.with_items(items.iter().cloned()),
            Action::MoveItems { start_items, .. } | Action::SetLocked { start_items, .. } => {
                state.with_items(start_items.iter().cloned())
            }
            Action::ResizeItems { info, .. } => state.with_items(info.start_items.iter().cloned()),
            Action::InsertVertex { item_id, index, .. } => {
                state.update_item(*item_id, |item| item.with_vertex_removed(*index))
            }
        }
    }

    pub fn describe(&self) -> &'static str {
        match self {
            Action::AddItem { .. } => "add item",
            Action::RemoveItems { .. } => "remove items",
            Action::MoveItems { .. } => "move items",
            Action::ResizeItems { .. } => "resize items",
            Action::InsertVertex { .. } => "insert vertex",
            Action::SetLocked { .. } => "set locked",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Rect;
    use pretty_assertions::assert_eq;

    fn square(id: u32) -> Item {
        Item::polygon(
            ItemId(id),
            [
                Point::new(0.0, 0.0),
                Point::new(10.0, 0.0),
                Point::new(10.0, 10.0),
                Point::new(0.0, 10.0),
            ],
        )
    }

    fn base() -> State {
        State::from_items([
            square(1),
            Item::line_from_points(ItemId(2), Point::new(20.0, 0.0), Point::new(30.0, 5.0)),
        ])
    }

    fn all_actions() -> Vec<Action> {
        let s = base();
        let sq = s.item(ItemId(1)).cloned().unwrap();
        let line = s.item(ItemId(2)).cloned().unwrap();
        vec![
            Action::add_item(Item::line_from_points(
                s.next_item_id(),
                Point::ORIGIN,
                Point::new(3.0, 3.0),
            )),
            Action::remove_items(vec![line.clone()]),
            Action::move_items(vec![sq.clone(), line.clone()], 0.1, -7.3),
            Action::resize(ResizeInfo {
                start_pos: Point::new(10.0, 10.0),
                moving_pos: Point::new(13.7, 21.1),
                anchor: Point::ORIGIN,
                axes: Axes::BOTH,
                start_items: vec![sq.clone()],
            }),
            Action::insert_vertex(ItemId(1), 1, Point::new(5.0, -1.0)),
            Action::set_locked(vec![sq, line], true),
        ]
    }

    #[test]
    fn prev_inverts_next() {
        let s = base();
        for action in all_actions() {
            let forward = action.next(&s);
            assert_ne!(forward, s, "{} should change the state", action.describe());
            assert_eq!(action.prev(&forward), s, "{} is not invertible", action.describe());
        }
    }

    #[test]
    fn resize_scales_about_anchor() {
        let action = Action::resize(ResizeInfo {
            start_pos: Point::new(10.0, 10.0),
            moving_pos: Point::new(20.0, 20.0),
            anchor: Point::ORIGIN,
            axes: Axes::BOTH,
            start_items: vec![square(1)],
        });
        let next = action.next(&base());
        let bbox = next.item(ItemId(1)).and_then(Item::bbox);
        assert_eq!(bbox, Some(Rect::new(0.0, 0.0, 20.0, 20.0)));
    }

    #[test]
    fn horizontal_resize_keeps_vertical_extent() {
        let action = Action::resize(ResizeInfo {
            // e-resize: the non-moving axis of the handle position is zeroed
            start_pos: Point::new(10.0, 0.0),
            moving_pos: Point::new(25.0, 99.0),
            anchor: Point::new(0.0, 0.0),
            axes: Axes::HORIZONTAL,
            start_items: vec![square(1)],
        });
        let bbox = action.next(&base()).item(ItemId(1)).and_then(Item::bbox);
        assert_eq!(bbox, Some(Rect::new(0.0, 0.0, 25.0, 10.0)));
    }

    #[test]
    fn degenerate_span_does_not_divide_by_zero() {
        let info = ResizeInfo {
            start_pos: Point::new(5.0, 5.0),
            moving_pos: Point::new(9.0, 9.0),
            anchor: Point::new(5.0, 0.0),
            axes: Axes::BOTH,
            start_items: vec![],
        };
        assert_eq!(info.scale_factors(), (1.0, 1.8));
    }
}
