use crate::geometry::{Point, Rect};
use crate::id::ItemId;
use crate::model::Item;
use crate::state::State;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// The set of selected item ids.
///
/// Selection lives outside the history: it references items by id and is
/// resolved against whichever state is current.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    ids: BTreeSet<ItemId>,
}

impl Selection {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn select_item(id: ItemId) -> Self {
        Self {
            ids: BTreeSet::from([id]),
        }
    }

    pub fn from_ids(ids: impl IntoIterator<Item = ItemId>) -> Self {
        Self {
            ids: ids.into_iter().collect(),
        }
    }

    pub fn ids(&self) -> impl Iterator<Item = ItemId> + '_ {
        self.ids.iter().copied()
    }

    pub fn contains(&self, id: ItemId) -> bool {
        self.ids.contains(&id)
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn toggle(&self, id: ItemId) -> Selection {
        let mut next = self.clone();
        if !next.ids.remove(&id) {
            next.ids.insert(id);
        }
        next
    }

    /// Selected items that exist in `state`, in id order.
    pub fn items<'s>(&self, state: &'s State) -> Vec<&'s Item> {
        self.ids.iter().filter_map(|id| state.item(*id)).collect()
    }

    /// Selected items that gestures may edit (exist and are unlocked).
    pub fn editable_items<'s>(&self, state: &'s State) -> Vec<&'s Item> {
        self.items(state)
            .into_iter()
            .filter(|item| !item.locked)
            .collect()
    }

    /// The single selected item, when exactly one selected id resolves.
    pub fn sitem<'s>(&self, state: &'s State) -> Option<&'s Item> {
        let items = self.items(state);
        match items.len() {
            1 => Some(items[0]),
            _ => None,
        }
    }

    /// Vertices of the single selected item, or an empty list.
    pub fn vertices(&self, state: &State) -> Vec<Point> {
        self.sitem(state)
            .map(|item| item.points.to_vec())
            .unwrap_or_default()
    }

    /// Bounding box of the resizable (unlocked) selected items.
    ///
    /// `None` when nothing is selected or nothing selected is resizable.
    pub fn get_bbox(&self, state: &State) -> Option<Rect> {
        self.editable_items(state)
            .iter()
            .filter_map(|item| item.bbox())
            .reduce(|acc, b| acc.union(&b))
    }

    /// Drop ids that no longer resolve in `state`.
    pub fn pruned(&self, state: &State) -> Selection {
        Self {
            ids: self
                .ids
                .iter()
                .copied()
                .filter(|id| state.item(*id).is_some())
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn state() -> State {
        State::from_items([
            Item::polygon(
                ItemId(1),
                [Point::new(0.0, 0.0), Point::new(4.0, 0.0), Point::new(4.0, 4.0)],
            ),
            Item::line_from_points(ItemId(2), Point::new(10.0, 10.0), Point::new(20.0, 12.0)),
            Item::line_from_points(ItemId(3), Point::new(-50.0, 0.0), Point::new(-40.0, 0.0))
                .with_locked(true),
        ])
    }

    #[test]
    fn bbox_spans_editable_items() {
        let sel = Selection::from_ids([ItemId(1), ItemId(2), ItemId(3)]);
        assert_eq!(sel.get_bbox(&state()), Some(Rect::new(0.0, 0.0, 20.0, 12.0)));
    }

    #[test]
    fn bbox_none_when_empty_or_locked() {
        assert_eq!(Selection::empty().get_bbox(&state()), None);
        assert_eq!(Selection::select_item(ItemId(3)).get_bbox(&state()), None);
        assert_eq!(Selection::select_item(ItemId(42)).get_bbox(&state()), None);
    }

    #[test]
    fn sitem_requires_exactly_one() {
        let s = state();
        assert_eq!(Selection::select_item(ItemId(2)).sitem(&s).map(|i| i.id), Some(ItemId(2)));
        assert!(Selection::from_ids([ItemId(1), ItemId(2)]).sitem(&s).is_none());
        assert!(Selection::select_item(ItemId(2)).vertices(&State::new()).is_empty());
    }

    #[test]
    fn toggle_and_prune() {
        let sel = Selection::select_item(ItemId(1)).toggle(ItemId(9));
        assert_eq!(sel.len(), 2);
        assert_eq!(sel.pruned(&state()), Selection::select_item(ItemId(1)));
        assert!(sel.toggle(ItemId(1)).toggle(ItemId(9)).is_empty());
    }
}
