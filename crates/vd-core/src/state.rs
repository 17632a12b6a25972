//! Document state: the set of items, keyed and ordered by id.
//!
//! `State` is a value. Every operation that changes it takes `&self` and
//! returns the next state, so the history can hold on to any state it has
//! produced without fear of it changing underneath.

use crate::geometry::Point;
use crate::id::ItemId;
use crate::model::Item;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "StateRepr", into = "StateRepr")]
pub struct State {
    items: BTreeMap<ItemId, Item>,
}

/// Serialized shape: a flat item list (JSON object keys must be strings).
#[derive(Serialize, Deserialize)]
struct StateRepr {
    items: Vec<Item>,
}

impl From<StateRepr> for State {
    fn from(repr: StateRepr) -> Self {
        State::from_items(repr.items)
    }
}

impl From<State> for StateRepr {
    fn from(state: State) -> Self {
        StateRepr {
            items: state.items.into_values().collect(),
        }
    }
}

impl State {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_items(items: impl IntoIterator<Item = Item>) -> Self {
        Self {
            items: items.into_iter().map(|item| (item.id, item)).collect(),
        }
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn item(&self, id: ItemId) -> Option<&Item> {
        self.items.get(&id)
    }

    /// Items in paint order (ascending id).
    pub fn items(&self) -> impl DoubleEndedIterator<Item = &Item> {
        self.items.values()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Smallest id above every id in use.
    pub fn next_item_id(&self) -> ItemId {
        self.items
            .keys()
            .next_back()
            .map(|id| id.next())
            .unwrap_or(ItemId::FIRST)
    }

    /// Every item whose shape contains `pos`, topmost first.
    pub fn items_at(&self, pos: Point) -> Vec<&Item> {
        self.items
            .values()
            .rev()
            .filter(|item| item.contains_point(pos))
            .collect()
    }

    /// Insert or replace items by id.
    pub fn with_items(&self, items: impl IntoIterator<Item = Item>) -> State {
        let mut next = self.clone();
        for item in items {
            next.items.insert(item.id, item);
        }
        next
    }

    pub fn with_item(&self, item: Item) -> State {
        self.with_items(std::iter::once(item))
    }

    pub fn without_items(&self, ids: impl IntoIterator<Item = ItemId>) -> State {
        let mut next = self.clone();
        for id in ids {
            next.items.remove(&id);
        }
        next
    }

    /// Replace an existing item through `f`. Missing ids leave the state as is.
    pub fn update_item(&self, id: ItemId, f: impl FnOnce(&Item) -> Item) -> State {
        match self.items.get(&id) {
            Some(item) => self.with_item(f(item)),
            None => self.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn line(id: u32, x: f64) -> Item {
        Item::line_from_points(ItemId(id), Point::new(x, 0.0), Point::new(x, 10.0))
    }

    #[test]
    fn next_id_is_monotonic() {
        let s = State::new();
        assert_eq!(s.next_item_id(), ItemId(1));
        let s = s.with_item(line(1, 0.0)).with_item(line(5, 1.0));
        assert_eq!(s.next_item_id(), ItemId(6));
    }

    #[test]
    fn with_and_without_are_values() {
        let base = State::new().with_item(line(1, 0.0));
        let added = base.with_item(line(2, 5.0));
        assert_eq!(base.len(), 1);
        assert_eq!(added.len(), 2);
        assert_eq!(added.without_items([ItemId(2)]), base);
    }

    #[test]
    fn items_at_is_topmost_first() {
        let s = State::from_items([line(1, 0.0), line(2, 0.5)]);
        let hits: Vec<ItemId> = s.items_at(Point::new(0.2, 5.0)).iter().map(|i| i.id).collect();
        assert_eq!(hits, vec![ItemId(2), ItemId(1)]);
    }

    #[test]
    fn update_missing_item_is_noop() {
        let s = State::from_items([line(1, 0.0)]);
        assert_eq!(s.update_item(ItemId(9), |i| i.clone().with_locked(true)), s);
    }

    #[test]
    fn json_roundtrip_keeps_order() {
        let s = State::from_items([line(3, 0.0), line(1, 2.0)]);
        let json = s.to_json().unwrap();
        let back = State::from_json(&json).unwrap();
        assert_eq!(back, s);
        let ids: Vec<ItemId> = back.items().map(|i| i.id).collect();
        assert_eq!(ids, vec![ItemId(1), ItemId(3)]);
    }
}
