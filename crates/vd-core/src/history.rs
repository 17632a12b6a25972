//! Linear undo/redo log.
//!
//! `AppHistory` is a cursor over a list of actions. `list[..=index]` is the
//! applied prefix, everything after it is the redoable suffix, and `state`
//! is always the result of applying the prefix in order. Undo and redo
//! apply exactly one `prev` / `next` step; the list is never replayed.
//!
//! The "nothing to do" sentinel is `None`: `apply`, `undo` and `redo` of
//! `None` return the log unchanged, which is what `get_last_action` /
//! `get_next_action` hand back at the ends of the log.

use crate::action::Action;
use crate::state::State;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppHistory {
    pub state: State,
    list: Vec<Action>,
    /// Last applied action; `None` when nothing is applied.
    index: Option<usize>,
    /// Oldest entries are dropped beyond this many (`None` = unbounded).
    max_depth: Option<usize>,
}

impl AppHistory {
    pub fn new(state: State) -> Self {
        Self {
            state,
            ..Self::default()
        }
    }

    pub fn with_max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn list(&self) -> &[Action] {
        &self.list
    }

    pub fn index(&self) -> Option<usize> {
        self.index
    }

    /// Length of the applied prefix.
    fn applied(&self) -> usize {
        self.index.map_or(0, |i| i + 1)
    }

    pub fn get_last_action(&self) -> Option<&Action> {
        self.index.and_then(|i| self.list.get(i))
    }

    pub fn get_next_action(&self) -> Option<&Action> {
        self.list.get(self.applied())
    }

    pub fn can_undo(&self) -> bool {
        self.index.is_some()
    }

    pub fn can_redo(&self) -> bool {
        self.get_next_action().is_some()
    }

    /// Apply a new action: drop the redo suffix, append, advance.
    pub fn apply(&self, action: Option<Action>) -> AppHistory {
        let Some(action) = action else {
            return self.clone();
        };
        log::debug!("history: apply {}", action.describe());
        let mut list = self.list[..self.applied()].to_vec();
        let state = action.next(&self.state);
        list.push(action);
        if let Some(max) = self.max_depth
            && list.len() > max
        {
            let excess = list.len() - max;
            list.drain(..excess);
        }
        AppHistory {
            state,
            index: list.len().checked_sub(1),
            list,
            max_depth: self.max_depth,
        }
    }

    /// Step back over `action`, which must be `get_last_action()`.
    pub fn undo(&self, action: Option<&Action>) -> AppHistory {
        let (Some(action), Some(index)) = (action, self.index) else {
            return self.clone();
        };
        log::debug!("history: undo {}", action.describe());
        AppHistory {
            state: action.prev(&self.state),
            list: self.list.clone(),
            index: index.checked_sub(1),
            max_depth: self.max_depth,
        }
    }

    /// Step forward over `action`, which must be `get_next_action()`.
    pub fn redo(&self, action: Option<&Action>) -> AppHistory {
        let Some(action) = action else {
            return self.clone();
        };
        if !self.can_redo() {
            return self.clone();
        }
        log::debug!("history: redo {}", action.describe());
        AppHistory {
            state: action.next(&self.state),
            list: self.list.clone(),
            index: Some(self.applied()),
            max_depth: self.max_depth,
        }
    }

    /// Forget the action at `index` without touching `state`.
    ///
    /// Used to fold a continuous gesture into one entry: pop the previous
    /// step, then `apply` the next one, which is computed from the same
    /// snapshot.
    pub fn pop(&self) -> AppHistory {
        let Some(index) = self.index else {
            return self.clone();
        };
        let mut list = self.list.clone();
        list.remove(index);
        AppHistory {
            state: self.state.clone(),
            list,
            index: index.checked_sub(1),
            max_depth: self.max_depth,
        }
    }

    pub fn clear_history(&self) -> AppHistory {
        AppHistory {
            state: self.state.clone(),
            list: Vec::new(),
            index: None,
            max_depth: self.max_depth,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point;
    use crate::id::ItemId;
    use crate::model::Item;
    use pretty_assertions::assert_eq;

    fn add(id: u32) -> Action {
        Action::add_item(Item::line_from_points(
            ItemId(id),
            Point::ORIGIN,
            Point::new(id as f64, 0.0),
        ))
    }

    fn undo(h: &AppHistory) -> AppHistory {
        h.undo(h.get_last_action())
    }

    fn redo(h: &AppHistory) -> AppHistory {
        h.redo(h.get_next_action())
    }

    #[test]
    fn apply_advances_index() {
        let h = AppHistory::default().apply(Some(add(1))).apply(Some(add(2)));
        assert_eq!(h.index(), Some(1));
        assert_eq!(h.list().len(), 2);
        assert_eq!(h.state.len(), 2);
        assert!(h.get_next_action().is_none());
    }

    #[test]
    fn undo_then_redo_restores() {
        let h = AppHistory::default().apply(Some(add(1))).apply(Some(add(2)));
        let back = undo(&h);
        assert_eq!(back.index(), Some(0));
        assert_eq!(back.state.len(), 1);
        assert_eq!(redo(&back).state, h.state);
    }

    #[test]
    fn new_apply_truncates_redo() {
        let h = AppHistory::default().apply(Some(add(1))).apply(Some(add(2)));
        let h = undo(&h).apply(Some(add(3)));
        assert_eq!(h.list().len(), 2);
        assert!(h.get_next_action().is_none());
        assert_eq!(redo(&h), h);
        assert!(h.state.item(ItemId(2)).is_none());
    }

    #[test]
    fn sentinel_is_noop_at_both_ends() {
        let empty = AppHistory::default();
        assert_eq!(undo(&empty), empty);
        assert_eq!(redo(&empty), empty);
        assert_eq!(empty.apply(None), empty);
        assert!(empty.get_last_action().is_none());

        let h = empty.apply(Some(add(1)));
        let start = undo(&h);
        assert_eq!(start.index(), None);
        assert_eq!(undo(&start), start);
        assert_eq!(start.state, State::new());
    }

    #[test]
    fn clear_keeps_state() {
        let h = AppHistory::default().apply(Some(add(1))).clear_history();
        assert_eq!(h.index(), None);
        assert!(h.list().is_empty());
        assert_eq!(h.state.len(), 1);
    }

    #[test]
    fn pop_keeps_state_and_drops_entry() {
        let h = AppHistory::default().apply(Some(add(1))).apply(Some(add(2)));
        let popped = h.pop();
        assert_eq!(popped.state, h.state);
        assert_eq!(popped.index(), Some(0));
        assert_eq!(popped.list().len(), 1);
    }

    #[test]
    fn max_depth_trims_oldest() {
        let mut h = AppHistory::default().with_max_depth(Some(3));
        for id in 1..=5 {
            h = h.apply(Some(add(id)));
        }
        assert_eq!(h.list().len(), 3);
        assert_eq!(h.index(), Some(2));
        assert_eq!(h.state.len(), 5);

        let mut undos = 0;
        while h.can_undo() {
            h = undo(&h);
            undos += 1;
        }
        assert_eq!(undos, 3);
        assert_eq!(h.state.len(), 2);
    }

    #[test]
    fn zero_depth_keeps_nothing_undoable() {
        let h = AppHistory::default()
            .with_max_depth(Some(0))
            .apply(Some(add(1)))
            .apply(Some(add(2)));
        assert!(h.list().is_empty());
        assert_eq!(h.index(), None);
        assert!(!h.can_undo());
        assert_eq!(h.state.len(), 2);
    }
}
