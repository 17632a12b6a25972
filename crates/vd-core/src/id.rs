use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of an item in the document.
///
/// Ids are allocated monotonically by [`crate::State::next_item_id`], so a
/// freshly drawn item never collides with an existing one.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub u32);

impl ItemId {
    pub const FIRST: ItemId = ItemId(1);

    pub fn next(self) -> ItemId {
        ItemId(self.0 + 1)
    }
}

impl fmt::Debug for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}
