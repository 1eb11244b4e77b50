use todo_dispatch::Action;

use crate::model::{Item, ItemId};

/// Actions owned by the item store.
#[derive(Action, Clone, Debug, PartialEq)]
#[action(namespace = "todos")]
pub enum TodosAction {
    /// Insert an item, replacing any item with the same id
    Add(Item),

    /// Flip `completed`. The id must exist.
    ToggleCompleted(ItemId),

    /// Set or clear the color. The id must exist.
    SetColor { id: ItemId, color: Option<String> },

    /// Remove an item if present
    Delete(ItemId),

    #[action(tag = "TODOS_LOADING")]
    BeginLoad,

    /// Replace every item with the fetched list
    #[action(tag = "TODOS_LOADED")]
    FinishLoad(Vec<Item>),
}
