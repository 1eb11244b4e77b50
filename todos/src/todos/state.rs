use std::collections::BTreeMap;
use std::sync::Arc;

use crate::error::TodoError;
use crate::model::{Item, ItemId};

/// Items by id. Values are shared with previous versions of the map.
pub type Entities = BTreeMap<ItemId, Arc<Item>>;

/// Coarse status of the item list.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LoadingStatus {
    #[default]
    Idle,
    Loading,
}

/// State of the item store.
///
/// `entities` is replaced with a new `Arc` on every change, so holders of
/// the old map keep seeing the old items.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TodosState {
    pub status: LoadingStatus,
    pub entities: Arc<Entities>,
}

impl TodosState {
    /// State holding `items`, idle.
    pub fn with_items(items: impl IntoIterator<Item = Item>) -> Self {
        Self {
            status: LoadingStatus::Idle,
            entities: Arc::new(
                items
                    .into_iter()
                    .map(|item| (item.id, Arc::new(item)))
                    .collect(),
            ),
        }
    }

    pub fn get(&self, id: ItemId) -> Option<&Item> {
        self.entities.get(&id).map(|item| item.as_ref())
    }

    /// Look up an item that must exist.
    pub fn require(&self, id: ItemId) -> Result<&Item, TodoError> {
        self.get(id).ok_or(TodoError::MissingTodo(id))
    }

    pub fn contains(&self, id: ItemId) -> bool {
        self.entities.contains_key(&id)
    }

    pub fn is_loading(&self) -> bool {
        self.status == LoadingStatus::Loading
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}
