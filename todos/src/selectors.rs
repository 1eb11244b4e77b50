//! Memoized views derived from [`AppState`]
//!
//! Every selector owns a [`Memo`]. Inputs produced by reducers through
//! structural sharing (`entities`, the all-items list, the filtered list)
//! are compared by pointer; the filter state is compared by value, with the
//! selected colors treated as a set.

use std::sync::Arc;

use todo_dispatch::{ByRef, ByValue, Memo};

use crate::filters::FiltersState;
use crate::model::Item;
use crate::state::AppState;
use crate::todos::Entities;

/// Shared, ordered list of item handles.
pub type ItemList = Arc<[Arc<Item>]>;

/// Extra arguments accepted by [`TodoSelectors::total_count`].
///
/// They are passed through to the derivation but are not part of its cache
/// key, so changing them never triggers a recompute.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TotalCountArgs {
    pub max: Option<usize>,
}

/// Recomputation counts per selector.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SelectorStats {
    pub all_items: usize,
    pub filtered_items: usize,
    pub filtered_count: usize,
    pub remaining_count: usize,
    pub total_count: usize,
}

type ListKey = (ByRef<[Arc<Item>]>,);

/// The application's selectors and their caches.
#[derive(Debug)]
pub struct TodoSelectors {
    all: Memo<(ByRef<Entities>,), ItemList>,
    filtered: Memo<(ByRef<[Arc<Item>]>, ByValue<FiltersState>), ItemList>,
    filtered_count: Memo<ListKey, usize>,
    remaining: Memo<ListKey, usize>,
    total: Memo<ListKey, usize>,
}

impl Default for TodoSelectors {
    fn default() -> Self {
        Self::new()
    }
}

impl TodoSelectors {
    /// Selectors remembering only their last input.
    pub fn new() -> Self {
        Self::with_capacity(1)
    }

    /// Let `filtered_items` remember up to `capacity` filter combinations.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            all: Memo::new(),
            filtered: Memo::with_capacity(capacity),
            filtered_count: Memo::new(),
            remaining: Memo::new(),
            total: Memo::new(),
        }
    }

    /// Every item, ordered by id.
    pub fn all_items(&mut self, state: &AppState) -> ItemList {
        self.all
            .get((ByRef(Arc::clone(&state.todos.entities)),), |(ByRef(entities),)| {
                tracing::trace!(items = entities.len(), "Recomputing all_items");
                entities.values().cloned().collect()
            })
    }

    /// Items passing the current status and color filters.
    ///
    /// With no filter active this is the [`all_items`](Self::all_items)
    /// list itself.
    pub fn filtered_items(&mut self, state: &AppState) -> ItemList {
        let all = self.all_items(state);
        self.filtered.get(
            (ByRef(all), ByValue(state.filters.normalized())),
            |(ByRef(all), ByValue(filters))| {
                tracing::trace!(?filters, "Recomputing filtered_items");
                if filters.shows_everything() {
                    return Arc::clone(all);
                }
                all.iter()
                    .filter(|item| filters.matches(item))
                    .cloned()
                    .collect()
            },
        )
    }

    pub fn filtered_count(&mut self, state: &AppState) -> usize {
        let filtered = self.filtered_items(state);
        self.filtered_count
            .get((ByRef(filtered),), |(ByRef(items),)| items.len())
    }

    /// Number of items not yet completed.
    pub fn remaining_count(&mut self, state: &AppState) -> usize {
        let all = self.all_items(state);
        self.remaining.get((ByRef(all),), |(ByRef(items),)| {
            items.iter().filter(|item| !item.completed).count()
        })
    }

    /// Number of items. `args` does not affect the result.
    pub fn total_count(&mut self, state: &AppState, args: &TotalCountArgs) -> usize {
        let all = self.all_items(state);
        self.total.get((ByRef(all),), |(ByRef(items),)| {
            tracing::trace!(?args, "Recomputing total_count");
            items.len()
        })
    }

    pub fn stats(&self) -> SelectorStats {
        SelectorStats {
            all_items: self.all.recomputations(),
            filtered_items: self.filtered.recomputations(),
            filtered_count: self.filtered_count.recomputations(),
            remaining_count: self.remaining.recomputations(),
            total_count: self.total.recomputations(),
        }
    }
}
