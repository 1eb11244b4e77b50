use std::sync::Arc;

use crate::error::TodoError;
use crate::model::{Item, ItemId};

use super::{Entities, LoadingStatus, TodosAction, TodosState};

/// Item store reducer.
///
/// Returns `true` if the state changed. Changes swap in a new `entities`
/// map that shares every untouched item with the old one.
///
/// # Panics
///
/// `ToggleCompleted` and `SetColor` panic when the id is not in the store.
/// Use [`checked`] to validate an action first.
pub fn reducer(state: &mut TodosState, action: TodosAction) -> bool {
    match action {
        TodosAction::Add(item) => {
            update_entities(state, |entities| {
                entities.insert(item.id, Arc::new(item));
            });
            true
        }

        TodosAction::ToggleCompleted(id) => {
            let item = existing(state, id);
            let toggled = Item {
                completed: !item.completed,
                ..item.clone()
            };
            update_entities(state, |entities| {
                entities.insert(id, Arc::new(toggled));
            });
            true
        }

        TodosAction::SetColor { id, color } => {
            let item = existing(state, id);
            if item.color == color {
                return false;
            }
            let recolored = Item {
                color,
                ..item.clone()
            };
            update_entities(state, |entities| {
                entities.insert(id, Arc::new(recolored));
            });
            true
        }

        TodosAction::Delete(id) => {
            if !state.entities.contains_key(&id) {
                return false;
            }
            update_entities(state, |entities| {
                entities.remove(&id);
            });
            true
        }

        TodosAction::BeginLoad => {
            if state.status == LoadingStatus::Loading {
                return false;
            }
            state.status = LoadingStatus::Loading;
            true
        }

        TodosAction::FinishLoad(items) => {
            state.status = LoadingStatus::Idle;
            // Later duplicates overwrite earlier ones
            state.entities = Arc::new(
                items
                    .into_iter()
                    .map(|item| (item.id, Arc::new(item)))
                    .collect(),
            );
            true
        }
    }
}

/// Pure form of [`reducer`]: the input state is left untouched.
pub fn reduce(state: &TodosState, action: TodosAction) -> TodosState {
    let mut next = state.clone();
    reducer(&mut next, action);
    next
}

/// Return `action` if it is safe to reduce against `state`.
pub fn checked(state: &TodosState, action: TodosAction) -> Result<TodosAction, TodoError> {
    match &action {
        TodosAction::ToggleCompleted(id) | TodosAction::SetColor { id, .. } => {
            state.require(*id)?;
        }
        _ => {}
    }
    Ok(action)
}

fn existing(state: &TodosState, id: ItemId) -> &Item {
    match state.entities.get(&id) {
        Some(item) => item.as_ref(),
        None => panic!("todo {} is not in the store", id),
    }
}

fn update_entities(state: &mut TodosState, change: impl FnOnce(&mut Entities)) {
    let mut entities = (*state.entities).clone();
    change(&mut entities);
    state.entities = Arc::new(entities);
}
