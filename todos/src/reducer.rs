//! Root reducer

use crate::action::AppAction;
use crate::state::AppState;
use crate::{filters, todos};

/// Route an action to the slice that owns it.
///
/// The other slice is never touched, so its pointers stay the same.
pub fn reducer(state: &mut AppState, action: AppAction) -> bool {
    match action {
        AppAction::Todos(action) => todos::reducer(&mut state.todos, action),
        AppAction::Filters(action) => filters::reducer(&mut state.filters, action),
    }
}

/// Pure form of [`reducer`].
pub fn reduce(state: &AppState, action: AppAction) -> AppState {
    let mut next = state.clone();
    reducer(&mut next, action);
    next
}
