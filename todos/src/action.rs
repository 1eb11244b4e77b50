//! Root action routing to the slice that owns it

use todo_dispatch::{Action, Dispatch};

use crate::filters::FiltersAction;
use crate::state::AppState;
use crate::todos::TodosAction;

#[derive(Clone, Debug, PartialEq)]
pub enum AppAction {
    Todos(TodosAction),
    Filters(FiltersAction),
}

impl Action for AppAction {
    fn name(&self) -> &'static str {
        match self {
            AppAction::Todos(action) => action.name(),
            AppAction::Filters(action) => action.name(),
        }
    }

    fn tag(&self) -> &'static str {
        match self {
            AppAction::Todos(action) => action.tag(),
            AppAction::Filters(action) => action.tag(),
        }
    }
}

impl From<TodosAction> for AppAction {
    fn from(action: TodosAction) -> Self {
        AppAction::Todos(action)
    }
}

impl From<FiltersAction> for AppAction {
    fn from(action: FiltersAction) -> Self {
        AppAction::Filters(action)
    }
}

impl From<TodosAction> for Dispatch<AppState, AppAction> {
    fn from(action: TodosAction) -> Self {
        Dispatch::Action(action.into())
    }
}

impl From<FiltersAction> for Dispatch<AppState, AppAction> {
    fn from(action: FiltersAction) -> Self {
        Dispatch::Action(action.into())
    }
}
