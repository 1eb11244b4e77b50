//! Application state - both stores side by side

use crate::filters::FiltersState;
use crate::todos::TodosState;

/// Root state. Each field is owned by one slice reducer.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AppState {
    pub todos: TodosState,
    pub filters: FiltersState,
}
