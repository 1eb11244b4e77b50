//! Item store: the to-do items keyed by id plus a loading flag

mod action;
mod reducer;
mod state;

pub use action::TodosAction;
pub use reducer::{checked, reduce, reducer};
pub use state::{Entities, LoadingStatus, TodosState};
