//! Filter store: which items the list shows

mod action;
mod reducer;
mod state;

pub use action::{ColorChange, FiltersAction};
pub use reducer::{reduce, reducer};
pub use state::{FiltersState, StatusFilter};
