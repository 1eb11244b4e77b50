//! To-do list built on todo-dispatch
//!
//! Two stores (items and filters) combined under one root reducer, memoized
//! selectors over them, and two thunks that talk to a backend.
//!
//! # Data flow
//!
//! 1. A command becomes an [`AppAction`] or a thunk
//! 2. The [`Runtime`](todo_dispatch::Runtime) reduces actions through
//!    [`reducer`] and spawns thunks
//! 3. Slice reducers swap in new structurally shared values
//! 4. [`TodoSelectors`] recompute only what changed
//! 5. The [`view`] renders the derived lists and counts

pub mod action;
pub mod api;
pub mod config;
pub mod error;
pub mod filters;
pub mod model;
pub mod reducer;
pub mod repl;
pub mod selectors;
pub mod state;
pub mod thunks;
pub mod todos;
pub mod view;

pub use action::AppAction;
pub use api::{FakeServer, HttpApi, TodoApi};
pub use config::{Args, Config};
pub use error::{ApiError, ParseError, TodoError};
pub use model::{Item, ItemId, NewTodo, AVAILABLE_COLORS};
pub use reducer::{reduce, reducer};
pub use selectors::{ItemList, SelectorStats, TodoSelectors, TotalCountArgs};
pub use state::AppState;
pub use thunks::{FetchTodos, SaveNewTodo};
