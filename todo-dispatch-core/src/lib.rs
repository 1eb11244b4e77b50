//! Core traits and types for todo-dispatch
//!
//! This crate provides the state layer for applications built on a
//! unidirectional data flow, following a Redux-inspired architecture.
//!
//! # Core Concepts
//!
//! - **Action**: Records that describe state changes, each with a namespaced tag
//! - **Store**: Centralized state container with reducer pattern
//! - **Memo**: Explicit selector caches keyed by dependency values
//! - **Thunk**: Async operations dispatched like actions
//! - **Runtime**: Owns the store, runs the action queue and thunk tasks
//!
//! # Basic Example
//!
//! ```ignore
//! use todo_dispatch_core::prelude::*;
//!
//! #[derive(Action, Clone, Debug)]
//! #[action(namespace = "shelf")]
//! enum ShelfAction {
//!     Add(String),
//! }
//!
//! #[derive(Clone, Default)]
//! struct Shelf {
//!     books: Arc<Vec<String>>,
//! }
//!
//! fn reducer(state: &mut Shelf, action: ShelfAction) -> bool {
//!     match action {
//!         ShelfAction::Add(title) => {
//!             let mut books = (*state.books).clone();
//!             books.push(title);
//!             state.books = Arc::new(books);
//!             true
//!         }
//!     }
//! }
//!
//! let mut store = Store::new(Shelf::default(), reducer);
//! store.dispatch(ShelfAction::Add("Dune".into()));
//! ```
//!
//! # Async Thunk Pattern
//!
//! An operation that needs the network is a [`Thunk`]: it gets a
//! [`ThunkContext`] to dispatch actions and read state, and is handed to the
//! same `dispatch` entry point as plain actions.
//!
//! ```ignore
//! struct LoadShelf { api: Arc<dyn ShelfApi> }
//!
//! impl Thunk<Shelf, ShelfAction> for LoadShelf {
//!     fn name(&self) -> &'static str { "shelf/load" }
//!
//!     fn run(self: Box<Self>, ctx: ThunkContext<Shelf, ShelfAction>) -> BoxFuture<'static, anyhow::Result<()>> {
//!         async move {
//!             ctx.dispatch(ShelfAction::Loading);
//!             let books = self.api.list().await?;
//!             ctx.dispatch(ShelfAction::Loaded(books));
//!             Ok(())
//!         }
//!         .boxed()
//!     }
//! }
//!
//! let mut runtime = Runtime::new(Shelf::default(), reducer);
//! runtime.dispatch(Dispatch::thunk(LoadShelf { api }));
//! runtime.settle().await?;
//! ```

pub mod action;
pub mod runtime;
pub mod select;
pub mod store;
pub mod tasks;
pub mod testing;

// Core trait exports
pub use action::Action;

// Store exports
pub use store::{LoggingMiddleware, Middleware, NoopMiddleware, Reducer, Store, StoreWithMiddleware};

// Selector exports
pub use select::{ByRef, ByValue, CacheKey, Memo};

// Runtime exports
pub use runtime::{Dispatch, DispatchStore, Dispatched, Runtime, Thunk, ThunkContext};

// Task exports
pub use tasks::{TaskKey, TaskManager, ThunkError};

// Testing exports
pub use testing::TestHarness;

/// Boxed future returned by [`Thunk::run`].
pub use futures::future::BoxFuture;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::action::Action;
    pub use crate::runtime::{Dispatch, Dispatched, Runtime, Thunk, ThunkContext};
    pub use crate::select::{ByRef, ByValue, Memo};
    pub use crate::store::{
        LoggingMiddleware, Middleware, NoopMiddleware, Reducer, Store, StoreWithMiddleware,
    };
    pub use crate::tasks::{TaskKey, ThunkError};
    pub use futures::future::BoxFuture;
    pub use futures::FutureExt;
}
