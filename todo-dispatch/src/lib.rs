//! todo-dispatch: Centralized state management with memoized selectors
//!
//! Like Redux, in Rust. Views are derived from state through memoized
//! selectors, and all state changes happen through dispatched actions or
//! async thunks.
//!
//! # Example
//! ```ignore
//! use todo_dispatch::prelude::*;
//!
//! #[derive(Action, Clone, Debug)]
//! #[action(namespace = "todos")]
//! enum TodosAction {
//!     ToggleCompleted(u64),   // tag: "todos/TOGGLE_COMPLETED"
//!     #[action(tag = "TODOS_LOADING")]
//!     BeginLoad,              // tag: "todos/TODOS_LOADING"
//! }
//! ```

// Re-export everything from core
pub use todo_dispatch_core::*;

// Re-export derive macros
pub use todo_dispatch_macros::Action;

/// Prelude for convenient imports
pub mod prelude {
    pub use todo_dispatch_core::prelude::*;

    // Derive macros
    pub use todo_dispatch_macros::Action;
}
