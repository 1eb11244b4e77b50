//! Test utilities for todo-dispatch applications
//!
//! - [`TestHarness`]: owns a state, hands out [`ThunkContext`]s wired to a
//!   captured action channel, and drains what was dispatched
//! - Assertion macros for verifying emitted actions
//!
//! # Example
//!
//! ```ignore
//! use todo_dispatch::testing::TestHarness;
//!
//! let mut harness = TestHarness::<AppState, AppAction>::new(AppState::default());
//!
//! harness.run_thunk(FetchTodos::new(api)).await?;
//!
//! let emitted = harness.drain_emitted();
//! assert_emitted!(emitted, AppAction::Todos(TodosAction::BeginLoad));
//! ```

use tokio::sync::{mpsc, watch};

use crate::runtime::{Thunk, ThunkContext};
use crate::store::Reducer;
use crate::Action;

/// Generic test harness for todo-dispatch applications.
///
/// Provides:
/// - State management with a simple `state` field
/// - Action channel for capturing emitted actions
/// - Helpers for running thunks without a [`Runtime`](crate::Runtime)
pub struct TestHarness<S, A: Action> {
    /// The application state under test
    pub state: S,
    /// Sender for emitting actions
    tx: mpsc::UnboundedSender<A>,
    /// Receiver for draining emitted actions
    rx: mpsc::UnboundedReceiver<A>,
    /// Publishes `state` to thunk contexts
    state_tx: watch::Sender<S>,
}

impl<S: Clone, A: Action> TestHarness<S, A> {
    /// Create a new test harness with the given initial state.
    pub fn new(state: S) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let (state_tx, _) = watch::channel(state.clone());
        Self {
            state,
            tx,
            rx,
            state_tx,
        }
    }

    /// Get a clone of the action sender for passing to handlers.
    pub fn sender(&self) -> mpsc::UnboundedSender<A> {
        self.tx.clone()
    }

    /// Emit an action (simulates what a handler would do).
    pub fn emit(&self, action: A) {
        let _ = self.tx.send(action);
    }

    /// Context whose `state()` returns the harness state as of this call.
    pub fn thunk_context(&self) -> ThunkContext<S, A> {
        self.state_tx.send_replace(self.state.clone());
        ThunkContext::new(self.tx.clone(), self.state_tx.subscribe())
    }

    /// Run a thunk to completion against the harness.
    ///
    /// Actions it dispatches are captured, not reduced.
    pub async fn run_thunk<T: Thunk<S, A>>(&mut self, thunk: T) -> anyhow::Result<()> {
        let ctx = self.thunk_context();
        Box::new(thunk).run(ctx).await
    }

    /// Drain all emitted actions from the channel.
    pub fn drain_emitted(&mut self) -> Vec<A> {
        let mut actions = Vec::new();
        while let Ok(action) = self.rx.try_recv() {
            actions.push(action);
        }
        actions
    }

    /// Check if any actions were emitted.
    pub fn has_emitted(&mut self) -> bool {
        !self.drain_emitted().is_empty()
    }

    /// Drain emitted actions and reduce them into `state`.
    ///
    /// Returns the drained actions.
    pub fn apply_emitted(&mut self, reducer: Reducer<S, A>) -> Vec<A> {
        let actions = self.drain_emitted();
        for action in &actions {
            reducer(&mut self.state, action.clone());
        }
        actions
    }
}

impl<S: Clone + Default, A: Action> Default for TestHarness<S, A> {
    fn default() -> Self {
        Self::new(S::default())
    }
}

/// Assert that a specific action was emitted.
///
/// # Example
///
/// ```ignore
/// use todo_dispatch::testing::assert_emitted;
///
/// let actions = harness.drain_emitted();
/// assert_emitted!(actions, TodosAction::BeginLoad);
/// assert_emitted!(actions, TodosAction::Add(item) if item.text == "milk");
/// ```
#[macro_export]
macro_rules! assert_emitted {
    ($actions:expr, $pattern:pat $(if $guard:expr)?) => {
        assert!(
            $actions.iter().any(|a| matches!(a, $pattern $(if $guard)?)),
            "Expected action matching `{}` to be emitted, but got: {:?}",
            stringify!($pattern),
            $actions
        );
    };
}

/// Assert that a specific action was NOT emitted.
///
/// # Example
///
/// ```ignore
/// use todo_dispatch::testing::assert_not_emitted;
///
/// let actions = harness.drain_emitted();
/// assert_not_emitted!(actions, TodosAction::FinishLoad(_));
/// ```
#[macro_export]
macro_rules! assert_not_emitted {
    ($actions:expr, $pattern:pat $(if $guard:expr)?) => {
        assert!(
            !$actions.iter().any(|a| matches!(a, $pattern $(if $guard)?)),
            "Expected action matching `{}` NOT to be emitted, but it was: {:?}",
            stringify!($pattern),
            $actions
        );
    };
}

/// Find and return the first action matching a pattern.
///
/// # Example
///
/// ```ignore
/// use todo_dispatch::testing::find_emitted;
///
/// let actions = harness.drain_emitted();
/// if let Some(TodosAction::FinishLoad(items)) = find_emitted!(actions, TodosAction::FinishLoad(_)) {
///     assert_eq!(items.len(), 3);
/// }
/// ```
#[macro_export]
macro_rules! find_emitted {
    ($actions:expr, $pattern:pat $(if $guard:expr)?) => {
        $actions.iter().find(|a| matches!(a, $pattern $(if $guard)?))
    };
}

/// Count how many actions match a pattern.
///
/// # Example
///
/// ```ignore
/// use todo_dispatch::testing::count_emitted;
///
/// let actions = harness.drain_emitted();
/// assert_eq!(count_emitted!(actions, TodosAction::BeginLoad), 1);
/// ```
#[macro_export]
macro_rules! count_emitted {
    ($actions:expr, $pattern:pat $(if $guard:expr)?) => {
        $actions.iter().filter(|a| matches!(a, $pattern $(if $guard)?)).count()
    };
}
