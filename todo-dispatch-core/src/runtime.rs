//! Runtime: the single dispatch entry point for actions and thunks.
//!
//! The runtime owns the store. Plain actions are reduced synchronously on the
//! caller's task. Thunks are spawned as tokio tasks; they dispatch by sending
//! actions back through a channel and read state from a `watch` snapshot that
//! the runtime republishes after every change.
//!
//! # Example
//!
//! ```ignore
//! let mut runtime = Runtime::new(AppState::default(), reducer);
//!
//! // Plain action: reduced immediately
//! runtime.dispatch(AppAction::from(FiltersAction::SetStatus(StatusFilter::Active)));
//!
//! // Thunk: spawned, its actions are applied while settling
//! runtime.dispatch(FetchTodos::new(api.clone()));
//! runtime.settle().await?;
//! ```

use std::marker::PhantomData;

use futures::future::BoxFuture;
use tokio::sync::{mpsc, watch};

use crate::store::{Middleware, Reducer, Store, StoreWithMiddleware};
use crate::tasks::{TaskKey, TaskManager, ThunkError};
use crate::Action;

/// Store interface used by [`Runtime`].
pub trait DispatchStore<S, A: Action> {
    /// Dispatch an action and return whether the state changed.
    fn dispatch(&mut self, action: A) -> bool;
    /// Get the current state.
    fn state(&self) -> &S;
}

impl<S, A: Action> DispatchStore<S, A> for Store<S, A> {
    fn dispatch(&mut self, action: A) -> bool {
        Store::dispatch(self, action)
    }

    fn state(&self) -> &S {
        Store::state(self)
    }
}

impl<S, A: Action, M: Middleware<A>> DispatchStore<S, A> for StoreWithMiddleware<S, A, M> {
    fn dispatch(&mut self, action: A) -> bool {
        StoreWithMiddleware::dispatch(self, action)
    }

    fn state(&self) -> &S {
        StoreWithMiddleware::state(self)
    }
}

/// Handle given to a running thunk: dispatch actions and read state.
pub struct ThunkContext<S, A> {
    action_tx: mpsc::UnboundedSender<A>,
    state_rx: watch::Receiver<S>,
}

impl<S, A> Clone for ThunkContext<S, A> {
    fn clone(&self) -> Self {
        Self {
            action_tx: self.action_tx.clone(),
            state_rx: self.state_rx.clone(),
        }
    }
}

impl<S: Clone, A: Action> ThunkContext<S, A> {
    /// Create a context from an action sender and a state subscription.
    pub fn new(action_tx: mpsc::UnboundedSender<A>, state_rx: watch::Receiver<S>) -> Self {
        Self {
            action_tx,
            state_rx,
        }
    }

    /// Queue an action for the runtime.
    ///
    /// The action is reduced when the runtime next processes its queue, so
    /// [`state`](Self::state) does not reflect it immediately.
    pub fn dispatch(&self, action: A) {
        // Receiver gone means the runtime shut down
        let _ = self.action_tx.send(action);
    }

    /// Snapshot of the most recently published state.
    pub fn state(&self) -> S {
        self.state_rx.borrow().clone()
    }
}

/// An asynchronous operation dispatched like an action.
///
/// Errors returned from [`run`](Self::run) are not handled by the thunk's
/// own dispatch flow; they surface from [`Runtime::settle`].
pub trait Thunk<S, A>: Send + 'static {
    /// Name used for logging and for generated task keys.
    fn name(&self) -> &'static str;

    /// Exclusive key. While a task under this key is in flight, further
    /// dispatches of a thunk with the same key are dropped.
    /// `None` (the default) runs every dispatch.
    fn key(&self) -> Option<TaskKey> {
        None
    }

    /// Run the operation.
    fn run(self: Box<Self>, ctx: ThunkContext<S, A>) -> BoxFuture<'static, anyhow::Result<()>>;
}

/// Anything the runtime accepts: a plain action or a thunk.
pub enum Dispatch<S, A> {
    Action(A),
    Thunk(Box<dyn Thunk<S, A>>),
}

impl<S, A> Dispatch<S, A> {
    /// Wrap a thunk.
    pub fn thunk<T: Thunk<S, A>>(thunk: T) -> Self {
        Dispatch::Thunk(Box::new(thunk))
    }
}

impl<S, A: Action> From<A> for Dispatch<S, A> {
    fn from(action: A) -> Self {
        Dispatch::Action(action)
    }
}

/// What happened to a dispatched item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatched {
    /// The action was reduced; `true` if the state changed.
    Applied(bool),
    /// The thunk was spawned under this key.
    Spawned(TaskKey),
    /// The thunk was dropped because a task with this key is in flight.
    Deduplicated(TaskKey),
}

impl Dispatched {
    /// Whether a reduced action changed the state.
    pub fn changed(&self) -> bool {
        matches!(self, Dispatched::Applied(true))
    }
}

/// Owns a store and runs the action queue and thunk tasks around it.
pub struct Runtime<S, A: Action, St: DispatchStore<S, A> = Store<S, A>> {
    store: St,
    action_tx: mpsc::UnboundedSender<A>,
    action_rx: mpsc::UnboundedReceiver<A>,
    state_tx: watch::Sender<S>,
    tasks: TaskManager,
    failure: Option<ThunkError>,
    _action: PhantomData<A>,
}

impl<S, A> Runtime<S, A, Store<S, A>>
where
    S: Clone + Send + Sync + 'static,
    A: Action,
{
    /// Create a runtime from state + reducer.
    pub fn new(state: S, reducer: Reducer<S, A>) -> Self {
        Self::from_store(Store::new(state, reducer))
    }
}

impl<S, A, St> Runtime<S, A, St>
where
    S: Clone + Send + Sync + 'static,
    A: Action,
    St: DispatchStore<S, A>,
{
    /// Create a runtime from an existing store.
    pub fn from_store(store: St) -> Self {
        let (action_tx, action_rx) = mpsc::unbounded_channel();
        let (state_tx, _) = watch::channel(store.state().clone());
        Self {
            store,
            action_tx,
            action_rx,
            state_tx,
            tasks: TaskManager::new(),
            failure: None,
            _action: PhantomData,
        }
    }

    /// Dispatch an action or a thunk.
    pub fn dispatch(&mut self, item: impl Into<Dispatch<S, A>>) -> Dispatched {
        match item.into() {
            Dispatch::Action(action) => Dispatched::Applied(self.apply(action)),
            Dispatch::Thunk(thunk) => self.spawn_thunk(thunk),
        }
    }

    fn apply(&mut self, action: A) -> bool {
        let changed = self.store.dispatch(action);
        if changed {
            self.state_tx.send_replace(self.store.state().clone());
        }
        changed
    }

    fn spawn_thunk(&mut self, thunk: Box<dyn Thunk<S, A>>) -> Dispatched {
        let name = thunk.name();
        let ctx = ThunkContext::new(self.action_tx.clone(), self.state_tx.subscribe());

        match thunk.key() {
            Some(key) if self.tasks.is_running(&key) => {
                tracing::debug!(thunk = name, task = %key, "Thunk already in flight, dropped");
                Dispatched::Deduplicated(key)
            }
            Some(key) => {
                self.tasks.spawn_exclusive(key.clone(), thunk.run(ctx));
                tracing::debug!(thunk = name, task = %key, "Thunk spawned");
                Dispatched::Spawned(key)
            }
            None => {
                let key = self.tasks.spawn(name, thunk.run(ctx));
                tracing::debug!(thunk = name, task = %key, "Thunk spawned");
                Dispatched::Spawned(key)
            }
        }
    }

    /// Send an action into the runtime queue.
    pub fn enqueue(&self, action: A) {
        let _ = self.action_tx.send(action);
    }

    /// Clone the action sender.
    pub fn action_tx(&self) -> mpsc::UnboundedSender<A> {
        self.action_tx.clone()
    }

    /// Access the current state.
    pub fn state(&self) -> &S {
        self.store.state()
    }

    /// Subscribe to state snapshots, republished after every change.
    pub fn subscribe(&self) -> watch::Receiver<S> {
        self.state_tx.subscribe()
    }

    /// Access the task manager.
    pub fn tasks(&self) -> &TaskManager {
        &self.tasks
    }

    /// Reduce every action already queued and collect finished thunks.
    /// Returns how many actions changed the state.
    ///
    /// Failures of collected thunks are logged here and returned by the next
    /// [`settle`](Self::settle).
    pub fn process_pending(&mut self) -> usize {
        self.drain(&mut |_: &S| {})
    }

    fn drain<F: FnMut(&S)>(&mut self, on_change: &mut F) -> usize {
        let mut changed = 0;
        while let Ok(action) = self.action_rx.try_recv() {
            if self.apply(action) {
                on_change(self.store.state());
                changed += 1;
            }
        }
        while let Some((key, outcome)) = self.tasks.try_join_next() {
            self.record(key, outcome);
        }
        changed
    }

    fn record(&mut self, key: TaskKey, outcome: Result<(), ThunkError>) {
        if let Err(err) = outcome {
            tracing::error!(task = %key, error = %err, "Thunk failed");
            self.failure.get_or_insert(err);
        }
    }

    /// Process queued actions until every thunk has finished.
    ///
    /// Failures are logged as they arrive; the first one is returned once the
    /// runtime is idle.
    pub async fn settle(&mut self) -> Result<(), ThunkError> {
        self.settle_with(|_| {}).await
    }

    /// Like [`settle`](Self::settle), calling `on_change` with the new state
    /// after every action that changed it.
    pub async fn settle_with<F>(&mut self, mut on_change: F) -> Result<(), ThunkError>
    where
        F: FnMut(&S),
    {
        loop {
            self.drain(&mut on_change);
            if self.tasks.is_empty() {
                break;
            }

            tokio::select! {
                Some(action) = self.action_rx.recv() => {
                    if self.apply(action) {
                        on_change(self.store.state());
                    }
                }
                Some((key, outcome)) = self.tasks.join_next() => {
                    self.record(key, outcome);
                }
                else => break,
            }
        }

        // Actions sent right before a task finished
        self.drain(&mut on_change);

        match self.failure.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Cancel one in-flight thunk. Its outcome is never reported.
    pub fn cancel(&mut self, key: &TaskKey) {
        self.tasks.cancel(key);
    }

    /// Cancel every in-flight thunk.
    pub fn shutdown(&mut self) {
        self.tasks.cancel_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::NoopMiddleware;
    use futures::FutureExt;
    use std::sync::Arc;
    use tokio::sync::oneshot;

    #[derive(Clone, Debug, Default, PartialEq)]
    struct Feed {
        loading: bool,
        posts: Arc<Vec<String>>,
    }

    #[derive(Clone, Debug, PartialEq)]
    enum FeedAction {
        Loading,
        Loaded(Vec<String>),
        Post(String),
    }

    impl Action for FeedAction {
        fn name(&self) -> &'static str {
            match self {
                FeedAction::Loading => "Loading",
                FeedAction::Loaded(_) => "Loaded",
                FeedAction::Post(_) => "Post",
            }
        }
    }

    fn feed_reducer(state: &mut Feed, action: FeedAction) -> bool {
        match action {
            FeedAction::Loading if state.loading => false,
            FeedAction::Loading => {
                state.loading = true;
                true
            }
            FeedAction::Loaded(posts) => {
                state.loading = false;
                state.posts = Arc::new(posts);
                true
            }
            FeedAction::Post(post) => {
                let mut posts = (*state.posts).clone();
                posts.push(post);
                state.posts = Arc::new(posts);
                true
            }
        }
    }

    /// Loads posts once the gate opens.
    struct LoadFeed {
        gate: Option<oneshot::Receiver<Vec<String>>>,
    }

    impl Thunk<Feed, FeedAction> for LoadFeed {
        fn name(&self) -> &'static str {
            "feed/load"
        }

        fn key(&self) -> Option<TaskKey> {
            Some(TaskKey::new("feed/load"))
        }

        fn run(
            self: Box<Self>,
            ctx: ThunkContext<Feed, FeedAction>,
        ) -> BoxFuture<'static, anyhow::Result<()>> {
            async move {
                ctx.dispatch(FeedAction::Loading);
                let gate = self.gate.ok_or_else(|| anyhow::anyhow!("no gate"))?;
                let posts = gate.await?;
                ctx.dispatch(FeedAction::Loaded(posts));
                Ok::<(), anyhow::Error>(())
            }
            .boxed()
        }
    }

    struct Failing;

    impl Thunk<Feed, FeedAction> for Failing {
        fn name(&self) -> &'static str {
            "feed/failing"
        }

        fn run(
            self: Box<Self>,
            _ctx: ThunkContext<Feed, FeedAction>,
        ) -> BoxFuture<'static, anyhow::Result<()>> {
            async { Err::<(), _>(anyhow::anyhow!("network down")) }.boxed()
        }
    }

    #[test]
    fn test_dispatch_action_applies_immediately() {
        let mut runtime = Runtime::new(Feed::default(), feed_reducer);

        assert_eq!(
            runtime.dispatch(FeedAction::Post("hello".into())),
            Dispatched::Applied(true)
        );
        assert_eq!(*runtime.state().posts, vec!["hello"]);

        runtime.dispatch(FeedAction::Loading);
        assert!(!runtime.dispatch(FeedAction::Loading).changed());
    }

    #[test]
    fn test_subscribe_sees_changes_only() {
        let mut runtime = Runtime::new(Feed::default(), feed_reducer);
        let mut rx = runtime.subscribe();

        runtime.dispatch(FeedAction::Loading);
        assert!(rx.has_changed().unwrap_or(false));
        assert!(rx.borrow_and_update().loading);

        runtime.dispatch(FeedAction::Loading);
        assert!(!rx.has_changed().unwrap_or(true));
    }

    #[tokio::test]
    async fn test_thunk_actions_are_applied_on_settle() {
        let mut runtime = Runtime::new(Feed::default(), feed_reducer);
        let (tx, gate) = oneshot::channel();

        let outcome = runtime.dispatch(Dispatch::thunk(LoadFeed { gate: Some(gate) }));
        assert_eq!(outcome, Dispatched::Spawned(TaskKey::new("feed/load")));

        let _ = tx.send(vec!["a".to_string(), "b".to_string()]);
        runtime.settle().await.expect("settle");

        assert!(!runtime.state().loading);
        assert_eq!(*runtime.state().posts, vec!["a", "b"]);
        assert!(runtime.tasks().is_empty());
    }

    #[tokio::test]
    async fn test_keyed_thunk_is_deduplicated_while_in_flight() {
        let mut runtime = Runtime::new(Feed::default(), feed_reducer);
        let (tx, gate) = oneshot::channel();

        runtime.dispatch(Dispatch::thunk(LoadFeed { gate: Some(gate) }));
        let second = runtime.dispatch(Dispatch::thunk(LoadFeed { gate: None }));
        assert_eq!(second, Dispatched::Deduplicated(TaskKey::new("feed/load")));

        let _ = tx.send(vec!["only".to_string()]);
        runtime.settle().await.expect("settle");
        assert_eq!(*runtime.state().posts, vec!["only"]);
    }

    #[tokio::test]
    async fn test_other_dispatches_interleave_with_thunk() {
        let mut runtime = Runtime::new(Feed::default(), feed_reducer);
        let (tx, gate) = oneshot::channel();

        runtime.dispatch(Dispatch::thunk(LoadFeed { gate: Some(gate) }));
        runtime.dispatch(FeedAction::Post("typed while loading".into()));
        assert_eq!(runtime.state().posts.len(), 1);

        let _ = tx.send(vec!["fresh".to_string()]);
        runtime.settle().await.expect("settle");
        assert_eq!(*runtime.state().posts, vec!["fresh"]);
    }

    #[tokio::test]
    async fn test_settle_surfaces_failure() {
        let mut runtime = Runtime::new(Feed::default(), feed_reducer);

        runtime.dispatch(Dispatch::thunk(Failing));
        let err = runtime.settle().await.expect_err("should fail");
        assert_eq!(err.to_string(), "network down");
        assert!(runtime.tasks().is_empty());
    }

    #[tokio::test]
    async fn test_enqueue_and_process_pending() {
        let mut runtime = Runtime::new(Feed::default(), feed_reducer);

        runtime.enqueue(FeedAction::Loading);
        runtime.action_tx().send(FeedAction::Loading).expect("open");
        assert_eq!(runtime.process_pending(), 1);
        assert!(runtime.state().loading);
    }

    async fn wait_for_tasks<S, A: Action, St: DispatchStore<S, A>>(runtime: &Runtime<S, A, St>)
    where
        S: Clone + Send + Sync + 'static,
    {
        while runtime.tasks().running_keys().next().is_some() {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test]
    async fn test_finished_keyed_thunk_allows_redispatch_without_settle() {
        let mut runtime = Runtime::new(Feed::default(), feed_reducer);
        let (tx, gate) = oneshot::channel();
        let _ = tx.send(vec!["first".to_string()]);

        runtime.dispatch(Dispatch::thunk(LoadFeed { gate: Some(gate) }));
        wait_for_tasks(&runtime).await;
        runtime.process_pending();
        assert!(!runtime.state().loading);
        assert_eq!(*runtime.state().posts, vec!["first"]);
        assert!(runtime.tasks().is_empty());

        let (tx, gate) = oneshot::channel();
        let again = runtime.dispatch(Dispatch::thunk(LoadFeed { gate: Some(gate) }));
        assert_eq!(again, Dispatched::Spawned(TaskKey::new("feed/load")));

        let _ = tx.send(vec!["second".to_string()]);
        runtime.settle().await.expect("settle");
        assert_eq!(*runtime.state().posts, vec!["second"]);
    }

    #[tokio::test]
    async fn test_finished_keyed_thunk_allows_redispatch_before_collection() {
        let mut runtime = Runtime::new(Feed::default(), feed_reducer);
        let (tx, gate) = oneshot::channel();
        let _ = tx.send(vec!["first".to_string()]);

        runtime.dispatch(Dispatch::thunk(LoadFeed { gate: Some(gate) }));
        wait_for_tasks(&runtime).await;

        let (tx, gate) = oneshot::channel();
        let again = runtime.dispatch(Dispatch::thunk(LoadFeed { gate: Some(gate) }));
        assert_eq!(again, Dispatched::Spawned(TaskKey::new("feed/load")));
        assert_eq!(runtime.tasks().len(), 2);

        let _ = tx.send(vec!["second".to_string()]);
        runtime.settle().await.expect("settle");
        assert_eq!(*runtime.state().posts, vec!["second"]);
        assert!(runtime.tasks().is_empty());
    }

    #[tokio::test]
    async fn test_failure_collected_by_process_pending_surfaces_on_settle() {
        let mut runtime = Runtime::new(Feed::default(), feed_reducer);

        runtime.dispatch(Dispatch::thunk(Failing));
        wait_for_tasks(&runtime).await;
        runtime.process_pending();
        assert!(runtime.tasks().is_empty());

        let err = runtime.settle().await.expect_err("kept until settle");
        assert_eq!(err.to_string(), "network down");
        runtime.settle().await.expect("reported once");
    }

    #[tokio::test]
    async fn test_settle_with_sees_each_change() {
        let mut runtime = Runtime::new(Feed::default(), feed_reducer);
        let (tx, gate) = oneshot::channel();
        let _ = tx.send(vec!["a".to_string()]);

        runtime.dispatch(Dispatch::thunk(LoadFeed { gate: Some(gate) }));
        let mut seen = Vec::new();
        runtime
            .settle_with(|feed: &Feed| seen.push((feed.loading, feed.posts.len())))
            .await
            .expect("settle");

        assert_eq!(seen, vec![(true, 0), (false, 1)]);
    }

    #[tokio::test]
    async fn test_runtime_over_store_with_middleware() {
        let store = StoreWithMiddleware::new(Feed::default(), feed_reducer, NoopMiddleware);
        let mut runtime: Runtime<Feed, FeedAction, _> = Runtime::from_store(store);
        let (tx, gate) = oneshot::channel();

        runtime.dispatch(FeedAction::Post("local".into()));
        runtime.dispatch(Dispatch::thunk(LoadFeed { gate: Some(gate) }));
        let _ = tx.send(vec!["remote".to_string()]);
        runtime.settle().await.expect("settle");

        assert_eq!(*runtime.state().posts, vec!["remote"]);
        assert!(!runtime.subscribe().borrow().loading);
    }

    #[tokio::test]
    async fn test_cancel_by_key_frees_the_key() {
        let mut runtime = Runtime::new(Feed::default(), feed_reducer);
        let (_tx, gate) = oneshot::channel();

        runtime.dispatch(Dispatch::thunk(LoadFeed { gate: Some(gate) }));
        runtime.cancel(&TaskKey::new("feed/load"));
        assert!(runtime.tasks().is_empty());

        let (tx, gate) = oneshot::channel();
        let again = runtime.dispatch(Dispatch::thunk(LoadFeed { gate: Some(gate) }));
        assert_eq!(again, Dispatched::Spawned(TaskKey::new("feed/load")));
        let _ = tx.send(vec!["after cancel".to_string()]);
        runtime.settle().await.expect("settle");
        assert_eq!(*runtime.state().posts, vec!["after cancel"]);
    }

    #[tokio::test]
    async fn test_shutdown_cancels_thunks() {
        let mut runtime = Runtime::new(Feed::default(), feed_reducer);
        let (_tx, gate) = oneshot::channel();

        runtime.dispatch(Dispatch::thunk(LoadFeed { gate: Some(gate) }));
        assert_eq!(runtime.tasks().len(), 1);

        runtime.shutdown();
        assert!(runtime.tasks().is_empty());
        runtime.settle().await.expect("nothing left to fail");
    }
}
