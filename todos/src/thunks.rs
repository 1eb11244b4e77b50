//! Async operations against the backend
//!
//! Both thunks let backend errors propagate: the runtime logs them and
//! returns them from `settle`. Nothing is dispatched after a failure, so a
//! failed fetch leaves the item store loading.

use std::sync::Arc;

use futures::future::BoxFuture;
use futures::FutureExt;
use todo_dispatch::{Dispatch, TaskKey, Thunk, ThunkContext};

use crate::action::AppAction;
use crate::api::TodoApi;
use crate::model::NewTodo;
use crate::state::AppState;
use crate::todos::TodosAction;

/// Task key shared by every fetch; a second fetch is dropped while one runs.
pub const FETCH_TODOS_KEY: &str = "todos/fetch";

/// Load every item from the backend.
pub struct FetchTodos {
    api: Arc<dyn TodoApi>,
}

impl FetchTodos {
    pub fn new(api: Arc<dyn TodoApi>) -> Self {
        Self { api }
    }
}

impl Thunk<AppState, AppAction> for FetchTodos {
    fn name(&self) -> &'static str {
        "todos/fetchTodos"
    }

    fn key(&self) -> Option<TaskKey> {
        Some(TaskKey::new(FETCH_TODOS_KEY))
    }

    fn run(
        self: Box<Self>,
        ctx: ThunkContext<AppState, AppAction>,
    ) -> BoxFuture<'static, anyhow::Result<()>> {
        async move {
            ctx.dispatch(TodosAction::BeginLoad.into());
            let items = self.api.list().await?;
            tracing::debug!(count = items.len(), "Todos fetched");
            ctx.dispatch(TodosAction::FinishLoad(items).into());
            Ok::<(), anyhow::Error>(())
        }
        .boxed()
    }
}

/// Create an item on the backend and add what it returns.
pub struct SaveNewTodo {
    api: Arc<dyn TodoApi>,
    text: String,
}

impl SaveNewTodo {
    pub fn new(api: Arc<dyn TodoApi>, text: impl Into<String>) -> Self {
        Self {
            api,
            text: text.into(),
        }
    }
}

impl Thunk<AppState, AppAction> for SaveNewTodo {
    fn name(&self) -> &'static str {
        "todos/saveNewTodo"
    }

    fn run(
        self: Box<Self>,
        ctx: ThunkContext<AppState, AppAction>,
    ) -> BoxFuture<'static, anyhow::Result<()>> {
        async move {
            let SaveNewTodo { api, text } = *self;
            let item = api.create(NewTodo { text }).await?;
            tracing::debug!(id = %item.id, "Todo saved");
            ctx.dispatch(TodosAction::Add(item).into());
            Ok::<(), anyhow::Error>(())
        }
        .boxed()
    }
}

impl From<FetchTodos> for Dispatch<AppState, AppAction> {
    fn from(thunk: FetchTodos) -> Self {
        Dispatch::thunk(thunk)
    }
}

impl From<SaveNewTodo> for Dispatch<AppState, AppAction> {
    fn from(thunk: SaveNewTodo) -> Self {
        Dispatch::thunk(thunk)
    }
}
