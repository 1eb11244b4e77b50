//! Backend client
//!
//! [`TodoApi`] is the seam the thunks talk through. [`HttpApi`] speaks JSON
//! over HTTP; [`FakeServer`] keeps the items in memory and can simulate
//! latency and outages.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use futures::future::BoxFuture;
use futures::FutureExt;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::error::ApiError;
use crate::model::{Item, ItemId, NewTodo};

/// Collection endpoint, relative to the server's base URL.
pub const TODOS_PATH: &str = "/fakeApi/todos";

/// Operations the backend offers.
pub trait TodoApi: Send + Sync + 'static {
    /// Every stored item.
    fn list(&self) -> BoxFuture<'_, Result<Vec<Item>, ApiError>>;

    /// Store a new item and return it with its assigned id.
    fn create(&self, todo: NewTodo) -> BoxFuture<'_, Result<Item, ApiError>>;
}

// ============================================================================
// Wire format
// ============================================================================

#[derive(Debug, Serialize, Deserialize)]
struct ListResponse {
    todos: Vec<Item>,
}

#[derive(Debug, Serialize, Deserialize)]
struct CreateRequest {
    todo: NewTodo,
}

#[derive(Debug, Serialize, Deserialize)]
struct CreateResponse {
    todo: Item,
}

// ============================================================================
// HTTP
// ============================================================================

/// JSON client for a running backend.
#[derive(Debug, Clone)]
pub struct HttpApi {
    client: reqwest::Client,
    base_url: String,
}

impl HttpApi {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn url(&self) -> String {
        format!("{}{}", self.base_url, TODOS_PATH)
    }
}

fn check_status(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(ApiError::Status {
            status: status.as_u16(),
            path: response.url().path().to_string(),
        })
    }
}

impl TodoApi for HttpApi {
    fn list(&self) -> BoxFuture<'_, Result<Vec<Item>, ApiError>> {
        async move {
            let response = self.client.get(self.url()).send().await?;
            let body: ListResponse = check_status(response)?.json().await?;
            tracing::debug!(count = body.todos.len(), "GET {}", TODOS_PATH);
            Ok(body.todos)
        }
        .boxed()
    }

    fn create(&self, todo: NewTodo) -> BoxFuture<'_, Result<Item, ApiError>> {
        async move {
            let response = self
                .client
                .post(self.url())
                .json(&CreateRequest { todo })
                .send()
                .await?;
            let body: CreateResponse = check_status(response)?.json().await?;
            tracing::debug!(id = %body.todo.id, "POST {}", TODOS_PATH);
            Ok(body.todo)
        }
        .boxed()
    }
}

// ============================================================================
// In-memory backend
// ============================================================================

#[derive(Debug, Default)]
struct Table {
    items: BTreeMap<ItemId, Item>,
    next_id: u64,
}

/// In-memory backend that assigns ids like the real one.
#[derive(Debug, Default)]
pub struct FakeServer {
    table: Mutex<Table>,
    latency: Duration,
    offline: AtomicBool,
}

impl FakeServer {
    /// Empty backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Backend holding `items`. New ids continue after the largest one.
    pub fn with_items(items: impl IntoIterator<Item = Item>) -> Self {
        let items: BTreeMap<ItemId, Item> =
            items.into_iter().map(|item| (item.id, item)).collect();
        let next_id = items.keys().next_back().map_or(0, |id| id.0);
        Self {
            table: Mutex::new(Table { items, next_id }),
            ..Self::default()
        }
    }

    /// Backend with a few sample items.
    pub fn seeded() -> Self {
        Self::with_items([
            Item::new(1, "Learn Rust").completed(),
            Item::new(2, "Learn Redux").with_color("purple"),
            Item::new(3, "Build something fun!").with_color("blue"),
        ])
    }

    /// Delay every response by `latency`.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// While offline every call fails with [`ApiError::Offline`].
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Number of stored items.
    pub async fn len(&self) -> usize {
        self.table.lock().await.items.len()
    }

    async fn respond(&self) -> Result<(), ApiError> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        if self.offline.load(Ordering::SeqCst) {
            return Err(ApiError::Offline);
        }
        Ok(())
    }
}

impl TodoApi for FakeServer {
    fn list(&self) -> BoxFuture<'_, Result<Vec<Item>, ApiError>> {
        async move {
            self.respond().await?;
            let table = self.table.lock().await;
            Ok(table.items.values().cloned().collect())
        }
        .boxed()
    }

    fn create(&self, todo: NewTodo) -> BoxFuture<'_, Result<Item, ApiError>> {
        async move {
            self.respond().await?;
            let text = todo.text.trim();
            if text.is_empty() {
                return Err(ApiError::Rejected("todo text is empty".into()));
            }

            let mut table = self.table.lock().await;
            table.next_id += 1;
            let item = Item::new(table.next_id, text);
            table.items.insert(item.id, item.clone());
            Ok(item)
        }
        .boxed()
    }
}
