//! End-to-end flows through the runtime, selectors and in-memory backend

use std::sync::Arc;
use std::time::Duration;

use todo_dispatch::{Dispatched, Runtime, TaskKey, ThunkError};
use todos::filters::{ColorChange, FiltersAction, StatusFilter};
use todos::thunks::FETCH_TODOS_KEY;
use todos::todos::{LoadingStatus, TodosAction};
use todos::{
    reducer, ApiError, AppAction, AppState, FakeServer, FetchTodos, Item, ItemId, NewTodo,
    SaveNewTodo, TodoApi, TodoSelectors, TotalCountArgs,
};

fn runtime() -> Runtime<AppState, AppAction> {
    Runtime::new(AppState::default(), reducer)
}

#[tokio::test]
async fn fetched_items_are_exactly_the_backend_items() {
    let a = Item::new(1, "a");
    let b = Item::new(2, "b").completed();
    let c = Item::new(3, "c").with_color("red");
    let api: Arc<dyn TodoApi> = Arc::new(FakeServer::with_items([
        a.clone(),
        b.clone(),
        c.clone(),
    ]));
    let mut runtime = runtime();
    let mut selectors = TodoSelectors::new();

    runtime.dispatch(FetchTodos::new(api));
    runtime.settle().await.expect("fetch");

    let all: Vec<Item> = selectors
        .all_items(runtime.state())
        .iter()
        .map(|item| (**item).clone())
        .collect();
    assert_eq!(all, vec![a, b, c]);
    assert_eq!(runtime.state().todos.status, LoadingStatus::Idle);
}

#[tokio::test]
async fn completed_filter_hides_active_item() {
    let mut runtime = runtime();
    let mut selectors = TodoSelectors::new();

    runtime.dispatch(TodosAction::Add(Item::new(1, "only")));
    runtime.dispatch(FiltersAction::SetStatus(StatusFilter::Completed));

    assert!(selectors.filtered_items(runtime.state()).is_empty());
    assert_eq!(selectors.remaining_count(runtime.state()), 1);
    assert_eq!(
        selectors.total_count(runtime.state(), &TotalCountArgs::default()),
        1
    );
}

#[tokio::test]
async fn toggled_item_shows_under_completed() {
    let mut runtime = runtime();
    let mut selectors = TodoSelectors::new();
    runtime.dispatch(TodosAction::Add(Item::new(1, "only")));
    runtime.dispatch(FiltersAction::SetStatus(StatusFilter::Completed));
    let before = selectors.filtered_items(runtime.state());

    runtime.dispatch(TodosAction::ToggleCompleted(ItemId(1)));
    let after = selectors.filtered_items(runtime.state());

    assert!(before.is_empty());
    assert_eq!(after.len(), 1);
    assert!(after[0].completed);
    assert_eq!(selectors.remaining_count(runtime.state()), 0);
}

#[tokio::test]
async fn color_added_then_removed_restores_filters() {
    let mut runtime = runtime();
    let initial = runtime.state().filters.clone();

    let added = runtime.dispatch(FiltersAction::ChangeColor {
        color: "red".into(),
        change: ColorChange::Added,
    });
    let again = runtime.dispatch(FiltersAction::ChangeColor {
        color: "red".into(),
        change: ColorChange::Added,
    });
    runtime.dispatch(FiltersAction::ChangeColor {
        color: "red".into(),
        change: ColorChange::Removed,
    });

    assert!(added.changed());
    assert!(!again.changed());
    assert!(runtime.state().filters.colors.is_empty());
    assert_eq!(runtime.state().filters, initial);
}

#[tokio::test]
async fn filtered_list_is_reused_until_entities_change() {
    let mut runtime = runtime();
    let mut selectors = TodoSelectors::new();
    runtime.dispatch(TodosAction::Add(Item::new(1, "a")));
    runtime.dispatch(TodosAction::Add(Item::new(2, "b")));
    runtime.dispatch(FiltersAction::SetStatus(StatusFilter::Active));

    let first = selectors.filtered_items(runtime.state());
    // Unchanged: same pointers everywhere
    assert!(!runtime.dispatch(TodosAction::Delete(ItemId(9))).changed());
    let second = selectors.filtered_items(runtime.state());
    assert!(Arc::ptr_eq(&first, &second));

    runtime.dispatch(TodosAction::Delete(ItemId(1)));
    let third = selectors.filtered_items(runtime.state());
    assert!(!Arc::ptr_eq(&first, &third));
    assert_eq!(selectors.stats().filtered_items, 2);
}

#[tokio::test]
async fn concurrent_fetches_are_deduplicated() {
    let server = Arc::new(FakeServer::seeded().with_latency(Duration::from_millis(30)));
    let mut runtime = runtime();

    let first = runtime.dispatch(FetchTodos::new(server.clone()));
    let second = runtime.dispatch(FetchTodos::new(server.clone()));

    assert_eq!(first, Dispatched::Spawned(TaskKey::new(FETCH_TODOS_KEY)));
    assert_eq!(second, Dispatched::Deduplicated(TaskKey::new(FETCH_TODOS_KEY)));

    runtime.settle().await.expect("fetch");
    assert_eq!(runtime.state().todos.len(), 3);

    // Free again once finished
    let third = runtime.dispatch(FetchTodos::new(server));
    assert!(matches!(third, Dispatched::Spawned(_)));
    runtime.settle().await.expect("fetch");
}

async fn wait_for_tasks(runtime: &Runtime<AppState, AppAction>) {
    while runtime.tasks().running_keys().next().is_some() {
        tokio::task::yield_now().await;
    }
}

#[tokio::test]
async fn repeated_fetch_without_settle_runs_again() {
    let server = Arc::new(FakeServer::seeded());
    let mut runtime = runtime();

    runtime.dispatch(FetchTodos::new(server.clone()));
    wait_for_tasks(&runtime).await;
    runtime.process_pending();
    assert!(!runtime.state().todos.is_loading());
    assert_eq!(runtime.state().todos.len(), 3);

    server
        .create(NewTodo::new("Fourth"))
        .await
        .expect("create");
    let again = runtime.dispatch(FetchTodos::new(server.clone()));
    assert_eq!(again, Dispatched::Spawned(TaskKey::new(FETCH_TODOS_KEY)));

    wait_for_tasks(&runtime).await;
    runtime.process_pending();
    assert_eq!(runtime.state().todos.len(), 4);
    assert!(runtime.tasks().is_empty());
}

#[tokio::test]
async fn actions_dispatched_during_fetch_are_applied() {
    let server = Arc::new(FakeServer::seeded().with_latency(Duration::from_millis(30)));
    let mut runtime = runtime();

    runtime.dispatch(FetchTodos::new(server));
    runtime.dispatch(FiltersAction::SetStatus(StatusFilter::Active));
    runtime.settle().await.expect("fetch");

    assert_eq!(runtime.state().filters.status, StatusFilter::Active);
    assert_eq!(runtime.state().todos.len(), 3);
}

#[tokio::test]
async fn save_new_todo_adds_backend_item() {
    let server = Arc::new(FakeServer::seeded());
    let mut runtime = runtime();

    runtime.dispatch(FetchTodos::new(server.clone()));
    runtime.settle().await.expect("fetch");
    runtime.dispatch(SaveNewTodo::new(server.clone(), "Water plants"));
    runtime.dispatch(SaveNewTodo::new(server.clone(), "Call mom"));
    runtime.settle().await.expect("save");

    assert_eq!(runtime.state().todos.len(), 5);
    assert_eq!(server.len().await, 5);
    let texts: Vec<&str> = runtime
        .state()
        .todos
        .entities
        .values()
        .map(|item| item.text.as_str())
        .collect();
    assert!(texts.contains(&"Water plants"));
    assert!(texts.contains(&"Call mom"));
}

#[tokio::test]
async fn failed_fetch_surfaces_and_stays_loading() {
    let server = Arc::new(FakeServer::seeded());
    server.set_offline(true);
    let mut runtime = runtime();

    runtime.dispatch(FetchTodos::new(server.clone()));
    let err = runtime.settle().await.expect_err("offline");

    match err {
        ThunkError::Failed(err) => {
            assert!(matches!(err.downcast_ref::<ApiError>(), Some(ApiError::Offline)))
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert_eq!(runtime.state().todos.status, LoadingStatus::Loading);
    assert!(runtime.tasks().is_empty());

    // Recovers on the next fetch
    server.set_offline(false);
    runtime.dispatch(FetchTodos::new(server));
    runtime.settle().await.expect("fetch");
    assert_eq!(runtime.state().todos.status, LoadingStatus::Idle);
}

#[tokio::test]
async fn subscribers_see_fetched_state() {
    let mut runtime = runtime();
    let mut rx = runtime.subscribe();

    runtime.dispatch(FetchTodos::new(Arc::new(FakeServer::seeded())));
    runtime.settle().await.expect("fetch");

    assert!(rx.has_changed().unwrap_or(false));
    assert_eq!(rx.borrow_and_update().todos.len(), 3);
}
