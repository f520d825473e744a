//! `TaskSync` over the HTTP store against the in-memory reference server.

use tasklist_app::{EditSession, SyncError, TaskSync};
use tasklist_core::{Task, TaskFilter, TaskId};
use tasklist_server::{ServerHandle, TaskServer};
use tasklist_store_http::{HttpTaskStore, StoreError};

async fn start() -> ServerHandle {
    TaskServer::new()
        .start("127.0.0.1:0")
        .await
        .unwrap_or_else(|err| panic!("failed to start server: {err}"))
}

fn connect(server: &ServerHandle) -> TaskSync<HttpTaskStore> {
    let store = HttpTaskStore::new(&server.base_url(), None)
        .unwrap_or_else(|err| panic!("failed to build store: {err}"));
    TaskSync::new(store)
}

async fn create(sync: &TaskSync<HttpTaskStore>, title: &str) -> Task {
    sync.create(title)
        .await
        .unwrap_or_else(|err| panic!("create failed: {err}"))
        .unwrap_or_else(|| panic!("non-blank title must create"))
}

async fn refresh(sync: &TaskSync<HttpTaskStore>, filter: TaskFilter) -> Vec<Task> {
    sync.list(filter)
        .await
        .unwrap_or_else(|err| panic!("list failed: {err}"))
}

fn titles(tasks: &[Task]) -> Vec<&str> {
    tasks.iter().map(|task| task.title.as_str()).collect()
}

#[tokio::test]
async fn create_toggle_filter_and_delete() {
    let server = start().await;
    let sync = connect(&server);

    let milk = create(&sync, "buy milk").await;
    assert_eq!(milk.id, TaskId::Number(1));
    assert!(!milk.completed);
    create(&sync, "walk dog").await;

    let toggled = sync
        .toggle_completion(&milk.id)
        .await
        .unwrap_or_else(|err| panic!("toggle failed: {err}"));
    assert!(toggled.completed);

    let done = refresh(&sync, TaskFilter::Completed).await;
    assert_eq!(titles(&done), ["buy milk"]);
    assert_eq!(titles(&sync.visible(TaskFilter::Incomplete).await), ["walk dog"]);

    sync.delete(&milk.id)
        .await
        .unwrap_or_else(|err| panic!("delete failed: {err}"));
    let all = refresh(&sync, TaskFilter::All).await;
    assert_eq!(titles(&all), ["walk dog"]);
}

#[tokio::test]
async fn writes_from_another_client_appear_after_refresh() {
    let server = start().await;
    let alice = connect(&server);
    let bob = connect(&server);

    create(&alice, "shared").await;
    assert!(bob.tasks().await.is_empty());

    let seen = refresh(&bob, TaskFilter::All).await;
    assert_eq!(titles(&seen), ["shared"]);
}

#[tokio::test]
async fn update_of_task_deleted_elsewhere_fails_and_keeps_local_copy() {
    let server = start().await;
    let alice = connect(&server);
    let bob = connect(&server);

    let task = create(&alice, "ephemeral").await;
    refresh(&bob, TaskFilter::All).await;
    alice
        .delete(&task.id)
        .await
        .unwrap_or_else(|err| panic!("delete failed: {err}"));

    let Err(err) = bob.toggle_completion(&task.id).await else {
        panic!("toggle of a task removed on the server must fail");
    };
    assert!(matches!(err, SyncError::UpdateFailed { ref id, .. } if *id == task.id));
    let store_err = err
        .store_failure()
        .and_then(|source| source.downcast_ref::<StoreError>());
    assert!(matches!(store_err, Some(StoreError::TaskNotFound(_))));
    assert_eq!(bob.get(&task.id).await, Some(task));
}

#[tokio::test]
async fn failed_delete_keeps_the_entry() {
    let server = start().await;
    let alice = connect(&server);
    let bob = connect(&server);

    let task = create(&alice, "twice").await;
    refresh(&bob, TaskFilter::All).await;
    alice
        .delete(&task.id)
        .await
        .unwrap_or_else(|err| panic!("delete failed: {err}"));

    let Err(err) = bob.delete(&task.id).await else {
        panic!("second delete must fail");
    };
    assert!(matches!(err, SyncError::DeleteFailed { .. }));
    assert_eq!(bob.tasks().await.len(), 1);
}

#[tokio::test]
async fn edit_session_renames_on_the_server() {
    let server = start().await;
    let sync = connect(&server);
    let task = create(&sync, "buy milk").await;

    let mut session = EditSession::default();
    let draft = sync
        .begin_edit(&task.id)
        .await
        .unwrap_or_else(|err| panic!("begin_edit failed: {err}"));
    session.begin(draft);
    if let Some(draft) = session.draft_mut() {
        draft.set_text("buy oat milk");
    }
    let saved = session
        .save(&sync)
        .await
        .unwrap_or_else(|err| panic!("save failed: {err}"));
    assert_eq!(saved.map(|t| t.title), Some("buy oat milk".to_owned()));
    assert_eq!(session, EditSession::Idle);

    let other = connect(&server);
    let remote = refresh(&other, TaskFilter::All).await;
    assert_eq!(titles(&remote), ["buy oat milk"]);
}
