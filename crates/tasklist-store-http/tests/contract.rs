//! HTTP contract tests for the task store client.
//!
//! These pin the request shapes (`method`, `path`, body) the client emits and how
//! store responses and statuses are mapped.

use serde_json::json;
use tasklist_core::{NewTask, Task, TaskId};
use tasklist_store_http::{HttpTaskStore, StoreError};
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer) -> HttpTaskStore {
    HttpTaskStore::new(&server.uri(), None).unwrap_or_else(|err| panic!("must build client: {err}"))
}

#[tokio::test]
async fn list_decodes_numeric_and_text_ids() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/tasks"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 1, "title": "buy milk", "completed": false},
            {"id": "b7", "title": "call mom", "completed": true},
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let tasks = client(&server)
        .list_tasks()
        .await
        .unwrap_or_else(|err| panic!("list must succeed: {err}"));

    assert_eq!(
        tasks,
        vec![
            Task {
                id: TaskId::Number(1),
                title: "buy milk".into(),
                completed: false,
            },
            Task {
                id: TaskId::Text("b7".into()),
                title: "call mom".into(),
                completed: true,
            },
        ]
    );
}

#[tokio::test]
async fn create_posts_title_and_incomplete_flag() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/tasks"))
        .and(body_json(json!({"title": "write report", "completed": false})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 42,
            "title": "write report",
            "completed": false,
        })))
        .expect(1)
        .mount(&server)
        .await;

    let draft = NewTask::from_input("write report").unwrap_or_else(|| panic!("non-blank title"));
    let created = client(&server)
        .create_task(&draft)
        .await
        .unwrap_or_else(|err| panic!("create must succeed: {err}"));

    assert_eq!(created.id, TaskId::Number(42));
    assert_eq!(created.title, "write report");
}

#[tokio::test]
async fn update_puts_the_full_task_object() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/tasks/1"))
        .and(body_json(json!({"id": 1, "title": "buy milk", "completed": true})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 1,
            "title": "buy milk",
            "completed": true,
        })))
        .expect(1)
        .mount(&server)
        .await;

    let task = Task {
        id: TaskId::Number(1),
        title: "buy milk".into(),
        completed: true,
    };
    let updated = client(&server)
        .update_task(&task)
        .await
        .unwrap_or_else(|err| panic!("update must succeed: {err}"));
    assert_eq!(updated, task);
}

#[tokio::test]
async fn delete_ignores_response_body() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/tasks/7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "Task deleted"})))
        .expect(1)
        .mount(&server)
        .await;

    client(&server)
        .delete_task(&TaskId::Number(7))
        .await
        .unwrap_or_else(|err| panic!("delete must succeed: {err}"));
}

#[tokio::test]
async fn delete_accepts_no_content() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/tasks/7"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    assert!(client(&server).delete_task(&TaskId::Number(7)).await.is_ok());
}

#[tokio::test]
async fn not_found_on_task_path_maps_to_task_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/tasks/9"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"detail": "Task not found"})))
        .mount(&server)
        .await;

    let err = client(&server)
        .delete_task(&TaskId::Number(9))
        .await
        .err()
        .unwrap_or_else(|| panic!("delete must fail"));
    assert!(matches!(err, StoreError::TaskNotFound(TaskId::Number(9))));
}

#[tokio::test]
async fn server_errors_carry_status_and_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/tasks"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let err = client(&server)
        .list_tasks()
        .await
        .err()
        .unwrap_or_else(|| panic!("list must fail"));
    match err {
        StoreError::Status {
            method,
            path,
            status,
            body,
        } => {
            assert_eq!(method, "GET");
            assert_eq!(path, "/tasks");
            assert_eq!(status, 500);
            assert_eq!(body, "boom");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn undecodable_body_is_an_http_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/tasks"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let err = client(&server)
        .list_tasks()
        .await
        .err()
        .unwrap_or_else(|| panic!("list must fail"));
    assert!(matches!(err, StoreError::Http(_)));
    assert!(!err.is_transport());
}

#[tokio::test]
async fn unreachable_store_is_a_transport_error() {
    // Port 9 (discard) on localhost is not expected to accept HTTP connections.
    let store = HttpTaskStore::new("http://127.0.0.1:9", None)
        .unwrap_or_else(|err| panic!("must build client: {err}"));
    let err = store
        .list_tasks()
        .await
        .err()
        .unwrap_or_else(|| panic!("list must fail"));
    assert!(err.is_transport());
}
