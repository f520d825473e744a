//! In-memory reference implementation of the `/tasks` REST store.
//!
//! Ids are assigned from an incrementing counter starting at 1. Nothing is
//! persisted; restarting the server starts from an empty list.

use std::future::Future;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, put};
use serde::Deserialize;
use serde_json::json;
use tasklist_core::{Task, TaskId};
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tower_http::cors::CorsLayer;
use tracing::{debug, info, warn};

/// Shared state accessible from Axum handlers.
#[derive(Clone, Default)]
struct AppState {
    store: Arc<Mutex<MemoryStore>>,
}

#[derive(Debug)]
struct MemoryStore {
    tasks: Vec<Task>,
    next_id: u64,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self {
            tasks: Vec::new(),
            next_id: 1,
        }
    }
}

impl MemoryStore {
    fn create(&mut self, body: TaskBody) -> Task {
        let task = Task {
            id: TaskId::Number(self.next_id),
            title: body.title,
            completed: body.completed,
        };
        self.next_id += 1;
        self.tasks.push(task.clone());
        task
    }

    fn update(&mut self, id: u64, body: TaskBody) -> Result<Task, ApiError> {
        let key = TaskId::Number(id);
        let slot = self
            .tasks
            .iter_mut()
            .find(|task| task.id == key)
            .ok_or(ApiError::TaskNotFound(id))?;
        *slot = Task {
            id: key,
            title: body.title,
            completed: body.completed,
        };
        Ok(slot.clone())
    }

    fn delete(&mut self, id: u64) -> Result<(), ApiError> {
        let key = TaskId::Number(id);
        let index = self
            .tasks
            .iter()
            .position(|task| task.id == key)
            .ok_or(ApiError::TaskNotFound(id))?;
        self.tasks.remove(index);
        Ok(())
    }
}

/// Request body for create and update. A client-supplied `id` is ignored.
#[derive(Debug, Deserialize)]
struct TaskBody {
    #[serde(default)]
    #[allow(dead_code)]
    id: Option<TaskId>,
    title: String,
    completed: bool,
}

/// Handler failures mapped to HTTP responses.
#[derive(Debug, Error)]
enum ApiError {
    #[error("Task not found")]
    TaskNotFound(u64),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            Self::TaskNotFound(id) => {
                debug!(id, "task not found");
                (
                    StatusCode::NOT_FOUND,
                    Json(json!({ "detail": self.to_string() })),
                )
                    .into_response()
            }
        }
    }
}

/// The reference task store server.
#[derive(Clone, Default)]
pub struct TaskServer {
    state: AppState,
}

impl TaskServer {
    /// Create a server with an empty task list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the Axum router with all routes.
    pub fn router(&self) -> Router {
        Router::new()
            .route("/tasks", get(list_tasks).post(create_task))
            .route("/tasks/{id}", put(update_task).delete(delete_task))
            .with_state(self.state.clone())
            .layer(CorsLayer::very_permissive())
    }

    /// Serve on `listener` until `shutdown` resolves.
    ///
    /// # Errors
    /// Returns an error when accepting connections fails.
    pub async fn serve<F>(self, listener: TcpListener, shutdown: F) -> io::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = listener.local_addr()?;
        info!(%addr, "task store listening");
        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown)
            .await
    }

    /// Bind `addr` and serve in a background task.
    ///
    /// # Errors
    /// Returns an error when the address cannot be bound.
    pub async fn start(self, addr: &str) -> io::Result<ServerHandle> {
        let listener = TcpListener::bind(addr).await?;
        let local_addr = listener.local_addr()?;
        let task = tokio::spawn(async move {
            if let Err(err) = self.serve(listener, std::future::pending()).await {
                warn!(error = %err, "task store stopped");
            }
        });
        Ok(ServerHandle {
            addr: local_addr,
            task,
        })
    }
}

/// Handle returned by [`TaskServer::start`]; the server stops when it is dropped.
pub struct ServerHandle {
    addr: SocketAddr,
    task: JoinHandle<()>,
}

impl ServerHandle {
    /// Address the server is bound to.
    #[must_use]
    pub const fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Base URL clients should use.
    #[must_use]
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }
}

impl Drop for ServerHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// GET /tasks
async fn list_tasks(State(state): State<AppState>) -> Json<Vec<Task>> {
    Json(state.store.lock().await.tasks.clone())
}

/// POST /tasks
async fn create_task(State(state): State<AppState>, Json(body): Json<TaskBody>) -> Json<Task> {
    let task = state.store.lock().await.create(body);
    debug!(id = %task.id, "task created");
    Json(task)
}

/// PUT /tasks/{id}
async fn update_task(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(body): Json<TaskBody>,
) -> Result<Json<Task>, ApiError> {
    let task = state.store.lock().await.update(id, body)?;
    Ok(Json(task))
}

/// DELETE /tasks/{id}
async fn delete_task(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state.store.lock().await.delete(id)?;
    Ok(Json(json!({ "message": "Task deleted" })))
}
