//! HTTP client for a remote task store exposing the `/tasks` REST resource.

pub mod error;

pub use error::StoreError;

use std::time::Duration;

use reqwest::{Client, Method, Response};
use tasklist_core::{NewTask, Task, TaskId};
use tracing::debug;
use url::Url;

/// Path segment of the collection resource.
const TASKS_SEGMENT: &str = "tasks";

/// Remote task store reached over HTTP.
///
/// | operation | request              |
/// |-----------|----------------------|
/// | list      | `GET /tasks`         |
/// | create    | `POST /tasks`        |
/// | update    | `PUT /tasks/{id}`    |
/// | delete    | `DELETE /tasks/{id}` |
#[derive(Debug, Clone)]
pub struct HttpTaskStore {
    client: Client,
    base: Url,
}

impl HttpTaskStore {
    /// Build a store client for `base_url` (e.g. `http://127.0.0.1:8000`).
    ///
    /// `timeout` of `None` keeps the HTTP client's defaults.
    ///
    /// # Errors
    /// Returns an error if the URL is invalid or the HTTP client cannot be constructed.
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self, StoreError> {
        let base = parse_base_url(base_url)?;
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
            base,
        })
    }

    /// Base URL every request path is resolved against.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base
    }

    /// Fetch every task in store order.
    ///
    /// # Errors
    /// Returns an error on transport failure, non-success status or undecodable body.
    pub async fn list_tasks(&self) -> Result<Vec<Task>, StoreError> {
        let url = self.tasks_url();
        let response = self.send(Method::GET, url, None::<&()>).await?;
        let response = check_status("GET", None, response).await?;
        Ok(response.json().await?)
    }

    /// Create a task; the returned task carries the store-assigned id.
    ///
    /// # Errors
    /// Returns an error on transport failure, non-success status or undecodable body.
    pub async fn create_task(&self, task: &NewTask) -> Result<Task, StoreError> {
        let url = self.tasks_url();
        let response = self.send(Method::POST, url, Some(task)).await?;
        let response = check_status("POST", None, response).await?;
        Ok(response.json().await?)
    }

    /// Replace a task with the provided full object.
    ///
    /// # Errors
    /// Returns [`StoreError::TaskNotFound`] when the store answers 404, or another error on
    /// transport failure, non-success status or undecodable body.
    pub async fn update_task(&self, task: &Task) -> Result<Task, StoreError> {
        let url = self.task_url(&task.id);
        let response = self.send(Method::PUT, url, Some(task)).await?;
        let response = check_status("PUT", Some(&task.id), response).await?;
        Ok(response.json().await?)
    }

    /// Delete a task by id. The response body is ignored.
    ///
    /// # Errors
    /// Returns [`StoreError::TaskNotFound`] when the store answers 404, or another error on
    /// transport failure or non-success status.
    pub async fn delete_task(&self, id: &TaskId) -> Result<(), StoreError> {
        let url = self.task_url(id);
        let response = self.send(Method::DELETE, url, None::<&()>).await?;
        check_status("DELETE", Some(id), response).await?;
        Ok(())
    }

    async fn send<B>(&self, method: Method, url: Url, body: Option<&B>) -> Result<Response, StoreError>
    where
        B: serde::Serialize + ?Sized,
    {
        debug!(%method, %url, "sending task store request");
        let mut request = self.client.request(method, url);
        if let Some(body) = body {
            request = request.json(body);
        }
        let response = request.send().await?;
        debug!(status = response.status().as_u16(), "task store responded");
        Ok(response)
    }

    fn tasks_url(&self) -> Url {
        self.url_with_segments(&[TASKS_SEGMENT])
    }

    fn task_url(&self, id: &TaskId) -> Url {
        let id = id.to_string();
        self.url_with_segments(&[TASKS_SEGMENT, &id])
    }

    fn url_with_segments(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        // parse_base_url rejects cannot-be-a-base URLs, so the segments are always available.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }
}

fn parse_base_url(raw: &str) -> Result<Url, StoreError> {
    let url = Url::parse(raw.trim()).map_err(|source| StoreError::InvalidBaseUrl {
        url: raw.to_owned(),
        source,
    })?;
    if url.cannot_be_a_base() || !matches!(url.scheme(), "http" | "https") {
        return Err(StoreError::UnsupportedBaseUrl(raw.to_owned()));
    }
    Ok(url)
}

async fn check_status(
    method: &'static str,
    task: Option<&TaskId>,
    response: Response,
) -> Result<Response, StoreError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    if status == reqwest::StatusCode::NOT_FOUND
        && let Some(id) = task
    {
        return Err(StoreError::TaskNotFound(id.clone()));
    }
    let path = response.url().path().to_owned();
    let body = response.text().await.unwrap_or_default();
    Err(StoreError::Status {
        method,
        path,
        status: status.as_u16(),
        body,
    })
}
