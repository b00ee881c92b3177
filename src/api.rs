//! HTTP client for the remote task API.

use crate::auth::BearerToken;
use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::tasks::{NewTask, Task, TaskId, TaskPatch};
use crate::traits::TaskApi;
use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Instant;
use tracing::{debug, warn};
use url::Url;

/// Collection path relative to the API base URL.
const TASKS_PATH: &str = "tasks";

/// Task API client authenticated with a bearer token.
#[derive(Debug, Clone)]
pub struct HttpTaskApi {
    /// HTTP client
    client: Client,
    /// API base URL, always ending in `/`
    base: Url,
    /// Credential attached to every request
    token: BearerToken,
}

impl HttpTaskApi {
    /// Create a client for the configured API.
    ///
    /// # Errors
    ///
    /// Returns an error if the API URL is invalid or the HTTP client cannot be built.
    pub fn new(config: &ClientConfig, token: BearerToken) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .user_agent(concat!("todo-live/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Self::with_client(config, token, client)
    }

    /// Create a client with a preconfigured `reqwest::Client`.
    ///
    /// # Errors
    ///
    /// Returns an error if the API URL is invalid.
    pub fn with_client(config: &ClientConfig, token: BearerToken, client: Client) -> Result<Self> {
        Ok(Self { client, base: config.api_base()?, token })
    }

    /// URL of the task collection.
    fn tasks_url(&self) -> Result<Url> {
        Ok(self.base.join(TASKS_PATH)?)
    }

    /// URL of a single task; the id is percent-encoded as one path segment.
    fn task_url(&self, id: &TaskId) -> Result<Url> {
        let mut url = self.tasks_url()?;
        url.path_segments_mut()
            .map_err(|()| Error::Config(format!("API URL cannot be a base: {}", self.base)))?
            .push(id.as_str());
        Ok(url)
    }

    /// Start an authenticated request.
    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.client.request(method, url).bearer_auth(self.token.expose())
    }

    /// Send a request and decode a JSON body from a successful response.
    async fn send_json<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
        id: Option<&TaskId>,
    ) -> Result<T> {
        let response = self.send(builder, id).await?;
        Ok(response.json::<T>().await?)
    }

    /// Send a request, turning non-success statuses into errors.
    async fn send(&self, builder: RequestBuilder, id: Option<&TaskId>) -> Result<Response> {
        let request = builder.build()?;
        let method = request.method().clone();
        let url = request.url().clone();
        let started = Instant::now();

        let response = self.client.execute(request).await.map_err(|e| {
            warn!(%method, %url, error = %e, "request failed");
            Error::from(e)
        })?;

        let status = response.status();
        let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        debug!(%method, %url, status = status.as_u16(), elapsed_ms, "response");

        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        warn!(%method, %url, status = status.as_u16(), "request rejected");
        Err(error_for_status(status, &body, id))
    }
}

/// Map a non-success response to the error taxonomy.
fn error_for_status(status: StatusCode, body: &str, id: Option<&TaskId>) -> Error {
    let message = extract_message(body)
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("unknown error").to_string());
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Error::Unauthorized(message),
        StatusCode::NOT_FOUND => match id {
            Some(id) => Error::NotFound(id.clone()),
            None => Error::Api { status: status.as_u16(), message },
        },
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => Error::Validation(message),
        _ => Error::Api { status: status.as_u16(), message },
    }
}

/// Pull a human-readable message out of an error body.
///
/// Servers answer either `{"message": ...}`, `{"error": ...}` or plain text.
fn extract_message(body: &str) -> Option<String> {
    let body = body.trim();
    if body.is_empty() {
        return None;
    }
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        for key in ["message", "error", "msg"] {
            if let Some(text) = value.get(key).and_then(serde_json::Value::as_str) {
                return Some(text.to_string());
            }
        }
    }
    Some(body.to_string())
}

#[async_trait(?Send)]
impl TaskApi for HttpTaskApi {
    async fn list_tasks(&self) -> Result<Vec<Task>> {
        let builder = self.request(Method::GET, self.tasks_url()?);
        self.send_json(builder, None).await
    }

    async fn create_task(&self, new_task: &NewTask) -> Result<Task> {
        let builder = self.request(Method::POST, self.tasks_url()?).json(new_task);
        self.send_json(builder, None).await
    }

    async fn replace_task(&self, task: &Task) -> Result<Task> {
        let builder = self.request(Method::PUT, self.task_url(&task.id)?).json(task);
        self.send_json(builder, Some(&task.id)).await
    }

    async fn patch_task(&self, id: &TaskId, patch: &TaskPatch) -> Result<Task> {
        if patch.is_empty() {
            return Err(Error::Validation("Nothing to update".to_string()));
        }
        let builder = self.request(Method::PATCH, self.task_url(id)?).json(patch);
        self.send_json(builder, Some(id)).await
    }

    async fn delete_task(&self, id: &TaskId) -> Result<()> {
        let builder = self.request(Method::DELETE, self.task_url(id)?);
        self.send(builder, Some(id)).await?;
        Ok(())
    }
}
