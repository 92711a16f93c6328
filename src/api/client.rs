use async_trait::async_trait;
use reqwest::{header::CONTENT_TYPE, Client, Method, StatusCode};
use serde::{de::DeserializeOwned, de::IgnoredAny, Serialize};
use tracing::{debug, warn};

use super::{ApiError, TaskApi};
use crate::task::{NewTask, Task, TaskId, TaskPatch};

/// reqwest-backed [`TaskApi`] talking to `{base_url}/tasks`.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// One round trip. `Ok(None)` means the server answered 204, an empty body or a
    /// JSON `null`; callers decide whether that is acceptable.
    async fn send<T, B>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<Option<T>, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let url = format!("{}{}", self.base_url, path);
        debug!(%method, path, "sending request");

        let mut request = self
            .client
            .request(method.clone(), &url)
            .header(CONTENT_TYPE, "application/json");
        if let Some(body) = body {
            request = request.body(serde_json::to_vec(body)?);
        }

        let response = request.send().await.map_err(|e| {
            warn!(%method, path, "request failed: {}", e);
            ApiError::from(e)
        })?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let err = ApiError::from_status(status.as_u16(), text);
            warn!(%method, path, status = status.as_u16(), "server rejected request: {}", err);
            return Err(err);
        }
        if status == StatusCode::NO_CONTENT {
            return Ok(None);
        }

        let bytes = response.bytes().await?;
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(None);
        }
        Ok(serde_json::from_slice::<Option<T>>(&bytes)?)
    }
}

#[async_trait]
impl TaskApi for ApiClient {
    async fn list(&self) -> Result<Vec<Task>, ApiError> {
        let tasks = self
            .send::<Vec<Task>, ()>(Method::GET, "/tasks", None)
            .await?;
        Ok(tasks.unwrap_or_default())
    }

    async fn create(&self, task: &NewTask) -> Result<Task, ApiError> {
        self.send(Method::POST, "/tasks", Some(task))
            .await?
            .ok_or(ApiError::EmptyBody)
    }

    async fn update(&self, id: &TaskId, patch: &TaskPatch) -> Result<Task, ApiError> {
        self.send(Method::PUT, &format!("/tasks/{}", id), Some(patch))
            .await?
            .ok_or(ApiError::EmptyBody)
    }

    async fn delete(&self, id: &TaskId) -> Result<(), ApiError> {
        self.send::<IgnoredAny, ()>(Method::DELETE, &format!("/tasks/{}", id), None)
            .await?;
        Ok(())
    }
}
