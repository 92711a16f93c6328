mod client;
mod error;

pub use client::ApiClient;
pub use error::ApiError;

use async_trait::async_trait;

use crate::task::{NewTask, Task, TaskId, TaskPatch};

/// The four remote operations the board needs. One request per call, no retries.
#[async_trait]
pub trait TaskApi: Send + Sync + 'static {
    async fn list(&self) -> Result<Vec<Task>, ApiError>;

    /// Returns the stored task including its server-assigned id.
    async fn create(&self, task: &NewTask) -> Result<Task, ApiError>;

    /// Applies only the fields present in `patch` and returns the full task.
    async fn update(&self, id: &TaskId, patch: &TaskPatch) -> Result<Task, ApiError>;

    async fn delete(&self, id: &TaskId) -> Result<(), ApiError>;
}
