#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;
use taskboard::{ApiError, NewTask, Task, TaskApi, TaskId, TaskPatch, TaskStatus};
use tokio::sync::Notify;

/// Request as seen by the in-memory backend.
#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub method: &'static str,
    pub path: String,
    pub body: Option<Value>,
}

#[derive(Default)]
struct State {
    tasks: Vec<Task>,
    next_id: u64,
    failures: VecDeque<(u16, String)>,
    hold_list: bool,
    calls: Vec<Call>,
}

/// In-memory task store behaving like the reference backend: sequential string ids,
/// `todo` as the default status, empty fields in an update leave the stored value alone,
/// and unknown ids are a 404. Clones share the same store.
#[derive(Clone, Default)]
pub struct MemoryApi {
    state: Arc<Mutex<State>>,
    release: Arc<Notify>,
}

impl MemoryApi {
    pub fn new() -> Self {
        let api = Self::default();
        api.state.lock().unwrap().next_id = 1;
        api
    }

    pub fn with_tasks(tasks: Vec<Task>) -> Self {
        let api = Self::new();
        {
            let mut state = api.state.lock().unwrap();
            state.next_id = tasks.len() as u64 + 1;
            state.tasks = tasks;
        }
        api
    }

    pub fn tasks(&self) -> Vec<Task> {
        self.state.lock().unwrap().tasks.clone()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    /// The next request fails with this status and body.
    pub fn fail_next(&self, status: u16, body: &str) {
        self.state
            .lock()
            .unwrap()
            .failures
            .push_back((status, body.to_string()));
    }

    /// Keeps `list` from answering until [`MemoryApi::release_list`].
    pub fn hold_list(&self) {
        self.state.lock().unwrap().hold_list = true;
    }

    pub fn release_list(&self) {
        self.release.notify_one();
    }

    fn record(
        &self,
        method: &'static str,
        path: String,
        body: Option<Value>,
    ) -> Result<(), ApiError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call { method, path, body });
        match state.failures.pop_front() {
            Some((status, body)) => Err(ApiError::from_status(status, body)),
            None => Ok(()),
        }
    }
}

fn not_found() -> ApiError {
    ApiError::from_status(404, "Task not found\n".to_string())
}

fn invalid_status() -> ApiError {
    ApiError::from_status(
        400,
        "Invalid status. Use: todo, in_progress, done\n".to_string(),
    )
}

#[async_trait]
impl TaskApi for MemoryApi {
    async fn list(&self) -> Result<Vec<Task>, ApiError> {
        let held = self.state.lock().unwrap().hold_list;
        if held {
            self.release.notified().await;
        }
        self.record("GET", "/tasks".to_string(), None)?;
        Ok(self.tasks())
    }

    async fn create(&self, task: &NewTask) -> Result<Task, ApiError> {
        self.record("POST", "/tasks".to_string(), serde_json::to_value(task).ok())?;
        if task.title.is_empty() {
            return Err(ApiError::from_status(400, "Title is required\n".to_string()));
        }
        if task.status.column().is_none() {
            return Err(invalid_status());
        }
        let mut state = self.state.lock().unwrap();
        let created = Task {
            id: TaskId::from(state.next_id.to_string()),
            title: task.title.clone(),
            description: task.description.clone(),
            status: task.status.clone(),
        };
        state.next_id += 1;
        state.tasks.push(created.clone());
        Ok(created)
    }

    async fn update(&self, id: &TaskId, patch: &TaskPatch) -> Result<Task, ApiError> {
        self.record("PUT", format!("/tasks/{}", id), serde_json::to_value(patch).ok())?;
        let mut state = self.state.lock().unwrap();
        let task = state
            .tasks
            .iter_mut()
            .find(|t| &t.id == id)
            .ok_or_else(not_found)?;
        if let Some(title) = patch.title.as_ref().filter(|t| !t.is_empty()) {
            task.title = title.clone();
        }
        if let Some(description) = patch.description.as_ref().filter(|d| !d.is_empty()) {
            task.description = description.clone();
        }
        if let Some(status) = &patch.status {
            if status.column().is_none() {
                return Err(invalid_status());
            }
            task.status = status.clone();
        }
        Ok(task.clone())
    }

    async fn delete(&self, id: &TaskId) -> Result<(), ApiError> {
        self.record("DELETE", format!("/tasks/{}", id), None)?;
        let mut state = self.state.lock().unwrap();
        let index = state
            .tasks
            .iter()
            .position(|t| &t.id == id)
            .ok_or_else(not_found)?;
        state.tasks.remove(index);
        Ok(())
    }
}

pub fn task(id: &str, title: &str, status: TaskStatus) -> Task {
    Task {
        id: TaskId::from(id),
        title: title.to_string(),
        description: String::new(),
        status,
    }
}
