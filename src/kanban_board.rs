use crate::api::ApiError;
use crate::task::{NewTask, Task, TaskId, TaskStatus};
use tracing::{debug, info, warn};

pub const TITLE_REQUIRED: &str = "Title is required";

/// Draft of the "new task" form.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TaskForm {
    pub title: String,
    pub description: String,
}

/// Completion of a request, applied to the board by whoever owns it.
#[derive(Debug)]
pub enum Outcome {
    Loaded(Result<Vec<Task>, ApiError>),
    Created(Result<Task, ApiError>),
    Edited(Result<Task, ApiError>),
    Moved(Result<Task, ApiError>),
    Deleted {
        id: TaskId,
        result: Result<(), ApiError>,
    },
}

/// Tasks partitioned into the three known columns, in list order.
#[derive(Debug, Default)]
pub struct Columns<'a> {
    buckets: [Vec<&'a Task>; 3],
}

impl<'a> Columns<'a> {
    pub fn get(&self, status: &TaskStatus) -> &[&'a Task] {
        match status.column() {
            Some(index) => &self.buckets[index],
            None => &[],
        }
    }

    pub fn column(&self, index: usize) -> &[&'a Task] {
        self.buckets.get(index).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.buckets.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Session state of the board. The task list is rebuilt from the server on startup and
/// only changes when a request completes.
#[derive(Debug, Default)]
pub struct KanbanBoard {
    tasks: Vec<Task>,
    pub loading: bool,
    /// Most recent failure; empty when there is nothing to show.
    pub error: String,
    pub form: TaskForm,
    pub saving: bool,
}

impl KanbanBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn find(&self, id: &TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| &t.id == id)
    }

    pub fn grouped(&self) -> Columns<'_> {
        let mut columns = Columns::default();
        for task in &self.tasks {
            if let Some(index) = task.status.column() {
                columns.buckets[index].push(task);
            }
        }
        columns
    }

    pub fn begin_load(&mut self) {
        self.loading = true;
    }

    /// Validates the form and, when the title is usable, marks the board as saving and
    /// returns the request body. A blank title sets `error` instead.
    pub fn begin_create(&mut self) -> Option<NewTask> {
        let title = self.form.title.trim();
        if title.is_empty() {
            self.error = TITLE_REQUIRED.to_string();
            return None;
        }
        self.saving = true;
        Some(NewTask {
            title: title.to_string(),
            description: self.form.description.trim().to_string(),
            status: TaskStatus::Todo,
        })
    }

    pub fn apply(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Loaded(Ok(tasks)) => {
                info!(count = tasks.len(), "loaded tasks");
                self.tasks = tasks;
                self.error.clear();
                self.loading = false;
            }
            Outcome::Loaded(Err(e)) => {
                self.fail(&e, "Failed to load tasks");
                self.loading = false;
            }
            Outcome::Created(Ok(task)) => {
                debug!(id = %task.id, "task created");
                self.tasks.push(task);
                self.form = TaskForm::default();
                self.error.clear();
                self.saving = false;
            }
            Outcome::Created(Err(e)) => {
                self.fail(&e, "Failed to create task");
                self.saving = false;
            }
            Outcome::Edited(Ok(task)) | Outcome::Moved(Ok(task)) => self.replace(task),
            Outcome::Edited(Err(e)) => self.fail(&e, "Failed to edit task"),
            Outcome::Moved(Err(e)) => self.fail(&e, "Failed to move task"),
            Outcome::Deleted { id, result: Ok(()) } => {
                debug!(%id, "task deleted");
                self.tasks.retain(|t| t.id != id);
            }
            Outcome::Deleted { result: Err(e), .. } => self.fail(&e, "Failed to delete task"),
        }
    }

    fn replace(&mut self, updated: Task) {
        debug!(id = %updated.id, status = %updated.status, "task updated");
        for task in self.tasks.iter_mut().filter(|t| t.id == updated.id) {
            *task = updated.clone();
        }
    }

    fn fail(&mut self, err: &ApiError, fallback: &str) {
        let message = err.to_string();
        warn!("{}: {}", fallback, message);
        self.error = if message.is_empty() {
            fallback.to_string()
        } else {
            message
        };
    }
}
