//! Terminal Kanban board that keeps an in-memory task list in sync with a task REST
//! API.

pub mod api;
pub mod config;
pub mod controller;
pub mod drag;
pub mod kanban_board;
pub mod logger;
pub mod prompt;
pub mod task;
pub mod ui;

pub use api::{ApiClient, ApiError, TaskApi};
pub use controller::Controller;
pub use kanban_board::{KanbanBoard, Outcome};
pub use task::{NewTask, Task, TaskId, TaskPatch, TaskStatus};
