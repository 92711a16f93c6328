use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::api::{ApiError, TaskApi};
use crate::kanban_board::{KanbanBoard, Outcome};
use crate::prompt::Prompter;
use crate::task::{Task, TaskId, TaskPatch, TaskStatus};

pub const EDIT_TITLE_PROMPT: &str = "New title:";
pub const EDIT_DESCRIPTION_PROMPT: &str = "New description (optional):";
pub const DELETE_CONFIRM: &str = "Delete this task?";

/// Drives the board: user actions become requests on the runtime, and their
/// completions come back over a channel to be applied one at a time by `drain` or
/// `settle`. Nothing else writes to the board.
pub struct Controller<A: TaskApi> {
    api: Arc<A>,
    board: KanbanBoard,
    runtime: Handle,
    tx: UnboundedSender<Option<Outcome>>,
    rx: UnboundedReceiver<Option<Outcome>>,
    pending: usize,
    started: bool,
    teardown: CancellationToken,
}

impl<A: TaskApi> Controller<A> {
    pub fn new(api: A, runtime: Handle) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            api: Arc::new(api),
            board: KanbanBoard::new(),
            runtime,
            tx,
            rx,
            pending: 0,
            started: false,
            teardown: CancellationToken::new(),
        }
    }

    /// Controller bound to the runtime it is created on.
    pub fn current(api: A) -> Self {
        Self::new(api, Handle::current())
    }

    pub fn board(&self) -> &KanbanBoard {
        &self.board
    }

    pub fn board_mut(&mut self) -> &mut KanbanBoard {
        &mut self.board
    }

    /// Requests still in flight.
    pub fn pending(&self) -> usize {
        self.pending
    }

    /// Loads the task list. Only the first call does anything.
    pub fn start(&mut self) {
        if self.started {
            return;
        }
        self.started = true;
        self.board.begin_load();

        let api = Arc::clone(&self.api);
        let token = self.teardown.clone();
        self.spawn(async move {
            tokio::select! {
                _ = token.cancelled() => None,
                result = api.list() => {
                    if token.is_cancelled() {
                        None
                    } else {
                        Some(Outcome::Loaded(result))
                    }
                }
            }
        });
    }

    /// Tears the view down. A load still in flight is dropped without touching state.
    pub fn shutdown(&mut self) {
        debug!("controller shutting down");
        self.teardown.cancel();
    }

    pub fn add_task(&mut self) {
        if self.board.saving {
            debug!("add ignored while a create is in flight");
            return;
        }
        let Some(new_task) = self.board.begin_create() else {
            return;
        };
        let api = Arc::clone(&self.api);
        self.spawn(async move { Some(Outcome::Created(api.create(&new_task).await)) });
    }

    /// Asks for a new title and description. Dismissing the title prompt cancels the
    /// edit before the description is asked for.
    pub fn edit_task(&mut self, id: &TaskId, prompter: &mut dyn Prompter) {
        let Some(task) = self.board.find(id) else {
            return;
        };
        let Some(title) = prompter.prompt(EDIT_TITLE_PROMPT, &task.title) else {
            return;
        };
        let description = prompter
            .prompt(EDIT_DESCRIPTION_PROMPT, &task.description)
            .unwrap_or_default();

        let patch = TaskPatch::text(title.trim(), description.trim());
        self.update(id.clone(), patch, Outcome::Edited);
    }

    pub fn move_task(&mut self, id: &TaskId, status: TaskStatus) {
        let Some(task) = self.board.find(id) else {
            return;
        };
        if task.status == status {
            return;
        }
        self.update(id.clone(), TaskPatch::status(status), Outcome::Moved);
    }

    /// Drop of a drag payload onto a column. Payloads that do not name a task on the
    /// board are ignored.
    pub fn drop_task(&mut self, status: TaskStatus, payload: &str) {
        let id = payload.trim();
        if id.is_empty() {
            return;
        }
        let id = TaskId::from(id);
        if self.board.find(&id).is_none() {
            debug!(%id, "dropped payload does not match a task");
            return;
        }
        self.move_task(&id, status);
    }

    pub fn delete_task(&mut self, id: &TaskId, prompter: &mut dyn Prompter) {
        if self.board.find(id).is_none() {
            return;
        }
        if !prompter.confirm(DELETE_CONFIRM) {
            return;
        }
        let api = Arc::clone(&self.api);
        let id = id.clone();
        self.spawn(async move {
            let result = api.delete(&id).await;
            Some(Outcome::Deleted { id, result })
        });
    }

    /// Applies every completion that has already arrived. Returns whether any did.
    pub fn drain(&mut self) -> bool {
        let mut applied = false;
        while let Ok(message) = self.rx.try_recv() {
            self.complete(message);
            applied = true;
        }
        applied
    }

    /// Waits until nothing is in flight, applying completions in arrival order.
    pub async fn settle(&mut self) {
        while self.pending > 0 {
            match self.rx.recv().await {
                Some(message) => self.complete(message),
                None => break,
            }
        }
    }

    fn update(
        &mut self,
        id: TaskId,
        patch: TaskPatch,
        outcome: fn(Result<Task, ApiError>) -> Outcome,
    ) {
        debug!(%id, ?patch, "updating task");
        let api = Arc::clone(&self.api);
        self.spawn(async move { Some(outcome(api.update(&id, &patch).await)) });
    }

    fn spawn<F>(&mut self, request: F)
    where
        F: std::future::Future<Output = Option<Outcome>> + Send + 'static,
    {
        self.pending += 1;
        let tx = self.tx.clone();
        let request = self.runtime.spawn(request);
        self.runtime.spawn(async move {
            let message = request.await.unwrap_or_else(|e| {
                warn!("request task failed: {}", e);
                None
            });
            let _ = tx.send(message);
        });
    }

    fn complete(&mut self, message: Option<Outcome>) {
        self.pending = self.pending.saturating_sub(1);
        match message {
            Some(Outcome::Loaded(_)) if self.teardown.is_cancelled() => {
                debug!("discarding task list that arrived after teardown");
            }
            Some(outcome) => self.board.apply(outcome),
            None => {}
        }
    }
}

impl<A: TaskApi> Drop for Controller<A> {
    fn drop(&mut self) {
        self.teardown.cancel();
    }
}
