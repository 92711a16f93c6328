use crate::task::{TaskId, TaskStatus};

/// Mouse drag in progress. The payload is the dragged task's id as plain text; it is
/// only resolved back to a task when dropped.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DragState {
    payload: Option<String>,
    over: Option<TaskStatus>,
}

impl DragState {
    pub fn start(&mut self, id: &TaskId) {
        self.payload = Some(id.to_string());
        self.over = None;
    }

    pub fn is_dragging(&self) -> bool {
        self.payload.is_some()
    }

    /// Pointer moved over a column (or entered it).
    pub fn over(&mut self, status: TaskStatus) {
        if self.is_dragging() {
            self.over = Some(status);
        }
    }

    /// Pointer left every column.
    pub fn leave(&mut self) {
        self.over = None;
    }

    pub fn is_over(&self, status: &TaskStatus) -> bool {
        self.over.as_ref() == Some(status)
    }

    /// Ends the drag and hands back the payload. The hover indicator is cleared whether
    /// or not the drop ends up doing anything.
    pub fn drop_payload(&mut self) -> Option<String> {
        self.over = None;
        self.payload.take()
    }

    pub fn cancel(&mut self) {
        self.payload = None;
        self.over = None;
    }
}
