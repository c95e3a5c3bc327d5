/// Local board state for drag-and-drop
///
/// Holds a board's tasks split into the three status columns and applies
/// edits optimistically, before the server has confirmed them. A drag runs in
/// three steps:
///
/// 1. [`BoardColumns::drag_start`] remembers the dragged task and its column.
/// 2. [`BoardColumns::drag_over`] is called as the pointer moves. It reorders
///    inside a column, or moves the task into another column in front of the
///    hovered task (or at the end when hovering the column itself).
/// 3. [`BoardColumns::drag_end`] returns the reorder calls to make: the
///    destination column always, plus the source column when the task left it.
///
/// # Example
///
/// ```no_run
/// use kanban_client::board_state::{BoardColumns, DropTarget};
/// use kanban_client::KanbanClient;
/// use kanban_shared::models::task::TaskStatus;
///
/// # async fn example(client: KanbanClient, board_id: i64) -> Result<(), kanban_client::ClientError> {
/// let mut columns = BoardColumns::from_tasks(client.list_tasks(board_id).await?);
///
/// columns.drag_start(12);
/// columns.drag_over(12, DropTarget::Column(TaskStatus::Done));
///
/// for request in columns.drag_end(true) {
///     client.reorder_tasks(&request).await?;
/// }
/// # Ok(())
/// # }
/// ```

use kanban_shared::models::task::{Task, TaskStatus};
use kanban_shared::reorder::ReorderRequest;

/// What the dragged task is hovering over
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropTarget {
    /// Another task card
    Task(i64),

    /// A column body (empty area or header)
    Column(TaskStatus),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Drag {
    task_id: i64,
    source: TaskStatus,
}

/// A board's tasks grouped by status, each column in display order
#[derive(Debug, Clone, Default)]
pub struct BoardColumns {
    columns: [Vec<Task>; 3],
    drag: Option<Drag>,
}

fn slot(status: TaskStatus) -> usize {
    match status {
        TaskStatus::Todo => 0,
        TaskStatus::InProgress => 1,
        TaskStatus::Done => 2,
    }
}

impl BoardColumns {
    /// Splits tasks into columns sorted by `order` (ties by ID)
    pub fn from_tasks(tasks: impl IntoIterator<Item = Task>) -> Self {
        let mut board = Self::default();

        for task in tasks {
            board.columns[slot(task.status)].push(task);
        }
        for column in &mut board.columns {
            column.sort_by_key(|t| (t.order, t.id));
        }

        board
    }

    /// Tasks in one column, top to bottom
    pub fn column(&self, status: TaskStatus) -> &[Task] {
        &self.columns[slot(status)]
    }

    /// Columns in display order with their headings
    pub fn columns(&self) -> impl Iterator<Item = (TaskStatus, &'static str, &[Task])> + '_ {
        TaskStatus::ALL
            .into_iter()
            .map(move |status| (status, status.title(), self.column(status)))
    }

    /// Task IDs in one column, top to bottom
    pub fn column_ids(&self, status: TaskStatus) -> Vec<i64> {
        self.column(status).iter().map(|t| t.id).collect()
    }

    /// Column currently holding `task_id`
    pub fn find_column(&self, task_id: i64) -> Option<TaskStatus> {
        TaskStatus::ALL
            .into_iter()
            .find(|status| self.column(*status).iter().any(|t| t.id == task_id))
    }

    pub fn find_task(&self, task_id: i64) -> Option<&Task> {
        self.columns.iter().flatten().find(|t| t.id == task_id)
    }

    /// Adds a freshly created task to the end of its column
    pub fn insert(&mut self, task: Task) {
        self.columns[slot(task.status)].push(task);
    }

    /// Drops a deleted task
    pub fn remove(&mut self, task_id: i64) -> Option<Task> {
        let status = self.find_column(task_id)?;
        let column = &mut self.columns[slot(status)];
        let index = column.iter().position(|t| t.id == task_id)?;

        Some(column.remove(index))
    }

    /// Applies a task returned by an update
    ///
    /// Replaced in place when its status is unchanged, otherwise moved to the
    /// end of its new column.
    pub fn apply_updated(&mut self, task: Task) {
        let column = &mut self.columns[slot(task.status)];

        if let Some(existing) = column.iter_mut().find(|t| t.id == task.id) {
            *existing = task;
            return;
        }

        self.remove(task.id);
        self.insert(task);
    }

    /// Starts dragging `task_id`; `false` if it is not on the board
    pub fn drag_start(&mut self, task_id: i64) -> bool {
        self.drag = self
            .find_column(task_id)
            .map(|source| Drag { task_id, source });

        self.drag.is_some()
    }

    /// Moves the dragged task as the pointer passes over `target`
    ///
    /// Returns `true` when the columns changed.
    pub fn drag_over(&mut self, task_id: i64, target: DropTarget) -> bool {
        if target == DropTarget::Task(task_id) {
            return false;
        }

        let Some(from) = self.find_column(task_id) else {
            return false;
        };
        let to = match target {
            DropTarget::Column(status) => status,
            DropTarget::Task(over_id) => match self.find_column(over_id) {
                Some(status) => status,
                None => return false,
            },
        };

        if from == to {
            let DropTarget::Task(over_id) = target else {
                return false;
            };

            let column = &mut self.columns[slot(from)];
            let (Some(old_index), Some(new_index)) = (
                column.iter().position(|t| t.id == task_id),
                column.iter().position(|t| t.id == over_id),
            ) else {
                return false;
            };

            let task = column.remove(old_index);
            column.insert(new_index, task);
            return true;
        }

        let Some(mut task) = self.remove(task_id) else {
            return false;
        };
        task.status = to;

        let column = &mut self.columns[slot(to)];
        let index = match target {
            DropTarget::Task(over_id) => column
                .iter()
                .position(|t| t.id == over_id)
                .unwrap_or(column.len()),
            DropTarget::Column(_) => column.len(),
        };
        column.insert(index, task);

        true
    }

    /// Finishes the drag and returns the reorder requests to send
    ///
    /// `dropped` is `false` when the task was released outside any target;
    /// nothing is sent then. Affected columns are renumbered locally to match
    /// what the server will store.
    pub fn drag_end(&mut self, dropped: bool) -> Vec<ReorderRequest> {
        let Some(drag) = self.drag.take() else {
            return Vec::new();
        };
        if !dropped {
            return Vec::new();
        }
        let Some(destination) = self.find_column(drag.task_id) else {
            return Vec::new();
        };

        let mut affected = vec![destination];
        if drag.source != destination {
            affected.push(drag.source);
        }

        affected
            .into_iter()
            .map(|status| {
                self.renumber(status);
                ReorderRequest {
                    status,
                    task_ids: self.column_ids(status),
                }
            })
            .collect()
    }

    /// Whether a drag is in progress
    pub fn dragging(&self) -> Option<i64> {
        self.drag.map(|d| d.task_id)
    }

    fn renumber(&mut self, status: TaskStatus) {
        for (index, task) in self.columns[slot(status)].iter_mut().enumerate() {
            task.status = status;
            task.order = i32::try_from(index).unwrap_or(i32::MAX);
        }
    }
}
