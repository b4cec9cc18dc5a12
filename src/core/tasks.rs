//! Compound task tracking.
//!
//! A compound task is created from a natural-language request, split into
//! subtasks and driven by a [`TaskExecutor`]. Every mutation is published to
//! registered listeners in the order it happens.
//!
//! ## Lifecycle
//!
//! ```text
//! pending ──► in-progress ──► completed
//!    │              │
//!    └──────────────┴───────► failed
//! ```
//!
//! `completed` and `failed` are terminal. Failed tasks stay in history until
//! cleared; nothing is retried automatically and tasks cannot be cancelled.

use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Task identifier (UUID v4).
pub type TaskId = String;

// =============================================================================
// Status
// =============================================================================

/// Lifecycle state shared by tasks and subtasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskStatus {
    Pending,
    InProgress,
    Completed,
    Failed,
}

impl TaskStatus {
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    /// Pending or in progress.
    #[must_use]
    pub const fn is_active(self) -> bool {
        !self.is_terminal()
    }

    /// Whether `self -> next` is a legal transition.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::InProgress | Self::Failed)
                | (Self::InProgress, Self::Completed | Self::Failed)
        )
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in-progress",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Model
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subtask {
    pub description: String,
    pub status: TaskStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub request: String,
    pub status: TaskStatus,
    pub subtasks: Vec<Subtask>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Task {
    fn new(request: &str) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            request: request.to_string(),
            status: TaskStatus::Pending,
            subtasks: decompose_request(request)
                .into_iter()
                .map(|description| Subtask {
                    description,
                    status: TaskStatus::Pending,
                })
                .collect(),
            created_at: now,
            updated_at: now,
            result: None,
            error: None,
        }
    }
}

/// Lifecycle violations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TaskError {
    #[error("task not found: {0}")]
    NotFound(TaskId),

    #[error("task {id}: cannot move from {from} to {to}")]
    InvalidTransition {
        id: TaskId,
        from: TaskStatus,
        to: TaskStatus,
    },

    #[error("task {id} has no subtask #{index}")]
    SubtaskOutOfRange { id: TaskId, index: usize },

    #[error("task {id} is {status}; subtasks can only change while in-progress")]
    NotInProgress { id: TaskId, status: TaskStatus },

    #[error("task request is empty")]
    EmptyRequest,
}

// =============================================================================
// Updates
// =============================================================================

/// What changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum TaskChange {
    Created,
    Status { from: TaskStatus, to: TaskStatus },
    Subtask { index: usize, status: TaskStatus },
    Removed,
}

/// Notification delivered to listeners: the change and the task after it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskUpdate {
    pub change: TaskChange,
    pub task: Task,
}

type Listener = Box<dyn Fn(&TaskUpdate) + Send>;

#[derive(Default)]
struct Registry {
    tasks: Vec<Task>,
    listeners: Vec<(u64, Listener)>,
    next_listener: u64,
}

impl Registry {
    fn notify(&self, change: TaskChange, task: &Task) {
        if self.listeners.is_empty() {
            return;
        }
        let update = TaskUpdate {
            change,
            task: task.clone(),
        };
        for (_, listener) in &self.listeners {
            listener(&update);
        }
    }

    fn find_mut(&mut self, id: &str) -> Result<&mut Task, TaskError> {
        self.tasks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| TaskError::NotFound(id.to_string()))
    }

    fn remove_where(&mut self, status: TaskStatus) -> usize {
        let (removed, kept): (Vec<Task>, Vec<Task>) = std::mem::take(&mut self.tasks)
            .into_iter()
            .partition(|t| t.status == status);
        self.tasks = kept;
        for task in &removed {
            self.notify(TaskChange::Removed, task);
        }
        removed.len()
    }
}

/// Handle returned by [`TaskManager::on_update`].
///
/// Dropping the handle keeps the listener registered; call
/// [`Subscription::unsubscribe`] to remove it.
#[must_use = "keep the handle to be able to unsubscribe"]
pub struct Subscription {
    id: u64,
    registry: Weak<Mutex<Registry>>,
}

impl Subscription {
    /// Remove the listener. No-op if the manager is gone.
    pub fn unsubscribe(self) {
        if let Some(registry) = self.registry.upgrade() {
            let mut registry = registry.lock().unwrap_or_else(PoisonError::into_inner);
            registry.listeners.retain(|(id, _)| *id != self.id);
        }
    }
}

// =============================================================================
// Manager
// =============================================================================

/// In-memory task registry shared between a UI and executors.
///
/// Listeners run synchronously while the registry is locked, which keeps
/// delivery in mutation order. A listener must not call back into the
/// manager.
#[derive(Clone, Default)]
pub struct TaskManager {
    registry: Arc<Mutex<Registry>>,
}

impl std::fmt::Debug for TaskManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let registry = self.lock();
        f.debug_struct("TaskManager")
            .field("tasks", &registry.tasks.len())
            .field("listeners", &registry.listeners.len())
            .finish()
    }
}

impl TaskManager {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Registry> {
        self.registry.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a listener for every task mutation.
    pub fn on_update<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&TaskUpdate) + Send + 'static,
    {
        let mut registry = self.lock();
        let id = registry.next_listener;
        registry.next_listener += 1;
        registry.listeners.push((id, Box::new(listener)));
        Subscription {
            id,
            registry: Arc::downgrade(&self.registry),
        }
    }

    /// Track a new pending task for `request`.
    ///
    /// A blank request is tracked with no subtasks; [`TaskManager::run`]
    /// refuses to execute one.
    pub fn create(&self, request: &str) -> Task {
        let task = Task::new(request);
        tracing::info!(
            id = %task.id,
            subtasks = task.subtasks.len(),
            "Task created"
        );
        let mut registry = self.lock();
        registry.tasks.push(task.clone());
        registry.notify(TaskChange::Created, &task);
        task
    }

    fn transition(
        &self,
        id: &str,
        to: TaskStatus,
        apply: impl FnOnce(&mut Task),
    ) -> Result<Task, TaskError> {
        let mut registry = self.lock();
        let task = registry.find_mut(id)?;
        let from = task.status;
        if !from.can_transition_to(to) {
            return Err(TaskError::InvalidTransition {
                id: id.to_string(),
                from,
                to,
            });
        }
        task.status = to;
        task.updated_at = Utc::now();
        apply(task);
        let snapshot = task.clone();
        tracing::debug!(%id, %from, %to, "Task transition");
        registry.notify(TaskChange::Status { from, to }, &snapshot);
        Ok(snapshot)
    }

    /// Move a pending task to in-progress.
    ///
    /// # Errors
    ///
    /// `NotFound` for unknown ids, `InvalidTransition` if not pending.
    pub fn start(&self, id: &str) -> Result<Task, TaskError> {
        self.transition(id, TaskStatus::InProgress, |_| {})
    }

    /// Mark an in-progress task completed.
    ///
    /// # Errors
    ///
    /// `NotFound` for unknown ids, `InvalidTransition` if not in progress.
    pub fn complete(&self, id: &str, result: Option<String>) -> Result<Task, TaskError> {
        self.transition(id, TaskStatus::Completed, |task| task.result = result)
    }

    /// Mark a pending or in-progress task failed.
    ///
    /// # Errors
    ///
    /// `NotFound` for unknown ids, `InvalidTransition` if already terminal.
    pub fn fail(&self, id: &str, error: impl Into<String>) -> Result<Task, TaskError> {
        let error = error.into();
        let task = self.transition(id, TaskStatus::Failed, |task| {
            task.error = Some(error.clone());
        })?;
        tracing::warn!(%id, %error, "Task failed");
        Ok(task)
    }

    /// Move one subtask of an in-progress task.
    ///
    /// # Errors
    ///
    /// `NotInProgress`, `SubtaskOutOfRange`, or `InvalidTransition`.
    pub fn update_subtask(
        &self,
        id: &str,
        index: usize,
        status: TaskStatus,
    ) -> Result<Task, TaskError> {
        let mut registry = self.lock();
        let task = registry.find_mut(id)?;
        if task.status != TaskStatus::InProgress {
            return Err(TaskError::NotInProgress {
                id: id.to_string(),
                status: task.status,
            });
        }
        let subtask = task
            .subtasks
            .get_mut(index)
            .ok_or_else(|| TaskError::SubtaskOutOfRange {
                id: id.to_string(),
                index,
            })?;
        if !subtask.status.can_transition_to(status) {
            return Err(TaskError::InvalidTransition {
                id: format!("{id}#{index}"),
                from: subtask.status,
                to: status,
            });
        }
        subtask.status = status;
        task.updated_at = Utc::now();
        let snapshot = task.clone();
        registry.notify(TaskChange::Subtask { index, status }, &snapshot);
        Ok(snapshot)
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<Task> {
        self.lock().tasks.iter().find(|t| t.id == id).cloned()
    }

    /// All tracked tasks in creation order.
    #[must_use]
    pub fn all(&self) -> Vec<Task> {
        self.lock().tasks.clone()
    }

    fn filtered(&self, keep: impl Fn(TaskStatus) -> bool) -> Vec<Task> {
        self.lock()
            .tasks
            .iter()
            .filter(|t| keep(t.status))
            .cloned()
            .collect()
    }

    /// Pending and in-progress tasks.
    #[must_use]
    pub fn active(&self) -> Vec<Task> {
        self.filtered(TaskStatus::is_active)
    }

    #[must_use]
    pub fn completed(&self) -> Vec<Task> {
        self.filtered(|s| s == TaskStatus::Completed)
    }

    #[must_use]
    pub fn failed(&self) -> Vec<Task> {
        self.filtered(|s| s == TaskStatus::Failed)
    }

    /// Drop completed tasks. Returns how many were removed.
    pub fn clear_completed(&self) -> usize {
        let removed = self.lock().remove_where(TaskStatus::Completed);
        tracing::debug!(removed, "Cleared completed tasks");
        removed
    }

    /// Drop failed tasks. Returns how many were removed.
    pub fn clear_failed(&self) -> usize {
        let removed = self.lock().remove_where(TaskStatus::Failed);
        tracing::debug!(removed, "Cleared failed tasks");
        removed
    }

    /// Create a task for `request` and drive it to a terminal state.
    ///
    /// # Errors
    ///
    /// `EmptyRequest` if `request` has no subtasks (nothing is tracked), or
    /// an invalid transition if another caller moved the task to a terminal
    /// state while the executor was running.
    pub async fn run<E: TaskExecutor>(&self, request: &str, executor: &E) -> Result<Task, TaskError> {
        if decompose_request(request).is_empty() {
            return Err(TaskError::EmptyRequest);
        }
        let task = self.create(request);
        self.start(&task.id)?;

        let ctx = TaskContext {
            manager: self.clone(),
            task_id: task.id.clone(),
            request: task.request.clone(),
            subtasks: task.subtasks.iter().map(|s| s.description.clone()).collect(),
        };

        match executor.execute(ctx).await {
            Ok(result) => self.complete(&task.id, result),
            Err(err) => self.fail(&task.id, format!("{err:#}")),
        }
    }
}

// =============================================================================
// Executor
// =============================================================================

/// Handle given to an executor for one task.
#[derive(Debug, Clone)]
pub struct TaskContext {
    manager: TaskManager,
    task_id: TaskId,
    request: String,
    subtasks: Vec<String>,
}

impl TaskContext {
    #[must_use]
    pub fn id(&self) -> &str {
        &self.task_id
    }

    #[must_use]
    pub fn request(&self) -> &str {
        &self.request
    }

    /// Subtask descriptions in order.
    #[must_use]
    pub fn subtasks(&self) -> &[String] {
        &self.subtasks
    }

    /// # Errors
    ///
    /// See [`TaskManager::update_subtask`].
    pub fn start_subtask(&self, index: usize) -> Result<(), TaskError> {
        self.manager
            .update_subtask(&self.task_id, index, TaskStatus::InProgress)
            .map(drop)
    }

    /// # Errors
    ///
    /// See [`TaskManager::update_subtask`].
    pub fn complete_subtask(&self, index: usize) -> Result<(), TaskError> {
        self.manager
            .update_subtask(&self.task_id, index, TaskStatus::Completed)
            .map(drop)
    }

    /// # Errors
    ///
    /// See [`TaskManager::update_subtask`].
    pub fn fail_subtask(&self, index: usize) -> Result<(), TaskError> {
        self.manager
            .update_subtask(&self.task_id, index, TaskStatus::Failed)
            .map(drop)
    }
}

/// Performs the work behind a task. Suspension points are opaque to the
/// manager; only the calls made through [`TaskContext`] are observed.
pub trait TaskExecutor {
    /// Drive the task. `Ok` completes it with an optional result, `Err` fails it.
    fn execute(&self, ctx: TaskContext) -> impl Future<Output = anyhow::Result<Option<String>>> + Send;
}

// =============================================================================
// Decomposition
// =============================================================================

const THEN: &str = " then ";

/// Split a compound request into subtask descriptions.
///
/// Separators are newlines, `;`, and "then" (optionally preceded by "and").
/// A request without separators yields itself as the only subtask.
#[must_use]
pub fn decompose_request(request: &str) -> Vec<String> {
    let mut parts = Vec::new();
    for chunk in request.split(['\n', ';']) {
        split_on_then(chunk, &mut parts);
    }
    parts
}

fn split_on_then(chunk: &str, out: &mut Vec<String>) {
    // ASCII lowercasing keeps byte offsets aligned with `chunk`.
    let lower = chunk.to_ascii_lowercase();
    let mut start = 0;
    while let Some(pos) = lower[start..].find(THEN) {
        let at = start + pos;
        push_part(&chunk[start..at], out);
        start = at + THEN.len();
    }
    push_part(&chunk[start..], out);
}

fn push_part(piece: &str, out: &mut Vec<String>) {
    let mut piece = piece.trim();
    let tail = piece.len().checked_sub(4).and_then(|i| piece.get(i..));
    if tail.is_some_and(|t| t.eq_ignore_ascii_case(" and")) {
        piece = &piece[..piece.len() - 4];
    } else if piece.eq_ignore_ascii_case("and") {
        piece = "";
    }
    let piece = piece.trim().trim_end_matches(',').trim();
    if !piece.is_empty() {
        out.push(piece.to_string());
    }
}
