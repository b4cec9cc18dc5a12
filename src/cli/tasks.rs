//! Tasks command implementation.

use std::sync::{Arc, Mutex, PoisonError};

use crate::cli::CommandContext;
use crate::cli::args::TasksCommand;
use crate::core::models::{TaskPlan, TaskRunReport};
use crate::core::tasks::{TaskContext, TaskExecutor, TaskManager, TaskStatus, decompose_request};
use crate::error::{KolgateError, Result};
use crate::render::human;

/// Walks the subtasks in order, yielding to the runtime between steps.
#[derive(Debug, Clone, Copy, Default)]
pub struct StepExecutor {
    /// 1-based subtask at which execution fails.
    pub fail_at: Option<usize>,
}

impl TaskExecutor for StepExecutor {
    async fn execute(&self, ctx: TaskContext) -> anyhow::Result<Option<String>> {
        let total = ctx.subtasks().len();
        for (index, description) in ctx.subtasks().iter().enumerate() {
            ctx.start_subtask(index)?;
            tokio::task::yield_now().await;
            if self.fail_at == Some(index + 1) {
                ctx.fail_subtask(index)?;
                anyhow::bail!("subtask {} failed: {description}", index + 1);
            }
            ctx.complete_subtask(index)?;
        }
        Ok(Some(format!("{total} subtask(s) completed")))
    }
}

/// Split `request` without running it.
#[must_use]
pub fn plan(request: &str) -> TaskPlan {
    TaskPlan {
        request: request.to_string(),
        subtasks: decompose_request(request),
    }
}

/// Run `request` on a fresh manager, collecting every notification.
///
/// `on_update` sees each notification as it happens.
///
/// # Errors
///
/// Returns an error if the task lifecycle is violated.
pub async fn run<E, F>(request: &str, executor: &E, on_update: F) -> Result<TaskRunReport>
where
    E: TaskExecutor,
    F: Fn(&crate::core::tasks::TaskUpdate) + Send + 'static,
{
    let manager = TaskManager::new();
    let updates = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&updates);
    let subscription = manager.on_update(move |update| {
        on_update(update);
        sink.lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(update.clone());
    });

    let task = manager.run(request, executor).await?;
    subscription.unsubscribe();

    let updates = std::mem::take(&mut *updates.lock().unwrap_or_else(PoisonError::into_inner));
    Ok(TaskRunReport { task, updates })
}

/// Execute a tasks subcommand.
///
/// # Errors
///
/// A failed task is reported and then returned as an error (exit code 1).
pub async fn execute(command: &TasksCommand, ctx: &CommandContext) -> Result<()> {
    match command {
        TasksCommand::Plan { request } => {
            ctx.emit("tasks.plan", &plan(request), human::render_plan)
        }
        TasksCommand::Run { request, fail_at } => {
            let executor = StepExecutor { fail_at: *fail_at };
            let stream = !ctx.options.is_json();
            let no_color = ctx.options.no_color;
            let report = run(request, &executor, move |update| {
                if stream {
                    print!("{}", human::render_task_update(update, no_color));
                }
            })
            .await?;

            ctx.emit("tasks.run", &report, human::render_task_run)?;
            if report.task.status == TaskStatus::Failed {
                let reason = report.task.error.clone().unwrap_or_default();
                return Err(KolgateError::Other(anyhow::anyhow!("task failed: {reason}")));
            }
            Ok(())
        }
    }
}
