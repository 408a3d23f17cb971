// ABOUTME: Linear task pipeline with early abort and reverse-order unwind.
// ABOUTME: The forward error is always reported; rollback failures are collected alongside it.

use super::error::{PipelineError, RollbackFailure, TaskError};
use super::{Context, Task};
use async_trait::async_trait;
use std::fmt;

/// Tasks executed strictly one after another.
#[derive(Default)]
pub struct Serial {
    tasks: Vec<Box<dyn Task>>,
}

impl Serial {
    pub fn new(tasks: Vec<Box<dyn Task>>) -> Self {
        Self { tasks }
    }

    pub fn push(&mut self, task: Box<dyn Task>) {
        self.tasks.push(task);
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Execute every task in order.
    ///
    /// On the first failure, tasks that already succeeded are rolled back in
    /// reverse order. A failed rollback does not stop earlier tasks from being
    /// rolled back.
    pub async fn run(&self, ctx: &Context) -> Result<(), PipelineError> {
        for (index, task) in self.tasks.iter().enumerate() {
            tracing::info!("+ [{}/{}] {}", index + 1, self.tasks.len(), task);

            if let Err(source) = task.execute(ctx).await {
                tracing::warn!("task {} failed: {}", task, source);
                let rollback_failures = self.unwind(ctx, index).await;
                return Err(PipelineError {
                    failed_index: index,
                    failed_task: task.to_string(),
                    source,
                    rollback_failures,
                });
            }
        }
        Ok(())
    }

    /// Roll back tasks `0..end` in reverse order.
    async fn unwind(&self, ctx: &Context, end: usize) -> Vec<RollbackFailure> {
        let mut failures = Vec::new();
        for index in (0..end).rev() {
            let task = &self.tasks[index];
            tracing::info!("- rolling back {}", task);
            if let Err(error) = task.rollback(ctx).await {
                tracing::warn!("rollback of {} failed: {}", task, error);
                failures.push(RollbackFailure {
                    index,
                    task: task.to_string(),
                    error,
                });
            }
        }
        failures
    }
}

impl fmt::Display for Serial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Serial: {} task(s)", self.tasks.len())
    }
}

#[async_trait]
impl Task for Serial {
    async fn execute(&self, ctx: &Context) -> Result<(), TaskError> {
        self.run(ctx)
            .await
            .map_err(|e| TaskError::Pipeline(Box::new(e)))
    }

    async fn rollback(&self, ctx: &Context) -> Result<(), TaskError> {
        let failures = self.unwind(ctx, self.tasks.len()).await;
        if failures.is_empty() {
            Ok(())
        } else {
            Err(TaskError::RollbackIncomplete(failures))
        }
    }
}
