// ABOUTME: Error types for task execution and pipeline unwinding.
// ABOUTME: Remote failures carry the host; pipeline failures keep the cause and every rollback failure.

use crate::executor::ExecError;
use std::fmt;
use std::path::PathBuf;

/// Errors from a single task.
#[derive(Debug, thiserror::Error)]
pub enum TaskError {
    #[error("no executor registered for host {host}")]
    NoExecutor { host: String },

    #[error("rollback is not supported for {task}")]
    UnsupportedRollback { task: String },

    #[error("remote action on {host} failed: {source}")]
    RemoteActionFailed {
        host: String,
        #[source]
        source: ExecError,
    },

    #[error("no SSH key set configured")]
    MissingSshKeySet,

    #[error("SSH key set is already configured with {0}")]
    SshKeySetConflict(PathBuf),

    #[error("failed to prepare {path}: {source}")]
    Local {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Pipeline(Box<PipelineError>),

    #[error("rollback incomplete: {}", format_failures(.0))]
    RollbackIncomplete(Vec<RollbackFailure>),
}

/// Error kind for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskErrorKind {
    /// Host has no registered executor; a configuration error, never retried.
    NoExecutor,
    /// The task declares no undo.
    UnsupportedRollback,
    /// A command or transfer failed on one host.
    RemoteActionFailed,
    /// The context was configured inconsistently.
    Configuration,
    /// Preparing local files failed.
    Local,
    /// A nested pipeline failed.
    Pipeline,
}

impl TaskError {
    pub fn kind(&self) -> TaskErrorKind {
        match self {
            TaskError::NoExecutor { .. } => TaskErrorKind::NoExecutor,
            TaskError::UnsupportedRollback { .. } => TaskErrorKind::UnsupportedRollback,
            TaskError::RemoteActionFailed { .. } => TaskErrorKind::RemoteActionFailed,
            TaskError::MissingSshKeySet | TaskError::SshKeySetConflict(_) => {
                TaskErrorKind::Configuration
            }
            TaskError::Local { .. } => TaskErrorKind::Local,
            TaskError::Pipeline(_) | TaskError::RollbackIncomplete(_) => TaskErrorKind::Pipeline,
        }
    }

    pub fn remote(host: impl Into<String>, source: ExecError) -> Self {
        TaskError::RemoteActionFailed {
            host: host.into(),
            source,
        }
    }

    pub fn unsupported_rollback(task: &impl fmt::Display) -> Self {
        TaskError::UnsupportedRollback {
            task: task.to_string(),
        }
    }

    /// Whether retrying the same task might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, TaskError::RemoteActionFailed { source, .. } if source.is_timeout())
    }

    /// The host a remote failure happened on.
    pub fn host(&self) -> Option<&str> {
        match self {
            TaskError::NoExecutor { host } | TaskError::RemoteActionFailed { host, .. } => {
                Some(host)
            }
            TaskError::Pipeline(err) => err.source.host(),
            _ => None,
        }
    }
}

/// A rollback that failed while unwinding a pipeline.
#[derive(Debug)]
pub struct RollbackFailure {
    pub index: usize,
    pub task: String,
    pub error: TaskError,
}

impl fmt::Display for RollbackFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "task {} ({}): {}", self.index, self.task, self.error)
    }
}

/// A pipeline stopped at a failing task and was unwound.
#[derive(Debug)]
pub struct PipelineError {
    /// Index of the task whose execute failed.
    pub failed_index: usize,
    pub failed_task: String,
    /// The forward error that stopped the pipeline.
    pub source: TaskError,
    /// Rollbacks that failed during the unwind, in the order attempted.
    pub rollback_failures: Vec<RollbackFailure>,
}

impl PipelineError {
    /// Whether every completed task was undone.
    pub fn fully_unwound(&self) -> bool {
        self.rollback_failures.is_empty()
    }
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "task {} ({}) failed: {}",
            self.failed_index, self.failed_task, self.source
        )?;
        if !self.rollback_failures.is_empty() {
            write!(
                f,
                "; rollback incomplete: {}",
                format_failures(&self.rollback_failures)
            )?;
        }
        Ok(())
    }
}

impl std::error::Error for PipelineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}

fn format_failures(failures: &[RollbackFailure]) -> String {
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
