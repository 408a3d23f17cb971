// ABOUTME: Discrete, revertible units of remote work and the pipeline that sequences them.
// ABOUTME: Every task executes against a Context and knows how (or whether) to undo itself.

mod builder;
mod context;
mod copy_file;
mod destroy;
mod error;
mod init_config;
mod mkdir;
mod pipeline;
mod systemctl;

pub use builder::Builder;
pub use context::{Context, SshKeySet, SshOptions};
pub use copy_file::CopyFile;
pub use destroy::DestroyInstance;
pub use error::{PipelineError, RollbackFailure, TaskError, TaskErrorKind};
pub use init_config::InitConfig;
pub use mkdir::Mkdir;
pub use pipeline::Serial;
pub use systemctl::{ServiceAction, SystemCtl};

use crate::ssh::CommandOutput;
use async_trait::async_trait;
use std::fmt;

/// One planned action against the cluster.
///
/// `Display` describes the task for logs and error reports.
#[async_trait]
pub trait Task: fmt::Display + Send + Sync {
    /// Perform the action. Safe to retry after a failure.
    async fn execute(&self, ctx: &Context) -> Result<(), TaskError>;

    /// Undo a prior successful `execute`.
    ///
    /// Tasks without a sensible undo return [`TaskError::UnsupportedRollback`].
    async fn rollback(&self, ctx: &Context) -> Result<(), TaskError>;
}

/// Run `command` on `host`, attaching the host to any failure.
pub(crate) async fn run_on(
    ctx: &Context,
    host: &str,
    command: &str,
) -> Result<CommandOutput, TaskError> {
    let executor = ctx.executor(host)?;
    executor
        .run(command)
        .await
        .map_err(|e| TaskError::remote(host, e))
}
