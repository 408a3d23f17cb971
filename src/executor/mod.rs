// ABOUTME: Capability abstraction for running commands and transferring files on one host.
// ABOUTME: Tasks and status queries reach remote hosts only through RemoteExecutor.

mod ssh;

pub use ssh::SshExecutor;

use crate::ssh::CommandOutput;
use async_trait::async_trait;
use std::path::Path;

/// Run commands and upload files on a single remote host.
#[async_trait]
pub trait RemoteExecutor: Send + Sync {
    /// The host this executor targets.
    fn host(&self) -> &str;

    /// Run a shell command. A non-zero exit status is an error.
    async fn run(&self, command: &str) -> Result<CommandOutput, ExecError>;

    /// Copy a local file to `remote_path` on the host.
    async fn upload(&self, local_path: &Path, remote_path: &str) -> Result<(), ExecError>;

    /// Release the underlying connection, if any.
    async fn close(&self) -> Result<(), ExecError> {
        Ok(())
    }
}

/// Errors from a remote executor.
#[derive(Debug, thiserror::Error)]
pub enum ExecError {
    #[error("SSH error: {0}")]
    Ssh(#[from] crate::ssh::Error),

    #[error("`{command}` exited with status {exit_code}: {stderr}")]
    NonZeroExit {
        command: String,
        exit_code: u32,
        stderr: String,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ExecError {
    /// Whether the failure was a timeout rather than a definite failure.
    pub fn is_timeout(&self) -> bool {
        matches!(self, ExecError::Ssh(e) if e.is_timeout())
    }

    /// Build the error for a command that completed with a failing status.
    pub fn non_zero(command: &str, output: &CommandOutput) -> Self {
        ExecError::NonZeroExit {
            command: command.to_string(),
            exit_code: output.exit_code,
            stderr: output.stderr.trim().to_string(),
        }
    }
}
