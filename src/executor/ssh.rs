// ABOUTME: RemoteExecutor backed by an SSH session.
// ABOUTME: Connects lazily on first use and reuses the session for later calls.

use super::{ExecError, RemoteExecutor};
use crate::ssh::{CommandOutput, Session, SessionConfig};
use async_trait::async_trait;
use std::path::Path;
use tokio::sync::OnceCell;

/// Executor for one host reached over SSH.
#[derive(Debug)]
pub struct SshExecutor {
    config: SessionConfig,
    session: OnceCell<Session>,
}

impl SshExecutor {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            config,
            session: OnceCell::new(),
        }
    }

    async fn session(&self) -> Result<&Session, ExecError> {
        let session = self
            .session
            .get_or_try_init(|| async {
                tracing::debug!(host = %self.config.host, "opening SSH session");
                Session::connect(self.config.clone()).await
            })
            .await?;
        Ok(session)
    }
}

#[async_trait]
impl RemoteExecutor for SshExecutor {
    fn host(&self) -> &str {
        &self.config.host
    }

    async fn run(&self, command: &str) -> Result<CommandOutput, ExecError> {
        tracing::debug!(host = %self.config.host, command, "running remote command");
        let output = self.session().await?.exec(command).await?;
        if !output.success() {
            return Err(ExecError::non_zero(command, &output));
        }
        Ok(output)
    }

    async fn upload(&self, local_path: &Path, remote_path: &str) -> Result<(), ExecError> {
        tracing::debug!(
            host = %self.config.host,
            local = %local_path.display(),
            remote = remote_path,
            "uploading file"
        );
        self.session().await?.upload(local_path, remote_path).await?;
        Ok(())
    }

    async fn close(&self) -> Result<(), ExecError> {
        if let Some(session) = self.session.get() {
            tracing::debug!(host = %self.config.host, "closing SSH session");
            session.disconnect().await?;
        }
        Ok(())
    }
}
