// ABOUTME: Upload a local file to a host.
// ABOUTME: Rollback removes the uploaded file.

use super::{Context, Task, TaskError, run_on};
use crate::ssh::quote;
use async_trait::async_trait;
use std::fmt;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct CopyFile {
    host: String,
    src: PathBuf,
    dst: String,
}

impl CopyFile {
    pub fn new(host: impl Into<String>, src: impl Into<PathBuf>, dst: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            src: src.into(),
            dst: dst.into(),
        }
    }
}

#[async_trait]
impl Task for CopyFile {
    async fn execute(&self, ctx: &Context) -> Result<(), TaskError> {
        let executor = ctx.executor(&self.host)?;
        executor
            .upload(&self.src, &self.dst)
            .await
            .map_err(|e| TaskError::remote(&self.host, e))
    }

    async fn rollback(&self, ctx: &Context) -> Result<(), TaskError> {
        run_on(ctx, &self.host, &format!("rm -f {}", quote(&self.dst))).await?;
        Ok(())
    }
}

impl fmt::Display for CopyFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "CopyFile: local={}, remote={}:{}",
            self.src.display(),
            self.host,
            self.dst
        )
    }
}
