// ABOUTME: Create directories on a host.
// ABOUTME: No rollback: the directories may have existed before.

use super::{Context, Task, TaskError, run_on};
use crate::ssh::quote;
use async_trait::async_trait;
use std::fmt;

#[derive(Debug, Clone)]
pub struct Mkdir {
    host: String,
    dirs: Vec<String>,
}

impl Mkdir {
    pub fn new(host: impl Into<String>, dirs: Vec<String>) -> Self {
        Self {
            host: host.into(),
            dirs,
        }
    }
}

#[async_trait]
impl Task for Mkdir {
    async fn execute(&self, ctx: &Context) -> Result<(), TaskError> {
        if self.dirs.is_empty() {
            return Ok(());
        }
        let dirs: Vec<String> = self.dirs.iter().map(|d| quote(d)).collect();
        run_on(ctx, &self.host, &format!("mkdir -p {}", dirs.join(" "))).await?;
        Ok(())
    }

    async fn rollback(&self, _ctx: &Context) -> Result<(), TaskError> {
        Err(TaskError::unsupported_rollback(self))
    }
}

impl fmt::Display for Mkdir {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Mkdir: host={}, dirs={}", self.host, self.dirs.join(","))
    }
}
