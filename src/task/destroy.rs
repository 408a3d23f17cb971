// ABOUTME: Permanently remove an instance from its host.
// ABOUTME: Stops the service unless its unit is already gone, then deletes unit file and dirs.

use super::{Context, Task, TaskError, run_on};
use crate::executor::ExecError;
use crate::meta::Instance;
use crate::ssh::quote;
use async_trait::async_trait;
use std::fmt;

const UNIT_DIR: &str = "/etc/systemd/system";

/// `systemctl stop` exit status when the unit is not loaded.
const UNIT_NOT_LOADED: u32 = 5;

#[derive(Debug, Clone)]
pub struct DestroyInstance {
    instance: Instance,
}

impl DestroyInstance {
    pub fn new(instance: Instance) -> Self {
        Self { instance }
    }

    pub fn instance(&self) -> &Instance {
        &self.instance
    }
}

#[async_trait]
impl Task for DestroyInstance {
    async fn execute(&self, ctx: &Context) -> Result<(), TaskError> {
        let host = self.instance.host();
        let service = quote(&self.instance.service_name());

        match run_on(ctx, host, &format!("sudo -n systemctl stop {service}")).await {
            Ok(_) => {}
            // Already destroyed, or never installed: nothing left running.
            Err(TaskError::RemoteActionFailed {
                source:
                    ExecError::NonZeroExit {
                        exit_code: UNIT_NOT_LOADED,
                        ..
                    },
                ..
            }) => {
                tracing::debug!(
                    "{} {} has no loaded unit, skipping stop",
                    self.instance.role(),
                    self.instance.id()
                );
            }
            Err(e) => return Err(e),
        }

        let mut paths: Vec<String> = self.instance.used_dirs().into_iter().map(quote).collect();
        paths.push(quote(&format!(
            "{}/{}",
            UNIT_DIR,
            self.instance.service_name()
        )));
        run_on(
            ctx,
            host,
            &format!(
                "sudo -n rm -rf {} && sudo -n systemctl daemon-reload",
                paths.join(" ")
            ),
        )
        .await?;

        tracing::info!("destroyed {} {}", self.instance.role(), self.instance.id());
        Ok(())
    }

    async fn rollback(&self, _ctx: &Context) -> Result<(), TaskError> {
        Err(TaskError::unsupported_rollback(self))
    }
}

impl fmt::Display for DestroyInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "DestroyInstance: role={}, id={}, dirs={}",
            self.instance.role(),
            self.instance.id(),
            self.instance.used_dirs().join(",")
        )
    }
}
