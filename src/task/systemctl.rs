// ABOUTME: Drive a service through the host's process manager.
// ABOUTME: Start/stop and enable/disable undo each other; restart cannot be undone.

use super::{Context, Task, TaskError, run_on};
use crate::ssh::quote;
use async_trait::async_trait;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceAction {
    Start,
    Stop,
    Restart,
    Enable,
    Disable,
}

impl ServiceAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceAction::Start => "start",
            ServiceAction::Stop => "stop",
            ServiceAction::Restart => "restart",
            ServiceAction::Enable => "enable",
            ServiceAction::Disable => "disable",
        }
    }

    /// The action that undoes this one.
    pub fn inverse(&self) -> Option<ServiceAction> {
        match self {
            ServiceAction::Start => Some(ServiceAction::Stop),
            ServiceAction::Stop => Some(ServiceAction::Start),
            ServiceAction::Enable => Some(ServiceAction::Disable),
            ServiceAction::Disable => Some(ServiceAction::Enable),
            ServiceAction::Restart => None,
        }
    }
}

impl fmt::Display for ServiceAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct SystemCtl {
    host: String,
    service: String,
    action: ServiceAction,
}

impl SystemCtl {
    pub fn new(host: impl Into<String>, service: impl Into<String>, action: ServiceAction) -> Self {
        Self {
            host: host.into(),
            service: service.into(),
            action,
        }
    }

    fn command(&self, action: ServiceAction) -> String {
        format!(
            "sudo -n systemctl daemon-reload && sudo -n systemctl {} {}",
            action,
            quote(&self.service)
        )
    }
}

#[async_trait]
impl Task for SystemCtl {
    async fn execute(&self, ctx: &Context) -> Result<(), TaskError> {
        run_on(ctx, &self.host, &self.command(self.action)).await?;
        Ok(())
    }

    async fn rollback(&self, ctx: &Context) -> Result<(), TaskError> {
        let inverse = self
            .action
            .inverse()
            .ok_or_else(|| TaskError::unsupported_rollback(self))?;
        run_on(ctx, &self.host, &self.command(inverse)).await?;
        Ok(())
    }
}

impl fmt::Display for SystemCtl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "SystemCtl: host={}, action={} {}",
            self.host, self.action, self.service
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inverse_pairs_are_symmetric() {
        for action in [
            ServiceAction::Start,
            ServiceAction::Stop,
            ServiceAction::Enable,
            ServiceAction::Disable,
        ] {
            let inverse = action.inverse().unwrap();
            assert_eq!(inverse.inverse(), Some(action));
        }
        assert_eq!(ServiceAction::Restart.inverse(), None);
    }

    #[tokio::test]
    async fn restart_rollback_is_unsupported_without_executor() {
        let task = SystemCtl::new("10.0.1.4", "tikv-20160.service", ServiceAction::Restart);
        let err = task.rollback(&Context::default()).await.unwrap_err();
        assert_eq!(err.kind(), super::super::TaskErrorKind::UnsupportedRollback);
    }
}
