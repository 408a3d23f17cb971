// ABOUTME: Resolves an instance's status from the membership view, then the process manager.
// ABOUTME: Best-effort: every failure degrades to Unresolved and is recorded as a warning.

use crate::diagnostics::{Diagnostics, Warning};
use crate::executor::{ExecError, RemoteExecutor};
use crate::meta::{Instance, InstanceStatus};
use crate::pd::MembershipSnapshot;
use crate::ssh::quote;
use crate::task::Context;

/// Ask the host's process manager for the `Active:` line of a service.
pub async fn service_status(
    executor: &dyn RemoteExecutor,
    service: &str,
) -> Result<String, ExecError> {
    let command = format!(
        "systemctl --no-pager status {} | grep 'Active:'",
        quote(service)
    );
    let output = executor.run(&command).await?;
    Ok(output.stdout)
}

/// Extract the running-state word from process manager output.
///
/// `"Active: active (running) since ..."` yields `Up`; any other state word is
/// passed through. Output without a usable `Active:` line yields `None`.
pub fn parse_service_state(text: &str) -> Option<InstanceStatus> {
    let start = text.find("Active:")?;
    let fields: Vec<&str> = text[start..].split_whitespace().collect();
    if fields.len() <= 2 {
        return None;
    }
    match fields[1] {
        "active" => Some(InstanceStatus::Up),
        state => Some(InstanceStatus::State(state.to_string())),
    }
}

/// Status of `instance` for display.
///
/// Prefers the membership view; when it has no answer, queries the process
/// manager on the instance's host. Never fails.
pub async fn reconcile_status(
    ctx: &Context,
    instance: &Instance,
    membership: &MembershipSnapshot,
    diag: &Diagnostics,
) -> InstanceStatus {
    let status = instance.status(membership);
    if status.is_resolved() {
        return status;
    }

    let Some(executor) = ctx.get_executor(instance.host()) else {
        diag.warn(Warning::status_unresolved(format!(
            "{}: no executor registered for host {}",
            instance.id(),
            instance.host()
        )));
        return InstanceStatus::Unresolved;
    };

    match service_status(executor.as_ref(), &instance.service_name()).await {
        Ok(text) => parse_service_state(&text).unwrap_or_else(|| {
            diag.warn(Warning::status_unresolved(format!(
                "{}: unexpected process manager output {:?}",
                instance.id(),
                text.trim()
            )));
            InstanceStatus::Unresolved
        }),
        Err(e) => {
            diag.warn(Warning::status_unresolved(format!(
                "{}: failed to query {}: {}",
                instance.id(),
                instance.service_name(),
                e
            )));
            InstanceStatus::Unresolved
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_status_text_is_up() {
        let text = "● foo.service - foo\n   Loaded: loaded (/etc/systemd/system/foo.service)\n   Active: active (running) since Mon 2020-01-06 10:00:00 UTC; 1h ago\n";
        assert_eq!(parse_service_state(text), Some(InstanceStatus::Up));
    }

    #[test]
    fn single_line_status_is_up() {
        let text = "● foo.service - ... Active: active (running)";
        assert_eq!(parse_service_state(text), Some(InstanceStatus::Up));
    }

    #[test]
    fn other_state_words_pass_through() {
        let text = "   Active: inactive (dead) since Tue 2020-01-07";
        assert_eq!(
            parse_service_state(text),
            Some(InstanceStatus::State("inactive".to_string()))
        );
    }

    #[test]
    fn short_or_missing_output_is_unparsed() {
        assert_eq!(parse_service_state(""), None);
        assert_eq!(parse_service_state("Active: active"), None);
        assert_eq!(parse_service_state("Unit foo.service could not be found."), None);
    }
}
