// ABOUTME: Diagnostics accumulator for non-fatal warnings during an operation.
// ABOUTME: Shared by concurrent status queries; shown to the user once the operation ends.

use parking_lot::Mutex;

/// Collects non-fatal warnings during cluster operations.
#[derive(Debug, Default)]
pub struct Diagnostics {
    warnings: Mutex<Vec<Warning>>,
}

impl Diagnostics {
    /// Record a warning, auto-logging it via tracing.
    pub fn warn(&self, warning: Warning) {
        tracing::warn!("{}", warning.message);
        self.warnings.lock().push(warning);
    }

    /// Snapshot of all collected warnings, in the order they were recorded.
    pub fn warnings(&self) -> Vec<Warning> {
        self.warnings.lock().clone()
    }

    /// Check if any warnings were collected.
    pub fn has_warnings(&self) -> bool {
        !self.warnings.lock().is_empty()
    }
}

/// A non-fatal warning collected during an operation.
#[derive(Debug, Clone)]
pub struct Warning {
    pub kind: WarningKind,
    pub message: String,
}

impl Warning {
    /// Live status for an instance could not be determined.
    pub fn status_unresolved(message: impl Into<String>) -> Self {
        Self {
            kind: WarningKind::StatusUnresolved,
            message: message.into(),
        }
    }

    /// Automatic tombstone removal did not run.
    pub fn tombstone_check_skipped(message: impl Into<String>) -> Self {
        Self {
            kind: WarningKind::TombstoneCheckSkipped,
            message: message.into(),
        }
    }

    /// Create an SSH disconnect warning.
    pub fn ssh_disconnect(message: impl Into<String>) -> Self {
        Self {
            kind: WarningKind::SshDisconnect,
            message: message.into(),
        }
    }
}

/// Categories of warnings that can occur during an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningKind {
    /// Neither the membership view nor the process manager answered.
    StatusUnresolved,
    /// Failed to cleanly disconnect SSH session.
    SshDisconnect,
    /// Membership or quorum checks failed, so tombstones were left in place.
    TombstoneCheckSkipped,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn diagnostics_starts_empty() {
        let diag = Diagnostics::default();
        assert!(!diag.has_warnings());
        assert!(diag.warnings().is_empty());
    }

    #[test]
    fn diagnostics_collects_warnings() {
        let diag = Diagnostics::default();

        diag.warn(Warning::status_unresolved("10.0.1.4:20160: no executor"));
        diag.warn(Warning::ssh_disconnect("connection reset"));

        assert!(diag.has_warnings());
        let kinds: Vec<_> = diag.warnings().iter().map(|w| w.kind).collect();
        assert_eq!(
            kinds,
            vec![WarningKind::StatusUnresolved, WarningKind::SshDisconnect]
        );
    }

    #[tokio::test]
    async fn concurrent_writers_each_land_once() {
        let diag = Arc::new(Diagnostics::default());
        let handles: Vec<_> = (0..16)
            .map(|i| {
                let diag = Arc::clone(&diag);
                tokio::spawn(async move {
                    diag.warn(Warning::status_unresolved(format!("node {i}")));
                })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap();
        }
        assert_eq!(diag.warnings().len(), 16);
    }
}
