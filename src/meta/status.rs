// ABOUTME: Derived instance status shown to operators.
// ABOUTME: Unresolved is an explicit variant, never a magic string.

use serde::{Serialize, Serializer};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstanceStatus {
    Up,
    Healthy,
    Unhealthy,
    Offline,
    Tombstone,
    Disconnected,
    Down,
    /// A state word the managed system or process manager reported verbatim.
    State(String),
    /// Neither the membership view nor the process manager gave an answer.
    Unresolved,
}

impl InstanceStatus {
    /// Map a pd store `state_name` to a status.
    pub fn from_state_name(name: &str) -> Self {
        match name {
            "Up" => InstanceStatus::Up,
            "Offline" => InstanceStatus::Offline,
            "Tombstone" => InstanceStatus::Tombstone,
            "Disconnected" => InstanceStatus::Disconnected,
            "Down" => InstanceStatus::Down,
            "" => InstanceStatus::Unresolved,
            other => InstanceStatus::State(other.to_string()),
        }
    }

    pub fn is_resolved(&self) -> bool {
        !matches!(self, InstanceStatus::Unresolved)
    }

    pub fn as_str(&self) -> &str {
        match self {
            InstanceStatus::Up => "Up",
            InstanceStatus::Healthy => "Healthy",
            InstanceStatus::Unhealthy => "Unhealthy",
            InstanceStatus::Offline => "Offline",
            InstanceStatus::Tombstone => "Tombstone",
            InstanceStatus::Disconnected => "Disconnected",
            InstanceStatus::Down => "Down",
            InstanceStatus::State(state) => state,
            InstanceStatus::Unresolved => "-",
        }
    }
}

impl fmt::Display for InstanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for InstanceStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}
