// ABOUTME: Cluster component roles and their startup dependency order.
// ABOUTME: Coordination (pd) starts first, monitoring last; stop order is the reverse.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Placement driver: coordination and membership metadata.
    Pd,
    /// Storage node, registered with pd as a store.
    Tikv,
    /// SQL gateway.
    Tidb,
    Prometheus,
    Grafana,
}

impl Role {
    /// Every role, in the order components must be started.
    pub const START_ORDER: [Role; 5] = [
        Role::Pd,
        Role::Tikv,
        Role::Tidb,
        Role::Prometheus,
        Role::Grafana,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Pd => "pd",
            Role::Tikv => "tikv",
            Role::Tidb => "tidb",
            Role::Prometheus => "prometheus",
            Role::Grafana => "grafana",
        }
    }

    /// Position of this role in [`Role::START_ORDER`].
    pub fn start_rank(&self) -> usize {
        match self {
            Role::Pd => 0,
            Role::Tikv => 1,
            Role::Tidb => 2,
            Role::Prometheus => 3,
            Role::Grafana => 4,
        }
    }

    /// Whether the managed system can retire instances of this role as tombstones.
    pub fn has_tombstone_state(&self) -> bool {
        matches!(self, Role::Tikv)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown role: {0}")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::START_ORDER
            .into_iter()
            .find(|role| role.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownRole(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_rank_matches_start_order() {
        for (index, role) in Role::START_ORDER.iter().enumerate() {
            assert_eq!(role.start_rank(), index);
        }
    }

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!("TiKV".parse::<Role>().unwrap(), Role::Tikv);
        assert!("pump".parse::<Role>().is_err());
    }

    #[test]
    fn only_storage_role_has_tombstones() {
        let tombstoning: Vec<_> = Role::START_ORDER
            .into_iter()
            .filter(Role::has_tombstone_state)
            .collect();
        assert_eq!(tombstoning, vec![Role::Tikv]);
    }
}
