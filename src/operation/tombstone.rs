// ABOUTME: Detects storage nodes the cluster has retired and removes them for good.
// ABOUTME: Discovery is read-only; metadata is saved only after every removal succeeded.

use super::{
    DiscoverySnafu, NodeRemovalSnafu, OperationError, OperationErrorKind, PersistenceSnafu,
    QuorumUnavailableSnafu, TopologyUpdateSnafu,
};
use crate::diagnostics::{Diagnostics, Warning};
use crate::meta::{ClusterMeta, Instance, MetaStore, Role, Topology};
use crate::pd::MembershipView;
use crate::task::{Context, DestroyInstance, Task};
use serde::Deserialize;
use snafu::{ResultExt, ensure};

/// How far the operator goes once candidates are found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TombstoneMode {
    /// Report candidates without touching anything.
    DiscoveryOnly,
    /// Destroy candidates and persist the shrunken topology.
    Execute,
}

/// Safety checks applied before the destructive phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct TombstonePolicy {
    /// Refuse to remove nodes unless a strict majority of pd members is healthy.
    #[serde(default = "default_require_pd_quorum")]
    pub require_pd_quorum: bool,
}

fn default_require_pd_quorum() -> bool {
    true
}

impl Default for TombstonePolicy {
    fn default() -> Self {
        Self {
            require_pd_quorum: default_require_pd_quorum(),
        }
    }
}

/// Whether any role in the topology can be retired as a tombstone.
pub fn needs_tombstone_check(topology: &Topology) -> bool {
    Role::START_ORDER
        .into_iter()
        .filter(Role::has_tombstone_state)
        .any(|role| !topology.component(role).is_empty())
}

/// Instances the managed system reports as tombstones, in declaration order.
pub async fn discover(
    topology: &Topology,
    membership: &dyn MembershipView,
) -> Result<Vec<Instance>, OperationError> {
    let stores = membership.stores().await.context(DiscoverySnafu)?;

    let candidates: Vec<Instance> = topology
        .instances()
        .into_iter()
        .filter(|instance| instance.role().has_tombstone_state())
        .filter(|instance| {
            let id = instance.id();
            stores
                .iter()
                .any(|store| store.address == id && store.is_tombstone())
        })
        .collect();

    tracing::debug!(candidates = candidates.len(), "tombstone discovery finished");
    Ok(candidates)
}

async fn check_quorum(membership: &dyn MembershipView) -> Result<(), OperationError> {
    let members = membership.health().await.context(DiscoverySnafu)?;
    let total = members.len();
    let healthy = members.iter().filter(|member| member.health).count();
    ensure!(
        total > 0 && healthy * 2 > total,
        QuorumUnavailableSnafu { healthy, total }
    );
    Ok(())
}

/// Find tombstone nodes and, in [`TombstoneMode::Execute`], remove them.
///
/// Returns the candidate ids in discovery-only mode and the removed ids in
/// execute mode. If any removal fails, `meta` and the stored metadata keep
/// every original instance.
pub async fn destroy_tombstone(
    ctx: &Context,
    membership: &dyn MembershipView,
    meta: &mut ClusterMeta,
    store: &dyn MetaStore,
    mode: TombstoneMode,
    policy: TombstonePolicy,
) -> Result<Vec<String>, OperationError> {
    if !needs_tombstone_check(&meta.topology) {
        return Ok(Vec::new());
    }

    let candidates = discover(&meta.topology, membership).await?;
    let ids: Vec<String> = candidates.iter().map(Instance::id).collect();
    if candidates.is_empty() || mode == TombstoneMode::DiscoveryOnly {
        return Ok(ids);
    }

    if policy.require_pd_quorum {
        check_quorum(membership).await?;
    }

    tracing::info!(cluster = %meta.name, nodes = ?ids, "removing tombstone nodes");
    for instance in candidates {
        let node = instance.id();
        DestroyInstance::new(instance)
            .execute(ctx)
            .await
            .context(NodeRemovalSnafu { node })?;
    }

    let mut topology = meta.topology.clone();
    topology.remove_instances(&ids).context(TopologyUpdateSnafu)?;
    meta.topology = topology;

    store
        .save(&meta.name, meta)
        .inspect_err(|e| {
            tracing::error!(
                cluster = %meta.name,
                nodes = ?ids,
                "tombstone nodes were destroyed but metadata was not saved: {}",
                e
            )
        })
        .context(PersistenceSnafu)?;

    tracing::info!(cluster = %meta.name, removed = ids.len(), "tombstone nodes removed");
    Ok(ids)
}

/// Remove tombstone nodes after a read-only pass such as display.
///
/// A membership view that cannot be read, or a pd quorum that is not met,
/// leaves the cluster untouched; these are recorded in `diag` and yield no
/// removed nodes. Removal and persistence failures are still returned.
pub async fn destroy_tombstone_if_needed(
    ctx: &Context,
    membership: &dyn MembershipView,
    meta: &mut ClusterMeta,
    store: &dyn MetaStore,
    policy: TombstonePolicy,
    diag: &Diagnostics,
) -> Result<Vec<String>, OperationError> {
    match destroy_tombstone(ctx, membership, meta, store, TombstoneMode::Execute, policy).await {
        Err(e)
            if matches!(
                e.kind(),
                OperationErrorKind::Discovery | OperationErrorKind::QuorumUnavailable
            ) =>
        {
            diag.warn(Warning::tombstone_check_skipped(format!(
                "tombstone check skipped: {e}"
            )));
            Ok(Vec::new())
        }
        result => result,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::meta::{PdSpec, TikvSpec};

    fn pd() -> PdSpec {
        PdSpec {
            host: "10.0.1.1".to_string(),
            name: None,
            ssh_port: 22,
            client_port: 2379,
            peer_port: 2380,
            deploy_dir: "/deploy/pd-2379".to_string(),
            data_dir: "/data/pd-2379".to_string(),
        }
    }

    #[test]
    fn check_needed_only_with_storage_nodes() {
        let mut topology = Topology::new(pd());
        assert!(!needs_tombstone_check(&topology));

        topology.tikv_servers.push(TikvSpec {
            host: "10.0.1.4".to_string(),
            ssh_port: 22,
            port: 20160,
            status_port: 20180,
            deploy_dir: "/deploy/tikv-20160".to_string(),
            data_dir: "/data/tikv-20160".to_string(),
        });
        assert!(needs_tombstone_check(&topology));
    }

    #[test]
    fn policy_requires_quorum_by_default() {
        assert!(TombstonePolicy::default().require_pd_quorum);
        let parsed: TombstonePolicy = serde_yaml::from_str("{}").unwrap();
        assert!(parsed.require_pd_quorum);
    }
}
