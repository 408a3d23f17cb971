// ABOUTME: Builds the cluster status table.
// ABOUTME: Status queries run concurrently per instance; rows are sorted by role, host, then ports.

use super::status::reconcile_status;
use crate::diagnostics::Diagnostics;
use crate::meta::{ClusterMeta, Instance, InstanceStatus, Role};
use crate::pd::{MembershipSnapshot, MembershipView};
use crate::task::Context;
use futures::future::join_all;
use serde::Serialize;

/// One line of the status table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisplayRow {
    pub id: String,
    pub role: String,
    pub host: String,
    /// Ports joined with `/`.
    pub ports: String,
    pub status: InstanceStatus,
    /// `-` for roles without a data dir.
    pub data_dir: String,
    pub deploy_dir: String,
}

impl DisplayRow {
    fn new(instance: &Instance, status: InstanceStatus) -> Self {
        Self {
            id: instance.id(),
            role: instance.role().to_string(),
            host: instance.host().to_string(),
            ports: instance
                .used_ports()
                .iter()
                .map(u16::to_string)
                .collect::<Vec<_>>()
                .join("/"),
            status,
            data_dir: instance.data_dir().unwrap_or("-").to_string(),
            deploy_dir: instance.deploy_dir().to_string(),
        }
    }
}

/// Restricts which instances are shown. Empty lists match everything.
#[derive(Debug, Clone, Default)]
pub struct DisplayFilter {
    pub roles: Vec<Role>,
    pub nodes: Vec<String>,
}

impl DisplayFilter {
    pub fn matches(&self, instance: &Instance) -> bool {
        (self.roles.is_empty() || self.roles.contains(&instance.role()))
            && (self.nodes.is_empty() || self.nodes.contains(&instance.id()))
    }
}

/// The status table for one cluster.
#[derive(Debug, Clone, Serialize)]
pub struct ClusterDisplay {
    pub name: String,
    pub version: String,
    pub rows: Vec<DisplayRow>,
}

/// Sort rows by role, then host, then the ports string.
pub fn sort_rows(rows: &mut [DisplayRow]) {
    rows.sort_by(|a, b| {
        (&a.role, &a.host, &a.ports).cmp(&(&b.role, &b.host, &b.ports))
    });
}

/// Query the status of every matching instance.
pub async fn display(
    ctx: &Context,
    meta: &ClusterMeta,
    membership: &dyn MembershipView,
    filter: &DisplayFilter,
    diag: &Diagnostics,
) -> ClusterDisplay {
    let snapshot = MembershipSnapshot::fetch(membership).await;
    let instances: Vec<Instance> = meta
        .topology
        .instances()
        .into_iter()
        .filter(|instance| filter.matches(instance))
        .collect();

    let snapshot = &snapshot;
    let mut rows = join_all(instances.iter().map(|instance| async move {
        let status = reconcile_status(ctx, instance, snapshot, diag).await;
        DisplayRow::new(instance, status)
    }))
    .await;
    sort_rows(&mut rows);

    ClusterDisplay {
        name: meta.name.to_string(),
        version: meta.version.clone(),
        rows,
    }
}
