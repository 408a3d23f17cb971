// ABOUTME: Start, stop, restart and config push pipelines in topology order.
// ABOUTME: Pipelines are built first, then run against a Context.

use super::{OperationError, PipelineSnafu};
use crate::meta::{ClusterMeta, Component, Role, Topology};
use crate::task::{Builder, Context, Serial, ServiceAction};
use snafu::ResultExt;
use std::path::Path;

fn selected(components: Vec<Component>, roles: &[Role]) -> impl Iterator<Item = Component> + '_ {
    components
        .into_iter()
        .filter(move |component| roles.is_empty() || roles.contains(&component.role()))
}

fn service_pipeline(
    builder: Builder,
    components: Vec<Component>,
    roles: &[Role],
    action: ServiceAction,
) -> Builder {
    selected(components, roles).fold(builder, |builder, component| {
        component
            .instances()
            .iter()
            .fold(builder, |builder, instance| builder.systemctl(instance, action))
    })
}

/// Start instances, coordination roles first. An empty role list means every role.
pub fn start(topology: &Topology, roles: &[Role]) -> Serial {
    service_pipeline(
        Builder::new(),
        topology.components_by_start_order(),
        roles,
        ServiceAction::Start,
    )
    .build()
}

/// Stop instances in reverse start order.
pub fn stop(topology: &Topology, roles: &[Role]) -> Serial {
    service_pipeline(
        Builder::new(),
        topology.components_by_stop_order(),
        roles,
        ServiceAction::Stop,
    )
    .build()
}

/// Stop everything selected in reverse order, then start it again in order.
pub fn restart(topology: &Topology, roles: &[Role]) -> Serial {
    let builder = service_pipeline(
        Builder::new(),
        topology.components_by_stop_order(),
        roles,
        ServiceAction::Stop,
    );
    service_pipeline(
        builder,
        topology.components_by_start_order(),
        roles,
        ServiceAction::Start,
    )
    .build()
}

/// Render and upload every instance's configuration file.
pub fn push_config(meta: &ClusterMeta, cache_dir: &Path, roles: &[Role]) -> Serial {
    let config = meta
        .topology
        .config_context(meta.name.as_str(), &meta.version);

    selected(meta.topology.components_by_start_order(), roles)
        .fold(Builder::new(), |builder, component| {
            component.instances().iter().fold(builder, |builder, instance| {
                let dirs = instance
                    .used_dirs()
                    .into_iter()
                    .map(str::to_string)
                    .collect();
                builder
                    .mkdir(instance.host(), dirs)
                    .init_config(instance, &config, &meta.user, cache_dir)
            })
        })
        .build()
}

/// Run a pipeline built by this module.
pub async fn execute(ctx: &Context, pipeline: &Serial) -> Result<(), OperationError> {
    pipeline.run(ctx).await.context(PipelineSnafu)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::meta::{PdSpec, TidbSpec};

    fn topology() -> Topology {
        let mut topology = Topology::new(PdSpec {
            host: "10.0.1.1".to_string(),
            name: None,
            ssh_port: 22,
            client_port: 2379,
            peer_port: 2380,
            deploy_dir: "/deploy/pd-2379".to_string(),
            data_dir: "/data/pd-2379".to_string(),
        });
        topology.tidb_servers.push(TidbSpec {
            host: "10.0.1.7".to_string(),
            ssh_port: 22,
            port: 4000,
            status_port: 10080,
            deploy_dir: "/deploy/tidb-4000".to_string(),
        });
        topology
    }

    #[test]
    fn restart_stops_then_starts_every_instance() {
        assert_eq!(restart(&topology(), &[]).len(), 4);
    }

    #[test]
    fn role_filter_limits_pipeline() {
        assert_eq!(start(&topology(), &[Role::Tidb]).len(), 1);
        assert!(stop(&topology(), &[Role::Grafana]).is_empty());
    }
}
