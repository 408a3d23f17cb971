// ABOUTME: Start, stop, restart and push-config command implementations.
// ABOUTME: Each builds a pipeline in topology order and runs it against the cluster.

use super::{Environment, open_cluster};
use clusterops::diagnostics::Diagnostics;
use clusterops::error::Result;
use clusterops::meta::Role;
use clusterops::operation;
use clusterops::output::Output;
use clusterops::task::Serial;
use clusterops::types::ClusterName;
use std::fmt;

#[derive(Debug, Clone, Copy)]
pub enum ServiceCommand {
    Start,
    Stop,
    Restart,
}

impl fmt::Display for ServiceCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ServiceCommand::Start => "start",
            ServiceCommand::Stop => "stop",
            ServiceCommand::Restart => "restart",
        })
    }
}

pub async fn service(
    env: &Environment,
    name: &ClusterName,
    command: ServiceCommand,
    roles: &[Role],
    output: Output,
) -> Result<()> {
    run(env, name, output, &command.to_string(), |meta| match command {
        ServiceCommand::Start => operation::start(&meta.topology, roles),
        ServiceCommand::Stop => operation::stop(&meta.topology, roles),
        ServiceCommand::Restart => operation::restart(&meta.topology, roles),
    })
    .await
}

pub async fn push_config(
    env: &Environment,
    name: &ClusterName,
    roles: &[Role],
    output: Output,
) -> Result<()> {
    let cache_dir = env.store.cache_dir(name);
    run(env, name, output, "push-config", |meta| {
        operation::push_config(meta, &cache_dir, roles)
    })
    .await
}

async fn run(
    env: &Environment,
    name: &ClusterName,
    mut output: Output,
    label: &str,
    plan: impl FnOnce(&clusterops::meta::ClusterMeta) -> Serial,
) -> Result<()> {
    let session = open_cluster(env, name)?;
    output.start_timer();
    let diag = Diagnostics::default();

    let pipeline = plan(&session.meta);
    output.progress(&format!("Running {} on {} ({})", label, name, pipeline));

    let result = operation::execute(&session.ctx, &pipeline).await;
    session.ctx.close_all(&diag).await;
    output.warnings(&diag.warnings());

    result?;
    output.success(&format!("{} {} complete", label, name));
    Ok(())
}
