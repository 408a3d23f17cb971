// ABOUTME: Prune command implementation.
// ABOUTME: Removes tombstone nodes, or only lists them with --dry-run.

use super::{Environment, open_cluster};
use clusterops::diagnostics::Diagnostics;
use clusterops::error::Result;
use clusterops::operation::{self, TombstoneMode};
use clusterops::output::Output;
use clusterops::types::ClusterName;

pub async fn prune(
    env: &Environment,
    name: &ClusterName,
    dry_run: bool,
    mut output: Output,
) -> Result<()> {
    let mut session = open_cluster(env, name)?;
    output.start_timer();
    let diag = Diagnostics::default();

    let mode = if dry_run {
        TombstoneMode::DiscoveryOnly
    } else {
        TombstoneMode::Execute
    };
    output.progress(&format!("Checking {} for tombstone nodes...", name));

    let result = operation::destroy_tombstone(
        &session.ctx,
        &session.pd,
        &mut session.meta,
        &env.store,
        mode,
        env.settings.tombstone,
    )
    .await;

    session.ctx.close_all(&diag).await;
    output.warnings(&diag.warnings());

    let nodes = result?;
    if nodes.is_empty() {
        output.success("No tombstone nodes found");
    } else if dry_run {
        output.nodes("Tombstone nodes (not removed):", &nodes);
    } else {
        output.nodes("Removed tombstone nodes:", &nodes);
        output.success(&format!("Pruned {} node(s) from {}", nodes.len(), name));
    }
    Ok(())
}
