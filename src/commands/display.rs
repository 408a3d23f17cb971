// ABOUTME: Display command implementation.
// ABOUTME: Prints the status table, then prunes tombstone nodes when membership can be read.

use super::{Environment, open_cluster};
use clusterops::diagnostics::Diagnostics;
use clusterops::error::Result;
use clusterops::meta::Role;
use clusterops::operation::{self, DisplayFilter};
use clusterops::output::Output;
use clusterops::types::ClusterName;

pub async fn display(
    env: &Environment,
    name: &ClusterName,
    roles: Vec<Role>,
    nodes: Vec<String>,
    mut output: Output,
) -> Result<()> {
    let mut session = open_cluster(env, name)?;
    output.start_timer();
    let diag = Diagnostics::default();

    let filter = DisplayFilter { roles, nodes };
    let table = operation::display(&session.ctx, &session.meta, &session.pd, &filter, &diag).await;
    output.display(&table);

    let pruned = operation::destroy_tombstone_if_needed(
        &session.ctx,
        &session.pd,
        &mut session.meta,
        &env.store,
        env.settings.tombstone,
        &diag,
    )
    .await;

    session.ctx.close_all(&diag).await;
    output.warnings(&diag.warnings());

    output.nodes("Removed tombstone nodes:", &pruned?);
    Ok(())
}
