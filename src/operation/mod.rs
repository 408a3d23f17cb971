// ABOUTME: Cluster-level operations built from tasks, the context and the topology.
// ABOUTME: Errors use the SNAFU pattern so each failure carries the node or phase it came from.

mod action;
mod display;
mod status;
mod tombstone;

pub use action::{execute, push_config, restart, start, stop};
pub use display::{ClusterDisplay, DisplayFilter, DisplayRow, display, sort_rows};
pub use status::{parse_service_state, reconcile_status, service_status};
pub use tombstone::{
    TombstoneMode, TombstonePolicy, destroy_tombstone, destroy_tombstone_if_needed, discover,
    needs_tombstone_check,
};

use crate::meta::MetaError;
use crate::pd::PdError;
use crate::task::{PipelineError, TaskError};
use snafu::Snafu;

/// Failure of a cluster-level operation.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum OperationError {
    #[snafu(display("failed to query cluster membership: {source}"))]
    Discovery { source: PdError },

    #[snafu(display("pd quorum unavailable: {healthy} of {total} members healthy"))]
    QuorumUnavailable { healthy: usize, total: usize },

    #[snafu(display("failed to remove node {node}: {source}"))]
    NodeRemoval { node: String, source: TaskError },

    #[snafu(display("failed to update topology: {source}"))]
    TopologyUpdate { source: MetaError },

    #[snafu(display(
        "nodes were removed but cluster metadata could not be saved: {source}"
    ))]
    Persistence { source: MetaError },

    #[snafu(display("{source}"))]
    Pipeline { source: PipelineError },
}

/// Error kind for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationErrorKind {
    /// The membership view could not be read.
    Discovery,
    /// Too few pd members are healthy to remove nodes safely.
    QuorumUnavailable,
    /// Removing a single node failed; metadata is untouched.
    NodeRemoval,
    /// Nodes are gone but the stored topology still lists them.
    Persistence,
    /// A task pipeline failed.
    Pipeline,
}

impl OperationError {
    /// Returns the error kind for programmatic handling.
    pub fn kind(&self) -> OperationErrorKind {
        match self {
            OperationError::Discovery { .. } => OperationErrorKind::Discovery,
            OperationError::QuorumUnavailable { .. } => OperationErrorKind::QuorumUnavailable,
            OperationError::NodeRemoval { .. } => OperationErrorKind::NodeRemoval,
            OperationError::TopologyUpdate { .. } | OperationError::Persistence { .. } => {
                OperationErrorKind::Persistence
            }
            OperationError::Pipeline { .. } => OperationErrorKind::Pipeline,
        }
    }

    /// The node a removal failed on, if this is a removal failure.
    pub fn node(&self) -> Option<&str> {
        match self {
            OperationError::NodeRemoval { node, .. } => Some(node),
            _ => None,
        }
    }
}

impl From<PipelineError> for OperationError {
    fn from(source: PipelineError) -> Self {
        OperationError::Pipeline { source }
    }
}
