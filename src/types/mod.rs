// ABOUTME: Validated domain types.
// ABOUTME: Cluster names are checked once at the edge and trusted afterwards.

mod cluster_name;

pub use cluster_name::{ClusterName, ClusterNameError};
