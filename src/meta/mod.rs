// ABOUTME: Cluster metadata: roles, instances, topology and the persisted ClusterMeta record.
// ABOUTME: The topology is the durable source of truth for cluster membership.

mod error;
mod instance;
mod role;
mod spec;
mod status;
mod store;
mod topology;

pub use error::MetaError;
pub use instance::{ConfigContext, Instance};
pub use role::{Role, UnknownRole};
pub use spec::{GrafanaSpec, PdSpec, PrometheusSpec, TidbSpec, TikvSpec};
pub use status::InstanceStatus;
pub use store::{ClusterMeta, FileMetaStore, MetaStore};
pub use topology::{Component, HostEntry, Topology};
