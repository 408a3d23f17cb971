// ABOUTME: Command module aggregator for the clusterops CLI.
// ABOUTME: Also holds the shared setup every command needs: settings, metadata and executors.

mod display;
mod prune;
mod service;

pub use display::display;
pub use prune::prune;
pub use service::{ServiceCommand, push_config, service};

use clusterops::config::{self, Settings};
use clusterops::error::Result;
use clusterops::meta::{ClusterMeta, FileMetaStore, MetaStore};
use clusterops::pd::PdClient;
use clusterops::task::Context;
use clusterops::types::ClusterName;

/// Settings and metadata store resolved from the home directory.
pub struct Environment {
    pub settings: Settings,
    pub store: FileMetaStore,
}

impl Environment {
    pub fn load() -> Result<Self> {
        let home = config::home_dir()?;
        let settings = Settings::load(&home)?;
        let store = FileMetaStore::new(config::clusters_dir(&home));
        tracing::debug!(home = %home.display(), "loaded settings");
        Ok(Self { settings, store })
    }
}

/// Everything needed to operate on one cluster.
pub struct ClusterSession {
    pub meta: ClusterMeta,
    pub ctx: Context,
    pub pd: PdClient,
}

/// Load a cluster's metadata and register an executor for each of its hosts.
pub fn open_cluster(env: &Environment, name: &ClusterName) -> Result<ClusterSession> {
    let meta = env.store.load(name)?;

    let mut ctx = Context::new(env.settings.ssh_options());
    let (private_key, public_key) = env.store.ssh_key_paths(name);
    ctx.set_ssh_key_set(private_key, public_key)?;
    ctx.set_cluster_ssh(&meta.topology, &meta.user, env.settings.ssh_timeout)?;

    let pd = PdClient::from_topology(&meta.topology, env.settings.pd_timeout);
    Ok(ClusterSession { meta, ctx, pd })
}
