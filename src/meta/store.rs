// ABOUTME: Load and save of the per-cluster metadata file.
// ABOUTME: Saves go through a temp file and rename, keeping a timestamped backup of the old file.

use super::error::MetaError;
use super::topology::Topology;
use crate::types::ClusterName;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const META_FILENAME: &str = "meta.yaml";
const BACKUP_DIR: &str = "backup";

/// The persisted record for one cluster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterMeta {
    pub name: ClusterName,
    /// Deploy user on every host.
    pub user: String,
    pub version: String,
    pub topology: Topology,
}

#[derive(Serialize, Deserialize)]
struct MetaFile {
    user: String,
    version: String,
    topology: Topology,
}

/// Durable storage for cluster metadata.
pub trait MetaStore: Send + Sync {
    fn load(&self, name: &ClusterName) -> Result<ClusterMeta, MetaError>;
    fn save(&self, name: &ClusterName, meta: &ClusterMeta) -> Result<(), MetaError>;
}

/// Stores each cluster under `<root>/<name>/meta.yaml`.
#[derive(Debug, Clone)]
pub struct FileMetaStore {
    root: PathBuf,
}

impl FileMetaStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Path of a file or directory under the cluster's directory.
    pub fn cluster_path(&self, name: &ClusterName, parts: &[&str]) -> PathBuf {
        let mut path = self.root.join(name.as_str());
        path.extend(parts);
        path
    }

    pub fn meta_path(&self, name: &ClusterName) -> PathBuf {
        self.cluster_path(name, &[META_FILENAME])
    }

    /// Private and public key used to reach every host of the cluster.
    pub fn ssh_key_paths(&self, name: &ClusterName) -> (PathBuf, PathBuf) {
        (
            self.cluster_path(name, &["ssh", "id_rsa"]),
            self.cluster_path(name, &["ssh", "id_rsa.pub"]),
        )
    }

    pub fn exists(&self, name: &ClusterName) -> bool {
        self.meta_path(name).is_file()
    }

    /// Scratch directory for rendered files before upload.
    pub fn cache_dir(&self, name: &ClusterName) -> PathBuf {
        self.cluster_path(name, &["config-cache"])
    }

    fn backup(&self, name: &ClusterName, current: &Path) -> Result<(), MetaError> {
        let backup_dir = self.cluster_path(name, &[BACKUP_DIR]);
        std::fs::create_dir_all(&backup_dir).map_err(MetaError::io(&backup_dir))?;
        let stamp = Utc::now().format("%Y-%m-%dT%H-%M-%S%.3f");
        let backup_path = backup_dir.join(format!("{META_FILENAME}-{stamp}"));
        std::fs::copy(current, &backup_path).map_err(MetaError::io(&backup_path))?;
        Ok(())
    }
}

impl MetaStore for FileMetaStore {
    fn load(&self, name: &ClusterName) -> Result<ClusterMeta, MetaError> {
        let path = self.meta_path(name);
        if !path.is_file() {
            return Err(MetaError::NotFound(name.clone()));
        }

        let content = std::fs::read_to_string(&path).map_err(MetaError::io(&path))?;
        let file: MetaFile = serde_yaml::from_str(&content).map_err(|source| MetaError::Parse {
            path: path.clone(),
            source,
        })?;
        file.topology.validate()?;

        Ok(ClusterMeta {
            name: name.clone(),
            user: file.user,
            version: file.version,
            topology: file.topology,
        })
    }

    fn save(&self, name: &ClusterName, meta: &ClusterMeta) -> Result<(), MetaError> {
        let dir = self.cluster_path(name, &[]);
        std::fs::create_dir_all(&dir).map_err(MetaError::io(&dir))?;

        let path = self.meta_path(name);
        if path.is_file() {
            self.backup(name, &path)?;
        }

        let yaml = serde_yaml::to_string(&MetaFile {
            user: meta.user.clone(),
            version: meta.version.clone(),
            topology: meta.topology.clone(),
        })
        .map_err(MetaError::Serialize)?;

        let tmp = path.with_extension("yaml.tmp");
        std::fs::write(&tmp, yaml).map_err(MetaError::io(&tmp))?;
        std::fs::rename(&tmp, &path).map_err(MetaError::io(&path))?;

        tracing::debug!(cluster = %name, path = %path.display(), "saved cluster metadata");
        Ok(())
    }
}
