// ABOUTME: Errors loading, validating and persisting cluster metadata.
// ABOUTME: Wraps file and YAML failures with the path involved.

use crate::types::ClusterName;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum MetaError {
    #[error("cluster {0} does not exist")]
    NotFound(ClusterName),

    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid metadata in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("failed to serialize metadata: {0}")]
    Serialize(#[source] serde_yaml::Error),

    #[error("invalid topology: {0}")]
    InvalidTopology(String),

    #[error("cannot remove {0}: a cluster needs at least one pd instance")]
    LastPdInstance(String),
}

impl MetaError {
    pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.into();
        move |source| MetaError::Io { path, source }
    }
}
