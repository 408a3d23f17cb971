// ABOUTME: Application-wide error type for the clusterops binary and library callers.
// ABOUTME: Wraps each layer's error with thiserror conversions.

use crate::config::ConfigError;
use crate::meta::{MetaError, UnknownRole};
use crate::operation::OperationError;
use crate::task::TaskError;
use crate::types::ClusterNameError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Meta(#[from] MetaError),

    #[error(transparent)]
    Task(#[from] TaskError),

    #[error(transparent)]
    Operation(#[from] OperationError),

    #[error("invalid cluster name: {0}")]
    ClusterName(#[from] ClusterNameError),

    #[error(transparent)]
    Role(#[from] UnknownRole),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
