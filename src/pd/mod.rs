// ABOUTME: Membership view of the managed cluster, as reported by the placement driver.
// ABOUTME: Defines the MembershipView seam, the HTTP client and a per-pass snapshot.

mod client;
mod snapshot;

pub use client::PdClient;
pub use snapshot::{MemberHealth, MembershipSnapshot, StoreInfo};

use async_trait::async_trait;
use std::time::Duration;

pub const STORES_PATH: &str = "/pd/api/v1/stores";
pub const HEALTH_PATH: &str = "/pd/api/v1/health";

/// Source of the managed system's own view of its members.
#[async_trait]
pub trait MembershipView: Send + Sync {
    /// All storage nodes known to the coordinator, including retired ones.
    async fn stores(&self) -> Result<Vec<StoreInfo>, PdError>;

    /// Health of each coordinator member.
    async fn health(&self) -> Result<Vec<MemberHealth>, PdError>;
}

/// Errors talking to the placement driver.
#[derive(Debug, thiserror::Error)]
pub enum PdError {
    #[error("no pd endpoints configured")]
    NoEndpoints,

    #[error("request to {endpoint} failed: {reason}")]
    Request { endpoint: String, reason: String },

    #[error("request to {endpoint} timed out after {timeout:?}")]
    Timeout { endpoint: String, timeout: Duration },

    #[error("{endpoint} answered with HTTP {status}: {body}")]
    Status {
        endpoint: String,
        status: u16,
        body: String,
    },

    #[error("failed to decode pd response: {0}")]
    Decode(#[from] serde_json::Error),
}
