// ABOUTME: Wire types for pd store and health responses, and a captured snapshot of both.
// ABOUTME: A failed fetch leaves the snapshot empty so status lookups fall through.

use super::MembershipView;
use serde::Deserialize;

/// A storage node as registered with pd.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StoreInfo {
    pub id: u64,
    pub address: String,
    #[serde(default)]
    pub state_name: String,
}

impl StoreInfo {
    pub fn is_tombstone(&self) -> bool {
        self.state_name.eq_ignore_ascii_case("tombstone")
    }
}

/// Health of one pd member.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MemberHealth {
    pub name: String,
    #[serde(default)]
    pub member_id: u64,
    #[serde(default)]
    pub client_urls: Vec<String>,
    pub health: bool,
}

impl MemberHealth {
    /// Whether one of this member's client URLs points at `host:port`.
    pub fn serves(&self, address: &str) -> bool {
        self.client_urls.iter().any(|url| {
            let without_scheme = url.split_once("://").map_or(url.as_str(), |(_, rest)| rest);
            without_scheme.trim_end_matches('/') == address
        })
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct StoresResponse {
    #[serde(default)]
    pub stores: Vec<StoreEntry>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct StoreEntry {
    pub store: StoreInfo,
}

/// Membership as observed at one point in time.
#[derive(Debug, Clone, Default)]
pub struct MembershipSnapshot {
    stores: Option<Vec<StoreInfo>>,
    health: Option<Vec<MemberHealth>>,
}

impl MembershipSnapshot {
    pub fn new(stores: Option<Vec<StoreInfo>>, health: Option<Vec<MemberHealth>>) -> Self {
        Self { stores, health }
    }

    /// Query both views. Failures are logged and leave that half empty.
    pub async fn fetch(view: &dyn MembershipView) -> Self {
        let (stores, health) = futures::join!(view.stores(), view.health());

        let stores = stores
            .inspect_err(|e| tracing::warn!("failed to query pd stores: {}", e))
            .ok();
        let health = health
            .inspect_err(|e| tracing::warn!("failed to query pd health: {}", e))
            .ok();

        Self { stores, health }
    }

    /// The store registered at `address` (`host:port`), if any.
    pub fn store(&self, address: &str) -> Option<&StoreInfo> {
        self.stores
            .as_deref()?
            .iter()
            .find(|store| store.address == address)
    }

    /// Health of the pd member serving `address`, if known.
    pub fn member_health(&self, address: &str) -> Option<bool> {
        self.health
            .as_deref()?
            .iter()
            .find(|member| member.serves(address))
            .map(|member| member.health)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_stores_response() {
        let json = r#"{
            "count": 2,
            "stores": [
                {"store": {"id": 1, "address": "10.0.1.4:20160", "state_name": "Up"}, "status": {}},
                {"store": {"id": 4, "address": "10.0.1.5:20160", "state": 2, "state_name": "Tombstone"}}
            ]
        }"#;
        let response: StoresResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.stores.len(), 2);
        assert!(!response.stores[0].store.is_tombstone());
        assert!(response.stores[1].store.is_tombstone());
    }

    #[test]
    fn member_matches_client_url_without_scheme() {
        let member = MemberHealth {
            name: "pd-1".to_string(),
            member_id: 7,
            client_urls: vec!["http://10.0.1.1:2379/".to_string()],
            health: true,
        };
        assert!(member.serves("10.0.1.1:2379"));
        assert!(!member.serves("10.0.1.1:2380"));
    }

    #[test]
    fn empty_snapshot_resolves_nothing() {
        let snapshot = MembershipSnapshot::default();
        assert!(snapshot.store("10.0.1.4:20160").is_none());
        assert!(snapshot.member_health("10.0.1.1:2379").is_none());
    }
}
