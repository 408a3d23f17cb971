// ABOUTME: Per-role instance declarations as written in the topology file.
// ABOUTME: Ports default to the managed system's standard values.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PdSpec {
    pub host: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default = "default_ssh_port")]
    pub ssh_port: u16,
    #[serde(default = "default_pd_client_port")]
    pub client_port: u16,
    #[serde(default = "default_pd_peer_port")]
    pub peer_port: u16,
    pub deploy_dir: String,
    pub data_dir: String,
}

impl PdSpec {
    /// Member name registered with the pd cluster.
    pub fn member_name(&self) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| format!("pd-{}-{}", self.host, self.client_port))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TikvSpec {
    pub host: String,
    #[serde(default = "default_ssh_port")]
    pub ssh_port: u16,
    #[serde(default = "default_tikv_port")]
    pub port: u16,
    #[serde(default = "default_tikv_status_port")]
    pub status_port: u16,
    pub deploy_dir: String,
    pub data_dir: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TidbSpec {
    pub host: String,
    #[serde(default = "default_ssh_port")]
    pub ssh_port: u16,
    #[serde(default = "default_tidb_port")]
    pub port: u16,
    #[serde(default = "default_tidb_status_port")]
    pub status_port: u16,
    pub deploy_dir: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrometheusSpec {
    pub host: String,
    #[serde(default = "default_ssh_port")]
    pub ssh_port: u16,
    #[serde(default = "default_prometheus_port")]
    pub port: u16,
    pub deploy_dir: String,
    pub data_dir: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrafanaSpec {
    pub host: String,
    #[serde(default = "default_ssh_port")]
    pub ssh_port: u16,
    #[serde(default = "default_grafana_port")]
    pub port: u16,
    pub deploy_dir: String,
}

fn default_ssh_port() -> u16 {
    22
}

fn default_pd_client_port() -> u16 {
    2379
}

fn default_pd_peer_port() -> u16 {
    2380
}

fn default_tikv_port() -> u16 {
    20160
}

fn default_tikv_status_port() -> u16 {
    20180
}

fn default_tidb_port() -> u16 {
    4000
}

fn default_tidb_status_port() -> u16 {
    10080
}

fn default_prometheus_port() -> u16 {
    9090
}

fn default_grafana_port() -> u16 {
    3000
}
