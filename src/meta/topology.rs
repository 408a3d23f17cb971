// ABOUTME: Declared cluster shape: components grouped by role, instances in declaration order.
// ABOUTME: Exposes deterministic start/stop ordering, host enumeration and membership edits.

use super::error::MetaError;
use super::instance::{ConfigContext, Instance};
use super::role::Role;
use super::spec::{GrafanaSpec, PdSpec, PrometheusSpec, TidbSpec, TikvSpec};
use nonempty::NonEmpty;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topology {
    #[serde(
        deserialize_with = "deserialize_pd_servers",
        serialize_with = "serialize_pd_servers"
    )]
    pub pd_servers: NonEmpty<PdSpec>,

    #[serde(default)]
    pub tikv_servers: Vec<TikvSpec>,

    #[serde(default)]
    pub tidb_servers: Vec<TidbSpec>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub monitoring_servers: Vec<PrometheusSpec>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub grafana_servers: Vec<GrafanaSpec>,
}

/// A role and its instances, in declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Component {
    role: Role,
    instances: Vec<Instance>,
}

impl Component {
    pub fn role(&self) -> Role {
        self.role
    }

    pub fn instances(&self) -> &[Instance] {
        &self.instances
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }
}

/// A host to reach over SSH, with the SSH port of its first declared instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostEntry {
    pub host: String,
    pub ssh_port: u16,
}

impl Topology {
    /// Minimal topology holding a single pd instance.
    pub fn new(pd: PdSpec) -> Self {
        Self {
            pd_servers: NonEmpty::new(pd),
            tikv_servers: Vec::new(),
            tidb_servers: Vec::new(),
            monitoring_servers: Vec::new(),
            grafana_servers: Vec::new(),
        }
    }

    pub fn component(&self, role: Role) -> Component {
        let instances = match role {
            Role::Pd => self.pd_servers.iter().cloned().map(Instance::Pd).collect(),
            Role::Tikv => self.tikv_servers.iter().cloned().map(Instance::Tikv).collect(),
            Role::Tidb => self.tidb_servers.iter().cloned().map(Instance::Tidb).collect(),
            Role::Prometheus => self
                .monitoring_servers
                .iter()
                .cloned()
                .map(Instance::Prometheus)
                .collect(),
            Role::Grafana => self
                .grafana_servers
                .iter()
                .cloned()
                .map(Instance::Grafana)
                .collect(),
        };
        Component { role, instances }
    }

    /// Every component, coordination roles first.
    pub fn components_by_start_order(&self) -> Vec<Component> {
        Role::START_ORDER
            .into_iter()
            .map(|role| self.component(role))
            .collect()
    }

    /// Every component, in reverse start order.
    pub fn components_by_stop_order(&self) -> Vec<Component> {
        let mut components = self.components_by_start_order();
        components.reverse();
        components
    }

    /// All instances in start order.
    pub fn instances(&self) -> Vec<Instance> {
        self.components_by_start_order()
            .into_iter()
            .flat_map(|component| component.instances)
            .collect()
    }

    /// Distinct hosts in start order of their first instance.
    pub fn hosts(&self) -> Vec<HostEntry> {
        let mut seen = HashSet::new();
        self.instances()
            .iter()
            .filter(|instance| seen.insert(instance.host().to_string()))
            .map(|instance| HostEntry {
                host: instance.host().to_string(),
                ssh_port: instance.ssh_port(),
            })
            .collect()
    }

    /// `host:client_port` for every pd instance.
    pub fn pd_endpoints(&self) -> Vec<String> {
        self.pd_servers
            .iter()
            .map(|pd| format!("{}:{}", pd.host, pd.client_port))
            .collect()
    }

    pub fn config_context(&self, cluster_name: &str, version: &str) -> ConfigContext {
        ConfigContext {
            cluster_name: cluster_name.to_string(),
            version: version.to_string(),
            pd_members: self.pd_servers.iter().cloned().collect(),
        }
    }

    /// Reject duplicate instance ids and ports claimed twice on one host.
    pub fn validate(&self) -> Result<(), MetaError> {
        let mut ids = HashSet::new();
        let mut ports = HashSet::new();

        for instance in self.instances() {
            if !ids.insert(instance.id()) {
                return Err(MetaError::InvalidTopology(format!(
                    "instance {} is declared more than once",
                    instance.id()
                )));
            }
            for port in instance.used_ports() {
                if !ports.insert((instance.host().to_string(), port)) {
                    return Err(MetaError::InvalidTopology(format!(
                        "port {} on {} is used by more than one instance",
                        port,
                        instance.host()
                    )));
                }
            }
        }
        Ok(())
    }

    /// Remove the instances with the given ids. Returns how many were removed.
    ///
    /// Fails without modifying anything if the removal would leave no pd instance.
    pub fn remove_instances(&mut self, ids: &[String]) -> Result<usize, MetaError> {
        let doomed = |host: &str, port: u16| ids.contains(&format!("{}:{}", host, port));

        let remaining_pd: Vec<PdSpec> = self
            .pd_servers
            .iter()
            .filter(|pd| !doomed(&pd.host, pd.client_port))
            .cloned()
            .collect();
        let removed_pd = self.pd_servers.len() - remaining_pd.len();
        let pd_servers = NonEmpty::from_vec(remaining_pd).ok_or_else(|| {
            MetaError::LastPdInstance(
                self.pd_servers
                    .iter()
                    .map(|pd| format!("{}:{}", pd.host, pd.client_port))
                    .collect::<Vec<_>>()
                    .join(", "),
            )
        })?;
        self.pd_servers = pd_servers;

        let before = self.tikv_servers.len()
            + self.tidb_servers.len()
            + self.monitoring_servers.len()
            + self.grafana_servers.len();
        self.tikv_servers.retain(|s| !doomed(&s.host, s.port));
        self.tidb_servers.retain(|s| !doomed(&s.host, s.port));
        self.monitoring_servers.retain(|s| !doomed(&s.host, s.port));
        self.grafana_servers.retain(|s| !doomed(&s.host, s.port));
        let after = self.tikv_servers.len()
            + self.tidb_servers.len()
            + self.monitoring_servers.len()
            + self.grafana_servers.len();

        Ok(removed_pd + before - after)
    }
}

fn deserialize_pd_servers<'de, D>(deserializer: D) -> Result<NonEmpty<PdSpec>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let servers: Vec<PdSpec> = Vec::deserialize(deserializer)?;
    NonEmpty::from_vec(servers)
        .ok_or_else(|| serde::de::Error::custom("at least one pd server is required"))
}

fn serialize_pd_servers<S>(servers: &NonEmpty<PdSpec>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.collect_seq(servers.iter())
}

#[cfg(test)]
mod tests {
    use super::*;

    const YAML: &str = r#"
pd_servers:
  - host: 10.0.1.1
    deploy_dir: /deploy/pd-2379
    data_dir: /data/pd-2379
tikv_servers:
  - host: 10.0.1.4
    deploy_dir: /deploy/tikv-20160
    data_dir: /data/tikv-20160
  - host: 10.0.1.1
    ssh_port: 2222
    deploy_dir: /deploy/tikv-20160
    data_dir: /data/tikv-20160
tidb_servers:
  - host: 10.0.1.7
    deploy_dir: /deploy/tidb-4000
"#;

    fn topology() -> Topology {
        serde_yaml::from_str(YAML).unwrap()
    }

    #[test]
    fn hosts_are_distinct_and_keep_first_ssh_port() {
        let hosts = topology().hosts();
        let names: Vec<_> = hosts.iter().map(|h| h.host.as_str()).collect();
        assert_eq!(names, vec!["10.0.1.1", "10.0.1.4", "10.0.1.7"]);
        assert_eq!(hosts[0].ssh_port, 22);
    }

    #[test]
    fn empty_pd_list_is_rejected() {
        let yaml = "pd_servers: []\n";
        let err = serde_yaml::from_str::<Topology>(yaml).unwrap_err();
        assert!(err.to_string().contains("at least one pd server"));
    }

    #[test]
    fn validate_rejects_port_conflicts() {
        let mut topo = topology();
        topo.tidb_servers[0].host = "10.0.1.1".to_string();
        topo.tidb_servers[0].port = 2380;
        let err = topo.validate().unwrap_err();
        assert!(err.to_string().contains("port 2380 on 10.0.1.1"));
    }

    #[test]
    fn remove_instances_only_touches_listed_ids() {
        let mut topo = topology();
        let removed = topo
            .remove_instances(&["10.0.1.4:20160".to_string()])
            .unwrap();
        assert_eq!(removed, 1);
        assert_eq!(topo.tikv_servers.len(), 1);
        assert_eq!(topo.tikv_servers[0].host, "10.0.1.1");
        assert_eq!(topo.tidb_servers.len(), 1);
    }

    #[test]
    fn removing_last_pd_fails_and_leaves_topology_intact() {
        let mut topo = topology();
        let original = topo.clone();
        let err = topo
            .remove_instances(&["10.0.1.1:2379".to_string(), "10.0.1.7:4000".to_string()])
            .unwrap_err();
        assert!(matches!(err, MetaError::LastPdInstance(_)));
        assert_eq!(topo, original);
    }

    #[test]
    fn serialization_round_trips_through_yaml() {
        let topo = topology();
        let yaml = serde_yaml::to_string(&topo).unwrap();
        let parsed: Topology = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed, topo);
    }
}
