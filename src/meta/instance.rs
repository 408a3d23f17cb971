// ABOUTME: One running node of a role on a host, with its capability set.
// ABOUTME: Dispatches host, ports, dirs, service name, status and config rendering per role.

use super::role::Role;
use super::spec::{GrafanaSpec, PdSpec, PrometheusSpec, TidbSpec, TikvSpec};
use super::status::InstanceStatus;
use crate::pd::MembershipSnapshot;
use std::fmt::Write;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Instance {
    Pd(PdSpec),
    Tikv(TikvSpec),
    Tidb(TidbSpec),
    Prometheus(PrometheusSpec),
    Grafana(GrafanaSpec),
}

/// Cluster-wide values needed to render an instance's configuration file.
#[derive(Debug, Clone)]
pub struct ConfigContext {
    pub cluster_name: String,
    pub version: String,
    pub pd_members: Vec<PdSpec>,
}

impl ConfigContext {
    fn pd_endpoints(&self) -> Vec<String> {
        self.pd_members
            .iter()
            .map(|pd| format!("{}:{}", pd.host, pd.client_port))
            .collect()
    }
}

impl Instance {
    pub fn role(&self) -> Role {
        match self {
            Instance::Pd(_) => Role::Pd,
            Instance::Tikv(_) => Role::Tikv,
            Instance::Tidb(_) => Role::Tidb,
            Instance::Prometheus(_) => Role::Prometheus,
            Instance::Grafana(_) => Role::Grafana,
        }
    }

    pub fn host(&self) -> &str {
        match self {
            Instance::Pd(spec) => &spec.host,
            Instance::Tikv(spec) => &spec.host,
            Instance::Tidb(spec) => &spec.host,
            Instance::Prometheus(spec) => &spec.host,
            Instance::Grafana(spec) => &spec.host,
        }
    }

    pub fn ssh_port(&self) -> u16 {
        match self {
            Instance::Pd(spec) => spec.ssh_port,
            Instance::Tikv(spec) => spec.ssh_port,
            Instance::Tidb(spec) => spec.ssh_port,
            Instance::Prometheus(spec) => spec.ssh_port,
            Instance::Grafana(spec) => spec.ssh_port,
        }
    }

    /// The port that identifies this instance.
    pub fn main_port(&self) -> u16 {
        match self {
            Instance::Pd(spec) => spec.client_port,
            Instance::Tikv(spec) => spec.port,
            Instance::Tidb(spec) => spec.port,
            Instance::Prometheus(spec) => spec.port,
            Instance::Grafana(spec) => spec.port,
        }
    }

    /// `host:main_port`, unique within a topology.
    pub fn id(&self) -> String {
        format!("{}:{}", self.host(), self.main_port())
    }

    pub fn used_ports(&self) -> Vec<u16> {
        match self {
            Instance::Pd(spec) => vec![spec.client_port, spec.peer_port],
            Instance::Tikv(spec) => vec![spec.port, spec.status_port],
            Instance::Tidb(spec) => vec![spec.port, spec.status_port],
            Instance::Prometheus(spec) => vec![spec.port],
            Instance::Grafana(spec) => vec![spec.port],
        }
    }

    /// Directories in use: deploy dir first, then the data dir when the role has one.
    pub fn used_dirs(&self) -> Vec<&str> {
        let mut dirs = vec![self.deploy_dir()];
        dirs.extend(self.data_dir());
        dirs
    }

    pub fn deploy_dir(&self) -> &str {
        match self {
            Instance::Pd(spec) => &spec.deploy_dir,
            Instance::Tikv(spec) => &spec.deploy_dir,
            Instance::Tidb(spec) => &spec.deploy_dir,
            Instance::Prometheus(spec) => &spec.deploy_dir,
            Instance::Grafana(spec) => &spec.deploy_dir,
        }
    }

    pub fn data_dir(&self) -> Option<&str> {
        match self {
            Instance::Pd(spec) => Some(&spec.data_dir),
            Instance::Tikv(spec) => Some(&spec.data_dir),
            Instance::Prometheus(spec) => Some(&spec.data_dir),
            Instance::Tidb(_) | Instance::Grafana(_) => None,
        }
    }

    /// Unit name in the host's process manager.
    pub fn service_name(&self) -> String {
        format!("{}-{}.service", self.role(), self.main_port())
    }

    /// Remote path of the rendered configuration file.
    pub fn config_path(&self) -> String {
        format!("{}/conf/{}.toml", self.deploy_dir(), self.role())
    }

    /// Status according to the managed system's own membership view.
    ///
    /// Roles the view does not track, and instances it does not know,
    /// come back as [`InstanceStatus::Unresolved`].
    pub fn status(&self, membership: &MembershipSnapshot) -> InstanceStatus {
        match self {
            Instance::Pd(_) => match membership.member_health(&self.id()) {
                Some(true) => InstanceStatus::Healthy,
                Some(false) => InstanceStatus::Unhealthy,
                None => InstanceStatus::Unresolved,
            },
            Instance::Tikv(_) => membership
                .store(&self.id())
                .map(|store| InstanceStatus::from_state_name(&store.state_name))
                .unwrap_or(InstanceStatus::Unresolved),
            _ => InstanceStatus::Unresolved,
        }
    }

    /// Render this instance's configuration file.
    pub fn render_config(&self, ctx: &ConfigContext) -> String {
        let mut out = format!(
            "# {} {} for cluster {} ({})\n",
            self.role(),
            self.id(),
            ctx.cluster_name,
            ctx.version
        );
        // Writing to a String cannot fail.
        let _ = match self {
            Instance::Pd(spec) => {
                let initial_cluster = ctx
                    .pd_members
                    .iter()
                    .map(|pd| format!("{}=http://{}:{}", pd.member_name(), pd.host, pd.peer_port))
                    .collect::<Vec<_>>()
                    .join(",");
                writeln!(
                    out,
                    "name = \"{}\"\nclient-urls = \"http://0.0.0.0:{}\"\nadvertise-client-urls = \"http://{}:{}\"\npeer-urls = \"http://0.0.0.0:{}\"\nadvertise-peer-urls = \"http://{}:{}\"\ndata-dir = \"{}\"\ninitial-cluster = \"{}\"",
                    spec.member_name(),
                    spec.client_port,
                    spec.host,
                    spec.client_port,
                    spec.peer_port,
                    spec.host,
                    spec.peer_port,
                    spec.data_dir,
                    initial_cluster
                )
            }
            Instance::Tikv(spec) => writeln!(
                out,
                "addr = \"0.0.0.0:{}\"\nadvertise-addr = \"{}:{}\"\nstatus-addr = \"{}:{}\"\ndata-dir = \"{}\"\n\n[pd]\nendpoints = {:?}",
                spec.port,
                spec.host,
                spec.port,
                spec.host,
                spec.status_port,
                spec.data_dir,
                ctx.pd_endpoints()
            ),
            Instance::Tidb(spec) => writeln!(
                out,
                "host = \"0.0.0.0\"\nport = {}\nadvertise-address = \"{}\"\nstore = \"tikv\"\npath = \"{}\"\n\n[status]\nstatus-port = {}",
                spec.port,
                spec.host,
                ctx.pd_endpoints().join(","),
                spec.status_port
            ),
            Instance::Prometheus(spec) => writeln!(
                out,
                "listen-address = \"0.0.0.0:{}\"\nstorage-path = \"{}\"",
                spec.port, spec.data_dir
            ),
            Instance::Grafana(spec) => writeln!(out, "http_port = {}", spec.port),
        };
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pd::{MemberHealth, StoreInfo};

    fn tikv(host: &str) -> Instance {
        Instance::Tikv(TikvSpec {
            host: host.to_string(),
            ssh_port: 22,
            port: 20160,
            status_port: 20180,
            deploy_dir: "/deploy/tikv-20160".to_string(),
            data_dir: "/data/tikv-20160".to_string(),
        })
    }

    fn pd(host: &str) -> PdSpec {
        PdSpec {
            host: host.to_string(),
            name: None,
            ssh_port: 22,
            client_port: 2379,
            peer_port: 2380,
            deploy_dir: "/deploy/pd-2379".to_string(),
            data_dir: "/data/pd-2379".to_string(),
        }
    }

    #[test]
    fn capability_set_for_storage_node() {
        let instance = tikv("10.0.1.4");
        assert_eq!(instance.id(), "10.0.1.4:20160");
        assert_eq!(instance.used_ports(), vec![20160, 20180]);
        assert_eq!(
            instance.used_dirs(),
            vec!["/deploy/tikv-20160", "/data/tikv-20160"]
        );
        assert_eq!(instance.service_name(), "tikv-20160.service");
        assert_eq!(instance.config_path(), "/deploy/tikv-20160/conf/tikv.toml");
    }

    #[test]
    fn gateway_has_no_data_dir() {
        let instance = Instance::Tidb(TidbSpec {
            host: "10.0.1.7".to_string(),
            ssh_port: 22,
            port: 4000,
            status_port: 10080,
            deploy_dir: "/deploy/tidb-4000".to_string(),
        });
        assert_eq!(instance.used_dirs(), vec!["/deploy/tidb-4000"]);
        assert!(instance.data_dir().is_none());
    }

    #[test]
    fn storage_status_comes_from_store_state() {
        let snapshot = MembershipSnapshot::new(
            Some(vec![StoreInfo {
                id: 1,
                address: "10.0.1.4:20160".to_string(),
                state_name: "Offline".to_string(),
            }]),
            None,
        );
        assert_eq!(tikv("10.0.1.4").status(&snapshot), InstanceStatus::Offline);
        assert_eq!(
            tikv("10.0.1.5").status(&snapshot),
            InstanceStatus::Unresolved
        );
    }

    #[test]
    fn pd_status_comes_from_member_health() {
        let snapshot = MembershipSnapshot::new(
            None,
            Some(vec![MemberHealth {
                name: "pd-1".to_string(),
                member_id: 1,
                client_urls: vec!["http://10.0.1.1:2379".to_string()],
                health: false,
            }]),
        );
        let instance = Instance::Pd(pd("10.0.1.1"));
        assert_eq!(instance.status(&snapshot), InstanceStatus::Unhealthy);
    }

    #[test]
    fn storage_config_lists_pd_endpoints() {
        let ctx = ConfigContext {
            cluster_name: "prod".to_string(),
            version: "v4.0.0".to_string(),
            pd_members: vec![pd("10.0.1.1"), pd("10.0.1.2")],
        };
        let rendered = tikv("10.0.1.4").render_config(&ctx);
        assert!(rendered.contains("cluster prod (v4.0.0)"));
        assert!(rendered.contains(r#"endpoints = ["10.0.1.1:2379", "10.0.1.2:2379"]"#));
    }

    #[test]
    fn pd_config_lists_initial_cluster() {
        let ctx = ConfigContext {
            cluster_name: "prod".to_string(),
            version: "v4.0.0".to_string(),
            pd_members: vec![pd("10.0.1.1"), pd("10.0.1.2")],
        };
        let rendered = Instance::Pd(pd("10.0.1.1")).render_config(&ctx);
        assert!(rendered.contains(
            "initial-cluster = \"pd-10.0.1.1-2379=http://10.0.1.1:2380,pd-10.0.1.2-2379=http://10.0.1.2:2380\""
        ));
    }
}
