// ABOUTME: Test support utilities.
// ABOUTME: In-memory executors, membership view and metadata store shared by integration tests.

use async_trait::async_trait;
use clusterops::executor::{ExecError, RemoteExecutor};
use clusterops::meta::{ClusterMeta, MetaError, MetaStore, Topology};
use clusterops::pd::{MemberHealth, MembershipView, PdError, StoreInfo};
use clusterops::ssh::CommandOutput;
use clusterops::task::Context;
use clusterops::types::ClusterName;
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Once};

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for tests. Safe to call multiple times.
#[allow(dead_code)]
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::EnvFilter;
        let filter = EnvFilter::from_default_env()
            .add_directive("clusterops=debug".parse().unwrap());
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init()
            .ok();
    });
}

/// Commands seen by every mock executor, as `host: command`, in call order.
pub type Journal = Arc<Mutex<Vec<String>>>;

/// Executor that records commands and answers from canned responses.
pub struct MockExecutor {
    host: String,
    journal: Journal,
    failures: Vec<(String, u32)>,
    responses: Vec<(String, String)>,
    uploads: Mutex<Vec<(PathBuf, String, String)>>,
    systemd: bool,
    removed_units: Mutex<Vec<String>>,
}

#[allow(dead_code)]
impl MockExecutor {
    pub fn new(host: &str, journal: &Journal) -> Self {
        Self {
            host: host.to_string(),
            journal: Arc::clone(journal),
            failures: Vec::new(),
            responses: Vec::new(),
            uploads: Mutex::new(Vec::new()),
            systemd: false,
            removed_units: Mutex::new(Vec::new()),
        }
    }

    /// Fail every command containing `pattern`.
    pub fn fail_on(self, pattern: &str) -> Self {
        self.fail_with(pattern, 1)
    }

    /// Fail every command containing `pattern` with `exit_code`.
    pub fn fail_with(mut self, pattern: &str, exit_code: u32) -> Self {
        self.failures.push((pattern.to_string(), exit_code));
        self
    }

    /// Track unit files: once one is removed, stopping that unit exits with status 5.
    pub fn with_systemd(mut self) -> Self {
        self.systemd = true;
        self
    }

    /// Answer commands containing `pattern` with `stdout`.
    pub fn respond(mut self, pattern: &str, stdout: &str) -> Self {
        self.responses.push((pattern.to_string(), stdout.to_string()));
        self
    }

    /// Local path, remote path and file content of every upload.
    pub fn uploads(&self) -> Vec<(PathBuf, String, String)> {
        self.uploads.lock().clone()
    }
}

#[async_trait]
impl RemoteExecutor for MockExecutor {
    fn host(&self) -> &str {
        &self.host
    }

    async fn run(&self, command: &str) -> Result<CommandOutput, ExecError> {
        self.journal.lock().push(format!("{}: {}", self.host, command));

        if let Some((_, exit_code)) = self
            .failures
            .iter()
            .find(|(p, _)| command.contains(p.as_str()))
        {
            return Err(ExecError::NonZeroExit {
                command: command.to_string(),
                exit_code: *exit_code,
                stderr: "injected failure".to_string(),
            });
        }

        if self.systemd {
            if let Some(unit) = command.strip_prefix("sudo -n systemctl stop ") {
                let unit = unit.trim_matches('\'');
                if self.removed_units.lock().iter().any(|u| u == unit) {
                    return Err(ExecError::NonZeroExit {
                        command: command.to_string(),
                        exit_code: 5,
                        stderr: format!("Failed to stop {unit}: Unit {unit} not loaded."),
                    });
                }
            }
            if command.contains("rm -rf") {
                self.removed_units.lock().extend(
                    command
                        .split_whitespace()
                        .filter_map(|t| t.trim_matches('\'').strip_prefix("/etc/systemd/system/"))
                        .map(str::to_string),
                );
            }
        }

        let stdout = self
            .responses
            .iter()
            .find(|(pattern, _)| command.contains(pattern.as_str()))
            .map(|(_, stdout)| stdout.clone())
            .unwrap_or_default();
        Ok(CommandOutput {
            exit_code: 0,
            stdout,
            stderr: String::new(),
        })
    }

    async fn upload(&self, local_path: &Path, remote_path: &str) -> Result<(), ExecError> {
        self.journal
            .lock()
            .push(format!("{}: upload {}", self.host, remote_path));
        if self.failures.iter().any(|(p, _)| remote_path.contains(p.as_str())) {
            return Err(ExecError::Io(std::io::Error::other("injected upload failure")));
        }
        let content = std::fs::read_to_string(local_path)?;
        self.uploads
            .lock()
            .push((local_path.to_path_buf(), remote_path.to_string(), content));
        Ok(())
    }
}

/// A context with a mock executor for every host in the topology.
#[allow(dead_code)]
pub fn mock_context(topology: &Topology, journal: &Journal) -> Context {
    let mut ctx = Context::default();
    for entry in topology.hosts() {
        ctx.set_executor(Arc::new(MockExecutor::new(&entry.host, journal)));
    }
    ctx
}

/// Like [`mock_context`], with executors that track removed unit files.
#[allow(dead_code)]
pub fn systemd_context(topology: &Topology, journal: &Journal) -> Context {
    let mut ctx = Context::default();
    for entry in topology.hosts() {
        ctx.set_executor(Arc::new(
            MockExecutor::new(&entry.host, journal).with_systemd(),
        ));
    }
    ctx
}

/// Membership view with fixed answers. `None` makes the query fail.
#[derive(Default)]
pub struct MockMembership {
    pub stores: Option<Vec<StoreInfo>>,
    pub health: Option<Vec<MemberHealth>>,
    pub store_queries: AtomicUsize,
}

#[allow(dead_code)]
impl MockMembership {
    pub fn new(stores: Vec<StoreInfo>, health: Vec<MemberHealth>) -> Self {
        Self {
            stores: Some(stores),
            health: Some(health),
            store_queries: AtomicUsize::new(0),
        }
    }

    pub fn unreachable() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MembershipView for MockMembership {
    async fn stores(&self) -> Result<Vec<StoreInfo>, PdError> {
        self.store_queries.fetch_add(1, Ordering::SeqCst);
        self.stores.clone().ok_or(PdError::NoEndpoints)
    }

    async fn health(&self) -> Result<Vec<MemberHealth>, PdError> {
        self.health.clone().ok_or(PdError::NoEndpoints)
    }
}

#[allow(dead_code)]
pub fn store(id: u64, address: &str, state_name: &str) -> StoreInfo {
    StoreInfo {
        id,
        address: address.to_string(),
        state_name: state_name.to_string(),
    }
}

#[allow(dead_code)]
pub fn member(host: &str, healthy: bool) -> MemberHealth {
    MemberHealth {
        name: format!("pd-{host}-2379"),
        member_id: 1,
        client_urls: vec![format!("http://{host}:2379")],
        health: healthy,
    }
}

/// Metadata store kept in memory, optionally failing every save.
#[derive(Default)]
pub struct MemoryStore {
    pub saved: Mutex<Vec<ClusterMeta>>,
    pub fail_saves: bool,
}

#[allow(dead_code)]
impl MemoryStore {
    pub fn failing() -> Self {
        Self {
            saved: Mutex::new(Vec::new()),
            fail_saves: true,
        }
    }

    pub fn last_saved(&self) -> Option<ClusterMeta> {
        self.saved.lock().last().cloned()
    }
}

impl MetaStore for MemoryStore {
    fn load(&self, name: &ClusterName) -> Result<ClusterMeta, MetaError> {
        self.last_saved()
            .ok_or_else(|| MetaError::NotFound(name.clone()))
    }

    fn save(&self, _name: &ClusterName, meta: &ClusterMeta) -> Result<(), MetaError> {
        if self.fail_saves {
            return Err(MetaError::Io {
                path: PathBuf::from("/clusters/meta.yaml"),
                source: std::io::Error::other("disk full"),
            });
        }
        self.saved.lock().push(meta.clone());
        Ok(())
    }
}

#[allow(dead_code)]
pub const TOPOLOGY: &str = r#"
pd_servers:
  - host: 10.0.1.1
    deploy_dir: /deploy/pd-2379
    data_dir: /data/pd-2379
  - host: 10.0.1.2
    deploy_dir: /deploy/pd-2379
    data_dir: /data/pd-2379
  - host: 10.0.1.3
    deploy_dir: /deploy/pd-2379
    data_dir: /data/pd-2379
tikv_servers:
  - host: 10.0.1.4
    deploy_dir: /deploy/tikv-20160
    data_dir: /data/tikv-20160
  - host: 10.0.1.5
    deploy_dir: /deploy/tikv-20160
    data_dir: /data/tikv-20160
  - host: 10.0.1.6
    deploy_dir: /deploy/tikv-20160
    data_dir: /data/tikv-20160
tidb_servers:
  - host: 10.0.1.7
    deploy_dir: /deploy/tidb-4000
"#;

#[allow(dead_code)]
pub fn topology() -> Topology {
    serde_yaml::from_str(TOPOLOGY).unwrap()
}

#[allow(dead_code)]
pub fn cluster_meta() -> ClusterMeta {
    ClusterMeta {
        name: "prod".parse().unwrap(),
        user: "tidb".to_string(),
        version: "v4.0.0".to_string(),
        topology: topology(),
    }
}
