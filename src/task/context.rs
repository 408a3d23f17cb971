// ABOUTME: Per-operation registry of remote executors and shared SSH credentials.
// ABOUTME: Built once before tasks run; tasks only ever see it through a shared reference.

use super::error::TaskError;
use crate::diagnostics::{Diagnostics, Warning};
use crate::executor::{RemoteExecutor, SshExecutor};
use crate::meta::Topology;
use crate::ssh::SessionConfig;
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

/// Private and public key shared by every host of a cluster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SshKeySet {
    pub private_key: PathBuf,
    pub public_key: PathBuf,
}

/// Connection settings applied to every executor the context creates.
#[derive(Debug, Clone)]
pub struct SshOptions {
    pub command_timeout: Duration,
    pub trust_first_connection: bool,
    pub known_hosts_path: Option<PathBuf>,
}

impl Default for SshOptions {
    fn default() -> Self {
        Self {
            command_timeout: Duration::from_secs(60),
            trust_first_connection: true,
            known_hosts_path: None,
        }
    }
}

/// Routes operations to per-host executors.
pub struct Context {
    executors: HashMap<String, Arc<dyn RemoteExecutor>>,
    ssh_key_set: Option<SshKeySet>,
    ssh_timeout: Duration,
    options: SshOptions,
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut hosts: Vec<_> = self.executors.keys().collect();
        hosts.sort();
        f.debug_struct("Context")
            .field("hosts", &hosts)
            .field("ssh_key_set", &self.ssh_key_set)
            .field("ssh_timeout", &self.ssh_timeout)
            .finish()
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new(SshOptions::default())
    }
}

impl Context {
    pub fn new(options: SshOptions) -> Self {
        Self {
            executors: HashMap::new(),
            ssh_key_set: None,
            ssh_timeout: Duration::from_secs(5),
            options,
        }
    }

    /// Set the key pair used for every SSH connection.
    ///
    /// The key set can be set once; setting the same paths again is a no-op.
    pub fn set_ssh_key_set(
        &mut self,
        private_key: impl AsRef<Path>,
        public_key: impl AsRef<Path>,
    ) -> Result<(), TaskError> {
        let key_set = SshKeySet {
            private_key: private_key.as_ref().to_path_buf(),
            public_key: public_key.as_ref().to_path_buf(),
        };
        match &self.ssh_key_set {
            Some(existing) if *existing != key_set => Err(TaskError::SshKeySetConflict(
                existing.private_key.clone(),
            )),
            _ => {
                self.ssh_key_set = Some(key_set);
                Ok(())
            }
        }
    }

    pub fn ssh_key_set(&self) -> Option<&SshKeySet> {
        self.ssh_key_set.as_ref()
    }

    pub fn ssh_timeout(&self) -> Duration {
        self.ssh_timeout
    }

    /// Register an SSH executor for every distinct host in the topology.
    ///
    /// Re-registering a host replaces its executor.
    pub fn set_cluster_ssh(
        &mut self,
        topology: &Topology,
        user: &str,
        timeout: Duration,
    ) -> Result<(), TaskError> {
        let key_set = self
            .ssh_key_set
            .as_ref()
            .ok_or(TaskError::MissingSshKeySet)?;
        self.ssh_timeout = timeout;

        let mut executors: Vec<Arc<dyn RemoteExecutor>> = Vec::new();
        for entry in topology.hosts() {
            let mut config = SessionConfig::new(&entry.host, user, &key_set.private_key)
                .port(entry.ssh_port)
                .trust_on_first_use(self.options.trust_first_connection)
                .connect_timeout(timeout)
                .command_timeout(self.options.command_timeout);
            if let Some(path) = &self.options.known_hosts_path {
                config = config.known_hosts_path(path);
            }
            executors.push(Arc::new(SshExecutor::new(config)));
        }

        tracing::debug!(hosts = executors.len(), user, "registered cluster executors");
        for executor in executors {
            self.set_executor(executor);
        }
        Ok(())
    }

    /// Register an executor under the host it targets.
    pub fn set_executor(&mut self, executor: Arc<dyn RemoteExecutor>) {
        self.executors.insert(executor.host().to_string(), executor);
    }

    /// The executor registered for `host`, if any.
    pub fn get_executor(&self, host: &str) -> Option<Arc<dyn RemoteExecutor>> {
        self.executors.get(host).cloned()
    }

    /// The executor registered for `host`, or [`TaskError::NoExecutor`].
    pub fn executor(&self, host: &str) -> Result<Arc<dyn RemoteExecutor>, TaskError> {
        self.get_executor(host).ok_or_else(|| TaskError::NoExecutor {
            host: host.to_string(),
        })
    }

    /// Number of registered hosts.
    pub fn host_count(&self) -> usize {
        self.executors.len()
    }

    /// Close every executor's connection. Failures are recorded, not returned.
    pub async fn close_all(&self, diag: &Diagnostics) {
        for (host, executor) in &self.executors {
            if let Err(e) = executor.close().await {
                diag.warn(Warning::ssh_disconnect(format!(
                    "failed to disconnect from {host}: {e}"
                )));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::meta::{PdSpec, TikvSpec};

    fn topology() -> Topology {
        let mut topo = Topology::new(PdSpec {
            host: "10.0.1.1".to_string(),
            name: None,
            ssh_port: 22,
            client_port: 2379,
            peer_port: 2380,
            deploy_dir: "/deploy/pd-2379".to_string(),
            data_dir: "/data/pd-2379".to_string(),
        });
        for (host, port) in [("10.0.1.1", 20160), ("10.0.1.2", 20160), ("10.0.1.2", 20161)] {
            topo.tikv_servers.push(TikvSpec {
                host: host.to_string(),
                ssh_port: 22,
                port,
                status_port: port + 20,
                deploy_dir: format!("/deploy/tikv-{port}"),
                data_dir: format!("/data/tikv-{port}"),
            });
        }
        topo
    }

    #[test]
    fn cluster_ssh_requires_key_set() {
        let mut ctx = Context::default();
        let err = ctx
            .set_cluster_ssh(&topology(), "tidb", Duration::from_secs(5))
            .unwrap_err();
        assert!(matches!(err, TaskError::MissingSshKeySet));
    }

    #[test]
    fn cluster_ssh_registers_each_host_once() {
        let mut ctx = Context::default();
        ctx.set_ssh_key_set("/keys/id_rsa", "/keys/id_rsa.pub")
            .unwrap();
        ctx.set_cluster_ssh(&topology(), "tidb", Duration::from_secs(5))
            .unwrap();
        ctx.set_cluster_ssh(&topology(), "tidb", Duration::from_secs(8))
            .unwrap();

        assert_eq!(ctx.host_count(), 2);
        assert_eq!(ctx.ssh_timeout(), Duration::from_secs(8));
        assert!(ctx.get_executor("10.0.1.1").is_some());
        assert!(ctx.get_executor("10.0.1.2").is_some());
    }

    #[test]
    fn key_set_cannot_be_replaced() {
        let mut ctx = Context::default();
        ctx.set_ssh_key_set("/a/id_rsa", "/a/id_rsa.pub").unwrap();
        ctx.set_ssh_key_set("/a/id_rsa", "/a/id_rsa.pub").unwrap();
        let err = ctx
            .set_ssh_key_set("/b/id_rsa", "/b/id_rsa.pub")
            .unwrap_err();
        assert!(matches!(err, TaskError::SshKeySetConflict(_)));
        assert_eq!(
            ctx.ssh_key_set().unwrap().private_key,
            std::path::PathBuf::from("/a/id_rsa")
        );
    }

    #[test]
    fn missing_executor_is_a_distinct_error() {
        let ctx = Context::default();
        let err = ctx.executor("10.9.9.9").err().unwrap();
        assert_eq!(err.kind(), super::super::TaskErrorKind::NoExecutor);
        assert_eq!(err.host(), Some("10.9.9.9"));
    }
}
