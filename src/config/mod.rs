// ABOUTME: Operator settings read from <home>/config.yml.
// ABOUTME: Resolves the home directory and fills in defaults for anything left unset.

use crate::operation::TombstonePolicy;
use crate::task::SshOptions;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

pub const HOME_ENV: &str = "CLUSTEROPS_HOME";
pub const CONFIG_FILENAME: &str = "config.yml";
const DEFAULT_HOME_DIR: &str = ".clusterops";
const CLUSTERS_DIR: &str = "clusters";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot determine home directory: set {HOME_ENV} or HOME")]
    NoHome,

    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid configuration in {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_yaml::Error,
    },
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Timeout for establishing SSH connections.
    #[serde(default = "default_ssh_timeout", with = "humantime_serde")]
    pub ssh_timeout: Duration,

    /// Timeout for a single remote command or upload.
    #[serde(default = "default_command_timeout", with = "humantime_serde")]
    pub command_timeout: Duration,

    /// Timeout for each pd API request.
    #[serde(default = "default_pd_timeout", with = "humantime_serde")]
    pub pd_timeout: Duration,

    /// Accept and remember host keys not yet in known_hosts.
    #[serde(default = "default_trust_first_connection")]
    pub trust_first_connection: bool,

    #[serde(default)]
    pub known_hosts_path: Option<PathBuf>,

    #[serde(default)]
    pub tombstone: TombstonePolicy,
}

fn default_ssh_timeout() -> Duration {
    Duration::from_secs(5)
}

fn default_command_timeout() -> Duration {
    Duration::from_secs(60)
}

fn default_pd_timeout() -> Duration {
    Duration::from_secs(5)
}

fn default_trust_first_connection() -> bool {
    true
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            ssh_timeout: default_ssh_timeout(),
            command_timeout: default_command_timeout(),
            pd_timeout: default_pd_timeout(),
            trust_first_connection: default_trust_first_connection(),
            known_hosts_path: None,
            tombstone: TombstonePolicy::default(),
        }
    }
}

impl Settings {
    /// Load `<home>/config.yml`. A missing file yields the defaults.
    pub fn load(home: &Path) -> Result<Self, ConfigError> {
        let path = home.join(CONFIG_FILENAME);
        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no settings file, using defaults");
                return Ok(Self::default());
            }
            Err(source) => return Err(ConfigError::Read { path, source }),
        };
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(&content).map_err(|source| ConfigError::Parse { path, source })
    }

    /// Connection settings handed to every executor.
    pub fn ssh_options(&self) -> SshOptions {
        SshOptions {
            command_timeout: self.command_timeout,
            trust_first_connection: self.trust_first_connection,
            known_hosts_path: self.known_hosts_path.clone(),
        }
    }
}

/// `$CLUSTEROPS_HOME`, else `$HOME/.clusterops`.
pub fn home_dir() -> Result<PathBuf, ConfigError> {
    if let Some(home) = std::env::var_os(HOME_ENV).filter(|v| !v.is_empty()) {
        return Ok(PathBuf::from(home));
    }
    std::env::var_os("HOME")
        .filter(|v| !v.is_empty())
        .map(|home| PathBuf::from(home).join(DEFAULT_HOME_DIR))
        .ok_or(ConfigError::NoHome)
}

/// Directory holding one subdirectory per cluster.
pub fn clusters_dir(home: &Path) -> PathBuf {
    home.join(CLUSTERS_DIR)
}
