// ABOUTME: Render an instance's configuration locally and copy it into the deploy dir.
// ABOUTME: Rollback is unsupported: the previous configuration is not kept.

use super::{Context, Task, TaskError, run_on};
use crate::meta::{ConfigContext, Instance};
use crate::ssh::quote;
use async_trait::async_trait;
use std::fmt;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct InitConfig {
    instance: Instance,
    config: ConfigContext,
    deploy_user: String,
    cache_dir: PathBuf,
}

impl InitConfig {
    pub fn new(
        instance: Instance,
        config: ConfigContext,
        deploy_user: impl Into<String>,
        cache_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            instance,
            config,
            deploy_user: deploy_user.into(),
            cache_dir: cache_dir.into(),
        }
    }

    /// Where the rendered file is staged before upload.
    pub fn local_path(&self) -> PathBuf {
        self.cache_dir
            .join(format!("{}.toml", self.instance.service_name()))
    }
}

#[async_trait]
impl Task for InitConfig {
    async fn execute(&self, ctx: &Context) -> Result<(), TaskError> {
        let host = self.instance.host();
        let executor = ctx.executor(host)?;

        tokio::fs::create_dir_all(&self.cache_dir)
            .await
            .map_err(|source| TaskError::Local {
                path: self.cache_dir.clone(),
                source,
            })?;
        let local_path = self.local_path();
        tokio::fs::write(&local_path, self.instance.render_config(&self.config))
            .await
            .map_err(|source| TaskError::Local {
                path: local_path.clone(),
                source,
            })?;

        let conf_dir = format!("{}/conf", self.instance.deploy_dir());
        run_on(ctx, host, &format!("mkdir -p {}", quote(&conf_dir))).await?;
        executor
            .upload(&local_path, &self.instance.config_path())
            .await
            .map_err(|e| TaskError::remote(host, e))
    }

    async fn rollback(&self, _ctx: &Context) -> Result<(), TaskError> {
        Err(TaskError::unsupported_rollback(self))
    }
}

impl fmt::Display for InitConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "InitConfig: cluster={}, user={}, host={}, path={}",
            self.config.cluster_name,
            self.deploy_user,
            self.instance.host(),
            self.instance.config_path()
        )
    }
}
