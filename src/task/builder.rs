// ABOUTME: Fluent assembly of task pipelines.
// ABOUTME: Each call appends one task; build() yields the Serial pipeline.

use super::{CopyFile, InitConfig, Mkdir, Serial, ServiceAction, SystemCtl, Task};
use crate::meta::{ConfigContext, Instance};
use std::path::PathBuf;

#[derive(Default)]
pub struct Builder {
    tasks: Vec<Box<dyn Task>>,
}

impl Builder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mkdir(mut self, host: &str, dirs: Vec<String>) -> Self {
        self.tasks.push(Box::new(Mkdir::new(host, dirs)));
        self
    }

    pub fn copy_file(mut self, host: &str, src: impl Into<PathBuf>, dst: &str) -> Self {
        self.tasks.push(Box::new(CopyFile::new(host, src, dst)));
        self
    }

    pub fn init_config(
        mut self,
        instance: &Instance,
        config: &ConfigContext,
        deploy_user: &str,
        cache_dir: impl Into<PathBuf>,
    ) -> Self {
        self.tasks.push(Box::new(InitConfig::new(
            instance.clone(),
            config.clone(),
            deploy_user,
            cache_dir,
        )));
        self
    }

    pub fn systemctl(mut self, instance: &Instance, action: ServiceAction) -> Self {
        self.tasks.push(Box::new(SystemCtl::new(
            instance.host(),
            instance.service_name(),
            action,
        )));
        self
    }

    /// Append an arbitrary task.
    pub fn task(mut self, task: Box<dyn Task>) -> Self {
        self.tasks.push(task);
        self
    }

    pub fn build(self) -> Serial {
        Serial::new(self.tasks)
    }
}
