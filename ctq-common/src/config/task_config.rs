use anyhow::{bail, Context};

use super::{
    ini_loader::IniLoader, pipeline_config::PipelineConfig, runtime_config::RuntimeConfig,
    workload_config::WorkloadConfig,
};
use crate::error::Error;

#[derive(Clone)]
pub struct TaskConfig {
    pub runtime: RuntimeConfig,
    pub pipeline: PipelineConfig,
    pub workload: WorkloadConfig,
}

// sections
const RUNTIME: &str = "runtime";
const PIPELINE: &str = "pipeline";
const WORKLOAD: &str = "workload";
// keys
const BUFFER_SIZE: &str = "buffer_size";
const BATCH_SIZE: &str = "batch_size";
const POLL_INTERVAL_MILLIS: &str = "poll_interval_millis";
const CHECKPOINT_INTERVAL_MILLIS: &str = "checkpoint_interval_millis";
// default values
const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_LOG_DIR: &str = "./logs";
const DEFAULT_BUFFER_SIZE: usize = 16;
const DEFAULT_BATCH_SIZE: usize = 1;
const DEFAULT_POLL_INTERVAL_MILLIS: u64 = 100;
const DEFAULT_CHECKPOINT_INTERVAL_MILLIS: u64 = 10;
const DEFAULT_RESOURCE_COUNT: usize = 200;
const DEFAULT_MIN_PROCESS_MILLIS: u64 = 1;
const DEFAULT_MAX_PROCESS_MILLIS: u64 = 107;

impl TaskConfig {
    pub fn new(task_config_file: &str) -> anyhow::Result<Self> {
        let loader = IniLoader::new(task_config_file)
            .with_context(|| format!("invalid configs in [{}]", task_config_file))?;
        Self::load(&loader)
    }

    pub fn read(content: &str) -> anyhow::Result<Self> {
        let loader = IniLoader::read(content)?;
        Self::load(&loader)
    }

    fn load(loader: &IniLoader) -> anyhow::Result<Self> {
        Ok(Self {
            runtime: Self::load_runtime_config(loader),
            pipeline: Self::load_pipeline_config(loader)?,
            workload: Self::load_workload_config(loader)?,
        })
    }

    fn load_runtime_config(loader: &IniLoader) -> RuntimeConfig {
        RuntimeConfig {
            log_level: loader.get_with_default(RUNTIME, "log_level", DEFAULT_LOG_LEVEL.to_string()),
            log_dir: loader.get_with_default(RUNTIME, "log_dir", DEFAULT_LOG_DIR.to_string()),
            log4rs_file: loader.get_optional(RUNTIME, "log4rs_file"),
        }
    }

    fn load_pipeline_config(loader: &IniLoader) -> anyhow::Result<PipelineConfig> {
        let buffer_size = loader.get_with_default(PIPELINE, BUFFER_SIZE, DEFAULT_BUFFER_SIZE);
        if buffer_size == 0 {
            bail!(Error::ConfigError(format!(
                "[{}].{} must be greater than 0",
                PIPELINE, BUFFER_SIZE
            )));
        }

        Ok(PipelineConfig {
            buffer_size,
            batch_size: loader.get_with_default(PIPELINE, BATCH_SIZE, DEFAULT_BATCH_SIZE),
            poll_interval_millis: loader.get_with_default(
                PIPELINE,
                POLL_INTERVAL_MILLIS,
                DEFAULT_POLL_INTERVAL_MILLIS,
            ),
            checkpoint_interval_millis: loader.get_with_default(
                PIPELINE,
                CHECKPOINT_INTERVAL_MILLIS,
                DEFAULT_CHECKPOINT_INTERVAL_MILLIS,
            ),
        })
    }

    fn load_workload_config(loader: &IniLoader) -> anyhow::Result<WorkloadConfig> {
        let resource_count =
            loader.get_with_default(WORKLOAD, "resource_count", DEFAULT_RESOURCE_COUNT);
        let min_process_millis =
            loader.get_with_default(WORKLOAD, "min_process_millis", DEFAULT_MIN_PROCESS_MILLIS);
        let max_process_millis =
            loader.get_with_default(WORKLOAD, "max_process_millis", DEFAULT_MAX_PROCESS_MILLIS);
        if min_process_millis > max_process_millis {
            bail!(Error::ConfigError(format!(
                "min_process_millis ({}) must not exceed max_process_millis ({})",
                min_process_millis, max_process_millis
            )));
        }

        Ok(WorkloadConfig {
            resource_count,
            min_process_millis,
            max_process_millis,
        })
    }
}
