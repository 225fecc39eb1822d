pub mod ini_loader;
pub mod pipeline_config;
pub mod runtime_config;
pub mod task_config;
pub mod workload_config;
