#[derive(Clone)]
pub struct WorkloadConfig {
    pub resource_count: usize,
    pub min_process_millis: u64,
    pub max_process_millis: u64,
}
