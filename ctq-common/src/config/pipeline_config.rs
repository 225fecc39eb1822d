#[derive(Clone)]
pub struct PipelineConfig {
    /// Capacity bound of the queues between stages.
    pub buffer_size: usize,
    /// Items a stage drains from its input queue per iteration.
    pub batch_size: usize,
    /// Idle sleep between polls of an empty input queue.
    pub poll_interval_millis: u64,
    /// Cadence of the progress/monitor log lines.
    pub checkpoint_interval_millis: u64,
}
