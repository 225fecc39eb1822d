use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    thread::{self, JoinHandle},
};

use anyhow::{bail, Context};

use ctq_common::{
    error::Error,
    log_error,
    monitor::{counter_type::CounterType, monitor::Monitor},
    queue::{CrossThreadQueue, PushError},
    utils::time_util::TimeUtil,
};

use crate::processor::Processor;

/// One worker of a pipeline: drains its input queue, runs the processor on
/// each item and forwards it to the output queue. An empty input is polled
/// with a sleep in between, re-checking the shutdown flag each round; a full
/// output is retried the same way so no item is ever dropped by a stage.
pub struct BaseStage<T, P> {
    pub name: String,
    pub input: Arc<CrossThreadQueue<T>>,
    pub output: Arc<CrossThreadQueue<T>>,
    pub processor: P,
    pub shutdown: Arc<AtomicBool>,
    pub monitor: Arc<Monitor>,
    pub batch_size: usize,
    pub poll_interval_millis: u64,
}

impl<T, P> BaseStage<T, P>
where
    T: Send + 'static,
    P: Processor<T> + 'static,
{
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        name: &str,
        input: Arc<CrossThreadQueue<T>>,
        output: Arc<CrossThreadQueue<T>>,
        processor: P,
        shutdown: Arc<AtomicBool>,
        monitor: Arc<Monitor>,
        batch_size: usize,
        poll_interval_millis: u64,
    ) -> Self {
        Self {
            name: name.into(),
            input,
            output,
            processor,
            shutdown,
            monitor,
            batch_size: batch_size.max(1),
            poll_interval_millis,
        }
    }

    pub fn run(mut self) -> anyhow::Result<()> {
        while !self.shutdown.load(Ordering::Acquire) {
            let items = self.input.pop_many(self.batch_size);
            if items.is_empty() {
                self.monitor.add_counter(CounterType::PollMissTotal, 1);
                TimeUtil::sleep_millis(self.poll_interval_millis);
                continue;
            }

            let mut processed = 0;
            for item in items {
                let processed_item = match self.processor.process(item) {
                    Ok(processed_item) => processed_item,
                    Err(error) => bail!(Error::PipelineError(format!(
                        "stage [{}] processor error: {}",
                        self.name, error
                    ))),
                };
                if !self.forward(processed_item) {
                    // shutdown raised while the output stayed full
                    return Ok(());
                }
                processed += 1;
            }

            self.monitor
                .add_batch_counter(CounterType::ProcessedRecordTotal, processed, processed);
            self.monitor
                .set_counter(CounterType::QueuedRecordCurrent, self.output.len() as u64);
        }
        Ok(())
    }

    // backpressure: retry a full output queue instead of evicting someone
    // else's in-flight work
    fn forward(&self, item: T) -> bool {
        let mut item = item;
        loop {
            match self.output.try_push(item) {
                Ok(()) => return true,
                Err(PushError::Full(returned)) => {
                    if self.shutdown.load(Ordering::Acquire) {
                        return false;
                    }
                    self.monitor.add_counter(CounterType::PushRetryTotal, 1);
                    item = returned;
                    TimeUtil::sleep_millis(self.poll_interval_millis);
                }
            }
        }
    }

    pub fn spawn(self) -> anyhow::Result<JoinHandle<()>> {
        let stage_name = self.name.clone();
        thread::Builder::new()
            .name(stage_name.clone())
            .spawn(move || {
                let name = self.name.clone();
                if let Err(error) = self.run() {
                    log_error!("stage [{}] exited with error: {}", name, error);
                }
            })
            .with_context(|| format!("failed to spawn stage thread [{}]", stage_name))
    }
}
