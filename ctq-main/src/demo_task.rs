use std::{
    fs,
    str::FromStr,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    thread::JoinHandle,
};

use anyhow::bail;
use log::LevelFilter;
use log4rs::{
    append::console::ConsoleAppender,
    config::{Appender, Config, Deserializers, RawConfig, Root},
    encode::pattern::PatternEncoder,
};

use ctq_common::{
    config::task_config::TaskConfig, error::Error, log_finished, log_info,
    monitor::monitor::Monitor, queue::CrossThreadQueue, utils::time_util::TimeUtil,
};
use ctq_pipeline::BaseStage;

use crate::{random_delay_processor::RandomDelayProcessor, work_unit::WorkUnit};

const LOG_LEVEL_PLACEHOLDER: &str = "LOG_LEVEL_PLACEHOLDER";
const LOG_DIR_PLACEHOLDER: &str = "LOG_DIR_PLACEHOLDER";
const CONSOLE_PATTERN: &str = "{d(%Y-%m-%d %H:%M:%S%.6f)} - {l} - {m}{n}";

pub struct DemoTask {
    config: TaskConfig,
}

impl DemoTask {
    pub fn new(task_config_file: &str) -> anyhow::Result<Self> {
        let config = TaskConfig::new(task_config_file)?;
        Ok(Self { config })
    }

    pub fn run(&self) -> anyhow::Result<()> {
        self.init_log4rs()?;

        let workload = &self.config.workload;
        let pipeline = &self.config.pipeline;

        // work flow:            /-- stage_1 -> stage_3 --\
        //  vacant -> stage_0 <                             > -> result
        //                       \-- stage_2 -> stage_4 --/
        let vacant = Arc::new(CrossThreadQueue::new());
        let hub = Arc::new(CrossThreadQueue::with_max_count(pipeline.buffer_size));
        let branch_a = Arc::new(CrossThreadQueue::with_max_count(pipeline.buffer_size));
        let branch_b = Arc::new(CrossThreadQueue::with_max_count(pipeline.buffer_size));
        let result = Arc::new(CrossThreadQueue::new());

        for id in 0..workload.resource_count {
            vacant.push(WorkUnit::new(id));
        }

        let shutdown = Arc::new(AtomicBool::new(false));
        let wiring = [
            ("stage_0", &vacant, &hub),
            ("stage_1", &hub, &branch_a),
            ("stage_2", &hub, &branch_b),
            ("stage_3", &branch_a, &result),
            ("stage_4", &branch_b, &result),
        ];

        let mut monitors = Vec::new();
        let mut handles = Vec::new();
        for (name, input, output) in wiring {
            let monitor = Arc::new(Monitor::new(name, "demo"));
            let processor = RandomDelayProcessor::new(
                workload.min_process_millis,
                workload.max_process_millis,
                None,
            );
            let stage = BaseStage::new(
                name,
                input.clone(),
                output.clone(),
                processor,
                shutdown.clone(),
                monitor.clone(),
                pipeline.batch_size,
                pipeline.poll_interval_millis,
            );
            handles.push(stage.spawn()?);
            monitors.push(monitor);
        }

        while result.len() < workload.resource_count {
            log_info!(
                "[{:3}] [{:3}] [{:3}] [{:3}] [{:3}]",
                vacant.len(),
                hub.len(),
                branch_a.len(),
                branch_b.len(),
                result.len()
            );
            TimeUtil::sleep_millis(pipeline.checkpoint_interval_millis);
        }

        shutdown.store(true, Ordering::Release);
        Self::join_stages(handles)?;
        for monitor in &monitors {
            monitor.flush();
        }

        log_info!(
            "[{:3}] [{:3}] [{:3}] [{:3}] [{:3}]",
            vacant.len(),
            hub.len(),
            branch_a.len(),
            branch_b.len(),
            result.len()
        );
        log_finished!("demo finished, {} work units drained", result.len());
        Ok(())
    }

    fn join_stages(handles: Vec<JoinHandle<()>>) -> anyhow::Result<()> {
        for handle in handles {
            if handle.join().is_err() {
                bail!(Error::PipelineError("stage thread panicked".into()));
            }
        }
        Ok(())
    }

    fn init_log4rs(&self) -> anyhow::Result<()> {
        let log4rs_file = &self.config.runtime.log4rs_file;
        if log4rs_file.is_empty() || fs::metadata(log4rs_file).is_err() {
            return Self::init_console_logger(&self.config.runtime.log_level);
        }

        let config_str = fs::read_to_string(log4rs_file)?
            .replace(LOG_DIR_PLACEHOLDER, &self.config.runtime.log_dir)
            .replace(LOG_LEVEL_PLACEHOLDER, &self.config.runtime.log_level);

        let raw: RawConfig = serde_yaml::from_str(&config_str)?;
        let (appenders, errors) = raw.appenders_lossy(&Deserializers::default());
        if !errors.is_empty() {
            bail!("errors deserializing appenders: {:?}", errors);
        }

        let config = Config::builder()
            .appenders(appenders)
            .loggers(raw.loggers())
            .build(raw.root())?;
        log4rs::init_config(config)?;
        Ok(())
    }

    fn init_console_logger(log_level: &str) -> anyhow::Result<()> {
        let level = LevelFilter::from_str(log_level).unwrap_or(LevelFilter::Info);
        let stdout = ConsoleAppender::builder()
            .encoder(Box::new(PatternEncoder::new(CONSOLE_PATTERN)))
            .build();
        let config = Config::builder()
            .appender(Appender::builder().build("stdout", Box::new(stdout)))
            .build(Root::builder().appender("stdout").build(level))?;
        log4rs::init_config(config)?;
        Ok(())
    }
}
