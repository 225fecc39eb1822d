use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::Instant,
};

use serial_test::serial;

use ctq_common::{
    monitor::monitor::Monitor, queue::CrossThreadQueue, utils::time_util::TimeUtil,
};
use ctq_pipeline::{BaseStage, Processor};

#[derive(Clone, Debug, Default, PartialEq)]
struct Unit {
    id: usize,
    hops: usize,
}

struct Hop {}

impl Processor<Unit> for Hop {
    fn process(&mut self, mut unit: Unit) -> anyhow::Result<Unit> {
        unit.hops += 1;
        Ok(unit)
    }
}

fn stage(
    name: &str,
    input: &Arc<CrossThreadQueue<Unit>>,
    output: &Arc<CrossThreadQueue<Unit>>,
    shutdown: &Arc<AtomicBool>,
) -> BaseStage<Unit, Hop> {
    BaseStage::new(
        name,
        input.clone(),
        output.clone(),
        Hop {},
        shutdown.clone(),
        Arc::new(Monitor::new(name, "pipeline_test")),
        2,
        1,
    )
}

/// The diamond graph of the demo: one fan-out stage feeding two parallel
/// branches that merge into a result queue. Every seeded unit must arrive
/// exactly once, having crossed exactly three stages.
#[test]
#[serial]
fn test_diamond_pipeline_drains_every_unit() {
    const UNITS: usize = 60;

    let vacant = Arc::new(CrossThreadQueue::new());
    let hub = Arc::new(CrossThreadQueue::with_max_count(8));
    let branch_a = Arc::new(CrossThreadQueue::with_max_count(8));
    let branch_b = Arc::new(CrossThreadQueue::with_max_count(8));
    let result = Arc::new(CrossThreadQueue::new());
    let shutdown = Arc::new(AtomicBool::new(false));

    for id in 0..UNITS {
        vacant.push(Unit { id, hops: 0 });
    }

    let stages = vec![
        stage("stage_0", &vacant, &hub, &shutdown),
        stage("stage_1", &hub, &branch_a, &shutdown),
        stage("stage_2", &hub, &branch_b, &shutdown),
        stage("stage_3", &branch_a, &result, &shutdown),
        stage("stage_4", &branch_b, &result, &shutdown),
    ];
    let mut handles = Vec::new();
    for stage in stages {
        handles.push(stage.spawn().unwrap());
    }

    let deadline = Instant::now() + std::time::Duration::from_secs(30);
    while result.len() < UNITS {
        assert!(Instant::now() < deadline, "pipeline stalled");
        TimeUtil::sleep_millis(2);
    }

    shutdown.store(true, Ordering::Release);
    for handle in handles {
        handle.join().unwrap();
    }

    let units = result.pop_many(usize::MAX);
    assert!(units.iter().all(|unit| unit.hops == 3));
    let mut ids: Vec<usize> = units.iter().map(|unit| unit.id).collect();
    ids.sort_unstable();
    assert_eq!(ids, (0..UNITS).collect::<Vec<_>>());
    assert!(vacant.is_empty());
    assert!(hub.is_empty());
    assert!(branch_a.is_empty());
    assert!(branch_b.is_empty());
}

/// A stage whose processor fails must stop without panicking the process,
/// leaving the unprocessed items in its input queue.
#[test]
#[serial]
fn test_failing_processor_stops_stage() {
    struct Failing {}
    impl Processor<Unit> for Failing {
        fn process(&mut self, _unit: Unit) -> anyhow::Result<Unit> {
            anyhow::bail!("corrupted unit");
        }
    }

    let input = Arc::new(CrossThreadQueue::new());
    let output: Arc<CrossThreadQueue<Unit>> = Arc::new(CrossThreadQueue::new());
    let shutdown = Arc::new(AtomicBool::new(false));
    input.push_batch((0..5).map(|id| Unit { id, hops: 0 }).collect());

    let stage = BaseStage::new(
        "stage_failing",
        input.clone(),
        output.clone(),
        Failing {},
        shutdown.clone(),
        Arc::new(Monitor::new("stage_failing", "pipeline_test")),
        1,
        1,
    );
    let handle = stage.spawn().unwrap();
    handle.join().unwrap();

    assert!(output.is_empty());
    // the failing item was consumed, the rest stayed behind
    assert_eq!(input.len(), 4);
}
