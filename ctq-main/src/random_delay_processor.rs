use std::time::{SystemTime, UNIX_EPOCH};

use rand::{rngs::SmallRng, Rng, SeedableRng};

use ctq_common::utils::time_util::TimeUtil;
use ctq_pipeline::Processor;

use crate::work_unit::WorkUnit;

/// Demo workload: stamp the unit and stall for a random duration to mimic
/// uneven per-item processing cost across stages.
pub struct RandomDelayProcessor {
    rng: SmallRng,
    min_millis: u64,
    max_millis: u64,
}

impl RandomDelayProcessor {
    pub fn new(min_millis: u64, max_millis: u64, seed: Option<u64>) -> Self {
        let seed = seed.unwrap_or_else(|| {
            let since_the_epoch = SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .expect("Time went backwards");
            since_the_epoch.as_secs_f64().to_bits()
        });
        Self {
            rng: SmallRng::seed_from_u64(seed),
            min_millis,
            max_millis,
        }
    }
}

impl Processor<WorkUnit> for RandomDelayProcessor {
    fn process(&mut self, mut unit: WorkUnit) -> anyhow::Result<WorkUnit> {
        unit.gain = 1.0;
        unit.offset = 1.00;
        unit.tag = "processed".to_string();

        let delay = self.rng.random_range(self.min_millis..=self.max_millis);
        TimeUtil::sleep_millis(delay);
        Ok(unit)
    }
}
