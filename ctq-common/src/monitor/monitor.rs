use dashmap::DashMap;

use super::counter::Counter;
use super::counter_type::{AggregateType, CounterType};
use crate::log_monitor;

#[derive(Default)]
pub struct Monitor {
    pub name: String,
    pub description: String,
    pub counters: DashMap<CounterType, Counter>,
}

impl Monitor {
    pub fn new(name: &str, description: &str) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            counters: DashMap::new(),
        }
    }

    #[inline(always)]
    pub fn add_counter(&self, counter_type: CounterType, value: u64) {
        self.add_batch_counter(counter_type, value, 1);
    }

    #[inline(always)]
    pub fn add_batch_counter(&self, counter_type: CounterType, value: u64, count: u64) {
        self.counters
            .entry(counter_type)
            .or_default()
            .add(value, count);
    }

    // for point-in-time gauges, overwrites instead of accumulating
    #[inline(always)]
    pub fn set_counter(&self, counter_type: CounterType, value: u64) {
        let mut counter = self.counters.entry(counter_type).or_default();
        counter.value = value;
    }

    pub fn flush(&self) {
        let counter_types = self
            .counters
            .iter()
            .map(|entry| entry.key().clone())
            .collect::<Vec<_>>();
        for counter_type in counter_types {
            if let Some(counter) = self.counters.get(&counter_type) {
                let mut log = format!("{} | {} | {}", self.name, self.description, counter_type);
                for aggregate_type in counter_type.get_aggregate_types() {
                    let aggregate_value = match aggregate_type {
                        AggregateType::Latest => counter.value,
                        AggregateType::AvgByCount => counter.avg_by_count(),
                    };
                    log = format!("{} | {}={}", log, aggregate_type, aggregate_value);
                }
                log_monitor!("{}", log);
            }
        }
    }
}
