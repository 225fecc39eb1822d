use strum::{Display, EnumString, IntoStaticStr};

#[derive(EnumString, IntoStaticStr, Display, PartialEq, Eq, Hash, Clone)]
pub enum CounterType {
    #[strum(serialize = "processed_records")]
    ProcessedRecordTotal,
    #[strum(serialize = "poll_misses")]
    PollMissTotal,
    #[strum(serialize = "push_retries")]
    PushRetryTotal,
    #[strum(serialize = "queued_records")]
    QueuedRecordCurrent,
}

#[derive(EnumString, IntoStaticStr, Display, PartialEq, Eq, Hash, Clone)]
pub enum AggregateType {
    #[strum(serialize = "latest")]
    Latest,
    #[strum(serialize = "avg")]
    AvgByCount,
}

impl CounterType {
    pub fn get_aggregate_types(&self) -> Vec<AggregateType> {
        match self {
            Self::QueuedRecordCurrent => vec![AggregateType::Latest],
            Self::ProcessedRecordTotal | Self::PollMissTotal | Self::PushRetryTotal => {
                vec![AggregateType::Latest, AggregateType::AvgByCount]
            }
        }
    }
}
