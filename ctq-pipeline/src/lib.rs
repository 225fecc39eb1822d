pub mod base_stage;
pub mod processor;

pub use base_stage::BaseStage;
pub use processor::Processor;
