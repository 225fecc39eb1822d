pub mod counter;
pub mod counter_type;
#[allow(clippy::module_inception)]
pub mod monitor;
