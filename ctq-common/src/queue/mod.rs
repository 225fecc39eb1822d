pub mod cross_thread_queue;
pub mod push_error;

pub use cross_thread_queue::CrossThreadQueue;
pub use push_error::PushError;
