use std::{thread, time::Duration};

pub struct TimeUtil {}

impl TimeUtil {
    /// Stateless sleep helper, blocks only the calling thread.
    #[inline(always)]
    pub fn sleep_millis(millis: u64) {
        thread::sleep(Duration::from_millis(millis));
    }
}
