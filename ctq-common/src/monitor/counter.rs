#[derive(Clone, Default)]
pub struct Counter {
    pub value: u64,
    pub count: u64,
}

impl Counter {
    pub fn new(value: u64, count: u64) -> Self {
        Self { value, count }
    }

    #[inline(always)]
    pub fn add(&mut self, value: u64, count: u64) {
        self.value += value;
        self.count += count;
    }

    #[inline(always)]
    pub fn avg_by_count(&self) -> u64 {
        if self.count > 0 {
            self.value / self.count
        } else {
            0
        }
    }
}
