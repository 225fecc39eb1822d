/// Per-item transformation a stage applies before forwarding downstream.
pub trait Processor<T>: Send {
    fn process(&mut self, item: T) -> anyhow::Result<T>;
}
