/// Payload circulating through the demo pipeline.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct WorkUnit {
    pub id: usize,
    pub gain: f32,
    pub offset: f64,
    pub tag: String,
}

impl WorkUnit {
    pub fn new(id: usize) -> Self {
        Self {
            id,
            ..Default::default()
        }
    }
}
