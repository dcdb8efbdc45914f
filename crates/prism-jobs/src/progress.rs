/// Progress hooks a front end can implement. All methods default to no-ops.
pub trait JobProgress {
    fn begin(&self, _total: usize) {}
    fn step(&self, _label: &str) {}
    fn end(&self) {}
}

impl JobProgress for () {}
