//! Job counting for progress display.
//!
//! Counts never influence conversion output; they only feed a [`ProgressSink`].

/// Receiver of progress updates
pub trait ProgressSink {
    /// Work is about to start
    fn start(&mut self, _total: u64) {}

    /// One or more items finished
    fn update(&mut self, completed: u64, total: u64);

    /// Work is over
    fn stop(&mut self, _completed: u64, _total: u64) {}
}

/// Total and completed work items, both saturating at `u64::MAX`
#[derive(Default)]
pub struct JobCounter {
    total: u64,
    completed: u64,
    sink: Option<Box<dyn ProgressSink>>,
}

impl std::fmt::Debug for JobCounter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JobCounter")
            .field("total", &self.total)
            .field("completed", &self.completed)
            .field("has_sink", &self.sink.is_some())
            .finish()
    }
}

impl JobCounter {
    /// Empty counter with no sink attached
    pub fn new() -> Self {
        Self::default()
    }

    /// Route updates to `sink`
    pub fn attach(&mut self, sink: Box<dyn ProgressSink>) {
        self.sink = Some(sink);
    }

    /// Count one more item of work
    pub fn add_job(&mut self) {
        self.total = self.total.saturating_add(1);
    }

    /// Mark one item finished and notify the sink
    pub fn complete_job(&mut self) {
        self.complete_jobs(1);
    }

    /// Mark `count` items finished at once, e.g. a skipped subtree
    pub fn complete_jobs(&mut self, count: u64) {
        if count == 0 {
            return;
        }
        self.completed = self.completed.saturating_add(count);
        let (completed, total) = (self.completed, self.total);
        if let Some(sink) = self.sink.as_mut() {
            sink.update(completed, total);
        }
    }

    /// Tell the sink how much work there is
    pub fn start(&mut self) {
        let total = self.total;
        if let Some(sink) = self.sink.as_mut() {
            sink.start(total);
        }
    }

    /// Tell the sink the work is over
    pub fn stop(&mut self) {
        let (completed, total) = (self.completed, self.total);
        if let Some(sink) = self.sink.as_mut() {
            sink.stop(completed, total);
        }
    }

    /// Items counted so far
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Items finished so far
    pub fn completed(&self) -> u64 {
        self.completed
    }
}
