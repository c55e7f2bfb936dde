//! Progress reporting for long-running front-ends.
//!
//! Percentages reported during one request never decrease. Reporting is
//! purely informational; sinks cannot influence the computation.

/// Receives `(percent, label)` milestones.
pub trait ProgressSink {
    fn report(&mut self, percent: u8, label: &str);
}

impl<F: FnMut(u8, &str)> ProgressSink for F {
    fn report(&mut self, percent: u8, label: &str) {
        self(percent, label)
    }
}

/// Discards every milestone.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn report(&mut self, _percent: u8, _label: &str) {}
}

/// Collects milestones in memory.
#[derive(Debug, Default, Clone)]
pub struct RecordedProgress {
    pub steps: Vec<(u8, String)>,
}

impl RecordedProgress {
    pub fn percents(&self) -> Vec<u8> {
        self.steps.iter().map(|(p, _)| *p).collect()
    }
}

impl ProgressSink for RecordedProgress {
    fn report(&mut self, percent: u8, label: &str) {
        self.steps.push((percent, label.to_string()));
    }
}
