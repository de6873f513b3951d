#![forbid(unsafe_code)]

//! Deterministic frame loop for tests.
//!
//! A [`Harness`] wires a [`FrameScheduler`] to a [`ManualClock`] and a
//! [`RecordingHost`]. Frames only happen when the test calls
//! [`Harness::tick`], and every tick is appended to a [`TickTrace`].

use std::rc::Rc;

use framewatch_runtime::{
    Component, FrameClock, FrameScheduler, ManualClock, Mounted, SchedulerConfig, TickReport,
    mount,
};

use crate::host::RecordingHost;
use crate::trace::TickTrace;

#[derive(Debug)]
pub struct Harness {
    scheduler: FrameScheduler,
    clock: Rc<ManualClock>,
    host: Rc<RecordingHost>,
    trace: TickTrace,
}

impl Default for Harness {
    fn default() -> Self {
        Self::new()
    }
}

impl Harness {
    /// Harness with the default configuration, minus the slow-check warning.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(SchedulerConfig::default().with_slow_check_budget(None))
    }

    #[must_use]
    pub fn with_config(config: SchedulerConfig) -> Self {
        let (scheduler, clock) = FrameScheduler::manual(config);
        Self {
            scheduler,
            clock,
            host: Rc::new(RecordingHost::new()),
            trace: TickTrace::new(),
        }
    }

    pub fn mount<C: Component>(&self, component: C) -> Mounted<C> {
        mount(&self.scheduler, self.host.clone(), component)
    }

    /// Deliver one frame and sweep.
    ///
    /// The sweep runs even if the clock has no pending request, so a test
    /// can observe what an unarmed scheduler does with a stray frame.
    pub fn tick(&mut self) -> TickReport {
        let _ = self.clock.take_frame();
        let before = self.host.redraw_count();
        let report = self.scheduler.tick();
        let requests = self.host.redraw_count().saturating_sub(before);
        self.trace.record(&report, requests);
        report
    }

    /// Run `n` ticks, returning their reports.
    pub fn tick_n(&mut self, n: usize) -> Vec<TickReport> {
        (0..n).map(|_| self.tick()).collect()
    }

    #[must_use]
    pub fn scheduler(&self) -> &FrameScheduler {
        &self.scheduler
    }

    #[must_use]
    pub fn clock(&self) -> &ManualClock {
        &self.clock
    }

    #[must_use]
    pub fn host(&self) -> &RecordingHost {
        &self.host
    }

    #[must_use]
    pub fn trace(&self) -> &TickTrace {
        &self.trace
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::Counter;

    #[test]
    fn tick_consumes_pending_frame_and_traces() {
        let mut harness = Harness::new();
        let counter = harness.mount(Counter::default());
        assert!(harness.clock().is_pending());

        let report = harness.tick();
        assert!(report.swept);
        assert_eq!(harness.trace().len(), 1);
        assert!(harness.clock().is_pending(), "tick re-arms");

        counter.with_mut(|c| c.count = 2);
        harness.tick();
        assert_eq!(harness.trace().entries()[1].redraw_requests, 1);
    }

    #[test]
    fn unarmed_tick_is_traced_as_unswept() {
        let mut harness = Harness::new();
        let report = harness.tick();
        assert!(!report.swept);
        assert!(!harness.trace().entries()[0].swept);
    }
}
